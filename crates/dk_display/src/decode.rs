use std::io::Read;

use dk_gfx::Image;
use dk_platform::DecodedImage;

use crate::ResourceError;

/// 读取图像字节源并解码为 RGBA8
pub fn load(image: &Image) -> Result<DecodedImage, ResourceError> {
    let source = image.source.as_ref().ok_or_else(|| ResourceError::NoSource {
        uri: image.uri.clone(),
    })?;

    let mut bytes = Vec::new();
    source
        .open()
        .and_then(|mut reader| reader.read_to_end(&mut bytes))
        .map_err(|source| ResourceError::Read {
            uri: image.uri.clone(),
            source,
        })?;

    let rgba = image::load_from_memory(&bytes)
        .map_err(|source| ResourceError::Decode {
            uri: image.uri.clone(),
            source,
        })?
        .to_rgba8();

    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::new(width, height, rgba.into_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0x20, 0x40, 0x60, 0xFF]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decodes_png() {
        let decoded = load(&Image::from_bytes("mem:swatch", png_bytes(3, 2))).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(&decoded.rgba[..4], &[0x20, 0x40, 0x60, 0xFF]);
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            load(&Image::unbacked("mem:none")),
            Err(ResourceError::NoSource { .. })
        ));
        assert!(matches!(
            load(&Image::file("/no/such/file.png")),
            Err(ResourceError::Read { .. })
        ));
        assert!(matches!(
            load(&Image::from_bytes("mem:junk", b"not an image".to_vec())),
            Err(ResourceError::Decode { .. })
        ));
    }
}
