use std::cell::Cell;
use std::ffi::c_void;

use dk_gfx::Font;
use dk_platform::{
    DecodedImage, DisplayBackend, MonitorInfo, NativeResource, Platform, PlatformError, WindowId,
};
use windows::Win32::Foundation::{COLORREF, HANDLE, HWND, SIZE};
use windows::Win32::Graphics::Gdi::*;

use crate::win_api;

/// GDI 颜色：`COLORREF` 及填充用的实心画刷
#[derive(Debug, Clone, Copy)]
pub struct WinColor {
    pub colorref: COLORREF,
    pub brush: HBRUSH,
}

#[derive(Debug, Clone, Copy)]
pub struct WinFont {
    pub hfont: HFONT,
    /// 创建时的字符高度（设备像素）
    pub height: i32,
}

/// Top-down 32bpp premultiplied BGRA DIB section.
#[derive(Debug, Clone, Copy)]
pub struct WinImage {
    pub bitmap: HBITMAP,
    pub width: u32,
    pub height: u32,
}

/// 与屏幕兼容的内存 DC，用于文本度量
#[derive(Debug, Clone, Copy)]
pub struct WinGc {
    pub hdc: HDC,
}

impl NativeResource for WinColor {
    fn native_id(&self) -> u64 {
        self.brush.0 as usize as u64
    }
}

impl NativeResource for WinFont {
    fn native_id(&self) -> u64 {
        self.hfont.0 as usize as u64
    }
}

impl NativeResource for WinImage {
    fn native_id(&self) -> u64 {
        self.bitmap.0 as usize as u64
    }
}

impl NativeResource for WinGc {
    fn native_id(&self) -> u64 {
        self.hdc.0 as usize as u64
    }
}

/// Win32 显示连接
///
/// Holds the screen DC for the lifetime of the connection; GDI objects created here are owned by
/// the caller until handed back to the matching `dispose_*`.
pub struct WindowsDisplay {
    screen_dc: HDC,
    dpi_y: i32,
    closed: Cell<bool>,
}

impl WindowsDisplay {
    pub fn open() -> Result<Self, PlatformError> {
        let _ = win_api::set_process_per_monitor_dpi_aware();

        // SAFETY: GetDC(None) returns the screen DC; it is released in `close`.
        let screen_dc = unsafe { GetDC(None) };
        if screen_dc.is_invalid() {
            return Err(PlatformError::Connection("GetDC(screen) failed".to_string()));
        }
        // SAFETY: screen_dc is valid (checked above).
        let dpi_y = unsafe { GetDeviceCaps(Some(screen_dc), LOGPIXELSY) };

        tracing::debug!(dpi_y, "win32 display connection opened");
        Ok(Self {
            screen_dc,
            dpi_y: if dpi_y > 0 { dpi_y } else { 96 },
            closed: Cell::new(false),
        })
    }

    pub fn dpi(&self) -> i32 {
        self.dpi_y
    }

    fn ensure_open(&self) -> Result<(), PlatformError> {
        if self.closed.get() {
            Err(PlatformError::Connection("display is closed".to_string()))
        } else {
            Ok(())
        }
    }

    fn delete_object(obj: HGDIOBJ) {
        // SAFETY: callers only pass objects created by this backend and not yet deleted.
        if !unsafe { DeleteObject(obj) }.as_bool() {
            tracing::warn!("DeleteObject failed for {:?}", obj);
        }
    }
}

impl DisplayBackend for WindowsDisplay {
    type Color = WinColor;
    type Font = WinFont;
    type Image = WinImage;
    type Gc = WinGc;

    fn platform(&self) -> Platform {
        Platform::Win32
    }

    fn create_color(&self, r: u8, g: u8, b: u8) -> Result<WinColor, PlatformError> {
        self.ensure_open()?;
        let colorref = COLORREF(r as u32 | (g as u32) << 8 | (b as u32) << 16);
        // SAFETY: plain GDI object creation.
        let brush = unsafe { CreateSolidBrush(colorref) };
        if brush.is_invalid() {
            return Err(PlatformError::ResourceCreation(format!(
                "CreateSolidBrush failed for {:#08x}",
                colorref.0
            )));
        }
        Ok(WinColor { colorref, brush })
    }

    fn color_rgb(&self, color: &WinColor) -> (u8, u8, u8) {
        let c = color.colorref.0;
        (c as u8, (c >> 8) as u8, (c >> 16) as u8)
    }

    fn dispose_color(&self, color: WinColor) {
        Self::delete_object(color.brush.into());
    }

    fn create_font(&self, font: &Font) -> Result<WinFont, PlatformError> {
        self.ensure_open()?;
        let pixels = (font.size as i64 * self.dpi_y as i64 + 36) / 72;
        let height = i32::try_from(pixels).map(|h| -h).map_err(|_| {
            PlatformError::ResourceCreation(format!("font size {}pt out of range", font.size))
        })?;
        let weight = if font.bold { FW_BOLD } else { FW_NORMAL };
        let face = win_api::to_wide_chars(&font.name);

        // SAFETY: `face` outlives the call and is null terminated.
        let hfont = unsafe {
            CreateFontW(
                height,
                0,
                0,
                0,
                weight.0 as i32,
                font.italic as u32,
                0,
                0,
                DEFAULT_CHARSET,
                OUT_DEFAULT_PRECIS,
                CLIP_DEFAULT_PRECIS,
                CLEARTYPE_QUALITY,
                (DEFAULT_PITCH.0 | FF_DONTCARE.0) as u32,
                windows::core::PCWSTR(face.as_ptr()),
            )
        };
        if hfont.is_invalid() {
            return Err(PlatformError::ResourceCreation(format!(
                "CreateFontW failed for '{font}'"
            )));
        }
        Ok(WinFont {
            hfont,
            height: -height,
        })
    }

    fn dispose_font(&self, font: WinFont) {
        Self::delete_object(font.hfont.into());
    }

    fn create_image(&self, image: &DecodedImage) -> Result<WinImage, PlatformError> {
        self.ensure_open()?;
        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: image.width as i32,
                // Negative height: top-down rows, matching the decoded buffer.
                biHeight: -(image.height as i32),
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                biSizeImage: 0,
                biXPelsPerMeter: 0,
                biYPelsPerMeter: 0,
                biClrUsed: 0,
                biClrImportant: 0,
            },
            bmiColors: [RGBQUAD::default(); 1],
        };

        let mut bits: *mut c_void = std::ptr::null_mut();
        // SAFETY: bmi describes a 32bpp DIB; `bits` receives the section's pixel pointer.
        let bitmap = unsafe {
            CreateDIBSection(
                Some(self.screen_dc),
                &bmi,
                DIB_RGB_COLORS,
                &mut bits,
                Some(HANDLE(std::ptr::null_mut())),
                0,
            )
        }
        .map_err(|e| PlatformError::ResourceCreation(format!("CreateDIBSection failed: {e:?}")))?;

        if bits.is_null() {
            Self::delete_object(bitmap.into());
            return Err(PlatformError::ResourceCreation(
                "CreateDIBSection returned no pixel buffer".to_string(),
            ));
        }

        // SAFETY: the section holds width * height 32-bit pixels, the same count as `rgba`
        // (DecodedImage guarantees the length).
        let dst = unsafe { std::slice::from_raw_parts_mut(bits as *mut u8, image.rgba.len()) };
        for (d, s) in dst.chunks_exact_mut(4).zip(image.rgba.chunks_exact(4)) {
            let a = s[3] as u32;
            d[0] = (s[2] as u32 * a / 255) as u8;
            d[1] = (s[1] as u32 * a / 255) as u8;
            d[2] = (s[0] as u32 * a / 255) as u8;
            d[3] = s[3];
        }

        Ok(WinImage {
            bitmap,
            width: image.width,
            height: image.height,
        })
    }

    fn image_size(&self, image: &WinImage) -> (u32, u32) {
        (image.width, image.height)
    }

    fn dispose_image(&self, image: WinImage) {
        Self::delete_object(image.bitmap.into());
    }

    fn create_gc(&self) -> Result<WinGc, PlatformError> {
        self.ensure_open()?;
        // SAFETY: screen_dc stays valid until `close`.
        let hdc = unsafe { CreateCompatibleDC(Some(self.screen_dc)) };
        if hdc.is_invalid() {
            return Err(PlatformError::ResourceCreation(
                "CreateCompatibleDC failed".to_string(),
            ));
        }
        Ok(WinGc { hdc })
    }

    fn dispose_gc(&self, gc: WinGc) {
        // SAFETY: the DC was created by CreateCompatibleDC in `create_gc`.
        if !unsafe { DeleteDC(gc.hdc) }.as_bool() {
            tracing::warn!("DeleteDC failed for {:?}", gc.hdc);
        }
    }

    fn text_extent(&self, gc: &WinGc, font: &WinFont, text: &str) -> (i32, i32) {
        let wide: Vec<u16> = text.encode_utf16().collect();
        let mut size = SIZE::default();
        // SAFETY: gc and font are live handles owned by the display environment; the previous
        // font is selected back before returning.
        unsafe {
            let old = SelectObject(gc.hdc, font.hfont.into());
            let ok = GetTextExtentPoint32W(gc.hdc, &wide, &mut size).as_bool();
            SelectObject(gc.hdc, old);
            if !ok {
                tracing::warn!("GetTextExtentPoint32W failed");
                return (0, font.height);
            }
        }
        (size.cx, size.cy)
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, PlatformError> {
        super::monitors::enumerate()
    }

    fn read_and_dispatch(&self) -> Result<bool, PlatformError> {
        Ok(win_api::peek_and_dispatch())
    }

    fn sleep(&self) {
        if let Err(e) = win_api::wait_message() {
            tracing::warn!("WaitMessage failed: {e:?}");
        }
    }

    fn is_window_destroyed(&self, window: WindowId) -> bool {
        let hwnd: HWND = super::hwnd(window);
        !win_api::is_window(hwnd)
    }

    fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        // SAFETY: screen_dc came from GetDC(None) in `open`.
        unsafe {
            ReleaseDC(None, self.screen_dc);
        }
        tracing::debug!("win32 display connection closed");
    }
}
