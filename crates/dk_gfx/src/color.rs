use std::fmt;

/// 颜色描述（打包的 32 位 ARGB）
///
/// 相等与哈希都按打包值比较，通道相同的两个描述共享同一个缓存的原生颜色。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    argb: u32,
}

impl Color {
    pub const BLACK: Color = Color::from_argb(0xFF00_0000);
    pub const WHITE: Color = Color::from_argb(0xFFFF_FFFF);

    #[inline]
    pub const fn from_argb(argb: u32) -> Self {
        Self { argb }
    }

    /// 由 8 位通道创建不透明颜色
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn argb(self) -> u32 {
        self.argb
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.argb >> 24) as u8
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.argb >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.argb >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.argb as u8
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08x})", self.argb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a() == 0xFF {
            write!(f, "#{:06x}", self.argb & 0x00FF_FFFF)
        } else {
            write!(f, "#{:08x}", self.argb)
        }
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self::from_argb(argb)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn test_channels_unpack() {
        let c = Color::from_argb(0x8020_4060);
        assert_eq!(c.a(), 0x80);
        assert_eq!(c.r(), 0x20);
        assert_eq!(c.g(), 0x40);
        assert_eq!(c.b(), 0x60);
    }

    #[test]
    fn test_rgb_is_opaque() {
        let c = Color::rgb(1, 2, 3);
        assert_eq!(c.argb(), 0xFF01_0203);
        assert_eq!(c.to_string(), "#010203");
    }

    #[test]
    fn test_alpha_is_part_of_identity() {
        assert_ne!(Color::from_argb(0x8020_4060), Color::from_argb(0xFF20_4060));
        assert_eq!(Color::from(0xFF20_4060), Color::rgb(0x20, 0x40, 0x60));
    }
}
