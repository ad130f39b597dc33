use std::fmt;

/// 窗口系统平台标识
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Win32,
    MacOsX,
    Gtk,
    Headless,
    Other(String),
}

impl Platform {
    /// 当前编译目标对应的平台
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(target_os = "macos") {
            Platform::MacOsX
        } else if cfg!(any(target_os = "linux", target_os = "freebsd")) {
            Platform::Gtk
        } else {
            Platform::Other(std::env::consts::OS.to_string())
        }
    }

    /// 由平台标识字符串解析（`cocoa` 视为 macOS）
    pub fn from_identifier(id: &str) -> Self {
        match id {
            "win32" => Platform::Win32,
            "macosx" | "cocoa" => Platform::MacOsX,
            "gtk" => Platform::Gtk,
            "headless" => Platform::Headless,
            other => Platform::Other(other.to_string()),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Platform::Win32 => "win32",
            Platform::MacOsX => "macosx",
            Platform::Gtk => "gtk",
            Platform::Headless => "headless",
            Platform::Other(id) => id,
        }
    }

    #[inline]
    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Win32)
    }

    #[inline]
    pub fn is_mac(&self) -> bool {
        matches!(self, Platform::MacOsX)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
