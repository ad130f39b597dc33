use dk_platform::{Platform, PlatformError, WindowId, WindowProperties};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::win_api;

/// Win32 窗口属性访问（`GetWindowLongPtrW` / `SetWindowLongPtrW`）
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Properties;

impl Win32Properties {
    pub fn new() -> Self {
        Self
    }

    fn live_hwnd(window: WindowId) -> Result<windows::Win32::Foundation::HWND, PlatformError> {
        let hwnd = super::hwnd(window);
        if win_api::is_window(hwnd) {
            Ok(hwnd)
        } else {
            Err(PlatformError::HandleUnavailable)
        }
    }
}

impl WindowProperties for Win32Properties {
    fn platform(&self) -> Platform {
        Platform::Win32
    }

    fn get(&self, window: WindowId, key: i32) -> Result<isize, PlatformError> {
        let hwnd = Self::live_hwnd(window)?;
        Ok(win_api::get_window_long_ptr(hwnd, key))
    }

    fn set(&self, window: WindowId, key: i32, value: isize) -> Result<(), PlatformError> {
        let hwnd = Self::live_hwnd(window)?;
        let previous = win_api::set_window_long_ptr(hwnd, key, value);
        tracing::trace!(key, value, previous, "SetWindowLongPtrW");
        Ok(())
    }

    fn constant(&self, name: &str) -> Result<i32, PlatformError> {
        let value = match name {
            "GWL_ID" => GWL_ID.0,
            "GWL_STYLE" => GWL_STYLE.0,
            "GWL_EXSTYLE" => GWL_EXSTYLE.0,
            "GWLP_USERDATA" => GWLP_USERDATA.0,
            "GWLP_WNDPROC" => GWLP_WNDPROC.0,
            "GWLP_HINSTANCE" => GWLP_HINSTANCE.0,
            "WS_VISIBLE" => WS_VISIBLE.0 as i32,
            "WS_POPUP" => WS_POPUP.0 as i32,
            "WS_CAPTION" => WS_CAPTION.0 as i32,
            "WS_THICKFRAME" => WS_THICKFRAME.0 as i32,
            "WS_EX_TOPMOST" => WS_EX_TOPMOST.0 as i32,
            "WS_EX_TOOLWINDOW" => WS_EX_TOOLWINDOW.0 as i32,
            "WS_EX_LAYERED" => WS_EX_LAYERED.0 as i32,
            "WS_EX_TRANSPARENT" => WS_EX_TRANSPARENT.0 as i32,
            "WS_EX_NOACTIVATE" => WS_EX_NOACTIVATE.0 as i32,
            _ => return Err(PlatformError::unsupported("win32", name)),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_resolve() {
        let props = Win32Properties::new();
        assert_eq!(props.constant("GWL_EXSTYLE").unwrap(), -20);
        assert_eq!(props.constant("WS_EX_LAYERED").unwrap(), 0x0008_0000);
        assert!(props.constant("NOT_A_CONSTANT").is_err());
    }

    #[test]
    fn test_dead_window_is_unavailable() {
        let props = Win32Properties::new();
        assert_eq!(
            props.get(WindowId::INVALID, -16),
            Err(PlatformError::HandleUnavailable)
        );
    }
}
