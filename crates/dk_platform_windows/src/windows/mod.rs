pub mod display;
pub mod monitors;
pub mod properties;

pub use display::{WinColor, WinFont, WinGc, WinImage, WindowsDisplay};
pub use properties::Win32Properties;

use std::ffi::c_void;

use dk_platform::WindowId;
use windows::Win32::Foundation::HWND;

#[inline]
pub fn window_id(hwnd: HWND) -> WindowId {
    WindowId::from_raw(hwnd.0 as usize)
}

#[inline]
pub fn hwnd(window: WindowId) -> HWND {
    HWND(window.raw() as *mut c_void)
}
