use std::{ffi::OsStr, iter::once, os::windows::ffi::OsStrExt};

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::HiDpi::{PROCESS_PER_MONITOR_DPI_AWARE, SetProcessDpiAwareness};
use windows::Win32::UI::WindowsAndMessaging::*;

#[inline]
pub fn set_process_per_monitor_dpi_aware() -> windows::core::Result<()> {
    unsafe { SetProcessDpiAwareness(PROCESS_PER_MONITOR_DPI_AWARE) }
}

/// 从线程消息队列取出并派发一条消息
///
/// Returns `false` when the queue was empty.
pub fn peek_and_dispatch() -> bool {
    unsafe {
        let mut msg = MSG::default();
        if !PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            return false;
        }
        let _ = TranslateMessage(&msg);
        DispatchMessageW(&msg);
        true
    }
}

/// 阻塞直到线程队列有新消息
#[inline]
pub fn wait_message() -> windows::core::Result<()> {
    unsafe { WaitMessage() }
}

#[inline]
pub fn is_window(hwnd: HWND) -> bool {
    !hwnd.0.is_null() && unsafe { IsWindow(Some(hwnd)).as_bool() }
}

#[inline]
pub fn get_window_long_ptr(hwnd: HWND, index: i32) -> isize {
    unsafe { GetWindowLongPtrW(hwnd, WINDOW_LONG_PTR_INDEX(index)) }
}

#[inline]
pub fn set_window_long_ptr(hwnd: HWND, index: i32, value: isize) -> isize {
    unsafe { SetWindowLongPtrW(hwnd, WINDOW_LONG_PTR_INDEX(index), value) }
}

/// 将字符串转换为 null 结尾的宽字符数组
pub fn to_wide_chars(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}
