use dk_gfx::Rect;
use dk_platform::{MonitorInfo, PlatformError};
use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOF_PRIMARY,
};
use windows::core::BOOL;

fn to_rect(r: &RECT) -> Rect {
    Rect::from_bounds(r.left, r.top, r.right, r.bottom)
}

unsafe extern "system" fn collect_monitor(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    data: LPARAM,
) -> BOOL {
    // SAFETY: `data` is the `&mut Vec<MonitorInfo>` passed by `enumerate`, alive for the whole
    // EnumDisplayMonitors call.
    let out = unsafe { &mut *(data.0 as *mut Vec<MonitorInfo>) };

    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    // SAFETY: hmonitor comes from the enumeration; info.cbSize is set.
    if unsafe { GetMonitorInfoW(hmonitor, &mut info) }.as_bool() {
        out.push(MonitorInfo {
            id: hmonitor.0 as usize as u64,
            bounds: to_rect(&info.rcMonitor),
            work_area: to_rect(&info.rcWork),
            primary: info.dwFlags & MONITORINFOF_PRIMARY != 0,
        });
    } else {
        tracing::warn!("GetMonitorInfoW failed for {:?}", hmonitor);
    }
    BOOL(1)
}

/// 枚举所有物理显示器
pub fn enumerate() -> Result<Vec<MonitorInfo>, PlatformError> {
    let mut monitors: Vec<MonitorInfo> = Vec::new();
    // SAFETY: the callback only touches `monitors` through the LPARAM for the duration of the call.
    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(collect_monitor),
            LPARAM(&mut monitors as *mut Vec<MonitorInfo> as isize),
        )
    };
    if !ok.as_bool() {
        return Err(PlatformError::Connection(
            "EnumDisplayMonitors failed".to_string(),
        ));
    }
    Ok(monitors)
}
