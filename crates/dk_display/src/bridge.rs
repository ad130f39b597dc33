use std::sync::OnceLock;

use dk_platform::headless::HeadlessProperties;
use dk_platform::{
    DisplayBackend, NativeControl, Platform, PlatformError, UnsupportedProperties, WindowId,
    WindowProperties,
};

use crate::Display;

/// Raw native window access for controls.
///
/// The property strategy is picked once, when the bridge is built, from the platform identity;
/// every later call goes straight to it. All failures are logged and collapse to a sentinel
/// (`0`, [`WindowId::INVALID`], `false`) so callers never have to handle platform gaps.
pub struct HandleBridge {
    strategy: Box<dyn WindowProperties>,
}

impl HandleBridge {
    /// 按编译目标平台创建
    pub fn detect() -> Self {
        Self::for_platform(&Platform::current())
    }

    pub fn for_identifier(id: &str) -> Self {
        Self::for_platform(&Platform::from_identifier(id))
    }

    pub fn for_platform(platform: &Platform) -> Self {
        let strategy: Box<dyn WindowProperties> = match platform {
            #[cfg(target_os = "windows")]
            Platform::Win32 => Box::new(dk_platform_windows::Win32Properties::new()),
            Platform::Headless => Box::new(HeadlessProperties::new()),
            other => Box::new(UnsupportedProperties::new(other.clone())),
        };
        Self::with_strategy(strategy)
    }

    /// 按显示环境所用后端的平台创建
    pub fn for_display<B: DisplayBackend>(display: &Display<B>) -> Self {
        Self::for_platform(&display.platform())
    }

    pub fn with_strategy(strategy: Box<dyn WindowProperties>) -> Self {
        tracing::debug!(platform = %strategy.platform(), "window property strategy selected");
        Self { strategy }
    }

    pub fn platform(&self) -> Platform {
        self.strategy.platform()
    }

    pub fn try_native_handle(&self, control: &dyn NativeControl) -> Result<WindowId, PlatformError> {
        control
            .native_handle()
            .filter(|window| window.is_valid())
            .ok_or(PlatformError::HandleUnavailable)
    }

    /// 控件的原生窗口，失败时返回 [`WindowId::INVALID`]
    pub fn native_handle(&self, control: &dyn NativeControl) -> WindowId {
        self.try_native_handle(control).unwrap_or_else(|e| {
            tracing::debug!("native handle lookup failed: {e}");
            WindowId::INVALID
        })
    }

    pub fn try_get_window_property(
        &self,
        control: &dyn NativeControl,
        key: i32,
    ) -> Result<isize, PlatformError> {
        let window = self.try_native_handle(control)?;
        self.strategy.get(window, key)
    }

    /// 读取窗口属性，失败返回 `0`
    pub fn get_window_property(&self, control: &dyn NativeControl, key: i32) -> isize {
        self.try_get_window_property(control, key)
            .unwrap_or_else(|e| {
                tracing::warn!(key, "get_window_property failed: {e}");
                0
            })
    }

    pub fn try_set_window_property(
        &self,
        control: &dyn NativeControl,
        key: i32,
        value: isize,
    ) -> Result<(), PlatformError> {
        let window = self.try_native_handle(control)?;
        self.strategy.set(window, key, value)
    }

    /// Write raw window property `key`. Returns whether the write reached the platform.
    pub fn set_window_property(&self, control: &dyn NativeControl, key: i32, value: isize) -> bool {
        match self.try_set_window_property(control, key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, value, "set_window_property failed: {e}");
                false
            }
        }
    }

    /// 平台常量，不存在时返回 `0`
    pub fn os_constant(&self, name: &str) -> i32 {
        self.strategy.constant(name).unwrap_or_else(|e| {
            tracing::warn!("os_constant({name}) failed: {e}");
            0
        })
    }
}

static BRIDGE: OnceLock<HandleBridge> = OnceLock::new();

/// 进程级 bridge（单例）
pub fn bridge() -> &'static HandleBridge {
    BRIDGE.get_or_init(HandleBridge::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unrealized;

    impl NativeControl for Unrealized {
        fn native_handle(&self) -> Option<WindowId> {
            None
        }
    }

    #[test]
    fn test_unsupported_platform_yields_sentinel() {
        let bridge = HandleBridge::for_identifier("beos");
        let window = WindowId::from_raw(0x42);
        assert_eq!(bridge.get_window_property(&window, -20), 0);
        assert!(!bridge.set_window_property(&window, -20, 1));
        assert_eq!(bridge.os_constant("GWL_EXSTYLE"), 0);
        assert_eq!(bridge.platform(), Platform::Other("beos".to_string()));
    }

    #[test]
    fn test_missing_handle_yields_invalid() {
        let bridge = HandleBridge::for_identifier("headless");
        assert_eq!(bridge.native_handle(&Unrealized), WindowId::INVALID);
        assert_eq!(
            bridge.try_get_window_property(&Unrealized, -16),
            Err(PlatformError::HandleUnavailable)
        );
        assert_eq!(bridge.get_window_property(&Unrealized, -16), 0);
    }

    #[test]
    fn test_headless_round_trip() {
        let bridge = HandleBridge::for_identifier("headless");
        let window = WindowId::from_raw(0x1000);
        let key = bridge.os_constant("GWL_EXSTYLE");
        assert_eq!(key, -20);
        assert!(bridge.set_window_property(&window, key, 0x80));
        assert_eq!(bridge.get_window_property(&window, key), 0x80);
        assert_eq!(bridge.native_handle(&window), window);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_win32_unavailable_off_windows() {
        let bridge = HandleBridge::for_identifier("win32");
        assert_eq!(bridge.platform(), Platform::Win32);
        assert_eq!(bridge.get_window_property(&WindowId::from_raw(1), -16), 0);
    }
}
