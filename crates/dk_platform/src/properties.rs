use crate::{Platform, PlatformError, WindowId};

/// Raw native window-property access for one platform.
///
/// The toolkit does not unify these mechanisms, so each supported platform provides its own
/// strategy and the host picks one at startup.
pub trait WindowProperties: Send + Sync {
    fn platform(&self) -> Platform;

    fn get(&self, window: WindowId, key: i32) -> Result<isize, PlatformError>;

    fn set(&self, window: WindowId, key: i32, value: isize) -> Result<(), PlatformError>;

    /// 按名称查询平台常量（如 `GWL_EXSTYLE`）
    fn constant(&self, name: &str) -> Result<i32, PlatformError>;
}

/// Strategy for platforms with no raw property primitive. Every call fails with
/// [`PlatformError::Unsupported`].
#[derive(Debug, Clone)]
pub struct UnsupportedProperties {
    platform: Platform,
}

impl UnsupportedProperties {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn err(&self, primitive: &str) -> PlatformError {
        PlatformError::unsupported(self.platform.identifier(), primitive)
    }
}

impl WindowProperties for UnsupportedProperties {
    fn platform(&self) -> Platform {
        self.platform.clone()
    }

    fn get(&self, _window: WindowId, _key: i32) -> Result<isize, PlatformError> {
        Err(self.err("GetWindowLong"))
    }

    fn set(&self, _window: WindowId, _key: i32, _value: isize) -> Result<(), PlatformError> {
        Err(self.err("SetWindowLong"))
    }

    fn constant(&self, name: &str) -> Result<i32, PlatformError> {
        Err(self.err(name))
    }
}
