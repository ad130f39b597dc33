//! Per-thread display environment.
//!
//! A [`Display`] owns one native display connection and caches the native colors, fonts and
//! images derived from `dk_gfx` descriptors. A [`Registry`] hands each UI thread its own display,
//! the [`EventPump`] drives the native event loop and tears the display down when the root window
//! goes away, and the [`HandleBridge`] gives controls raw access to native window properties.

pub mod bridge;
pub mod cache;
pub mod config;
pub mod decode;
pub mod defaults;
pub mod display;
pub mod error;
mod monitors;
pub mod pump;
pub mod registry;

pub use bridge::{HandleBridge, bridge};
pub use cache::{CacheStats, ResourceCache};
pub use config::DisplayConfig;
pub use display::{Display, DisplayId, DisplayStats};
pub use error::{DisplayError, DisplayResult, ResourceError};
pub use pump::{DispatchFailure, EventPump, PumpState, PumpStats, Tick};
pub use registry::{DefaultBackend, MainDisplay, Registry, registry};

pub use dk_gfx::{Color, Font, Image, Rect};
pub use dk_platform::{
    DisplayBackend, MonitorInfo, NativeControl, NativeResource, Platform, PlatformError, WindowId,
};
