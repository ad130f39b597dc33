pub mod backend;
pub mod error;
pub mod headless;
pub mod host;
pub mod platform;
pub mod properties;

pub use backend::*;
pub use error::PlatformError;
pub use host::*;
pub use platform::Platform;
pub use properties::*;
pub use dk_gfx::{Color, Font, Image, Rect};
