use dk_gfx::{Font, Rect};

use crate::{Platform, PlatformError, WindowId};

/// A native resource handle created by a [`DisplayBackend`].
///
/// Handles are cheap references (raw OS handles, ids); cloning one does not duplicate the
/// underlying resource. Ownership stays with whoever created it and must be given back to the
/// backend's matching `dispose_*` call exactly once.
pub trait NativeResource: Clone + 'static {
    /// Backend-unique identity of the underlying native object.
    fn native_id(&self) -> u64;
}

/// Physical monitor as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorInfo {
    pub id: u64,
    pub bounds: Rect,
    pub work_area: Rect,
    pub primary: bool,
}

/// Decoded image pixels handed to the backend: straight (non-premultiplied) RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, PlatformError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(PlatformError::ResourceCreation(format!(
                "image buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Native display connection.
///
/// One backend instance is owned by exactly one display environment and is only touched from the
/// thread that created it. Every method takes `&self`: event handlers run from inside
/// [`read_and_dispatch`](DisplayBackend::read_and_dispatch) and are allowed to create resources
/// on the same connection, so implementations keep whatever mutable state they need behind
/// interior mutability and must not hold it across a dispatch.
pub trait DisplayBackend {
    type Color: NativeResource;
    type Font: NativeResource;
    type Image: NativeResource;
    /// Drawing context used for metric queries.
    type Gc: NativeResource;

    fn platform(&self) -> Platform;

    /// Create a native color. The alpha channel is not representable and is never passed.
    fn create_color(&self, r: u8, g: u8, b: u8) -> Result<Self::Color, PlatformError>;
    /// Query the channels back from a native color.
    fn color_rgb(&self, color: &Self::Color) -> (u8, u8, u8);
    fn dispose_color(&self, color: Self::Color);

    fn create_font(&self, font: &Font) -> Result<Self::Font, PlatformError>;
    fn dispose_font(&self, font: Self::Font);

    fn create_image(&self, image: &DecodedImage) -> Result<Self::Image, PlatformError>;
    fn image_size(&self, image: &Self::Image) -> (u32, u32);
    fn dispose_image(&self, image: Self::Image);

    fn create_gc(&self) -> Result<Self::Gc, PlatformError>;
    fn dispose_gc(&self, gc: Self::Gc);

    /// Extent of `text` in device pixels when drawn with `font` on `gc`.
    fn text_extent(&self, gc: &Self::Gc, font: &Self::Font, text: &str) -> (i32, i32);

    /// Enumerate physical monitors; `primary` carries the platform's own notion of primary.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, PlatformError>;

    /// Dispatch at most one pending event.
    ///
    /// Returns `Ok(true)` if an event was dispatched, `Ok(false)` if the queue was empty, and
    /// `Err` if handling the event failed.
    fn read_and_dispatch(&self) -> Result<bool, PlatformError>;

    /// Block the calling thread until an event arrives or the connection is woken.
    fn sleep(&self);

    fn is_window_destroyed(&self, window: WindowId) -> bool;

    /// Close the display connection. Called once, after every resource has been disposed.
    fn close(&self);
}
