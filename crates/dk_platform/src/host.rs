/// Opaque native window identifier.
///
/// Keeps platform window handles (e.g. Win32 `HWND`) from leaking across crate boundaries.
/// Backends convert to/from raw handles as needed. Zero is never a live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(usize);

impl WindowId {
    pub const INVALID: WindowId = WindowId(0);

    #[inline]
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// 可能对应原生窗口的控件
///
/// Controls that have not been realized yet (or never get a native peer) return `None`.
pub trait NativeControl {
    fn native_handle(&self) -> Option<WindowId>;
}

impl NativeControl for WindowId {
    fn native_handle(&self) -> Option<WindowId> {
        self.is_valid().then_some(*self)
    }
}
