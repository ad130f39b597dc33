use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use dk_gfx::{Color, Font, Image};
use dk_platform::{DisplayBackend, MonitorInfo, NativeResource, Platform};

use crate::cache::{CacheStats, ResourceCache};
use crate::monitors::MonitorCache;
use crate::{DisplayError, ResourceError, decode};

static NEXT_DISPLAY_ID: AtomicU64 = AtomicU64::new(1);

/// 显示环境的进程内唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(u64);

impl DisplayId {
    fn next() -> Self {
        Self(NEXT_DISPLAY_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Per-thread display environment.
///
/// Owns one native display connection and everything created on it: the color, font and image
/// caches, a lazily created scratch drawing context, and the memoized monitor layout. A display
/// is affine to the thread that created it (it is neither `Send` nor `Sync`), so none of its
/// state needs locking. Methods take `&self` so event handlers can resolve resources while the
/// event pump is running.
///
/// Handles returned by `resolve_*` stay owned by the cache; callers must not dispose them.
pub struct Display<B: DisplayBackend> {
    id: DisplayId,
    backend: B,
    colors: RefCell<ResourceCache<Color, B::Color>>,
    fonts: RefCell<ResourceCache<Font, B::Font>>,
    /// Keyed by image uri.
    images: RefCell<ResourceCache<String, B::Image>>,
    scratch_gc: RefCell<Option<B::Gc>>,
    monitors: MonitorCache,
    disposed: Cell<bool>,
}

impl<B: DisplayBackend> Display<B> {
    pub fn new(backend: B) -> Self {
        let display = Self {
            id: DisplayId::next(),
            backend,
            colors: RefCell::new(ResourceCache::new()),
            fonts: RefCell::new(ResourceCache::new()),
            images: RefCell::new(ResourceCache::new()),
            scratch_gc: RefCell::new(None),
            monitors: MonitorCache::default(),
            disposed: Cell::new(false),
        };
        let id = display.id.raw();
        let platform = display.backend.platform();
        tracing::info!(id, %platform, "display environment created");
        display
    }

    #[inline]
    pub fn id(&self) -> DisplayId {
        self.id
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn platform(&self) -> Platform {
        self.backend.platform()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn ensure_live(&self) -> Result<(), ResourceError> {
        if self.disposed.get() {
            Err(ResourceError::Disposed)
        } else {
            Ok(())
        }
    }

    // 颜色

    /// 获取原生颜色，alpha 通道被忽略（原生颜色不透明）
    pub fn resolve_color(&self, color: &Color) -> Result<B::Color, ResourceError> {
        self.ensure_live()?;
        self.colors.borrow_mut().resolve_with(color, || {
            tracing::debug!(%color, "creating native color");
            Ok(self.backend.create_color(color.r(), color.g(), color.b())?)
        })
    }

    pub fn release_color(&self, color: &Color) -> bool {
        self.colors
            .borrow_mut()
            .release_with(color, |h| self.backend.dispose_color(h))
    }

    pub fn release_all_colors(&self) -> usize {
        self.colors
            .borrow_mut()
            .release_all_with(|h| self.backend.dispose_color(h))
    }

    // 字体

    pub fn resolve_font(&self, font: &Font) -> Result<B::Font, ResourceError> {
        self.ensure_live()?;
        self.fonts.borrow_mut().resolve_with(font, || {
            tracing::debug!(%font, "creating native font");
            Ok(self.backend.create_font(font)?)
        })
    }

    pub fn release_font(&self, font: &Font) -> bool {
        self.fonts
            .borrow_mut()
            .release_with(font, |h| self.backend.dispose_font(h))
    }

    pub fn release_all_fonts(&self) -> usize {
        self.fonts
            .borrow_mut()
            .release_all_with(|h| self.backend.dispose_font(h))
    }

    // 图像

    /// 获取原生图像，未命中时读取并解码字节源
    ///
    /// The source must not call back into this display while it is being read.
    pub fn resolve_image(&self, image: &Image) -> Result<B::Image, ResourceError> {
        self.ensure_live()?;
        self.images.borrow_mut().resolve_with(&image.uri, || {
            tracing::debug!(uri = %image.uri, "loading native image");
            let decoded = decode::load(image)?;
            Ok(self.backend.create_image(&decoded)?)
        })
    }

    /// Like [`resolve_image`](Self::resolve_image) but logs failures and returns `None`, for
    /// callers that draw a placeholder for missing images.
    pub fn image(&self, image: &Image) -> Option<B::Image> {
        match self.resolve_image(image) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("cannot load image {image}: {e}");
                None
            }
        }
    }

    pub fn release_image(&self, image: &Image) -> bool {
        self.images
            .borrow_mut()
            .release_with(&image.uri, |h| self.backend.dispose_image(h))
    }

    pub fn release_all_images(&self) -> usize {
        self.images
            .borrow_mut()
            .release_all_with(|h| self.backend.dispose_image(h))
    }

    // 临时绘图上下文

    /// Shared drawing context for metric queries.
    ///
    /// Created on first use and owned by the display; callers must never dispose it.
    pub fn scratch_gc(&self) -> Result<B::Gc, ResourceError> {
        self.ensure_live()?;
        let mut slot = self.scratch_gc.borrow_mut();
        if let Some(gc) = slot.as_ref() {
            return Ok(gc.clone());
        }
        let gc = self.backend.create_gc()?;
        tracing::debug!(gc = gc.native_id(), "scratch context allocated");
        *slot = Some(gc.clone());
        Ok(gc)
    }

    /// 在临时上下文上测量 `text` 的像素尺寸
    pub fn text_extent(&self, font: &Font, text: &str) -> Result<(i32, i32), ResourceError> {
        let native_font = self.resolve_font(font)?;
        let gc = self.scratch_gc()?;
        Ok(self.backend.text_extent(&gc, &native_font, text))
    }

    fn dispose_scratch_gc(&self) -> bool {
        match self.scratch_gc.borrow_mut().take() {
            Some(gc) => {
                self.backend.dispose_gc(gc);
                true
            }
            None => false,
        }
    }

    // 显示器

    /// All physical monitors. Enumerated on first call, then served from the memoized list
    /// until [`invalidate_monitors`](Self::invalidate_monitors) or teardown.
    pub fn monitors(&self) -> Result<Rc<[MonitorInfo]>, DisplayError> {
        if self.is_disposed() {
            return Err(DisplayError::Disposed);
        }
        self.monitors.list(&self.backend)
    }

    /// 主显示器，必要时先枚举
    pub fn primary_monitor(&self) -> Result<MonitorInfo, DisplayError> {
        if self.is_disposed() {
            return Err(DisplayError::Disposed);
        }
        self.monitors.primary(&self.backend)
    }

    /// 清除显示器缓存，下次查询重新枚举
    pub fn invalidate_monitors(&self) {
        self.monitors.invalidate();
    }

    // 生命周期

    /// 各缓存统计
    pub fn cache_stats(&self) -> DisplayStats {
        DisplayStats {
            colors: self.colors.borrow().stats(),
            fonts: self.fonts.borrow().stats(),
            images: self.images.borrow().stats(),
            scratch_gc: self.scratch_gc.borrow().is_some(),
        }
    }

    /// Release every native resource and close the connection.
    ///
    /// Order is fixed: images, fonts, colors, scratch context, then the connection itself,
    /// which must outlive everything created on it. Runs once; later calls return `false`.
    pub fn teardown(&self) -> bool {
        if self.disposed.replace(true) {
            tracing::debug!(id = self.id.raw(), "display already torn down");
            return false;
        }

        let images = self.release_all_images();
        let fonts = self.release_all_fonts();
        let colors = self.release_all_colors();
        let scratch_gc = self.dispose_scratch_gc();
        self.monitors.invalidate();
        self.backend.close();

        tracing::info!(
            id = self.id.raw(),
            images,
            fonts,
            colors,
            scratch_gc,
            "display environment torn down"
        );
        true
    }
}

impl<B: DisplayBackend> Drop for Display<B> {
    fn drop(&mut self) {
        if !self.is_disposed() {
            tracing::warn!(
                id = self.id.raw(),
                "display dropped without teardown, releasing now"
            );
            self.teardown();
        }
    }
}

/// 显示环境缓存状态快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayStats {
    pub colors: CacheStats,
    pub fonts: CacheStats,
    pub images: CacheStats,
    pub scratch_gc: bool,
}

impl DisplayStats {
    pub fn total(&self) -> CacheStats {
        self.colors + self.fonts + self.images
    }
}
