//! Headless display backend.
//!
//! Runs the whole display stack without an OS windowing system: CI, tests, and hosts on
//! platforms without a native backend. Native handles are serial ids, monitors come from
//! [`HeadlessConfig`], and the event queue is fed through [`HeadlessDisplay::post`] on the owning
//! thread or a [`HeadlessProxy`] from any thread. Every release is recorded in a journal so
//! callers can observe teardown order.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc;
use std::time::Duration;

use dk_gfx::{Font, Rect};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{
    DecodedImage, DisplayBackend, MonitorInfo, NativeResource, Platform, PlatformError, WindowId,
    WindowProperties,
};

// 配置默认值
pub fn default_monitors() -> Vec<MonitorConfig> {
    vec![MonitorConfig {
        bounds: Rect::new(0, 0, 1920, 1080),
        work_area: Some(Rect::new(0, 0, 1920, 1040)),
        primary: true,
    }]
}

pub fn default_dpi() -> u32 {
    96
}

pub fn default_idle_wait_ms() -> u64 {
    50
}

/// 模拟显示器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub bounds: Rect,
    /// 缺省时与 `bounds` 相同
    #[serde(default)]
    pub work_area: Option<Rect>,
    #[serde(default)]
    pub primary: bool,
}

/// Headless 后端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlessConfig {
    #[serde(default = "default_monitors")]
    pub monitors: Vec<MonitorConfig>,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// 无事件唤醒时单次 `sleep` 的最长等待（毫秒）
    #[serde(default = "default_idle_wait_ms")]
    pub idle_wait_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            monitors: default_monitors(),
            dpi: default_dpi(),
            idle_wait_ms: default_idle_wait_ms(),
        }
    }
}

/// 释放日志条目，按调用顺序记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    Color(u64),
    Font(u64),
    Image(u64),
    Gc(u64),
    Connection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessColor {
    id: u64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessFont {
    id: u64,
    /// 字体像素高度（按 DPI 换算）
    pub height: i32,
    pub name: String,
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessImage {
    id: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessGc {
    id: u64,
}

macro_rules! native_resource {
    ($($ty:ty),*) => {
        $(impl NativeResource for $ty {
            #[inline]
            fn native_id(&self) -> u64 {
                self.id
            }
        })*
    };
}

native_resource!(HeadlessColor, HeadlessFont, HeadlessImage, HeadlessGc);

type Task = Box<dyn FnOnce() -> Result<(), PlatformError>>;
type SendTask = Box<dyn FnOnce() -> Result<(), PlatformError> + Send>;

enum Queued {
    Task(Task),
    Destroy(WindowId),
    Wake,
}

enum ProxyMessage {
    Task(SendTask),
    Destroy(WindowId),
    Wake,
}

impl From<ProxyMessage> for Queued {
    fn from(msg: ProxyMessage) -> Self {
        match msg {
            ProxyMessage::Task(task) => Queued::Task(task),
            ProxyMessage::Destroy(window) => Queued::Destroy(window),
            ProxyMessage::Wake => Queued::Wake,
        }
    }
}

/// Cross-thread handle onto a [`HeadlessDisplay`]'s event queue.
#[derive(Clone)]
pub struct HeadlessProxy {
    sender: mpsc::Sender<ProxyMessage>,
}

impl HeadlessProxy {
    /// 投递任务到显示线程，显示已销毁时返回 `false`
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() -> Result<(), PlatformError> + Send + 'static,
    {
        self.sender.send(ProxyMessage::Task(Box::new(task))).is_ok()
    }

    pub fn destroy_window(&self, window: WindowId) -> bool {
        self.sender.send(ProxyMessage::Destroy(window)).is_ok()
    }

    /// 唤醒阻塞中的 `sleep`，不派发任何事件
    pub fn wake(&self) -> bool {
        self.sender.send(ProxyMessage::Wake).is_ok()
    }
}

/// Display backend with no OS windowing system behind it.
pub struct HeadlessDisplay {
    config: HeadlessConfig,
    next_id: Cell<u64>,
    live: RefCell<HashSet<u64>>,
    journal: RefCell<Vec<Released>>,
    queue: RefCell<VecDeque<Queued>>,
    sender: mpsc::Sender<ProxyMessage>,
    inbox: mpsc::Receiver<ProxyMessage>,
    windows: RefCell<HashSet<WindowId>>,
    next_window: Cell<usize>,
    closed: Cell<bool>,
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl HeadlessDisplay {
    pub fn new(config: HeadlessConfig) -> Self {
        let (sender, inbox) = mpsc::channel();
        Self {
            config,
            next_id: Cell::new(1),
            live: RefCell::new(HashSet::new()),
            journal: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            sender,
            inbox,
            windows: RefCell::new(HashSet::new()),
            next_window: Cell::new(0x1000),
            closed: Cell::new(false),
        }
    }

    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    pub fn proxy(&self) -> HeadlessProxy {
        HeadlessProxy {
            sender: self.sender.clone(),
        }
    }

    /// 创建模拟顶层窗口
    pub fn create_window(&self) -> WindowId {
        let raw = self.next_window.get();
        self.next_window.set(raw + 0x10);
        let window = WindowId::from_raw(raw);
        self.windows.borrow_mut().insert(window);
        window
    }

    /// 立即销毁窗口（不经过事件队列）
    pub fn destroy_window(&self, window: WindowId) {
        self.windows.borrow_mut().remove(&window);
    }

    /// Queue a task to run on the next dispatch. The task may touch thread-local state.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() -> Result<(), PlatformError> + 'static,
    {
        self.queue.borrow_mut().push_back(Queued::Task(Box::new(task)));
    }

    /// 在已排队事件之后销毁 `window`
    pub fn post_destroy(&self, window: WindowId) {
        self.queue.borrow_mut().push_back(Queued::Destroy(window));
    }

    pub fn pending_events(&self) -> usize {
        self.drain_inbox();
        self.queue.borrow().len()
    }

    /// 已创建且尚未释放的句柄数
    pub fn live_handles(&self) -> usize {
        self.live.borrow().len()
    }

    /// 释放日志快照
    pub fn journal(&self) -> Vec<Released> {
        self.journal.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn drain_inbox(&self) {
        let mut queue = self.queue.borrow_mut();
        while let Ok(msg) = self.inbox.try_recv() {
            queue.push_back(msg.into());
        }
    }

    fn allocate(&self) -> Result<u64, PlatformError> {
        if self.closed.get() {
            return Err(PlatformError::Connection("headless display is closed".to_string()));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().insert(id);
        Ok(id)
    }

    fn release(&self, id: u64, entry: Released) {
        if !self.live.borrow_mut().remove(&id) {
            tracing::warn!(id, ?entry, "headless: release of unknown or already released handle");
        }
        self.journal.borrow_mut().push(entry);
    }

    /// 磅值换算为像素，超出 i32 范围时返回 None
    fn pixels(&self, points: u32) -> Option<i32> {
        let px = (points as u64 * self.config.dpi as u64).div_ceil(72);
        i32::try_from(px).ok()
    }
}

impl DisplayBackend for HeadlessDisplay {
    type Color = HeadlessColor;
    type Font = HeadlessFont;
    type Image = HeadlessImage;
    type Gc = HeadlessGc;

    fn platform(&self) -> Platform {
        Platform::Headless
    }

    fn create_color(&self, r: u8, g: u8, b: u8) -> Result<HeadlessColor, PlatformError> {
        Ok(HeadlessColor {
            id: self.allocate()?,
            r,
            g,
            b,
        })
    }

    fn color_rgb(&self, color: &HeadlessColor) -> (u8, u8, u8) {
        (color.r, color.g, color.b)
    }

    fn dispose_color(&self, color: HeadlessColor) {
        self.release(color.id, Released::Color(color.id));
    }

    fn create_font(&self, font: &Font) -> Result<HeadlessFont, PlatformError> {
        if font.name.is_empty() || font.size == 0 {
            return Err(PlatformError::ResourceCreation(format!(
                "invalid font '{font}'"
            )));
        }
        let height = self.pixels(font.size).ok_or_else(|| {
            PlatformError::ResourceCreation(format!("font size {}pt out of range", font.size))
        })?;
        Ok(HeadlessFont {
            id: self.allocate()?,
            height,
            name: font.name.clone(),
            size: font.size,
            bold: font.bold,
            italic: font.italic,
        })
    }

    fn dispose_font(&self, font: HeadlessFont) {
        self.release(font.id, Released::Font(font.id));
    }

    fn create_image(&self, image: &DecodedImage) -> Result<HeadlessImage, PlatformError> {
        if image.width == 0 || image.height == 0 {
            return Err(PlatformError::ResourceCreation(
                "zero-sized image".to_string(),
            ));
        }
        Ok(HeadlessImage {
            id: self.allocate()?,
            width: image.width,
            height: image.height,
        })
    }

    fn image_size(&self, image: &HeadlessImage) -> (u32, u32) {
        (image.width, image.height)
    }

    fn dispose_image(&self, image: HeadlessImage) {
        self.release(image.id, Released::Image(image.id));
    }

    fn create_gc(&self) -> Result<HeadlessGc, PlatformError> {
        Ok(HeadlessGc {
            id: self.allocate()?,
        })
    }

    fn dispose_gc(&self, gc: HeadlessGc) {
        self.release(gc.id, Released::Gc(gc.id));
    }

    fn text_extent(&self, _gc: &HeadlessGc, font: &HeadlessFont, text: &str) -> (i32, i32) {
        // Fixed-advance metrics: half the line height per char, a bit wider when bold.
        let advance = if font.bold { 11 } else { 10 };
        let width = text.chars().count() as i64 * font.height as i64 * advance / 20;
        (width.min(i32::MAX as i64) as i32, font.height)
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, PlatformError> {
        Ok(self
            .config
            .monitors
            .iter()
            .enumerate()
            .map(|(index, m)| MonitorInfo {
                id: index as u64 + 1,
                bounds: m.bounds,
                work_area: m.work_area.unwrap_or(m.bounds),
                primary: m.primary,
            })
            .collect())
    }

    fn read_and_dispatch(&self) -> Result<bool, PlatformError> {
        self.drain_inbox();
        // The queue borrow must end before the task runs; tasks may post more events.
        let next = self.queue.borrow_mut().pop_front();
        match next {
            None | Some(Queued::Wake) => Ok(false),
            Some(Queued::Destroy(window)) => {
                self.destroy_window(window);
                Ok(true)
            }
            Some(Queued::Task(task)) => task().map(|()| true),
        }
    }

    fn sleep(&self) {
        if !self.queue.borrow().is_empty() {
            return;
        }
        let wait = Duration::from_millis(self.config.idle_wait_ms);
        if let Ok(msg) = self.inbox.recv_timeout(wait) {
            self.queue.borrow_mut().push_back(msg.into());
        }
    }

    fn is_window_destroyed(&self, window: WindowId) -> bool {
        !self.windows.borrow().contains(&window)
    }

    fn close(&self) {
        if self.closed.replace(true) {
            tracing::warn!("headless: display connection closed twice");
            return;
        }
        let leaked = self.live_handles();
        if leaked > 0 {
            tracing::warn!(leaked, "headless: closing with live native handles");
        }
        self.journal.borrow_mut().push(Released::Connection);
    }
}

const HEADLESS_CONSTANTS: &[(&str, i32)] = &[
    ("GWL_ID", -12),
    ("GWL_STYLE", -16),
    ("GWL_EXSTYLE", -20),
    ("GWLP_USERDATA", -21),
];

/// 内存中的窗口属性表，键名与 Win32 兼容
#[derive(Debug, Default)]
pub struct HeadlessProperties {
    values: Mutex<HashMap<(WindowId, i32), isize>>,
}

impl HeadlessProperties {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowProperties for HeadlessProperties {
    fn platform(&self) -> Platform {
        Platform::Headless
    }

    fn get(&self, window: WindowId, key: i32) -> Result<isize, PlatformError> {
        Ok(self.values.lock().get(&(window, key)).copied().unwrap_or(0))
    }

    fn set(&self, window: WindowId, key: i32, value: isize) -> Result<(), PlatformError> {
        self.values.lock().insert((window, key), value);
        Ok(())
    }

    fn constant(&self, name: &str) -> Result<i32, PlatformError> {
        HEADLESS_CONSTANTS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| PlatformError::unsupported("headless", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_tracked() {
        let display = HeadlessDisplay::default();
        let a = display.create_color(1, 2, 3).unwrap();
        let b = display.create_color(1, 2, 3).unwrap();
        assert_ne!(a.native_id(), b.native_id());
        assert_eq!(display.live_handles(), 2);

        display.dispose_color(a.clone());
        assert_eq!(display.live_handles(), 1);
        assert_eq!(display.journal(), vec![Released::Color(a.native_id())]);
    }

    #[test]
    fn test_closed_display_refuses_allocation() {
        let display = HeadlessDisplay::default();
        display.close();
        assert!(display.is_closed());
        assert!(display.create_gc().is_err());
        assert_eq!(display.journal(), vec![Released::Connection]);
    }

    #[test]
    fn test_dispatch_runs_tasks_in_order() {
        let display = HeadlessDisplay::default();
        let window = display.create_window();
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            display.post(move || {
                log.borrow_mut().push(i);
                Ok(())
            });
        }
        display.post_destroy(window);

        while !display.is_window_destroyed(window) {
            assert!(display.read_and_dispatch().unwrap());
        }
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert!(!display.read_and_dispatch().unwrap());
    }

    #[test]
    fn test_proxy_wakes_sleep() {
        let display = HeadlessDisplay::new(HeadlessConfig {
            idle_wait_ms: 5_000,
            ..HeadlessConfig::default()
        });
        let window = display.create_window();
        let proxy = display.proxy();
        let handle = std::thread::spawn(move || {
            assert!(proxy.destroy_window(window));
        });
        display.sleep();
        handle.join().unwrap();
        assert!(display.read_and_dispatch().unwrap());
        assert!(display.is_window_destroyed(window));
    }

    #[test]
    fn test_text_extent_scales_with_dpi() {
        let display = HeadlessDisplay::new(HeadlessConfig {
            dpi: 144,
            ..HeadlessConfig::default()
        });
        let gc = display.create_gc().unwrap();
        let font = display.create_font(&Font::new("Mono", 12)).unwrap();
        assert_eq!(display.text_extent(&gc, &font, "abcd"), (48, 24));
    }

    #[test]
    fn test_oversized_font_is_rejected() {
        let display = HeadlessDisplay::default();
        let err = display.create_font(&Font::new("Arial", u32::MAX)).unwrap_err();
        assert!(matches!(err, PlatformError::ResourceCreation(_)));
        assert_eq!(display.live_handles(), 0);

        // 大字号仍可创建，超长文本宽度饱和而不溢出
        let gc = display.create_gc().unwrap();
        let font = display.create_font(&Font::new("Arial", 50_000_000)).unwrap();
        assert_eq!(font.height, 66_666_667);
        let text = "x".repeat(1000);
        assert_eq!(display.text_extent(&gc, &font, &text).0, i32::MAX);
    }

    #[test]
    fn test_properties_table() {
        let props = HeadlessProperties::new();
        let w = WindowId::from_raw(7);
        let style = props.constant("GWL_STYLE").unwrap();
        assert_eq!(props.get(w, style).unwrap(), 0);
        props.set(w, style, 0x40).unwrap();
        assert_eq!(props.get(w, style).unwrap(), 0x40);
        assert!(props.constant("NOPE").is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let cfg: HeadlessConfig = serde_json::from_str(r#"{"dpi": 120}"#).unwrap();
        assert_eq!(cfg.dpi, 120);
        assert_eq!(cfg.monitors, default_monitors());
        assert_eq!(cfg.idle_wait_ms, default_idle_wait_ms());
    }
}
