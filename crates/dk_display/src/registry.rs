use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use dk_platform::{DisplayBackend, PlatformError};
use parking_lot::Mutex;

use crate::{Display, DisplayError, DisplayId};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// 当前线程的显示环境，每个 registry 一个槽位
    static LOCAL_DISPLAYS: RefCell<HashMap<u64, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// 在所属线程上创建新显示环境的原生连接
pub type BackendFactory<B> = Box<dyn Fn() -> Result<B, PlatformError> + Send + Sync>;

/// The process-wide "main" display designation.
///
/// Only identifies the display; the display itself stays on its own thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainDisplay {
    pub id: DisplayId,
    pub thread: ThreadId,
}

impl MainDisplay {
    pub fn is_current_thread(&self) -> bool {
        thread::current().id() == self.thread
    }
}

#[derive(Default)]
struct RegistryState {
    threads: HashMap<ThreadId, DisplayId>,
    main: Option<MainDisplay>,
}

/// Thread-keyed display environment registry.
///
/// Each thread gets exactly one [`Display`] on its first [`current`](Registry::current) call.
/// The first display created through a registry is designated main, once, for the registry's
/// lifetime. Displays are never removed automatically; the owning thread calls
/// [`detach_current`](Registry::detach_current) after tearing its display down.
pub struct Registry<B: DisplayBackend + 'static> {
    id: u64,
    factory: BackendFactory<B>,
    state: Mutex<RegistryState>,
}

impl<B: DisplayBackend + 'static> Registry<B> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<B, PlatformError> + Send + Sync + 'static,
    {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            factory: Box::new(factory),
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// 当前线程的显示环境，首次访问时创建
    pub fn current(&self) -> Result<Rc<Display<B>>, DisplayError> {
        if let Some(display) = self.local() {
            return Ok(display);
        }

        let thread = thread::current().id();
        // One guard around check-then-create and the main designation.
        let mut state = self.state.lock();
        if let Some(display) = self.local() {
            return Ok(display);
        }

        let backend = (self.factory)()?;
        let display = Rc::new(Display::new(backend));
        state.threads.insert(thread, display.id());
        if state.main.is_none() {
            let id = display.id().raw();
            tracing::info!(id, ?thread, "main display designated");
            state.main = Some(MainDisplay {
                id: display.id(),
                thread,
            });
        }

        let slot: Rc<dyn Any> = display.clone();
        LOCAL_DISPLAYS.with(|local| local.borrow_mut().insert(self.id, slot));
        Ok(display)
    }

    /// 主显示环境标识
    pub fn main(&self) -> Result<MainDisplay, DisplayError> {
        self.state.lock().main.ok_or(DisplayError::NotRunning)
    }

    /// The main display itself, when called from its thread.
    pub fn main_display(&self) -> Result<Rc<Display<B>>, DisplayError> {
        let main = self.main()?;
        if !main.is_current_thread() {
            return Err(DisplayError::WrongThread);
        }
        self.local()
            .filter(|display| display.id() == main.id)
            .ok_or(DisplayError::Disposed)
    }

    pub fn contains_current(&self) -> bool {
        self.local().is_some()
    }

    /// Remove the calling thread's display from the registry and hand it back.
    ///
    /// The main designation is never reassigned, even when the main display is detached.
    pub fn detach_current(&self) -> Option<Rc<Display<B>>> {
        let display = self.local()?;
        self.state.lock().threads.remove(&thread::current().id());
        LOCAL_DISPLAYS.with(|local| local.borrow_mut().remove(&self.id));
        let id = display.id().raw();
        tracing::debug!(id, "display detached from registry");
        Some(display)
    }

    /// 已注册显示环境的线程数
    pub fn len(&self) -> usize {
        self.state.lock().threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn local(&self) -> Option<Rc<Display<B>>> {
        LOCAL_DISPLAYS
            .with(|local| local.borrow().get(&self.id).cloned())
            .and_then(|slot| slot.downcast::<Display<B>>().ok())
    }
}

/// 进程级 registry 使用的默认后端
#[cfg(target_os = "windows")]
pub type DefaultBackend = dk_platform_windows::WindowsDisplay;

#[cfg(not(target_os = "windows"))]
pub type DefaultBackend = dk_platform::headless::HeadlessDisplay;

fn open_default_backend() -> Result<DefaultBackend, PlatformError> {
    #[cfg(target_os = "windows")]
    {
        dk_platform_windows::WindowsDisplay::open()
    }
    #[cfg(not(target_os = "windows"))]
    {
        let config = crate::DisplayConfig::load();
        Ok(dk_platform::headless::HeadlessDisplay::new(config.headless))
    }
}

static REGISTRY: OnceLock<Registry<DefaultBackend>> = OnceLock::new();

/// 进程级 registry（单例）
pub fn registry() -> &'static Registry<DefaultBackend> {
    REGISTRY.get_or_init(|| Registry::new(open_default_backend))
}

/// 从进程级 registry 获取当前线程的显示环境
pub fn current() -> Result<Rc<Display<DefaultBackend>>, DisplayError> {
    registry().current()
}

/// The process-wide main display designation.
pub fn main() -> Result<MainDisplay, DisplayError> {
    registry().main()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_platform::headless::HeadlessDisplay;

    fn headless_registry() -> Registry<HeadlessDisplay> {
        Registry::new(|| Ok(HeadlessDisplay::default()))
    }

    #[test]
    fn test_main_before_current_is_not_running() {
        let registry = headless_registry();
        assert!(matches!(registry.main(), Err(DisplayError::NotRunning)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_current_is_stable_per_thread() {
        let registry = headless_registry();
        let a = registry.current().unwrap();
        let b = registry.current().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(registry.main().unwrap().id, a.id());
        assert!(Rc::ptr_eq(&registry.main_display().unwrap(), &a));
    }

    #[test]
    fn test_registries_are_independent() {
        let first = headless_registry();
        let second = headless_registry();
        let a = first.current().unwrap();
        let b = second.current().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_factory_failure_registers_nothing() {
        let registry: Registry<HeadlessDisplay> =
            Registry::new(|| Err(PlatformError::Connection("no display".to_string())));
        assert!(matches!(
            registry.current(),
            Err(DisplayError::Platform(PlatformError::Connection(_)))
        ));
        assert!(registry.is_empty());
        assert!(registry.main().is_err());
    }

    #[test]
    fn test_detach_keeps_main() {
        let registry = headless_registry();
        let display = registry.current().unwrap();
        display.teardown();
        let detached = registry.detach_current().unwrap();
        assert!(Rc::ptr_eq(&display, &detached));
        assert!(!registry.contains_current());
        assert_eq!(registry.main().unwrap().id, display.id());

        let replacement = registry.current().unwrap();
        assert_ne!(replacement.id(), display.id());
        assert_eq!(registry.main().unwrap().id, display.id());
    }
}
