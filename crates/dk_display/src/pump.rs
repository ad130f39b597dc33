use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use dk_platform::{DisplayBackend, PlatformError, WindowId};

use crate::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Running,
    Stopped,
}

/// 单次派发失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchFailure {
    Error(PlatformError),
    /// An event handler panicked; the payload message if it had one.
    Panic(String),
}

/// 事件循环单次迭代的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Dispatched,
    /// 队列为空
    Idle,
    Failed(DispatchFailure),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub dispatched: u64,
    pub idle: u64,
    pub failures: u64,
}

/// Drives a display's native event loop until a root window is destroyed.
///
/// A failing or panicking event handler only costs its own event: the failure is logged and the
/// loop carries on. The root window is the only way to stop the loop.
///
/// Panic recovery only covers backends that dispatch in Rust (headless). On Win32 handlers run
/// inside an `extern "system"` window procedure, and a panic there aborts the process instead of
/// unwinding back to [`tick`](Self::tick).
pub struct EventPump<'a, B: DisplayBackend> {
    display: &'a Display<B>,
    state: PumpState,
    stats: PumpStats,
}

impl<'a, B: DisplayBackend> EventPump<'a, B> {
    pub fn new(display: &'a Display<B>) -> Self {
        Self {
            display,
            state: PumpState::Stopped,
            stats: PumpStats::default(),
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    /// Main loop: pump until `root` is destroyed, then tear the display down.
    ///
    /// Teardown happens exactly once however the loop ends, including by unwinding out of the
    /// backend.
    pub fn run(&mut self, root: WindowId) -> PumpStats {
        let _teardown = TeardownGuard(self.display);
        self.run_nested(root)
    }

    /// Pump until `root` is destroyed without tearing anything down (modal dialogs and other
    /// nested loops).
    pub fn run_nested(&mut self, root: WindowId) -> PumpStats {
        self.state = PumpState::Running;
        tracing::debug!(root = root.raw(), "event loop running");

        let display = self.display;
        let backend = display.backend();
        while !backend.is_window_destroyed(root) {
            if self.tick() == Tick::Idle {
                backend.sleep();
            }
        }

        self.state = PumpState::Stopped;
        tracing::debug!(root = root.raw(), stats = ?self.stats, "event loop stopped");
        self.stats
    }

    /// 尝试派发一个待处理事件
    pub fn tick(&mut self) -> Tick {
        let display = self.display;
        let backend = display.backend();
        let result = panic::catch_unwind(AssertUnwindSafe(|| backend.read_and_dispatch()));

        match result {
            Ok(Ok(true)) => {
                self.stats.dispatched += 1;
                Tick::Dispatched
            }
            Ok(Ok(false)) => {
                self.stats.idle += 1;
                Tick::Idle
            }
            Ok(Err(e)) => {
                self.stats.failures += 1;
                tracing::warn!("event dispatch failed: {e}");
                Tick::Failed(DispatchFailure::Error(e))
            }
            Err(payload) => {
                self.stats.failures += 1;
                let msg = panic_message(&*payload);
                tracing::error!("panic in event handler: {msg}");
                Tick::Failed(DispatchFailure::Panic(msg))
            }
        }
    }
}

struct TeardownGuard<'a, B: DisplayBackend>(&'a Display<B>);

impl<B: DisplayBackend> Drop for TeardownGuard<'_, B> {
    fn drop(&mut self) {
        self.0.teardown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_platform::headless::HeadlessDisplay;

    #[test]
    fn test_tick_reports_each_outcome() {
        let display = Display::new(HeadlessDisplay::default());
        let backend = display.backend();
        backend.post(|| Ok(()));
        backend.post(|| Err(PlatformError::Dispatch("handler failed".to_string())));
        backend.post(|| panic!("boom"));

        let mut pump = EventPump::new(&display);
        assert_eq!(pump.tick(), Tick::Dispatched);
        assert_eq!(
            pump.tick(),
            Tick::Failed(DispatchFailure::Error(PlatformError::Dispatch(
                "handler failed".to_string()
            )))
        );
        assert_eq!(
            pump.tick(),
            Tick::Failed(DispatchFailure::Panic("boom".to_string()))
        );
        assert_eq!(pump.tick(), Tick::Idle);
        assert_eq!(
            pump.stats(),
            PumpStats {
                dispatched: 1,
                idle: 1,
                failures: 2
            }
        );
    }

    #[test]
    fn test_nested_loop_leaves_display_alive() {
        let display = Display::new(HeadlessDisplay::default());
        let dialog = display.backend().create_window();
        display.backend().post_destroy(dialog);

        let mut pump = EventPump::new(&display);
        let stats = pump.run_nested(dialog);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(pump.state(), PumpState::Stopped);
        assert!(!display.is_disposed());
    }
}
