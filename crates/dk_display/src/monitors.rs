use std::cell::RefCell;
use std::rc::Rc;

use dk_platform::{DisplayBackend, MonitorInfo};

use crate::DisplayError;

#[derive(Clone)]
struct MonitorSet {
    list: Rc<[MonitorInfo]>,
    primary: usize,
}

/// 显示器布局缓存
///
/// Enumerated once on first use and kept until explicitly invalidated; there is no hot-plug
/// notification behind it.
#[derive(Default)]
pub(crate) struct MonitorCache {
    set: RefCell<Option<MonitorSet>>,
}

impl MonitorCache {
    pub fn list<B: DisplayBackend>(&self, backend: &B) -> Result<Rc<[MonitorInfo]>, DisplayError> {
        Ok(self.get_or_enumerate(backend)?.list)
    }

    pub fn primary<B: DisplayBackend>(&self, backend: &B) -> Result<MonitorInfo, DisplayError> {
        let set = self.get_or_enumerate(backend)?;
        Ok(set.list[set.primary])
    }

    pub fn invalidate(&self) {
        self.set.borrow_mut().take();
    }

    fn get_or_enumerate<B: DisplayBackend>(&self, backend: &B) -> Result<MonitorSet, DisplayError> {
        if let Some(set) = self.set.borrow().as_ref() {
            return Ok(set.clone());
        }
        let set = normalize(backend.monitors()?)?;
        tracing::debug!(
            count = set.list.len(),
            primary = set.primary,
            "enumerated monitors"
        );
        *self.set.borrow_mut() = Some(set.clone());
        Ok(set)
    }
}

/// Pick exactly one primary: the first entry the platform flags, or the first monitor if the
/// platform flags none.
fn normalize(mut raw: Vec<MonitorInfo>) -> Result<MonitorSet, DisplayError> {
    if raw.is_empty() {
        return Err(DisplayError::NoMonitors);
    }
    let primary = match raw.iter().position(|m| m.primary) {
        Some(index) => index,
        None => {
            tracing::warn!("platform reported no primary monitor, using the first");
            0
        }
    };
    for (index, monitor) in raw.iter_mut().enumerate() {
        monitor.primary = index == primary;
    }
    Ok(MonitorSet {
        list: raw.into(),
        primary,
    })
}
