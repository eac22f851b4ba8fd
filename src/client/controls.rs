//! Input controls shared by the selection and upload flows

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Upload and selection inputs; disabled while an upload is in flight
#[derive(Debug, Clone)]
pub struct Controls {
    enabled: Arc<AtomicBool>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl Controls {
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Disable the controls until the returned guard drops
    pub fn disable(&self) -> Option<ControlsGuard> {
        self.enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ControlsGuard {
                controls: self.clone(),
            })
    }
}

pub struct ControlsGuard {
    controls: Controls,
}

impl Drop for ControlsGuard {
    fn drop(&mut self) {
        self.controls.enabled.store(true, Ordering::SeqCst);
    }
}
