use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flags shared by the polling path and the OS hook path.
///
/// `suspended` blocks all dispatch while a rebind capture is running.
/// `window_focused` decides which delivery path owns keyboard input: the
/// poller while the window has focus, the hook otherwise.
#[derive(Debug, Clone)]
pub struct InputGate {
    suspended: Arc<AtomicBool>,
    window_focused: Arc<AtomicBool>,
}

impl Default for InputGate {
    fn default() -> Self {
        Self {
            suspended: Arc::new(AtomicBool::new(false)),
            window_focused: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suspend(&self) {
        if !self.suspended.swap(true, Ordering::SeqCst) {
            tracing::debug!("input dispatch suspended");
        }
    }

    pub fn resume(&self) {
        if self.suspended.swap(false, Ordering::SeqCst) {
            tracing::debug!("input dispatch resumed");
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    pub fn set_window_focused(&self, focused: bool) {
        let old = self.window_focused.swap(focused, Ordering::SeqCst);
        if old != focused {
            tracing::debug!(from = old, to = focused, "window focus changed");
        }
    }

    pub fn window_focused(&self) -> bool {
        self.window_focused.load(Ordering::SeqCst)
    }
}
