use crate::input::{Action, InputGate};
use crate::viewport::{SharedViewport, ZoomDirection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives manual map refresh requests.
pub trait MapRefresh: Send + Sync {
    fn request_refresh(&self);
}

/// Refresh sink that does nothing, for setups without a map feed.
#[derive(Debug, Default)]
pub struct NoRefresh;

impl MapRefresh for NoRefresh {
    fn request_refresh(&self) {}
}

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The viewport was mutated.
    Applied,
    /// The settings overlay visibility flipped to the contained value.
    SettingsToggled(bool),
    RefreshRequested,
    /// Input is suspended for rebind capture.
    Suspended,
    /// Navigation is blocked while the settings overlay is visible.
    BlockedBySettings,
    /// The viewport lock was poisoned; nothing changed.
    Unavailable,
}

/// The single entry point through which both the poller and the hotkey
/// hook apply actions. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct ActionDispatcher {
    viewport: SharedViewport,
    gate: InputGate,
    settings_visible: Arc<AtomicBool>,
    refresh: Arc<dyn MapRefresh>,
    repaint: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl ActionDispatcher {
    pub fn new(viewport: SharedViewport, gate: InputGate, refresh: Arc<dyn MapRefresh>) -> Self {
        Self {
            viewport,
            gate,
            settings_visible: Arc::new(AtomicBool::new(false)),
            refresh,
            repaint: None,
        }
    }

    /// Called after every state change so an idle window redraws.
    pub fn with_repaint(mut self, repaint: impl Fn() + Send + Sync + 'static) -> Self {
        self.repaint = Some(Arc::new(repaint));
        self
    }

    pub fn gate(&self) -> &InputGate {
        &self.gate
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    pub fn settings_visible(&self) -> bool {
        self.settings_visible.load(Ordering::SeqCst)
    }

    pub fn set_settings_visible(&self, visible: bool) {
        self.settings_visible.store(visible, Ordering::SeqCst);
    }

    pub fn dispatch(&self, action: Action) -> DispatchOutcome {
        if self.gate.is_suspended() {
            return DispatchOutcome::Suspended;
        }

        let outcome = match action {
            Action::ToggleSettings => {
                let visible = !self.settings_visible.fetch_xor(true, Ordering::SeqCst);
                tracing::debug!(visible, "settings overlay toggled");
                DispatchOutcome::SettingsToggled(visible)
            }
            Action::Refresh => {
                tracing::debug!("map refresh requested");
                self.refresh.request_refresh();
                DispatchOutcome::RefreshRequested
            }
            a if a.is_navigation() && self.settings_visible() => {
                return DispatchOutcome::BlockedBySettings
            }
            navigation => self.apply_navigation(navigation),
        };

        if let Some(repaint) = &self.repaint {
            repaint();
        }
        outcome
    }

    fn apply_navigation(&self, action: Action) -> DispatchOutcome {
        let Ok(mut vp) = self.viewport.lock() else {
            tracing::warn!(%action, "viewport lock poisoned; action dropped");
            return DispatchOutcome::Unavailable;
        };
        let speed = vp.config().pan_speed;
        match action {
            Action::PanLeft => vp.apply_pan(speed, 0.0),
            Action::PanRight => vp.apply_pan(-speed, 0.0),
            Action::PanUp => vp.apply_pan(0.0, speed),
            Action::PanDown => vp.apply_pan(0.0, -speed),
            Action::ZoomIn => vp.apply_zoom(ZoomDirection::In),
            Action::ZoomOut => vp.apply_zoom(ZoomDirection::Out),
            Action::ResetView => vp.reset_view(),
            Action::ToggleSettings | Action::Refresh => {}
        }
        DispatchOutcome::Applied
    }
}
