use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical operation raised by a binding, independent of the device that
/// produced it. Declaration order is the display order in the settings menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleSettings,
    Refresh,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::PanLeft,
        Action::PanRight,
        Action::PanUp,
        Action::PanDown,
        Action::ZoomIn,
        Action::ZoomOut,
        Action::ResetView,
        Action::ToggleSettings,
        Action::Refresh,
    ];

    /// Name used as the key in the persisted `keybinds` object.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::PanLeft => "pan_left",
            Action::PanRight => "pan_right",
            Action::PanUp => "pan_up",
            Action::PanDown => "pan_down",
            Action::ZoomIn => "zoom_in",
            Action::ZoomOut => "zoom_out",
            Action::ResetView => "reset_view",
            Action::ToggleSettings => "toggle_settings",
            Action::Refresh => "refresh",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Actions that move the view. They repeat for as long as their input
    /// is held and are suppressed while the settings overlay is visible.
    /// The others fire once per press.
    pub fn is_navigation(self) -> bool {
        !matches!(self, Action::ToggleSettings | Action::Refresh)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
