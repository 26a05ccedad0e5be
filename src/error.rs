use crate::input::Action;
use crate::keys::KeyCode;
use std::path::PathBuf;

/// Failures the input core reports. None of them are fatal: each is logged
/// by the caller and the viewer keeps running with whatever state it has.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Settings file missing, unreadable or malformed; defaults are used.
    #[error("could not load settings from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },
    /// A joystick referenced by a binding is not connected.
    #[error("joystick {0} is not connected")]
    DeviceUnavailable(u32),
    /// The OS hook cannot watch this key; the binding stays inert until rebound.
    #[error("cannot register global hotkey {key} for {action}")]
    HotkeyRegistration { action: Action, key: KeyCode },
    /// Writing the settings file failed; the in-memory table stays authoritative.
    #[error("could not persist settings: {0}")]
    Persistence(String),
}
