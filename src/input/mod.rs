//! Input bindings: the action set, the persisted binding table, joystick
//! discovery, per-frame polling and interactive rebinding.

mod action;
mod binding;
mod capture;
mod controller;
mod devices;
mod gate;
mod poller;
mod registry;

pub use action::Action;
pub use binding::{Binding, KeybindTable};
pub use capture::{CaptureOutcome, CaptureState, RebindCapture, CANCEL_KEY};
pub use controller::InputController;
pub use devices::{
    default_backend as default_joystick_backend, ButtonSnapshot, DeviceRegistry,
    JoystickBackend, JoystickInfo, NoJoysticks, RESCAN_INTERVAL,
};
pub use gate::InputGate;
pub use poller::{poll, HeldKeys};
pub use registry::KeybindRegistry;
