use super::{Action, Binding, DeviceRegistry, KeybindTable};
use crate::keys::KeyCode;
use eframe::egui;
use std::collections::{BTreeSet, HashSet};

/// Keys held down during the current frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys(HashSet<KeyCode>);

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate egui's held-key set; keys without a canonical code are dropped.
    pub fn from_egui<'a>(keys: impl IntoIterator<Item = &'a egui::Key>) -> Self {
        Self(keys.into_iter().filter_map(|k| KeyCode::from_egui(*k)).collect())
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.0.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<KeyCode> for HeldKeys {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Sample the current input state and return every action whose binding
/// is active. Held inputs are reported on every call.
///
/// Joystick bindings for devices that are not registered, or that fail
/// to read, are skipped.
pub fn poll(table: &KeybindTable, held: &HeldKeys, devices: &DeviceRegistry) -> BTreeSet<Action> {
    table
        .iter()
        .filter(|(action, binding)| match *binding {
            Binding::Keyboard { value } => held.is_held(value),
            Binding::Joystick { joy_id, button } => match devices.is_pressed(joy_id, button) {
                Ok(pressed) => pressed,
                Err(err) => {
                    tracing::trace!(%action, %err, "joystick binding inactive");
                    false
                }
            },
        })
        .map(|(action, _)| action)
        .collect()
}
