use super::Action;
use crate::keys::KeyCode;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One physical input source bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Binding {
    Keyboard {
        value: KeyCode,
    },
    Joystick {
        joy_id: u32,
        #[serde(rename = "value")]
        button: u32,
    },
}

impl Binding {
    pub fn key(key: KeyCode) -> Self {
        Binding::Keyboard { value: key }
    }

    pub fn joystick(joy_id: u32, button: u32) -> Self {
        Binding::Joystick { joy_id, button }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Keyboard { value } => write!(f, "{value}"),
            Binding::Joystick { joy_id, button } => write!(f, "Joy {joy_id} Button {button}"),
        }
    }
}

/// Action to binding map. Every action always has exactly one binding;
/// rebinding replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeybindTable {
    binds: BTreeMap<Action, Binding>,
}

impl KeybindTable {
    pub fn default_binding(action: Action) -> Binding {
        let key = match action {
            Action::PanLeft => KeyCode::LEFT,
            Action::PanRight => KeyCode::RIGHT,
            Action::PanUp => KeyCode::UP,
            Action::PanDown => KeyCode::DOWN,
            Action::ZoomIn => KeyCode::PLUS,
            Action::ZoomOut => KeyCode::MINUS,
            Action::ResetView => KeyCode(0x52),
            Action::ToggleSettings => KeyCode::F1,
            Action::Refresh => KeyCode::F5,
        };
        Binding::key(key)
    }

    pub fn get(&self, action: Action) -> Option<Binding> {
        self.binds.get(&action).copied()
    }

    /// Replace the binding for `action`, returning the previous one.
    pub fn set(&mut self, action: Action, binding: Binding) -> Option<Binding> {
        self.binds.insert(action, binding)
    }

    /// Bindings in action declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, Binding)> + '_ {
        self.binds.iter().map(|(a, b)| (*a, *b))
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}

impl Default for KeybindTable {
    fn default() -> Self {
        Self {
            binds: Action::ALL
                .into_iter()
                .map(|a| (a, Self::default_binding(a)))
                .collect(),
        }
    }
}

impl Serialize for KeybindTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.binds.len()))?;
        for (action, binding) in &self.binds {
            map.serialize_entry(action.as_str(), binding)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeybindTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

impl KeybindTable {
    /// Build a full table from loosely typed entries. Unknown action names
    /// are dropped, malformed entries and missing actions get defaults.
    fn from_raw(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let mut table = Self::default();
        for (name, value) in raw {
            let Some(action) = Action::from_name(&name) else {
                tracing::debug!(%name, "ignoring keybind for unknown action");
                continue;
            };
            match serde_json::from_value::<Binding>(value) {
                Ok(binding) => {
                    table.set(action, binding);
                }
                Err(err) => {
                    tracing::warn!(%action, %err, "malformed keybind; using default");
                }
            }
        }
        table
    }
}
