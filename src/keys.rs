use eframe::egui;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical keyboard key used by bindings, the poller and the hotkey hook.
///
/// The numeric value is the Windows virtual-key code. It is also the value
/// persisted in the settings file, so a binding written on one run resolves
/// to the same physical key on the next. Codes without an egui or platform
/// translation are kept as-is and simply never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACKSPACE: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const ENTER: Self = Self(0x0D);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const PAGE_UP: Self = Self(0x21);
    pub const PAGE_DOWN: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const NUMPAD_ADD: Self = Self(0x6B);
    pub const NUMPAD_SUBTRACT: Self = Self(0x6D);
    pub const PLUS: Self = Self(0xBB);
    pub const COMMA: Self = Self(0xBC);
    pub const MINUS: Self = Self(0xBD);
    pub const PERIOD: Self = Self(0xBE);
    pub const F1: Self = Self(0x70);
    pub const F5: Self = Self(0x74);

    /// Key for an ASCII letter or digit.
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() || upper.is_ascii_digit() {
            Some(Self(upper as u32))
        } else {
            None
        }
    }

    /// Human readable name for the settings menu.
    pub fn name(self) -> String {
        if let Some((_, name)) = NAMES.iter().find(|(code, _)| *code == self) {
            return (*name).to_string();
        }
        match self.0 {
            0x30..=0x39 | 0x41..=0x5A => char::from_u32(self.0)
                .map(String::from)
                .unwrap_or_default(),
            0x70..=0x87 => format!("F{}", self.0 - 0x70 + 1),
            code => format!("Key {code:#04X}"),
        }
    }

    /// Translate an egui key into the canonical code.
    pub fn from_egui(key: egui::Key) -> Option<Self> {
        EGUI_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, code)| *code)
    }

    /// Windows virtual-key code for this key, if it is a valid VK.
    pub fn to_vk(self) -> Option<u16> {
        (1..=0xFE).contains(&self.0).then_some(self.0 as u16)
    }

    pub fn from_vk(vk: u32) -> Self {
        Self(vk)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

const NAMES: &[(KeyCode, &str)] = &[
    (KeyCode::BACKSPACE, "Backspace"),
    (KeyCode::TAB, "Tab"),
    (KeyCode::ENTER, "Enter"),
    (KeyCode::ESCAPE, "Esc"),
    (KeyCode::SPACE, "Space"),
    (KeyCode::PAGE_UP, "PageUp"),
    (KeyCode::PAGE_DOWN, "PageDown"),
    (KeyCode::END, "End"),
    (KeyCode::HOME, "Home"),
    (KeyCode::LEFT, "Left"),
    (KeyCode::UP, "Up"),
    (KeyCode::RIGHT, "Right"),
    (KeyCode::DOWN, "Down"),
    (KeyCode::INSERT, "Insert"),
    (KeyCode::DELETE, "Delete"),
    (KeyCode::NUMPAD_ADD, "Numpad+"),
    (KeyCode::NUMPAD_SUBTRACT, "Numpad-"),
    (KeyCode::PLUS, "+"),
    (KeyCode::COMMA, ","),
    (KeyCode::MINUS, "-"),
    (KeyCode::PERIOD, "."),
];

// egui does not report the numpad separately, so `Plus`/`Minus` cover both rows.
const EGUI_KEYS: &[(egui::Key, KeyCode)] = &[
    (egui::Key::Backspace, KeyCode::BACKSPACE),
    (egui::Key::Tab, KeyCode::TAB),
    (egui::Key::Enter, KeyCode::ENTER),
    (egui::Key::Escape, KeyCode::ESCAPE),
    (egui::Key::Space, KeyCode::SPACE),
    (egui::Key::PageUp, KeyCode::PAGE_UP),
    (egui::Key::PageDown, KeyCode::PAGE_DOWN),
    (egui::Key::End, KeyCode::END),
    (egui::Key::Home, KeyCode::HOME),
    (egui::Key::ArrowLeft, KeyCode::LEFT),
    (egui::Key::ArrowUp, KeyCode::UP),
    (egui::Key::ArrowRight, KeyCode::RIGHT),
    (egui::Key::ArrowDown, KeyCode::DOWN),
    (egui::Key::Insert, KeyCode::INSERT),
    (egui::Key::Delete, KeyCode::DELETE),
    (egui::Key::Plus, KeyCode::PLUS),
    (egui::Key::Equals, KeyCode::PLUS),
    (egui::Key::Minus, KeyCode::MINUS),
    (egui::Key::Comma, KeyCode::COMMA),
    (egui::Key::Period, KeyCode::PERIOD),
    (egui::Key::Num0, KeyCode(0x30)),
    (egui::Key::Num1, KeyCode(0x31)),
    (egui::Key::Num2, KeyCode(0x32)),
    (egui::Key::Num3, KeyCode(0x33)),
    (egui::Key::Num4, KeyCode(0x34)),
    (egui::Key::Num5, KeyCode(0x35)),
    (egui::Key::Num6, KeyCode(0x36)),
    (egui::Key::Num7, KeyCode(0x37)),
    (egui::Key::Num8, KeyCode(0x38)),
    (egui::Key::Num9, KeyCode(0x39)),
    (egui::Key::A, KeyCode(0x41)),
    (egui::Key::B, KeyCode(0x42)),
    (egui::Key::C, KeyCode(0x43)),
    (egui::Key::D, KeyCode(0x44)),
    (egui::Key::E, KeyCode(0x45)),
    (egui::Key::F, KeyCode(0x46)),
    (egui::Key::G, KeyCode(0x47)),
    (egui::Key::H, KeyCode(0x48)),
    (egui::Key::I, KeyCode(0x49)),
    (egui::Key::J, KeyCode(0x4A)),
    (egui::Key::K, KeyCode(0x4B)),
    (egui::Key::L, KeyCode(0x4C)),
    (egui::Key::M, KeyCode(0x4D)),
    (egui::Key::N, KeyCode(0x4E)),
    (egui::Key::O, KeyCode(0x4F)),
    (egui::Key::P, KeyCode(0x50)),
    (egui::Key::Q, KeyCode(0x51)),
    (egui::Key::R, KeyCode(0x52)),
    (egui::Key::S, KeyCode(0x53)),
    (egui::Key::T, KeyCode(0x54)),
    (egui::Key::U, KeyCode(0x55)),
    (egui::Key::V, KeyCode(0x56)),
    (egui::Key::W, KeyCode(0x57)),
    (egui::Key::X, KeyCode(0x58)),
    (egui::Key::Y, KeyCode(0x59)),
    (egui::Key::Z, KeyCode(0x5A)),
    (egui::Key::F1, KeyCode(0x70)),
    (egui::Key::F2, KeyCode(0x71)),
    (egui::Key::F3, KeyCode(0x72)),
    (egui::Key::F4, KeyCode(0x73)),
    (egui::Key::F5, KeyCode(0x74)),
    (egui::Key::F6, KeyCode(0x75)),
    (egui::Key::F7, KeyCode(0x76)),
    (egui::Key::F8, KeyCode(0x77)),
    (egui::Key::F9, KeyCode(0x78)),
    (egui::Key::F10, KeyCode(0x79)),
    (egui::Key::F11, KeyCode(0x7A)),
    (egui::Key::F12, KeyCode(0x7B)),
];

#[cfg(test)]
mod tests {
    use super::KeyCode;
    use eframe::egui;

    #[test]
    fn names_cover_named_letters_and_function_keys() {
        assert_eq!(KeyCode::LEFT.name(), "Left");
        assert_eq!(KeyCode::from_char('r').map(KeyCode::name).as_deref(), Some("R"));
        assert_eq!(KeyCode::from_char('7').map(KeyCode::name).as_deref(), Some("7"));
        assert_eq!(KeyCode::F1.name(), "F1");
        assert_eq!(KeyCode::F5.name(), "F5");
        assert_eq!(KeyCode::from_char('-'), None);
    }

    #[test]
    fn unknown_codes_render_as_hex() {
        assert_eq!(KeyCode(0xE5).name(), "Key 0xE5");
    }

    #[test]
    fn egui_plus_and_equals_share_a_code() {
        assert_eq!(KeyCode::from_egui(egui::Key::Plus), Some(KeyCode::PLUS));
        assert_eq!(KeyCode::from_egui(egui::Key::Equals), Some(KeyCode::PLUS));
        assert_eq!(KeyCode::from_egui(egui::Key::R), KeyCode::from_char('r'));
        assert_eq!(KeyCode::from_egui(egui::Key::F5), Some(KeyCode::F5));
    }

    #[test]
    fn vk_range_is_validated() {
        assert_eq!(KeyCode::LEFT.to_vk(), Some(0x25));
        assert_eq!(KeyCode(0).to_vk(), None);
        assert_eq!(KeyCode(0x1FF).to_vk(), None);
    }
}
