//! Keyboard input as delivered by the host.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Up,
    Down,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Tab,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
    Char(char),
}

impl Key {
    /// Parse a host key name (`"up"`, `"page_down"`, `"a"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "pageup" | "page_up" => Self::PageUp,
            "pagedown" | "page_down" => Self::PageDown,
            "enter" | "return" => Self::Enter,
            "esc" | "escape" => Self::Escape,
            "tab" => Self::Tab,
            "left" => Self::Left,
            "right" => Self::Right,
            "home" => Self::Home,
            "end" => Self::End,
            "backspace" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS. Treated like ctrl for date shifting.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    #[must_use]
    pub const fn count(self) -> u8 {
        self.shift as u8 + self.ctrl as u8 + self.alt as u8 + self.meta as u8
    }

    #[must_use]
    pub const fn ctrl_or_meta(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press routed to a focused sub-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Caret sits at the end of the sub-field's raw text.
    pub caret_at_end: bool,
}

impl KeyPress {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            caret_at_end: true,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn caret_at_end(mut self, at_end: bool) -> Self {
        self.caret_at_end = at_end;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names() {
        assert_eq!(Key::from_name("PageDown"), Some(Key::PageDown));
        assert_eq!(Key::from_name("esc"), Some(Key::Escape));
        assert_eq!(Key::from_name("x"), Some(Key::Char('x')));
        assert_eq!(Key::from_name("xy"), None);
    }

    #[test]
    fn modifier_count() {
        assert_eq!(Modifiers::NONE.count(), 0);
        let both = Modifiers {
            shift: true,
            ctrl: true,
            ..Modifiers::NONE
        };
        assert_eq!(both.count(), 2);
        assert!(both.ctrl_or_meta());
    }
}
