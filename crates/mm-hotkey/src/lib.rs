//! Global keyboard shortcuts for instant input switching.
//!
//! Shortcut combos are stored as text (`"ctrl+shift+1"`). [`Hotkey::parse`]
//! turns that text into modifier flags plus a Win32 virtual-key code, and
//! [`listener::listen`] registers every configured shortcut and switches
//! inputs when one is pressed.

pub mod listener;

use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub use listener::{listen, perform_switch, SwitchGate};

/// Built-in combo that prints the shortcut list.
pub const HELP_HOTKEY: &str = "ctrl+shift+h";

// Win32 `RegisterHotKey` modifier flags.
pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_WIN: u32 = 0x0008;
/// Suppress auto-repeat while the combo is held.
pub const MOD_NOREPEAT: u32 = 0x4000;

/// Named keys and their virtual-key codes. Aliases map to the same code.
const NAMED_KEYS: &[(&str, u32)] = &[
    ("space", 0x20),
    ("enter", 0x0D),
    ("return", 0x0D),
    ("tab", 0x09),
    ("esc", 0x1B),
    ("escape", 0x1B),
    ("backspace", 0x08),
    ("insert", 0x2D),
    ("ins", 0x2D),
    ("delete", 0x2E),
    ("del", 0x2E),
    ("home", 0x24),
    ("end", 0x23),
    ("pageup", 0x21),
    ("pgup", 0x21),
    ("pagedown", 0x22),
    ("pgdn", 0x22),
    ("left", 0x25),
    ("up", 0x26),
    ("right", 0x27),
    ("down", 0x28),
    ("printscreen", 0x2C),
    ("pause", 0x13),
    ("minus", 0xBD),
    ("plus", 0xBB),
    ("comma", 0xBC),
    ("period", 0xBE),
];

/// Modifier set of a hotkey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.win)
    }

    /// `MOD_*` flags for `RegisterHotKey`, always including `MOD_NOREPEAT`.
    pub fn flags(&self) -> u32 {
        let mut flags = MOD_NOREPEAT;
        if self.ctrl {
            flags |= MOD_CONTROL;
        }
        if self.alt {
            flags |= MOD_ALT;
        }
        if self.shift {
            flags |= MOD_SHIFT;
        }
        if self.win {
            flags |= MOD_WIN;
        }
        flags
    }
}

/// A parsed shortcut: modifiers plus exactly one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    /// Canonical lowercase key name (`"1"`, `"f5"`, `"num3"`, `"pageup"`).
    pub key: String,
    pub vk: u32,
}

/// Why a combo string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    Empty,
    /// Only modifiers were given.
    NoKey,
    MultipleKeys(String, String),
    UnknownToken(String),
}

impl fmt::Display for HotkeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeyError::Empty => write!(f, "Shortcut is empty"),
            HotkeyError::NoKey => write!(f, "Shortcut needs a key besides modifiers"),
            HotkeyError::MultipleKeys(a, b) => {
                write!(f, "Shortcut has more than one key: '{}' and '{}'", a, b)
            }
            HotkeyError::UnknownToken(t) => write!(f, "Unknown key in shortcut: '{}'", t),
        }
    }
}

impl Error for HotkeyError {}

impl Hotkey {
    /// Parse `"ctrl+alt+1"`-style text. Case and spaces are ignored.
    pub fn parse(text: &str) -> Result<Self, HotkeyError> {
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if cleaned.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key: Option<(String, u32)> = None;

        for token in cleaned.split('+') {
            match token {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "win" | "windows" | "super" => modifiers.win = true,
                "" => return Err(HotkeyError::UnknownToken("+".to_string())),
                other => {
                    let (name, vk) = key_code(other)
                        .ok_or_else(|| HotkeyError::UnknownToken(other.to_string()))?;
                    if let Some((first, _)) = &key {
                        return Err(HotkeyError::MultipleKeys(first.clone(), name));
                    }
                    key = Some((name, vk));
                }
            }
        }

        let (key, vk) = key.ok_or(HotkeyError::NoKey)?;
        Ok(Self { modifiers, key, vk })
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hotkey::parse(s)
    }
}

impl fmt::Display for Hotkey {
    /// Canonical form: `ctrl+alt+shift+win+key`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (on, name) in [
            (m.ctrl, "ctrl"),
            (m.alt, "alt"),
            (m.shift, "shift"),
            (m.win, "win"),
        ] {
            if on {
                write!(f, "{}+", name)?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Canonical spelling of a combo, e.g. `"Shift + CTRL + 1"` → `"ctrl+shift+1"`.
pub fn canonicalize(text: &str) -> Result<String, HotkeyError> {
    Hotkey::parse(text).map(|h| h.to_string())
}

/// Canonical name and virtual-key code for one key token.
fn key_code(token: &str) -> Option<(String, u32)> {
    let bytes = token.as_bytes();
    if bytes.len() == 1 {
        let c = bytes[0];
        return match c {
            b'a'..=b'z' => Some((token.to_string(), u32::from(c.to_ascii_uppercase()))),
            b'0'..=b'9' => Some((token.to_string(), u32::from(c))),
            _ => None,
        };
    }

    if let Some(n) = token.strip_prefix('f').and_then(|d| d.parse::<u32>().ok()) {
        if (1..=24).contains(&n) && !token[1..].starts_with('0') {
            return Some((token.to_string(), 0x70 + n - 1));
        }
    }

    let numpad = token
        .strip_prefix("numpad")
        .or_else(|| token.strip_prefix("num"));
    if let Some(d) = numpad {
        if d.len() == 1 {
            if let Some(n) = d.chars().next().and_then(|c| c.to_digit(10)) {
                return Some((format!("num{}", n), 0x60 + n));
            }
        }
    }

    NAMED_KEYS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, vk)| {
            let canonical = NAMED_KEYS
                .iter()
                .find(|(_, v)| v == vk)
                .map(|(n, _)| *n)
                .unwrap_or(token);
            (canonical.to_string(), *vk)
        })
}

#[cfg(test)]
#[path = "tests/hotkey_tests.rs"]
mod tests;
