//! Keyboard key definitions and their platform codes.
//!
//! Every key carries its DirectInput scan code (PC scan code set 1, with
//! extended `E0`-prefixed keys flagged by `0x80`) and its Linux evdev code.
//! X11 keycodes are derived from the evdev code.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset between evdev keycodes and X11 keycodes.
pub const X11_EVDEV_OFFSET: u16 = 8;

/// Bit marking an extended scan code in DirectInput numbering.
pub const EXTENDED_FLAG: u16 = 0x80;

macro_rules! keys {
    ($($variant:ident => $scan:literal, $evdev:literal;)*) => {
        /// Keys that can be bound to a note.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Key {
            $($variant,)*
        }

        impl Key {
            /// Every key, in declaration order.
            pub const ALL: &'static [Key] = &[$(Key::$variant),*];

            /// The DirectInput scan code.
            pub fn scancode(self) -> u16 {
                match self {
                    $(Key::$variant => $scan,)*
                }
            }

            /// The Linux input-event (evdev) key code.
            pub fn evdev_code(self) -> u16 {
                match self {
                    $(Key::$variant => $evdev,)*
                }
            }

            /// The canonical name, as accepted in configuration files.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

keys! {
    // Letters
    KeyA => 0x1E, 30;
    KeyB => 0x30, 48;
    KeyC => 0x2E, 46;
    KeyD => 0x20, 32;
    KeyE => 0x12, 18;
    KeyF => 0x21, 33;
    KeyG => 0x22, 34;
    KeyH => 0x23, 35;
    KeyI => 0x17, 23;
    KeyJ => 0x24, 36;
    KeyK => 0x25, 37;
    KeyL => 0x26, 38;
    KeyM => 0x32, 50;
    KeyN => 0x31, 49;
    KeyO => 0x18, 24;
    KeyP => 0x19, 25;
    KeyQ => 0x10, 16;
    KeyR => 0x13, 19;
    KeyS => 0x1F, 31;
    KeyT => 0x14, 20;
    KeyU => 0x16, 22;
    KeyV => 0x2F, 47;
    KeyW => 0x11, 17;
    KeyX => 0x2D, 45;
    KeyY => 0x15, 21;
    KeyZ => 0x2C, 44;

    // Numbers (top row)
    Num0 => 0x0B, 11;
    Num1 => 0x02, 2;
    Num2 => 0x03, 3;
    Num3 => 0x04, 4;
    Num4 => 0x05, 5;
    Num5 => 0x06, 6;
    Num6 => 0x07, 7;
    Num7 => 0x08, 8;
    Num8 => 0x09, 9;
    Num9 => 0x0A, 10;

    // Function keys
    F1 => 0x3B, 59;
    F2 => 0x3C, 60;
    F3 => 0x3D, 61;
    F4 => 0x3E, 62;
    F5 => 0x3F, 63;
    F6 => 0x40, 64;
    F7 => 0x41, 65;
    F8 => 0x42, 66;
    F9 => 0x43, 67;
    F10 => 0x44, 68;
    F11 => 0x57, 87;
    F12 => 0x58, 88;
    F13 => 0x64, 183;
    F14 => 0x65, 184;
    F15 => 0x66, 185;

    // Modifiers
    ShiftLeft => 0x2A, 42;
    ShiftRight => 0x36, 54;
    ControlLeft => 0x1D, 29;
    ControlRight => 0x9D, 97;
    AltLeft => 0x38, 56;
    AltRight => 0xB8, 100;
    MetaLeft => 0xDB, 125;
    MetaRight => 0xDC, 126;

    // Navigation
    Escape => 0x01, 1;
    Tab => 0x0F, 15;
    CapsLock => 0x3A, 58;
    Space => 0x39, 57;
    Enter => 0x1C, 28;
    Backspace => 0x0E, 14;
    Insert => 0xD2, 110;
    Delete => 0xD3, 111;
    Home => 0xC7, 102;
    End => 0xCF, 107;
    PageUp => 0xC9, 104;
    PageDown => 0xD1, 109;
    ArrowUp => 0xC8, 103;
    ArrowDown => 0xD0, 108;
    ArrowLeft => 0xCB, 105;
    ArrowRight => 0xCD, 106;

    // Lock keys
    NumLock => 0x45, 69;
    ScrollLock => 0x46, 70;
    PrintScreen => 0xB7, 99;
    Pause => 0xC5, 119;

    // Punctuation and symbols
    Grave => 0x29, 41;
    Minus => 0x0C, 12;
    Equal => 0x0D, 13;
    BracketLeft => 0x1A, 26;
    BracketRight => 0x1B, 27;
    Backslash => 0x2B, 43;
    Semicolon => 0x27, 39;
    Quote => 0x28, 40;
    Comma => 0x33, 51;
    Period => 0x34, 52;
    Slash => 0x35, 53;
    IntlBackslash => 0x56, 86;

    // Numpad
    Numpad0 => 0x52, 82;
    Numpad1 => 0x4F, 79;
    Numpad2 => 0x50, 80;
    Numpad3 => 0x51, 81;
    Numpad4 => 0x4B, 75;
    Numpad5 => 0x4C, 76;
    Numpad6 => 0x4D, 77;
    Numpad7 => 0x47, 71;
    Numpad8 => 0x48, 72;
    Numpad9 => 0x49, 73;
    NumpadAdd => 0x4E, 78;
    NumpadSubtract => 0x4A, 74;
    NumpadMultiply => 0x37, 55;
    NumpadDivide => 0xB5, 98;
    NumpadDecimal => 0x53, 83;
    NumpadEnter => 0x9C, 96;
    NumpadEqual => 0x8D, 117;

    // Media keys
    VolumeUp => 0xB0, 115;
    VolumeDown => 0xAE, 114;
    VolumeMute => 0xA0, 113;
    MediaPlayPause => 0xA2, 164;
    MediaStop => 0xA4, 166;
    MediaNext => 0x99, 163;
    MediaPrevious => 0x90, 165;

    // Context menu
    ContextMenu => 0xDD, 127;
}

/// DirectInput spellings accepted alongside the canonical names.
const ALIASES: &[(&str, Key)] = &[
    ("lshift", Key::ShiftLeft),
    ("rshift", Key::ShiftRight),
    ("lcontrol", Key::ControlLeft),
    ("rcontrol", Key::ControlRight),
    ("lctrl", Key::ControlLeft),
    ("rctrl", Key::ControlRight),
    ("lmenu", Key::AltLeft),
    ("rmenu", Key::AltRight),
    ("lalt", Key::AltLeft),
    ("ralt", Key::AltRight),
    ("lwin", Key::MetaLeft),
    ("rwin", Key::MetaRight),
    ("apps", Key::ContextMenu),
    ("return", Key::Enter),
    ("back", Key::Backspace),
    ("capital", Key::CapsLock),
    ("scroll", Key::ScrollLock),
    ("sysrq", Key::PrintScreen),
    ("lbracket", Key::BracketLeft),
    ("rbracket", Key::BracketRight),
    ("apostrophe", Key::Quote),
    ("equals", Key::Equal),
    ("prior", Key::PageUp),
    ("next", Key::PageDown),
    ("up", Key::ArrowUp),
    ("down", Key::ArrowDown),
    ("left", Key::ArrowLeft),
    ("right", Key::ArrowRight),
    ("add", Key::NumpadAdd),
    ("subtract", Key::NumpadSubtract),
    ("multiply", Key::NumpadMultiply),
    ("divide", Key::NumpadDivide),
    ("decimal", Key::NumpadDecimal),
    ("numpadequals", Key::NumpadEqual),
    ("oem102", Key::IntlBackslash),
    ("mute", Key::VolumeMute),
    ("playpause", Key::MediaPlayPause),
    ("mediastop", Key::MediaStop),
    ("nexttrack", Key::MediaNext),
    ("prevtrack", Key::MediaPrevious),
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Key {
    /// Whether the scan code needs the `E0` extended prefix.
    pub fn is_extended(self) -> bool {
        self.scancode() & EXTENDED_FLAG != 0
    }

    /// The X11 keycode.
    pub fn x11_keycode(self) -> u16 {
        self.evdev_code() + X11_EVDEV_OFFSET
    }

    /// The classic DirectInput spelling, e.g. `W`, `1`, `LSHIFT` or `SPACE`.
    pub fn directinput_name(self) -> String {
        let name = self.name();
        if let Some(short) = name.strip_prefix("Key").or_else(|| name.strip_prefix("Num"))
            && short.len() == 1
        {
            return short.to_string();
        }

        ALIASES
            .iter()
            .find(|(_, key)| *key == self)
            .map(|(alias, _)| alias.to_ascii_uppercase())
            .unwrap_or_else(|| name.to_ascii_uppercase())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);

        // Bare letters and digits: "W", "1"
        let mut chars = wanted.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let canonical = if c.is_ascii_digit() {
                format!("num{c}")
            } else {
                format!("key{c}")
            };
            if let Some(key) = Key::ALL.iter().find(|k| normalize(k.name()) == canonical) {
                return Ok(*key);
            }
        }

        Key::ALL
            .iter()
            .copied()
            .find(|k| normalize(k.name()) == wanted)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == wanted)
                    .map(|(_, key)| *key)
            })
            .ok_or_else(|| Error::Config(format!("unknown key \"{s}\"")))
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.name().to_string()
    }
}
