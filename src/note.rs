//! MIDI note and channel identifiers.
//!
//! Notes are written in scientific pitch notation, where middle C (`C4`) is
//! note 60 and `C-1` is note 0. Sharps may be spelled `#` or `S` (`F#3`,
//! `FS3`) and flats `b` (`Gb3`).

use crate::error::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A MIDI note number in `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note(u8);

impl Note {
    /// Highest valid note number.
    pub const MAX: u8 = 127;

    /// Create a note, rejecting numbers above 127.
    pub fn new(number: u8) -> Result<Self> {
        if number > Self::MAX {
            return Err(Error::Config(format!("note {number} is out of range 0-127")));
        }
        Ok(Self(number))
    }

    /// Create a note from the low seven bits of a data byte.
    pub const fn from_u7(byte: u8) -> Self {
        Self(byte & 0x7F)
    }

    /// The raw note number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// The scientific-pitch name, e.g. `F#3`.
    pub fn name(self) -> String {
        let octave = i32::from(self.0 / 12) - 1;
        format!("{}{}", PITCH_CLASSES[usize::from(self.0 % 12)], octave)
    }

    fn parse_name(s: &str) -> Option<i64> {
        let mut chars = s.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let pitch_class = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let rest = chars.as_str();
        let (accidental, octave) = match rest.chars().next()? {
            '#' | 's' | 'S' => (1, &rest[1..]),
            'b' => (-1, &rest[1..]),
            _ => (0, rest),
        };

        // Widened so absurd octaves land out of range instead of overflowing.
        let octave = i64::from(octave.parse::<i32>().ok()?);
        Some((octave + 1) * 12 + pitch_class + accidental)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

impl FromStr for Note {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let number = match s.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => Self::parse_name(s),
        }
        .ok_or_else(|| Error::Config(format!("\"{s}\" is not a note number or name")))?;

        u8::try_from(number)
            .ok()
            .filter(|n| *n <= Self::MAX)
            .map(Self)
            .ok_or_else(|| Error::Config(format!("note \"{s}\" is out of range 0-127")))
    }
}

impl TryFrom<u8> for Note {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        Self::new(number)
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct NoteVisitor;

        impl Visitor<'_> for NoteVisitor {
            type Value = Note;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a MIDI note number (0-127) or name such as \"C4\" or \"F#3\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Note, E> {
                u8::try_from(v)
                    .map_err(|_| E::custom(format!("note {v} is out of range 0-127")))
                    .and_then(|n| Note::new(n).map_err(E::custom))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Note, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("note {v} is out of range 0-127")))
                    .and_then(|n| self.visit_u64(n))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Note, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(NoteVisitor)
    }
}

/// A MIDI channel in `0..=15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Channel(u8);

impl Channel {
    /// Highest valid channel number.
    pub const MAX: u8 = 15;

    /// Create a channel, rejecting numbers above 15.
    pub fn new(number: u8) -> Result<Self> {
        if number > Self::MAX {
            return Err(Error::Config(format!(
                "channel {number} is out of range 0-15"
            )));
        }
        Ok(Self(number))
    }

    /// Extract the channel from a MIDI status byte.
    pub fn from_status(status: u8) -> Self {
        Self(status & 0x0F)
    }

    /// The raw channel number.
    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let number = u8::deserialize(deserializer)?;
        Channel::new(number).map_err(de::Error::custom)
    }
}
