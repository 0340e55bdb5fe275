//! Configuration loading and validation.
//!
//! Configuration is read from a TOML file:
//!
//! ```toml
//! device = "Casio"
//! channel = 0
//! sensitivity = 4.0
//! refresh_interval = 0.005
//!
//! [keys]
//! "F#3" = "W"
//! D3 = "LSHIFT"
//!
//! [movement]
//! E4 = "left"
//!
//! [buttons]
//! D4 = { press = "left_press", release = "left_release" }
//! ```

use crate::action::Direction;
use crate::binding::{BindingTable, ButtonBinding};
use crate::error::{Error, Result};
use crate::keycode::Key;
use crate::motion::{DEFAULT_INTERVAL, DEFAULT_SENSITIVITY};
use crate::note::{Channel, Note};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Case-insensitive substring of the MIDI input port name.
    #[serde(default = "default_device")]
    pub device: String,
    /// Channel to listen on (0-15).
    #[serde(default)]
    pub channel: Channel,
    /// Pixels per tick for one held movement note.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Seconds between mouse pump ticks.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: f64,
    /// Log every received note.
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Emit zero-length moves on idle pump ticks.
    #[serde(default = "default_true")]
    pub emit_idle_moves: bool,
    /// Note to keyboard key.
    #[serde(default, deserialize_with = "unique_notes")]
    pub keys: BTreeMap<Note, Key>,
    /// Note to pointer direction.
    #[serde(default, deserialize_with = "unique_notes")]
    pub movement: BTreeMap<Note, Direction>,
    /// Note to mouse button press/release pair.
    #[serde(default, deserialize_with = "unique_notes")]
    pub buttons: BTreeMap<Note, ButtonBinding>,
}

fn default_device() -> String {
    "Casio".to_string()
}

fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}

fn default_refresh_interval() -> f64 {
    DEFAULT_INTERVAL.as_secs_f64()
}

fn default_true() -> bool {
    true
}

/// Deserialize a note-keyed table, rejecting two spellings of one note.
fn unique_notes<'de, D, V>(deserializer: D) -> std::result::Result<BTreeMap<Note, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueNotes<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueNotes<V> {
        type Value = BTreeMap<Note, V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table keyed by note")
        }

        fn visit_map<A: MapAccess<'de>>(
            self,
            mut map: A,
        ) -> std::result::Result<Self::Value, A::Error> {
            let mut out = BTreeMap::new();
            while let Some((note, value)) = map.next_entry::<Note, V>()? {
                if out.insert(note, value).is_some() {
                    return Err(de::Error::custom(format!("note {note} is bound twice")));
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(UniqueNotes(PhantomData))
}

impl Default for Config {
    /// The stock profile: WASD and friends around F#3, mouse around E4.
    fn default() -> Self {
        Self {
            device: default_device(),
            channel: Channel::default(),
            sensitivity: DEFAULT_SENSITIVITY,
            refresh_interval: default_refresh_interval(),
            verbose: true,
            emit_idle_moves: true,
            keys: BTreeMap::from([
                (Note::from_u7(54), Key::KeyW), // F#3
                (Note::from_u7(52), Key::KeyA), // E3
                (Note::from_u7(53), Key::KeyS), // F3
                (Note::from_u7(55), Key::KeyD), // G3
                (Note::from_u7(50), Key::ShiftLeft), // D3
                (Note::from_u7(57), Key::Space), // A3
                (Note::from_u7(56), Key::KeyR), // G#3
            ]),
            movement: BTreeMap::from([
                (Note::from_u7(64), Direction::Left), // E4
                (Note::from_u7(65), Direction::Down), // F4
                (Note::from_u7(66), Direction::Up), // F#4
                (Note::from_u7(67), Direction::Right), // G4
            ]),
            buttons: BTreeMap::from([
                (Note::from_u7(62), ButtonBinding::LEFT), // D4
                (Note::from_u7(69), ButtonBinding::RIGHT), // A4
            ]),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check numeric ranges and binding overlaps.
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(Error::Config(format!(
                "sensitivity must be a positive number, got {}",
                self.sensitivity
            )));
        }
        self.interval()?;
        self.binding_table()?;
        Ok(())
    }

    /// The mouse pump interval.
    pub fn interval(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.refresh_interval)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                Error::Config(format!(
                    "refresh_interval must be a positive number of seconds, got {}",
                    self.refresh_interval
                ))
            })
    }

    /// Build the binding table, rejecting notes bound more than once.
    pub fn binding_table(&self) -> Result<BindingTable> {
        BindingTable::new(
            self.keys.clone(),
            self.movement.clone(),
            self.buttons.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ButtonAction;
    use crate::binding::Binding;
    use std::io::Write;

    fn note(n: u8) -> Note {
        Note::new(n).unwrap()
    }

    #[test]
    fn test_default_profile() {
        let config = Config::default();
        assert_eq!(config.device, "Casio");
        assert_eq!(config.channel.number(), 0);
        assert_eq!(config.sensitivity, 4.0);
        assert_eq!(config.interval().unwrap(), Duration::from_millis(5));
        assert!(config.verbose);

        let table = config.binding_table().unwrap();
        assert_eq!(table.resolve(note(54)), Some(Binding::Key(Key::KeyW)));
        assert_eq!(table.resolve(note(50)), Some(Binding::Key(Key::ShiftLeft)));
        assert_eq!(
            table.resolve(note(66)),
            Some(Binding::Movement(Direction::Up))
        );
        assert_eq!(
            table.resolve(note(69)),
            Some(Binding::Button(ButtonBinding::RIGHT))
        );
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            device = "Launchpad"
            channel = 9
            sensitivity = 2.5
            refresh_interval = 0.01
            verbose = false
            emit_idle_moves = false

            [keys]
            "F#3" = "W"
            60 = "LSHIFT"

            [movement]
            C5 = "up"

            [buttons]
            D4 = { press = "left_click", release = "left_release" }
            "#,
        )
        .unwrap();

        assert_eq!(config.device, "Launchpad");
        assert_eq!(config.channel.number(), 9);
        assert_eq!(config.sensitivity, 2.5);
        assert_eq!(config.interval().unwrap(), Duration::from_millis(10));
        assert!(!config.verbose);
        assert!(!config.emit_idle_moves);
        assert_eq!(config.keys.get(&note(54)), Some(&Key::KeyW));
        assert_eq!(config.keys.get(&note(60)), Some(&Key::ShiftLeft));
        assert_eq!(config.movement.get(&note(72)), Some(&Direction::Up));
        assert_eq!(
            config.buttons.get(&note(62)).unwrap().press,
            ButtonAction::LeftPress
        );
    }

    #[test]
    fn test_missing_fields_use_defaults_and_empty_tables() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.device, "Casio");
        assert_eq!(config.sensitivity, 4.0);
        assert!(config.keys.is_empty());
        assert!(config.movement.is_empty());
        assert!(config.buttons.is_empty());
    }

    #[test]
    fn test_invalid_values_rejected() {
        for content in [
            "channel = 16",
            "sensitivity = 0.0",
            "sensitivity = -1.0",
            "refresh_interval = 0.0",
            "refresh_interval = -0.5",
            "bogus = 1",
            "[keys]\nC4 = \"NotAKey\"",
            "[keys]\nH4 = \"W\"",
            "[keys]\nC200000000 = \"W\"",
            "[movement]\nC4 = \"sideways\"",
            "[buttons]\nC4 = { press = \"left_press\" }",
        ] {
            let err = Config::from_toml_str(content).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{content}: {err}");
        }
    }

    #[test]
    fn test_duplicate_spellings_rejected() {
        let err = Config::from_toml_str("[keys]\n\"F#3\" = \"W\"\nFS3 = \"A\"").unwrap_err();
        assert!(err.to_string().contains("bound twice"), "{err}");
    }

    #[test]
    fn test_note_in_two_tables_rejected() {
        let err = Config::from_toml_str("[keys]\nC4 = \"W\"\n[movement]\n60 = \"left\"")
            .unwrap_err();
        assert!(err.to_string().contains("[keys] and [movement]"), "{err}");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device = \"nanoKEY\"\n[keys]\nC4 = \"SPACE\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.device, "nanoKEY");
        assert_eq!(config.keys.get(&note(60)), Some(&Key::Space));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/midiator.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
