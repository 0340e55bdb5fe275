//! Note-to-action binding tables.

use crate::action::{ButtonAction, Direction};
use crate::error::{Error, Result};
use crate::keycode::Key;
use crate::note::Note;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The press and release actions bound to one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ButtonBinding {
    /// Emitted on note on.
    pub press: ButtonAction,
    /// Emitted on note off.
    pub release: ButtonAction,
}

impl ButtonBinding {
    /// Left button press/release pair.
    pub const LEFT: ButtonBinding = ButtonBinding {
        press: ButtonAction::LeftPress,
        release: ButtonAction::LeftRelease,
    };

    /// Right button press/release pair.
    pub const RIGHT: ButtonBinding = ButtonBinding {
        press: ButtonAction::RightPress,
        release: ButtonAction::RightRelease,
    };
}

/// The binding resolved for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// The note drives a keyboard key.
    Key(Key),
    /// The note holds a pointer direction.
    Movement(Direction),
    /// The note drives a mouse button.
    Button(ButtonBinding),
}

/// Immutable note lookup tables.
///
/// A note appears in at most one of the three tables; [`BindingTable::new`]
/// rejects overlaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    keys: BTreeMap<Note, Key>,
    movements: BTreeMap<Note, Direction>,
    buttons: BTreeMap<Note, ButtonBinding>,
}

impl BindingTable {
    /// Build the table, rejecting notes bound in more than one table.
    pub fn new(
        keys: BTreeMap<Note, Key>,
        movements: BTreeMap<Note, Direction>,
        buttons: BTreeMap<Note, ButtonBinding>,
    ) -> Result<Self> {
        let overlap = |a: &'static str, b: &'static str, note: &Note| {
            Error::Config(format!("note {note} is bound in both [{a}] and [{b}]"))
        };

        if let Some(note) = keys.keys().find(|n| movements.contains_key(n)) {
            return Err(overlap("keys", "movement", note));
        }
        if let Some(note) = keys.keys().find(|n| buttons.contains_key(n)) {
            return Err(overlap("keys", "buttons", note));
        }
        if let Some(note) = movements.keys().find(|n| buttons.contains_key(n)) {
            return Err(overlap("movement", "buttons", note));
        }

        Ok(Self {
            keys,
            movements,
            buttons,
        })
    }

    /// Resolve a note: key bindings first, then movement, then buttons.
    pub fn resolve(&self, note: Note) -> Option<Binding> {
        if let Some(key) = self.keys.get(&note) {
            return Some(Binding::Key(*key));
        }
        if let Some(direction) = self.movements.get(&note) {
            return Some(Binding::Movement(*direction));
        }
        self.buttons.get(&note).map(|b| Binding::Button(*b))
    }

    /// Key bindings.
    pub fn keys(&self) -> &BTreeMap<Note, Key> {
        &self.keys
    }

    /// Movement bindings.
    pub fn movements(&self) -> &BTreeMap<Note, Direction> {
        &self.movements
    }

    /// Button bindings.
    pub fn buttons(&self) -> &BTreeMap<Note, ButtonBinding> {
        &self.buttons
    }

    /// Total number of bound notes.
    pub fn len(&self) -> usize {
        self.keys.len() + self.movements.len() + self.buttons.len()
    }

    /// Whether no note is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
