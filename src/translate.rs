//! Stateless note-to-action translators for keys and mouse buttons.

use crate::action::Action;
use crate::binding::ButtonBinding;
use crate::event::NoteState;
use crate::keycode::Key;

/// Translate a key-bound note: on presses the key, off releases it.
pub fn translate_key(key: Key, state: NoteState) -> Action {
    match state {
        NoteState::On => Action::PressKey(key),
        NoteState::Off => Action::ReleaseKey(key),
    }
}

/// Translate a button-bound note: on emits the press action, off the release.
pub fn translate_button(binding: ButtonBinding, state: NoteState) -> Action {
    match state {
        NoteState::On => Action::MouseButton(binding.press),
        NoteState::Off => Action::MouseButton(binding.release),
    }
}
