//! Fallback when no injection backend is compiled in.

use crate::action::ButtonAction;
use crate::error::{Error, Result};
use crate::keycode::Key;

/// Name of this injection backend.
pub const BACKEND: &str = "none";

fn unsupported() -> Error {
    if cfg!(target_os = "linux") {
        Error::NotSupported("no Linux backend enabled, enable the 'evdev' or 'x11' feature".into())
    } else {
        Error::NotSupported("input injection is only available on Windows and Linux".into())
    }
}

pub fn init() -> Result<()> {
    Err(unsupported())
}

pub fn key_press(_key: Key) -> Result<()> {
    Err(unsupported())
}

pub fn key_release(_key: Key) -> Result<()> {
    Err(unsupported())
}

pub fn mouse_button(_action: ButtonAction) -> Result<()> {
    Err(unsupported())
}

pub fn mouse_move_relative(_dx: i32, _dy: i32) -> Result<()> {
    Err(unsupported())
}
