//! X11 implementation using the XTest extension.

mod simulate;

pub use simulate::{BACKEND, init, key_press, key_release, mouse_button, mouse_move_relative};
