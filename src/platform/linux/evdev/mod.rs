//! Linux evdev implementation.
//!
//! Injects events through a `/dev/uinput` virtual device, so it works on
//! X11, Wayland and the console alike.
//!
//! ## Permissions
//!
//! The process must be able to write `/dev/uinput`, usually by being in the
//! `input` group:
//! ```bash
//! sudo usermod -aG input $USER
//! # Then log out and back in
//! ```

mod simulate;

pub use simulate::{BACKEND, init, key_press, key_release, mouse_button, mouse_move_relative};
