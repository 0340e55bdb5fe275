//! Linux platform implementation.
//!
//! Supports two injection backends:
//! - **evdev** (default): writes to a uinput virtual device (X11 and Wayland)
//! - **X11**: uses XTest on the current display
//!
//! ## Feature Flags
//!
//! - `evdev` (default): inject through `/dev/uinput`
//! - `x11`: inject through XTest; takes precedence when both are enabled

#[cfg(feature = "x11")]
mod x11;

#[cfg(all(feature = "evdev", not(feature = "x11")))]
mod evdev;

#[cfg(feature = "x11")]
pub use x11::*;

#[cfg(all(feature = "evdev", not(feature = "x11")))]
pub use evdev::*;
