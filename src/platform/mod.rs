//! Platform-specific input injection.
//!
//! Every backend exposes `init`, the four injection functions and a
//! `BACKEND` name.

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use windows::*;

#[cfg(all(target_os = "linux", any(feature = "x11", feature = "evdev")))]
mod linux;
#[cfg(all(target_os = "linux", any(feature = "x11", feature = "evdev")))]
pub use linux::*;

#[cfg(not(any(
    target_os = "windows",
    all(target_os = "linux", any(feature = "x11", feature = "evdev"))
)))]
mod stub;
#[cfg(not(any(
    target_os = "windows",
    all(target_os = "linux", any(feature = "x11", feature = "evdev"))
)))]
pub use stub::*;
