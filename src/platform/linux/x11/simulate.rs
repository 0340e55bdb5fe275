//! X11 input injection using XTest.

use crate::action::ButtonAction;
use crate::error::{Error, Result};
use crate::keycode::Key;
use std::os::raw::c_int;
use std::ptr::null;
use std::sync::{Mutex, MutexGuard};
use x11::xlib;
use x11::xtest;

/// Name of this injection backend.
pub const BACKEND: &str = "XTest";

const TRUE: c_int = 1;
const FALSE: c_int = 0;

/// An open X display connection.
struct Display(*mut xlib::Display);

// The connection is only ever used while holding DISPLAY's lock.
unsafe impl Send for Display {}

/// Opened on the first injected action and kept for the process lifetime.
static DISPLAY: Mutex<Option<Display>> = Mutex::new(None);

fn display() -> Result<MutexGuard<'static, Option<Display>>> {
    let mut guard = DISPLAY
        .lock()
        .map_err(|_| Error::ThreadError("display mutex poisoned".into()))?;

    if guard.is_none() {
        let display = unsafe { xlib::XOpenDisplay(null()) };
        if display.is_null() {
            return Err(Error::InjectionFailed("failed to open X display".into()));
        }
        log::debug!("opened X display for XTest");
        *guard = Some(Display(display));
    }
    Ok(guard)
}

/// Open the display now rather than on the first action.
pub fn init() -> Result<()> {
    display().map(|_| ())
}

/// Run one XTest request and flush it.
fn with_display<F>(what: &str, request: F) -> Result<()>
where
    F: FnOnce(*mut xlib::Display) -> c_int,
{
    let guard = display()?;
    let display = guard
        .as_ref()
        .ok_or_else(|| Error::InjectionFailed("X display not initialized".into()))?
        .0;

    let result = request(display);
    unsafe {
        xlib::XFlush(display);
    }

    if result == 0 {
        Err(Error::InjectionFailed(format!("{what} failed")))
    } else {
        Ok(())
    }
}

fn fake_key(key: Key, pressed: c_int) -> Result<()> {
    let keycode = u32::from(key.x11_keycode());
    with_display("XTestFakeKeyEvent", |display| unsafe {
        xtest::XTestFakeKeyEvent(display, keycode, pressed, 0)
    })
}

/// Press a key.
pub fn key_press(key: Key) -> Result<()> {
    fake_key(key, TRUE)
}

/// Release a key.
pub fn key_release(key: Key) -> Result<()> {
    fake_key(key, FALSE)
}

/// Press or release a mouse button.
pub fn mouse_button(action: ButtonAction) -> Result<()> {
    let (button, pressed) = match action {
        ButtonAction::LeftPress => (1, TRUE),
        ButtonAction::LeftRelease => (1, FALSE),
        ButtonAction::RightPress => (3, TRUE),
        ButtonAction::RightRelease => (3, FALSE),
    };
    with_display("XTestFakeButtonEvent", |display| unsafe {
        xtest::XTestFakeButtonEvent(display, button, pressed, 0)
    })
}

/// Move the pointer relative to its current position.
pub fn mouse_move_relative(dx: i32, dy: i32) -> Result<()> {
    with_display("XTestFakeRelativeMotionEvent", |display| unsafe {
        xtest::XTestFakeRelativeMotionEvent(display, dx, dy, 0)
    })
}
