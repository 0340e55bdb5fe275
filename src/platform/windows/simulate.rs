//! Windows input injection using SendInput.
//!
//! Keys are sent as hardware scancodes rather than virtual-key codes, which
//! games reading raw input (DirectInput) need to see them.

use crate::action::ButtonAction;
use crate::error::{Error, Result};
use crate::keycode::{EXTENDED_FLAG, Key};
use std::mem::size_of;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYEVENTF_EXTENDEDKEY,
    KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, MOUSE_EVENT_FLAGS, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEINPUT,
    SendInput, VIRTUAL_KEY,
};

/// Name of this injection backend.
pub const BACKEND: &str = "SendInput";

fn send(input: INPUT, what: &str) -> Result<()> {
    let inputs = [input];
    let result = unsafe { SendInput(&inputs, size_of::<INPUT>() as i32) };

    if result != 1 {
        Err(Error::InjectionFailed(format!("SendInput failed for {what}")))
    } else {
        Ok(())
    }
}

/// Send a mouse event
fn sim_mouse_event(flags: MOUSE_EVENT_FLAGS, dx: i32, dy: i32) -> Result<()> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    send(input, "mouse event")
}

/// Send a scancode keyboard event
fn sim_keyboard_event(key: Key, release: bool) -> Result<()> {
    let mut flags = KEYEVENTF_SCANCODE;
    if key.is_extended() {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if release {
        flags |= KEYEVENTF_KEYUP;
    }

    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: key.scancode() & !EXTENDED_FLAG,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    send(input, "keyboard event")
}

/// SendInput needs no setup.
pub fn init() -> Result<()> {
    Ok(())
}

/// Press a key.
pub fn key_press(key: Key) -> Result<()> {
    sim_keyboard_event(key, false)
}

/// Release a key.
pub fn key_release(key: Key) -> Result<()> {
    sim_keyboard_event(key, true)
}

/// Press or release a mouse button.
pub fn mouse_button(action: ButtonAction) -> Result<()> {
    let flags = match action {
        ButtonAction::LeftPress => MOUSEEVENTF_LEFTDOWN,
        ButtonAction::LeftRelease => MOUSEEVENTF_LEFTUP,
        ButtonAction::RightPress => MOUSEEVENTF_RIGHTDOWN,
        ButtonAction::RightRelease => MOUSEEVENTF_RIGHTUP,
    };
    sim_mouse_event(flags, 0, 0)
}

/// Move the pointer relative to its current position.
pub fn mouse_move_relative(dx: i32, dy: i32) -> Result<()> {
    sim_mouse_event(MOUSEEVENTF_MOVE, dx, dy)
}
