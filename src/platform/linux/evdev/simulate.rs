//! Linux input injection through a uinput virtual device.

use crate::action::ButtonAction;
use crate::error::{Error, Result};
use crate::keycode::Key;
use evdev::{
    AttributeSet, EventType as EvdevEventType, InputEvent, Key as EvdevKey, RelativeAxisType,
    uinput::{VirtualDevice, VirtualDeviceBuilder},
};
use std::sync::{Mutex, MutexGuard};

/// Name of this injection backend.
pub const BACKEND: &str = "uinput";

const DEVICE_NAME: &str = "midiator virtual input";

/// Lazily created on the first injected action.
static VIRTUAL_DEVICE: Mutex<Option<VirtualDevice>> = Mutex::new(None);

fn build_device() -> Result<VirtualDevice> {
    let mut keys = AttributeSet::<EvdevKey>::new();
    for key in Key::ALL {
        keys.insert(EvdevKey::new(key.evdev_code()));
    }
    keys.insert(EvdevKey::BTN_LEFT);
    keys.insert(EvdevKey::BTN_RIGHT);

    let mut rel_axes = AttributeSet::<RelativeAxisType>::new();
    rel_axes.insert(RelativeAxisType::REL_X);
    rel_axes.insert(RelativeAxisType::REL_Y);

    let device = VirtualDeviceBuilder::new()
        .map_err(|e| {
            Error::PermissionDenied(format!(
                "cannot open /dev/uinput: {e}. Add yourself to the 'input' group or install a udev rule"
            ))
        })?
        .name(DEVICE_NAME)
        .with_keys(&keys)
        .map_err(|e| Error::InjectionFailed(format!("failed to register keys: {e}")))?
        .with_relative_axes(&rel_axes)
        .map_err(|e| Error::InjectionFailed(format!("failed to register relative axes: {e}")))?
        .build()
        .map_err(|e| Error::InjectionFailed(format!("failed to create virtual device: {e}")))?;

    log::debug!("created uinput device \"{DEVICE_NAME}\"");
    Ok(device)
}

/// Get or create the virtual device
fn virtual_device() -> Result<MutexGuard<'static, Option<VirtualDevice>>> {
    let mut guard = VIRTUAL_DEVICE
        .lock()
        .map_err(|_| Error::ThreadError("virtual device mutex poisoned".into()))?;

    if guard.is_none() {
        *guard = Some(build_device()?);
    }
    Ok(guard)
}

/// Create the virtual device now rather than on the first action.
pub fn init() -> Result<()> {
    virtual_device().map(|_| ())
}

/// Write `events` followed by a single SYN_REPORT.
fn emit(events: &[InputEvent]) -> Result<()> {
    let mut guard = virtual_device()?;
    let device = guard
        .as_mut()
        .ok_or_else(|| Error::InjectionFailed("virtual device not initialized".into()))?;

    let mut batch = events.to_vec();
    batch.push(InputEvent::new(EvdevEventType::SYNCHRONIZATION, 0, 0));
    device
        .emit(&batch)
        .map_err(|e| Error::InjectionFailed(format!("failed to write uinput event: {e}")))
}

fn key_event(code: u16, pressed: bool) -> InputEvent {
    InputEvent::new(EvdevEventType::KEY, code, i32::from(pressed))
}

/// Press a key.
pub fn key_press(key: Key) -> Result<()> {
    emit(&[key_event(key.evdev_code(), true)])
}

/// Release a key.
pub fn key_release(key: Key) -> Result<()> {
    emit(&[key_event(key.evdev_code(), false)])
}

/// Press or release a mouse button.
pub fn mouse_button(action: ButtonAction) -> Result<()> {
    let button = match action {
        ButtonAction::LeftPress | ButtonAction::LeftRelease => EvdevKey::BTN_LEFT,
        ButtonAction::RightPress | ButtonAction::RightRelease => EvdevKey::BTN_RIGHT,
    };
    emit(&[key_event(button.code(), action.is_press())])
}

/// Move the pointer relative to its current position.
///
/// Zero axes are omitted; a zero move writes nothing.
pub fn mouse_move_relative(dx: i32, dy: i32) -> Result<()> {
    let events: Vec<InputEvent> = [(RelativeAxisType::REL_X, dx), (RelativeAxisType::REL_Y, dy)]
        .into_iter()
        .filter(|&(_, value)| value != 0)
        .map(|(axis, value)| InputEvent::new(EvdevEventType::RELATIVE, axis.0, value))
        .collect();

    if events.is_empty() {
        return Ok(());
    }
    emit(&events)
}
