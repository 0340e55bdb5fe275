//! The seam between the translation engine and OS input injection.

use crate::action::Action;
use crate::error::Result;
use crate::platform;

/// Receives synthesized input actions.
///
/// Implement this trait to route actions somewhere other than the OS, for
/// example to record them in tests. Calls are fire-and-forget: a failure is
/// reported once and never retried.
pub trait InputSink: Send + Sync {
    /// Perform one action.
    fn emit(&self, action: &Action) -> Result<()>;
}

/// Implement InputSink for closures.
impl<F> InputSink for F
where
    F: Fn(&Action) -> Result<()> + Send + Sync,
{
    fn emit(&self, action: &Action) -> Result<()> {
        self(action)
    }
}

/// Sink that injects actions into the host OS through the compiled backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSink;

impl SystemSink {
    /// Create a new system sink.
    pub fn new() -> Self {
        Self
    }

    /// Create a sink and open the backend's device or display up front.
    ///
    /// Fails with [`Error::PermissionDenied`](crate::Error::PermissionDenied)
    /// when `/dev/uinput` is not writable and with
    /// [`Error::NotSupported`](crate::Error::NotSupported) when no backend is
    /// compiled in.
    pub fn connect() -> Result<Self> {
        platform::init()?;
        Ok(Self)
    }

    /// Name of the compiled injection backend, e.g. `uinput` or `SendInput`.
    pub fn backend(&self) -> &'static str {
        platform::BACKEND
    }
}

impl InputSink for SystemSink {
    fn emit(&self, action: &Action) -> Result<()> {
        match *action {
            Action::PressKey(key) => platform::key_press(key),
            Action::ReleaseKey(key) => platform::key_release(key),
            Action::MouseButton(button) => platform::mouse_button(button),
            Action::MouseMove { dx, dy } => platform::mouse_move_relative(dx, dy),
        }
    }
}
