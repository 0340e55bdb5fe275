//! Cooperative shutdown signal shared by the event loop and the mouse pump.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// A cloneable, one-shot stop flag.
///
/// Every clone observes the same flag. Sleepers in [`wait_timeout`] wake as
/// soon as the flag is raised.
///
/// [`wait_timeout`]: ShutdownSignal::wait_timeout
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    /// Create a signal that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every sleeper.
    pub fn trigger(&self) {
        let (flag, condvar) = &*self.inner;
        let mut triggered = flag.lock().unwrap_or_else(|e| e.into_inner());
        *triggered = true;
        condvar.notify_all();
    }

    /// Check whether the flag has been raised.
    pub fn is_triggered(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for up to `timeout`, returning early if the flag is raised.
    ///
    /// Returns `true` if the flag is raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }
}
