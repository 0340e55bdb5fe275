//! Error types for the MIDI translation engine.

use thiserror::Error;

/// Result type alias for midiator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating MIDI input.
#[derive(Debug, Error)]
pub enum Error {
    /// No MIDI input port name contains the configured identifier.
    #[error("\"{0}\" does not identify an active or valid MIDI device")]
    DeviceNotFound(String),

    /// The MIDI port exists but could not be opened.
    #[error("device \"{0}\" appears to be in use by another process")]
    DeviceBusy(String),

    /// The MIDI backend could not be initialised or queried.
    #[error("MIDI transport error: {0}")]
    Transport(String),

    /// The OS refused a synthesized key, button or movement event.
    #[error("failed to inject input: {0}")]
    InjectionFailed(String),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation requires elevated permissions.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Thread-related error.
    #[error("thread error: {0}")]
    ThreadError(String),

    /// No injection backend is available on this platform.
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Whether this error must abort startup.
    ///
    /// Injection failures are reported per action and never stop the event
    /// loop or the mouse pump.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::InjectionFailed(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
