//! # midiator
//!
//! Drive your keyboard and mouse from a MIDI controller.
//!
//! ## Features
//!
//! - Bind notes to keyboard keys, pointer directions or mouse buttons
//! - Held direction notes move the pointer continuously, diagonals included
//! - Keys are injected as hardware scancodes, so games reading raw input see them
//! - Bindings and tuning loaded from a TOML file
//! - Injection through `SendInput` on Windows and uinput or XTest on Linux
//!
//! ## Quick Start
//!
//! ```no_run
//! use midiator::Config;
//!
//! let config = Config::load("midiator.toml").expect("invalid config");
//! midiator::start(&config).expect("midiator stopped");
//! ```
//!
//! ### Custom Sinks
//!
//! The engine is independent of the OS. Anything implementing [`InputSink`],
//! closures included, can receive the synthesized actions:
//!
//! ```
//! use midiator::{Action, Config, Engine, MidiMessage};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(|action: &Action| -> midiator::Result<()> {
//!     println!("{action:?}");
//!     Ok(())
//! });
//! let engine = Engine::new(&Config::default(), sink).unwrap();
//!
//! // F#3 down and up: press and release W
//! engine
//!     .run([
//!         MidiMessage::parse(&[0x90, 54, 100]),
//!         MidiMessage::parse(&[0x80, 54, 0]),
//!     ])
//!     .unwrap();
//! ```
//!
//! ## Architecture
//!
//! A [`Dispatcher`] routes each note event to exactly one translator. Key and
//! button notes go straight to the sink; movement notes only update the shared
//! [`MotionAccumulator`], which a [`MotionPump`] thread turns into relative
//! pointer moves at a fixed interval.

pub mod action;
pub mod binding;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod keycode;
pub mod motion;
pub mod note;
pub mod shutdown;
pub mod sink;
pub mod translate;
pub mod transport;

mod platform;

// Re-exports
pub use action::{Action, ButtonAction, Direction};
pub use binding::{Binding, BindingTable, ButtonBinding};
pub use config::Config;
pub use dispatch::{Dispatch, Dispatcher};
pub use engine::Engine;
pub use error::{Error, Result};
pub use event::{MidiMessage, NoteEvent, NoteState};
pub use keycode::Key;
pub use motion::{MotionAccumulator, MotionPump};
pub use note::{Channel, Note};
pub use shutdown::ShutdownSignal;
pub use sink::{InputSink, SystemSink};
pub use translate::{translate_button, translate_key};
#[cfg(feature = "midi")]
pub use transport::{MidiInputStream, input_port_names};

/// Connect to the configured MIDI device and translate its input into OS
/// events until Ctrl-C.
///
/// The device is resolved before anything else, so a missing controller is
/// reported as [`Error::DeviceNotFound`] without touching the bindings or the
/// input backend. Losing the device mid-session is reported as
/// [`Error::Transport`].
#[cfg(feature = "midi")]
pub fn start(config: &Config) -> Result<()> {
    let stream = MidiInputStream::open(&config.device)?;

    let sink = SystemSink::connect()?;
    log::info!("injecting input through {}", sink.backend());
    let engine = Engine::new(config, std::sync::Arc::new(sink))?;

    let shutdown = engine.shutdown_signal();
    ctrlc::set_handler({
        let shutdown = shutdown.clone();
        move || {
            log::info!("interrupted, shutting down");
            shutdown.trigger();
        }
    })
    .map_err(|e| Error::ThreadError(format!("failed to install Ctrl-C handler: {e}")))?;

    engine.run(stream.messages(&shutdown))?;

    if stream.is_disconnected() {
        return Err(Error::Transport(format!(
            "MIDI device \"{}\" disconnected",
            stream.port_name()
        )));
    }
    Ok(())
}
