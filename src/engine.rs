//! The translation engine: event loop plus background mouse pump.

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::event::MidiMessage;
use crate::motion::{MotionAccumulator, MotionPump};
use crate::shutdown::ShutdownSignal;
use crate::sink::InputSink;
use std::sync::Arc;

/// Owns the bindings, the motion state and the sink, and runs both loops.
pub struct Engine<S: InputSink + ?Sized + 'static> {
    dispatcher: Dispatcher,
    pump: MotionPump,
    accumulator: Arc<MotionAccumulator>,
    sink: Arc<S>,
    shutdown: ShutdownSignal,
}

impl<S: InputSink + ?Sized + 'static> Engine<S> {
    /// Validate `config` and build an engine that emits into `sink`.
    pub fn new(config: &Config, sink: Arc<S>) -> Result<Self> {
        config.validate()?;

        let bindings = Arc::new(config.binding_table()?);
        let accumulator = Arc::new(MotionAccumulator::new(config.sensitivity));
        let dispatcher = Dispatcher::new(config.channel, bindings.clone(), accumulator.clone())
            .verbose(config.verbose);
        let pump = MotionPump::new(accumulator.clone(), config.interval()?)
            .emit_idle(config.emit_idle_moves);

        log::debug!(
            "{} keys, {} movement and {} button bindings on channel {}",
            bindings.keys().len(),
            bindings.movements().len(),
            bindings.buttons().len(),
            config.channel
        );

        Ok(Self {
            dispatcher,
            pump,
            accumulator,
            sink,
            shutdown: ShutdownSignal::new(),
        })
    }

    /// A handle that stops [`Engine::run`] when triggered.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// The shared motion accumulator.
    pub fn accumulator(&self) -> &Arc<MotionAccumulator> {
        &self.accumulator
    }

    /// The message dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Start the mouse pump and dispatch `messages` until they run out or
    /// shutdown is triggered.
    ///
    /// Injection failures are logged and skipped. Any other sink error, from
    /// either loop, stops both and is returned. On return the shutdown signal
    /// has been triggered and the pump thread has exited, so an engine runs
    /// at most once.
    pub fn run<I>(&self, messages: I) -> Result<()>
    where
        I: IntoIterator<Item = MidiMessage>,
    {
        log::info!("spawning mouse pump ({:?})", self.pump.interval());
        let pump = self
            .pump
            .clone()
            .spawn(self.sink.clone(), self.shutdown.clone())?;

        log::info!("handling MIDI events");
        let mut outcome = Ok(());
        for message in messages {
            if self.shutdown.is_triggered() {
                break;
            }
            match self.dispatcher.dispatch(&message, &*self.sink) {
                Ok(_) => {}
                Err(e) if e.is_fatal() => {
                    outcome = Err(e);
                    break;
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        self.shutdown.trigger();
        let pumped = pump
            .join()
            .map_err(|_| Error::ThreadError("failed to join mouse pump thread".into()))?;
        outcome.and(pumped)
    }
}
