//! Routes incoming MIDI messages to exactly one translator.

use crate::action::Action;
use crate::binding::{Binding, BindingTable};
use crate::error::Result;
use crate::event::{MidiMessage, NoteEvent};
use crate::motion::MotionAccumulator;
use crate::note::Channel;
use crate::sink::InputSink;
use crate::translate::{translate_button, translate_key};
use std::sync::Arc;

/// What the dispatcher did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Wrong channel or not a note message. Nothing happened.
    Ignored,
    /// The note has no binding.
    Unbound,
    /// A key or button action was sent to the sink.
    Emitted(Action),
    /// The motion accumulator was updated.
    Moved,
}

/// Classifies messages and invokes the matching translator.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    channel: Channel,
    bindings: Arc<BindingTable>,
    accumulator: Arc<MotionAccumulator>,
    verbose: bool,
}

impl Dispatcher {
    /// Create a dispatcher listening on `channel`.
    pub fn new(
        channel: Channel,
        bindings: Arc<BindingTable>,
        accumulator: Arc<MotionAccumulator>,
    ) -> Self {
        Self {
            channel,
            bindings,
            accumulator,
            verbose: true,
        }
    }

    /// Log every bound and unbound note-on (default on).
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The channel events must arrive on.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Dispatch one message.
    ///
    /// Messages on other channels and non-note messages are dropped silently.
    /// A failing sink is reported as an error; nothing is retried.
    pub fn dispatch<S: InputSink + ?Sized>(
        &self,
        message: &MidiMessage,
        sink: &S,
    ) -> Result<Dispatch> {
        match message {
            MidiMessage::Note(event) if event.channel == self.channel => {
                self.dispatch_note(event, sink)
            }
            _ => Ok(Dispatch::Ignored),
        }
    }

    fn dispatch_note<S: InputSink + ?Sized>(
        &self,
        event: &NoteEvent,
        sink: &S,
    ) -> Result<Dispatch> {
        let log_on = self.verbose && event.state.is_on();

        match self.bindings.resolve(event.note) {
            Some(Binding::Key(key)) => {
                if log_on {
                    log::info!(
                        "received note {} -> key {}",
                        event.note,
                        key.directinput_name()
                    );
                }
                let action = translate_key(key, event.state);
                sink.emit(&action)?;
                Ok(Dispatch::Emitted(action))
            }
            Some(Binding::Movement(direction)) => {
                if log_on {
                    log::info!("received note {} -> mouse {direction}", event.note);
                }
                self.accumulator.apply(direction, event.state);
                Ok(Dispatch::Moved)
            }
            Some(Binding::Button(binding)) => {
                if log_on {
                    log::info!("received note {} -> mouse {}", event.note, binding.press);
                }
                let action = translate_button(binding, event.state);
                sink.emit(&action)?;
                Ok(Dispatch::Emitted(action))
            }
            None => {
                if log_on {
                    log::info!("received note {} -> not bound", event.note);
                }
                Ok(Dispatch::Unbound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ButtonAction, Direction};
    use crate::binding::ButtonBinding;
    use crate::error::Error;
    use crate::keycode::Key;
    use crate::note::Note;
    use crate::sink::testing::{FailingSink, RecordingSink};
    use std::collections::BTreeMap;

    fn note(n: u8) -> Note {
        Note::new(n).unwrap()
    }

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    fn dispatcher() -> Dispatcher {
        let table = BindingTable::new(
            BTreeMap::from([(note(54), Key::KeyW), (note(50), Key::ShiftLeft)]),
            BTreeMap::from([(note(64), Direction::Left), (note(67), Direction::Right)]),
            BTreeMap::from([(note(62), ButtonBinding::LEFT)]),
        )
        .unwrap();
        Dispatcher::new(
            ch(0),
            Arc::new(table),
            Arc::new(MotionAccumulator::new(4.0)),
        )
    }

    /// Captures log lines emitted on the calling thread.
    mod capture {
        use log::{LevelFilter, Log, Metadata, Record};
        use std::cell::RefCell;
        use std::sync::Once;

        thread_local! {
            static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
        }

        struct ThreadLogger;

        impl Log for ThreadLogger {
            fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
                true
            }

            fn log(&self, record: &Record<'_>) {
                LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
            }

            fn flush(&self) {}
        }

        static LOGGER: ThreadLogger = ThreadLogger;
        static INIT: Once = Once::new();

        /// Run `f` and return the lines it logged.
        pub(super) fn lines(f: impl FnOnce()) -> Vec<String> {
            INIT.call_once(|| {
                let _ = log::set_logger(&LOGGER);
                log::set_max_level(LevelFilter::Info);
            });
            LINES.with(|lines| lines.borrow_mut().clear());
            f();
            LINES.with(|lines| lines.borrow_mut().drain(..).collect())
        }
    }

    fn on(n: u8) -> MidiMessage {
        NoteEvent::on(note(n), ch(0)).into()
    }

    fn off(n: u8) -> MidiMessage {
        NoteEvent::off(note(n), ch(0)).into()
    }

    #[test]
    fn test_key_press_release() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        d.dispatch(&on(54), &sink).unwrap();
        d.dispatch(&off(54), &sink).unwrap();

        assert_eq!(
            sink.actions(),
            vec![Action::PressKey(Key::KeyW), Action::ReleaseKey(Key::KeyW)]
        );
    }

    #[test]
    fn test_button_press_release() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        assert_eq!(
            d.dispatch(&on(62), &sink).unwrap(),
            Dispatch::Emitted(Action::MouseButton(ButtonAction::LeftPress))
        );
        d.dispatch(&off(62), &sink).unwrap();

        assert_eq!(
            sink.actions(),
            vec![
                Action::MouseButton(ButtonAction::LeftPress),
                Action::MouseButton(ButtonAction::LeftRelease),
            ]
        );
    }

    #[test]
    fn test_unbound_note_emits_nothing() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        assert_eq!(d.dispatch(&on(100), &sink).unwrap(), Dispatch::Unbound);
        assert_eq!(d.dispatch(&off(100), &sink).unwrap(), Dispatch::Unbound);
        assert!(sink.actions().is_empty());
        assert_eq!(d.accumulator.held(), (0, 0));
    }

    #[test]
    fn test_other_channel_is_ignored() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        for n in [54, 62, 64] {
            let msg: MidiMessage = NoteEvent::on(note(n), ch(1)).into();
            assert_eq!(d.dispatch(&msg, &sink).unwrap(), Dispatch::Ignored);
        }
        assert!(sink.actions().is_empty());
        assert_eq!(d.accumulator.held(), (0, 0));
    }

    #[test]
    fn test_non_note_message_is_ignored() {
        let d = dispatcher();
        let sink = RecordingSink::default();
        let msg = MidiMessage::parse(&[0xB0, 1, 127]);
        assert_eq!(d.dispatch(&msg, &sink).unwrap(), Dispatch::Ignored);
        assert!(sink.actions().is_empty());
    }

    #[test]
    fn test_movement_updates_accumulator_only() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        assert_eq!(d.dispatch(&on(64), &sink).unwrap(), Dispatch::Moved);
        assert_eq!(d.accumulator.snapshot(), (-4.0, 0.0));

        // Unrelated notes in between leave the pair balanced
        d.dispatch(&on(54), &sink).unwrap();
        d.dispatch(&on(67), &sink).unwrap();
        d.dispatch(&off(64), &sink).unwrap();
        d.dispatch(&off(54), &sink).unwrap();
        assert_eq!(d.accumulator.snapshot(), (4.0, 0.0));

        d.dispatch(&off(67), &sink).unwrap();
        assert_eq!(d.accumulator.snapshot(), (0.0, 0.0));
        assert!(sink.actions().iter().all(|a| !a.is_move()));
    }

    #[test]
    fn test_sink_failure_is_reported() {
        let d = dispatcher();
        assert!(matches!(
            d.dispatch(&on(54), &FailingSink),
            Err(Error::InjectionFailed(_))
        ));
    }

    #[test]
    fn test_repeated_events_pass_through() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        d.dispatch(&off(62), &sink).unwrap();
        d.dispatch(&off(62), &sink).unwrap();
        assert_eq!(
            sink.actions(),
            vec![
                Action::MouseButton(ButtonAction::LeftRelease),
                Action::MouseButton(ButtonAction::LeftRelease),
            ]
        );
    }

    #[test]
    fn test_verbose_logs_on_events_only() {
        let d = dispatcher();
        let sink = RecordingSink::default();

        let cases = [
            (on(54), vec!["received note 54 (F#3) -> key W"]),
            (off(54), vec![]),
            (on(50), vec!["received note 50 (D3) -> key LSHIFT"]),
            (on(64), vec!["received note 64 (E4) -> mouse LEFT"]),
            (off(64), vec![]),
            (on(62), vec!["received note 62 (D4) -> mouse LEFT_CLICK"]),
            (off(62), vec![]),
            (on(61), vec!["received note 61 (C#4) -> not bound"]),
            (off(61), vec![]),
            (NoteEvent::on(note(54), ch(1)).into(), vec![]),
        ];
        for (message, expected) in cases {
            let logged = capture::lines(|| {
                d.dispatch(&message, &sink).unwrap();
            });
            assert_eq!(logged, expected, "{message:?}");
        }
    }

    #[test]
    fn test_quiet_dispatcher_logs_nothing() {
        let d = dispatcher().verbose(false);
        let sink = RecordingSink::default();

        let logged = capture::lines(|| {
            for message in [on(54), off(54), on(61), on(64), on(62)] {
                d.dispatch(&message, &sink).unwrap();
            }
        });
        assert!(logged.is_empty(), "{logged:?}");
        assert_eq!(sink.actions().len(), 3);
    }

    #[test]
    fn test_channel_accessor() {
        assert_eq!(dispatcher().channel(), ch(0));
    }
}
