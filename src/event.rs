//! MIDI messages as delivered by the transport.

use crate::note::{Channel, Note};

const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;

/// Whether a note went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteState {
    /// The key or pad was struck.
    On,
    /// The key or pad was released.
    Off,
}

impl NoteState {
    /// Returns `true` for [`NoteState::On`].
    pub fn is_on(self) -> bool {
        self == NoteState::On
    }
}

/// A note-on or note-off event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    /// Note on or off.
    pub state: NoteState,
    /// The device-defined key or pad.
    pub note: Note,
    /// The channel the event arrived on.
    pub channel: Channel,
    /// Strike velocity. Carried for diagnostics only.
    pub velocity: u8,
}

impl NoteEvent {
    /// Create a note-on event.
    pub fn on(note: Note, channel: Channel) -> Self {
        Self {
            state: NoteState::On,
            note,
            channel,
            velocity: 64,
        }
    }

    /// Create a note-off event.
    pub fn off(note: Note, channel: Channel) -> Self {
        Self {
            state: NoteState::Off,
            note,
            channel,
            velocity: 0,
        }
    }
}

/// A decoded MIDI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on or note off.
    Note(NoteEvent),
    /// Anything else (control change, pitch bend, clock, ...).
    Other {
        /// The raw status byte, or 0 for an empty message.
        status: u8,
    },
}

impl MidiMessage {
    /// Decode a raw MIDI message.
    ///
    /// A note-on with velocity 0 is treated as a note-off.
    pub fn parse(bytes: &[u8]) -> Self {
        let Some(&status) = bytes.first() else {
            return MidiMessage::Other { status: 0 };
        };

        let kind = status & 0xF0;
        if (kind != STATUS_NOTE_ON && kind != STATUS_NOTE_OFF) || bytes.len() < 3 {
            return MidiMessage::Other { status };
        }

        let velocity = bytes[2] & 0x7F;
        let state = if kind == STATUS_NOTE_ON && velocity > 0 {
            NoteState::On
        } else {
            NoteState::Off
        };

        MidiMessage::Note(NoteEvent {
            state,
            note: Note::from_u7(bytes[1]),
            channel: Channel::from_status(status),
            velocity,
        })
    }

    /// The note event, if this is one.
    pub fn as_note(&self) -> Option<&NoteEvent> {
        match self {
            MidiMessage::Note(event) => Some(event),
            MidiMessage::Other { .. } => None,
        }
    }
}

impl From<NoteEvent> for MidiMessage {
    fn from(event: NoteEvent) -> Self {
        MidiMessage::Note(event)
    }
}
