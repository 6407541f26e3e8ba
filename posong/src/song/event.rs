//! Individual song events

use crate::midi;
use std::fmt;
use ux::u4;

/// A point in time, in ticks since the start of the song
pub type Ticks = u32;

/// Meta event id of "End of Track"
pub const META_END_OF_TRACK: u8 = 0x2F;

/// Meta event id of "Set Tempo"
pub const META_SET_TEMPO: u8 = 0x51;

/// Meta event ids below this one hold text (track names, lyrics, markers and the like)
pub const META_TEXT_END: u8 = 0x20;

/// The identity of an [`Event`] within its [`Song`](super::Song)
///
/// Two events with exactly the same contents are still different events. The editing
/// operations that need to find "this event" again after it might have moved (removal,
/// re-sorting after a time change) go by this id instead of by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub(crate) u64);

/// A single timed event on one of the song's tracks
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub(crate) id: EventId,

    /// When the event happens, in ticks since the start of the song
    ///
    /// After changing this, call [`Song::shuffle_for_changed_time`](super::Song::shuffle_for_changed_time)
    /// so the song's events stay sorted.
    pub time: Ticks,

    /// Zero-based index of the track (`MTrk` chunk) the event lives on
    pub track: usize,

    /// What kind of event this is, and its data
    pub kind: EventKind,
}

impl Event {
    /// The identity of this event within its song
    pub fn id(&self) -> EventId {
        self.id
    }

    /// The event's channel, if it is a channel event
    pub fn channel(&self) -> Option<u4> {
        self.kind.channel()
    }

    /// The note, if this is a [`EventKind::NoteOn`]
    pub fn note(&self) -> Option<&Note> {
        match &self.kind {
            EventKind::NoteOn(note) => Some(note),
            _ => None,
        }
    }

    /// Mutable access to the note, if this is a [`EventKind::NoteOn`]
    pub fn note_mut(&mut self) -> Option<&mut Note> {
        match &mut self.kind {
            EventKind::NoteOn(note) => Some(note),
            _ => None,
        }
    }

    /// The note's length, or zero for anything that isn't a note
    pub fn duration(&self) -> Ticks {
        self.note().map_or(0, |note| note.duration)
    }

    /// The tick at which the event is over, which for anything but notes is its start
    pub fn end(&self) -> Ticks {
        self.time.saturating_add(self.duration())
    }

    pub fn is_note(&self) -> bool {
        matches!(self.kind, EventKind::NoteOn(_))
    }

    pub fn is_end_of_track(&self) -> bool {
        matches!(self.kind, EventKind::Meta { id: META_END_OF_TRACK, .. })
    }

    /// Is this a note played by one of the inputs?
    ///
    /// Notes carry their input in bits 3 to 5 of the per-note program.
    pub fn is_input_note(&self) -> bool {
        self.note()
            .and_then(|note| note.program)
            .is_some_and(|program| program & 0x38 != 0)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            EventKind::NoteOn(note) => {
                write!(f, "note {}, chan {}", midi::note_name(note.note), note.channel)
            }
            EventKind::NoteAdjust { channel, note, .. } => {
                write!(f, "adjust note {}, chan {channel}", midi::note_name(*note))
            }
            EventKind::Control {
                channel,
                control,
                value,
            } => write!(f, "control {control}={value}, chan {channel}"),
            EventKind::Program { channel, program } => {
                write!(f, "program {}, chan {channel}", midi::describe_program(*program))
            }
            EventKind::Pressure { channel, pressure } => {
                write!(f, "pressure {pressure}, chan {channel}")
            }
            EventKind::Wheel { channel, value } => write!(f, "wheel {value}, chan {channel}"),
            EventKind::Meta { id, body } => write!(f, "meta {id:#04x}, {} bytes", body.len()),
            EventKind::Sysex { body } => write!(f, "sysex {} bytes", body.len()),
        }
    }
}

/// The kinds of events a song can hold
///
/// These follow the MIDI channel voice messages, with one exception: there is no note off.
/// A note off is always folded into the [`Note`] it ends, as its duration and off velocity.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A note, with its duration
    NoteOn(Note),

    /// Polyphonic aftertouch on a single, sounding note
    NoteAdjust { channel: u4, note: u8, pressure: u8 },

    /// A control change
    Control { channel: u4, control: u8, value: u8 },

    /// A program change
    Program { channel: u4, program: u8 },

    /// Channel pressure (aftertouch for the whole channel)
    Pressure { channel: u4, pressure: u8 },

    /// Pitch wheel, from -8192 to 8191 with 0 in the center
    Wheel { channel: u4, value: i16 },

    /// A meta event, identified by its one-byte id
    Meta { id: u8, body: Vec<u8> },

    /// A system exclusive message
    Sysex { body: Vec<u8> },
}

impl EventKind {
    /// The status byte's high nibble for this kind of event
    pub fn status(&self) -> u8 {
        match self {
            Self::NoteOn(_) => 0x90,
            Self::NoteAdjust { .. } => 0xA0,
            Self::Control { .. } => 0xB0,
            Self::Program { .. } => 0xC0,
            Self::Pressure { .. } => 0xD0,
            Self::Wheel { .. } => 0xE0,
            Self::Sysex { .. } => 0xF0,
            Self::Meta { .. } => 0xFF,
        }
    }

    /// The channel, for channel events
    pub fn channel(&self) -> Option<u4> {
        match self {
            Self::NoteOn(note) => Some(note.channel),
            Self::NoteAdjust { channel, .. }
            | Self::Control { channel, .. }
            | Self::Program { channel, .. }
            | Self::Pressure { channel, .. }
            | Self::Wheel { channel, .. } => Some(*channel),
            Self::Meta { .. } | Self::Sysex { .. } => None,
        }
    }

    /// Move a channel event to another channel
    ///
    /// Returns `false` (and does nothing) for meta and sysex events, which have no channel.
    pub fn set_channel(&mut self, to: u4) -> bool {
        match self {
            Self::NoteOn(Note { channel, .. })
            | Self::NoteAdjust { channel, .. }
            | Self::Control { channel, .. }
            | Self::Program { channel, .. }
            | Self::Pressure { channel, .. }
            | Self::Wheel { channel, .. } => {
                *channel = to;
                true
            }
            Self::Meta { .. } | Self::Sysex { .. } => false,
        }
    }
}

/// A note, from its note on up to (and including) the note off that ended it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub channel: u4,

    /// The pitch (0 - 127)
    pub note: u8,

    /// The note-on velocity
    ///
    /// The engine reads more than loudness from this byte: newer songs encode the input
    /// the note was played by into it (see [`reformat`](crate::pipeline::reformat)).
    pub velocity: u8,

    /// How long the note sounds, in ticks
    ///
    /// Zero for a note that was never ended.
    pub duration: Ticks,

    /// The velocity of the note off that ended this note, or zero for a note never ended
    pub off_velocity: u8,

    /// A program attached to just this note, overriding the channel's current program
    pub program: Option<u8>,
}

impl Note {
    /// A new note that hasn't been ended yet
    pub fn new(channel: u4, note: u8, velocity: u8) -> Self {
        Self {
            channel,
            note,
            velocity,
            duration: 0,
            off_velocity: 0,
            program: None,
        }
    }

    /// Has a note off been seen for this note?
    pub fn is_terminated(&self) -> bool {
        self.off_velocity != 0
    }
}
