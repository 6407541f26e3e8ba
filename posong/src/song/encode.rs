use super::{
    Song, Ticks,
    event::{Event, EventKind},
};
use crate::serde::{ByteBuilder, WriteError};
use log::warn;
use std::collections::VecDeque;
use thiserror::Error;
use ux::u4;

impl Song {
    /// Encode the song as a format 1 MIDI file
    ///
    /// Every note is written as a note on followed by a note off at its end. Each track
    /// below [`Song::track_chunk_count`] gets an `MTrk` chunk, empty or not. Running status
    /// is never used.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut builder = ByteBuilder::new();

        builder.raw("MThd");
        let start = builder.position();
        builder.u16be(self.format);
        builder.u16be(self.track_count);
        builder.u16be(self.ticks_per_qnote);
        builder.commit_u32belen(start)?;

        let orphans = self
            .events
            .iter()
            .filter(|event| event.track >= self.track_chunk_count)
            .count();
        if orphans > 0 {
            warn!(
                "Not encoding {orphans} event(s) on tracks past the song's {} track(s)",
                self.track_chunk_count
            );
        }

        for track in 0..self.track_chunk_count {
            builder.raw("MTrk");
            let start = builder.position();

            let mut encoder = TrackEncoder::new(&mut builder);
            for event in self.events.iter().filter(|event| event.track == track) {
                encoder.event(event)?;
            }
            encoder.finish()?;

            builder.commit_u32belen(start)?;
        }

        Ok(builder.into_bytes())
    }
}

/// A note off that has yet to be written
struct PendingOff {
    time: Ticks,
    channel: u4,
    note: u8,
    velocity: u8,
}

/// Writes the events of a single track, interleaving the note offs
struct TrackEncoder<'a> {
    builder: &'a mut ByteBuilder,
    time: Ticks,

    /// Sorted by time, offs at the same time in the order their notes started
    pending: VecDeque<PendingOff>,
}

impl<'a> TrackEncoder<'a> {
    fn new(builder: &'a mut ByteBuilder) -> Self {
        Self {
            builder,
            time: 0,
            pending: VecDeque::new(),
        }
    }

    fn event(&mut self, event: &Event) -> Result<(), EncodeError> {
        self.flush(event.time)?;
        self.delta(event.time)?;

        match &event.kind {
            EventKind::NoteOn(note) => {
                self.channel_status(0x90, note.channel);
                self.data(note.note)?;
                self.data(note.velocity)?;

                let time = event.time.checked_add(note.duration).ok_or(
                    EncodeError::TimeOverflow {
                        time: event.time,
                        duration: note.duration,
                    },
                )?;

                let index = self.pending.partition_point(|off| off.time <= time);
                self.pending.insert(index, PendingOff {
                    time,
                    channel: note.channel,
                    note: note.note,
                    velocity: note.off_velocity,
                });
            }
            EventKind::NoteAdjust {
                channel,
                note,
                pressure,
            } => {
                self.channel_status(0xA0, *channel);
                self.data(*note)?;
                self.data(*pressure)?;
            }
            EventKind::Control {
                channel,
                control,
                value,
            } => {
                self.channel_status(0xB0, *channel);
                self.data(*control)?;
                self.data(*value)?;
            }
            EventKind::Program { channel, program } => {
                self.channel_status(0xC0, *channel);
                self.data(*program)?;
            }
            EventKind::Pressure { channel, pressure } => {
                self.channel_status(0xD0, *channel);
                self.data(*pressure)?;
            }
            EventKind::Wheel { channel, value } => {
                if !(-8192..=8191).contains(value) {
                    return Err(EncodeError::WheelOutOfRange { value: *value });
                }

                let raw = (value + 8192) as u16;
                self.channel_status(0xE0, *channel);
                self.builder.u8((raw & 0x7F) as u8);
                self.builder.u8((raw >> 7) as u8);
            }
            EventKind::Meta { id, body } => {
                self.builder.u8(0xFF);
                self.builder.u8(*id);
                self.body(body)?;
            }
            EventKind::Sysex { body } => {
                self.builder.u8(0xF0);
                self.body(body)?;
            }
        }

        Ok(())
    }

    /// Write whatever note offs are still pending
    fn finish(mut self) -> Result<(), EncodeError> {
        self.flush(Ticks::MAX)
    }

    /// Write the pending note offs that happen at or before `time`
    fn flush(&mut self, time: Ticks) -> Result<(), EncodeError> {
        while let Some(off) = self.pending.front() {
            if off.time > time {
                break;
            }

            let PendingOff {
                time,
                channel,
                note,
                velocity,
            } = *off;
            self.pending.pop_front();

            self.delta(time)?;
            self.channel_status(0x80, channel);
            self.data(note)?;
            self.data(velocity)?;
        }

        Ok(())
    }

    fn delta(&mut self, time: Ticks) -> Result<(), EncodeError> {
        if time > self.time {
            self.builder.vlq(time - self.time)?;
            self.time = time;
        } else {
            self.builder.u8(0);
        }

        Ok(())
    }

    fn channel_status(&mut self, status: u8, channel: u4) {
        self.builder.u8(status | u8::from(channel));
    }

    fn data(&mut self, byte: u8) -> Result<(), EncodeError> {
        if byte > 0x7F {
            return Err(EncodeError::DataByteOutOfRange { byte });
        }

        self.builder.u8(byte);
        Ok(())
    }

    fn body(&mut self, body: &[u8]) -> Result<(), EncodeError> {
        let start = self.builder.position();
        self.builder.raw(body);
        self.builder.commit_vlqlen(start)?;
        Ok(())
    }
}

/// An error describing what could go wrong encoding a [`Song`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A delta time or body length didn't fit its field
    #[error("Writing the song data failed")]
    Write(#[from] WriteError),

    /// Channel event data bytes are 7-bit
    #[error("Data byte {byte:#04X} does not fit 7 bits")]
    DataByteOutOfRange { byte: u8 },

    /// The pitch wheel goes from -8192 to 8191
    #[error("Wheel value {value} is out of range")]
    WheelOutOfRange { value: i16 },

    /// A note ends later than the last representable tick
    #[error("Note at tick {time} with duration {duration} ends out of range")]
    TimeOverflow { time: Ticks, duration: Ticks },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        serde::VLQ_MAX,
        song::event::{META_END_OF_TRACK, Note},
    };

    fn note(channel: u8, pitch: u8, velocity: u8, duration: Ticks, off_velocity: u8) -> EventKind {
        EventKind::NoteOn(Note {
            duration,
            off_velocity,
            ..Note::new(u4::new(channel), pitch, velocity)
        })
    }

    fn end_of_track() -> EventKind {
        EventKind::Meta {
            id: META_END_OF_TRACK,
            body: Vec::new(),
        }
    }

    /// The bytes of the first `MTrk` chunk's payload
    fn first_track(bytes: &[u8]) -> &[u8] {
        assert_eq!(&bytes[14..18], b"MTrk");
        let len = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        &bytes[22..22 + len]
    }

    #[test]
    fn empty_song() {
        assert_eq!(Song::new().encode().unwrap(), [
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 1, 0, 48, // header
            b'M', b'T', b'r', b'k', 0, 0, 0, 0, // one empty track
        ]);
    }

    #[test]
    fn note_offs_interleaved() {
        let mut song = Song::new();
        song.add_event(0, 0, EventKind::Program {
            channel: u4::new(0),
            program: 5,
        });
        song.add_event(0, 0, note(0, 60, 100, 96, 0x40));
        song.add_event(48, 0, note(0, 62, 90, 48, 0x20));
        song.add_event(96, 0, end_of_track());

        let bytes = song.encode().unwrap();
        assert_eq!(first_track(&bytes), [
            0x00, 0xC0, 0x05, // program
            0x00, 0x90, 60, 100, // first note on
            0x30, 0x90, 62, 90, // second note on
            0x30, 0x80, 60, 0x40, // first note off
            0x00, 0x80, 62, 0x20, // second note off, same tick
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ]);
    }

    #[test]
    fn note_offs_sorted_by_end() {
        let mut song = Song::new();
        song.add_event(0, 0, note(3, 60, 100, 100, 0x40));
        song.add_event(10, 0, note(3, 64, 100, 20, 0x40));

        let bytes = song.encode().unwrap();
        assert_eq!(first_track(&bytes), [
            0x00, 0x93, 60, 100, // long note on
            0x0A, 0x93, 64, 100, // short note on
            0x14, 0x83, 64, 0x40, // short note off
            0x46, 0x83, 60, 0x40, // long note off
        ]);
    }

    #[test]
    fn channel_events() {
        let mut song = Song::new();
        song.add_event(0, 0, EventKind::NoteAdjust {
            channel: u4::new(1),
            note: 60,
            pressure: 10,
        });
        song.add_event(0x80, 0, EventKind::Control {
            channel: u4::new(2),
            control: 7,
            value: 100,
        });
        song.add_event(0x80, 0, EventKind::Pressure {
            channel: u4::new(4),
            pressure: 20,
        });
        song.add_event(0x80, 0, EventKind::Wheel {
            channel: u4::new(15),
            value: -8192,
        });
        song.add_event(0x80, 0, EventKind::Wheel {
            channel: u4::new(15),
            value: 8191,
        });
        song.add_event(0x80, 0, EventKind::Sysex {
            body: vec![0x7E, 0xF7],
        });

        let bytes = song.encode().unwrap();
        assert_eq!(first_track(&bytes), [
            0x00, 0xA1, 60, 10, // aftertouch
            0x81, 0x00, 0xB2, 7, 100, // control, two-byte delta
            0x00, 0xD4, 20, // pressure
            0x00, 0xEF, 0x00, 0x00, // lowest wheel
            0x00, 0xEF, 0x7F, 0x7F, // highest wheel
            0x00, 0xF0, 0x02, 0x7E, 0xF7, // sysex
        ]);
    }

    #[test]
    fn tracks() {
        let mut song = Song::new();
        song.track_count = 2;
        song.track_chunk_count = 2;
        song.add_event(0, 1, note(0, 60, 100, 0, 0));
        song.add_event(5, 0, end_of_track());

        // Not encoded, there is no third track
        song.add_event(0, 2, end_of_track());

        let bytes = song.encode().unwrap();
        assert_eq!(&bytes[14..], [
            b'M', b'T', b'r', b'k', 0, 0, 0, 4, // first track
            0x05, 0xFF, 0x2F, 0x00, //
            b'M', b'T', b'r', b'k', 0, 0, 0, 8, // second track
            0x00, 0x90, 60, 100, // unterminated note
            0x00, 0x80, 60, 0x00, //
        ]);
    }

    #[test]
    fn data_byte_out_of_range() {
        let mut song = Song::new();
        song.add_event(0, 0, EventKind::Control {
            channel: u4::new(0),
            control: 7,
            value: 0x80,
        });

        assert_eq!(
            song.encode().unwrap_err(),
            EncodeError::DataByteOutOfRange { byte: 0x80 }
        );
    }

    #[test]
    fn wheel_out_of_range() {
        let mut song = Song::new();
        song.add_event(0, 0, EventKind::Wheel {
            channel: u4::new(0),
            value: 8192,
        });

        assert_eq!(
            song.encode().unwrap_err(),
            EncodeError::WheelOutOfRange { value: 8192 }
        );
    }

    #[test]
    fn time_overflow() {
        let mut song = Song::new();
        song.add_event(10, 0, note(0, 60, 100, Ticks::MAX, 0x40));

        assert_eq!(song.encode().unwrap_err(), EncodeError::TimeOverflow {
            time: 10,
            duration: Ticks::MAX
        });
    }

    #[test]
    fn delta_out_of_range() {
        let mut song = Song::new();
        song.add_event(VLQ_MAX + 1, 0, end_of_track());

        assert_eq!(
            song.encode().unwrap_err(),
            EncodeError::Write(WriteError::VlqOutOfRange { value: VLQ_MAX + 1 })
        );
    }

    #[test]
    fn round_trip() {
        let song = Song::decode(include_bytes!("../../test/two_tracks.mid")).unwrap();
        let bytes = song.encode().unwrap();
        let decoded = Song::decode(&bytes).unwrap();

        assert_eq!(decoded.format, song.format);
        assert_eq!(decoded.track_count, song.track_count);
        assert_eq!(decoded.ticks_per_qnote, song.ticks_per_qnote);
        assert_eq!(decoded.track_chunk_count, song.track_chunk_count);
        assert_eq!(decoded.seconds_per_qnote, song.seconds_per_qnote);

        let summary = |song: &Song| -> Vec<(Ticks, usize, EventKind)> {
            song.events
                .iter()
                .map(|event| (event.time, event.track, event.kind.clone()))
                .collect()
        };
        assert_eq!(summary(&decoded), summary(&song));

        // Without running status or unknown chunks the output is stable from here on
        assert_eq!(decoded.encode().unwrap(), bytes);
    }
}
