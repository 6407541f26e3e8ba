use super::{
    Song, Ticks,
    event::{EventKind, META_SET_TEMPO, Note},
};
use crate::serde::{ByteCursor, ReadError};
use log::{debug, info, warn};
use thiserror::Error;
use ux::u4;

/// The off velocity given to notes ended by a note on with zero velocity
const IMPLICIT_OFF_VELOCITY: u8 = 0x40;

/// Set in the division when it counts SMPTE frames instead of ticks per quarter note
const SMPTE_DIVISION: u16 = 0x8000;

impl Song {
    /// Decode a song from the bytes of a format 1 MIDI file
    ///
    /// Note offs (and note ons with zero velocity) are paired with the note they end, which
    /// gets its duration and off velocity from them. Chunks other than `MThd` and `MTrk` are
    /// skipped. The first Set Tempo event decides the song's tempo; songs without one play
    /// at [`Song::DEFAULT_SECONDS_PER_QNOTE`].
    ///
    /// Event times may grow up to [`Ticks::MAX`], past what a single four-byte delta can
    /// hold. Such a song decodes, but [`Song::encode`] rejects it.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = SongDecoder::new();
        let mut cursor = ByteCursor::new(bytes);

        while !cursor.is_empty() {
            let id = cursor.string(4)?;
            let chunk = cursor.u32belen()?;
            decoder.chunk(&id, chunk)?;
        }

        Ok(decoder.finish())
    }
}

/// State that lives for the duration of a single [`Song::decode`] call
struct SongDecoder {
    song: Song,
    header_found: bool,
    tempo: Option<f64>,
}

impl SongDecoder {
    fn new() -> Self {
        Self {
            song: Song {
                track_chunk_count: 0,
                ..Song::new()
            },
            header_found: false,
            tempo: None,
        }
    }

    fn chunk(&mut self, id: &str, chunk: &[u8]) -> Result<(), DecodeError> {
        match id {
            "MThd" => self.header(chunk),
            "MTrk" => self.track(chunk),
            _ => {
                warn!("Ignoring unknown {}-byte '{id}' chunk", chunk.len());
                Ok(())
            }
        }
    }

    fn header(&mut self, chunk: &[u8]) -> Result<(), DecodeError> {
        let mut cursor = ByteCursor::new(chunk);
        let format = cursor.u16be()?;
        let track_count = cursor.u16be()?;
        let ticks_per_qnote = cursor.u16be()?;

        if format != 1
            || track_count < 1
            || ticks_per_qnote < 1
            || ticks_per_qnote & SMPTE_DIVISION != 0
        {
            return Err(DecodeError::UnsupportedHeader {
                format,
                track_count,
                ticks_per_qnote,
            });
        }

        self.song.format = format;
        self.song.track_count = track_count;
        self.song.ticks_per_qnote = ticks_per_qnote;
        self.header_found = true;

        Ok(())
    }

    fn track(&mut self, chunk: &[u8]) -> Result<(), DecodeError> {
        let track = self.song.track_chunk_count;
        self.song.track_chunk_count += 1;

        debug!("Decoding {}-byte track {track}", chunk.len());

        let protocol = |error| DecodeError::Protocol { track, error };

        let mut cursor = ByteCursor::new(chunk);
        let mut running_status = None;
        let mut time: Ticks = 0;

        while !cursor.is_empty() {
            time = time.saturating_add(cursor.vlq()?);

            let lead = cursor.u8()?;
            let status = if lead & 0x80 == 0 {
                // A data byte: the status byte was left out, repeat the previous one
                cursor.unread(1)?;
                running_status.ok_or(protocol(ProtocolError::RunningStatusUnset { lead }))?
            } else {
                running_status = Some(lead);
                lead
            };

            let channel = u4::new(status & 0x0F);

            let kind = match status & 0xF0 {
                0x80 => {
                    let note = data(&mut cursor, track, status)?;
                    let velocity = data(&mut cursor, track, status)?;
                    self.note_off(time, channel, note, velocity);
                    continue;
                }
                0x90 => {
                    let note = data(&mut cursor, track, status)?;
                    let velocity = data(&mut cursor, track, status)?;
                    if velocity == 0 {
                        self.note_off(time, channel, note, IMPLICIT_OFF_VELOCITY);
                        continue;
                    }

                    EventKind::NoteOn(Note::new(channel, note, velocity))
                }
                0xA0 => EventKind::NoteAdjust {
                    channel,
                    note: data(&mut cursor, track, status)?,
                    pressure: data(&mut cursor, track, status)?,
                },
                0xB0 => EventKind::Control {
                    channel,
                    control: data(&mut cursor, track, status)?,
                    value: data(&mut cursor, track, status)?,
                },
                0xC0 => EventKind::Program {
                    channel,
                    program: data(&mut cursor, track, status)?,
                },
                0xD0 => EventKind::Pressure {
                    channel,
                    pressure: data(&mut cursor, track, status)?,
                },
                0xE0 => {
                    let lo = cursor.u8()?;
                    let hi = cursor.u8()?;
                    if (lo | hi) & 0x80 != 0 {
                        return Err(protocol(ProtocolError::InvalidWheel { lo, hi }));
                    }

                    EventKind::Wheel {
                        channel,
                        value: ((i16::from(hi) << 7) | i16::from(lo)) - 8192,
                    }
                }
                _ => {
                    // System messages cancel running status
                    running_status = None;

                    match status {
                        0xF0 | 0xF7 => EventKind::Sysex {
                            body: cursor.vlqlen()?.to_vec(),
                        },
                        0xFF => {
                            let id = cursor.u8()?;
                            let body = cursor.vlqlen()?;
                            self.examine_meta(id, body);

                            EventKind::Meta {
                                id,
                                body: body.to_vec(),
                            }
                        }
                        status => {
                            return Err(protocol(ProtocolError::UnsupportedSystemMessage {
                                status,
                            }));
                        }
                    }
                }
            };

            self.song.add_event(time, track, kind);
        }

        Ok(())
    }

    /// End the most recently started, still sounding note with this channel and pitch
    ///
    /// Notes starting after `time` are not considered. Offs without a matching note are
    /// dropped.
    fn note_off(&mut self, time: Ticks, channel: u4, pitch: u8, velocity: u8) {
        let open = self
            .song
            .events
            .iter_mut()
            .rev()
            .find_map(|event| match &mut event.kind {
                EventKind::NoteOn(note)
                    if event.time <= time
                        && note.channel == channel
                        && note.note == pitch
                        && !note.is_terminated() =>
                {
                    Some((event.time, note))
                }
                _ => None,
            });

        if let Some((start, note)) = open {
            note.duration = time - start;
            note.off_velocity = velocity.max(1);
        }
    }

    fn examine_meta(&mut self, id: u8, body: &[u8]) {
        if id != META_SET_TEMPO {
            return;
        }

        let &[high, mid, low] = body else {
            warn!(
                "Ignoring Set Tempo with unexpected length {}, should be 3",
                body.len()
            );
            return;
        };

        let seconds = f64::from(u32::from_be_bytes([0, high, mid, low])) / 1_000_000.0;

        match self.tempo {
            None => self.tempo = Some(seconds),
            Some(tempo) if tempo != seconds => warn!(
                "Tempo change detected! Using the first one, {tempo} s/qn, and ignoring {seconds}"
            ),
            Some(_) => (),
        }
    }

    fn finish(mut self) -> Song {
        if !self.header_found {
            warn!("No MThd chunk found, keeping the default header");
        } else if usize::from(self.song.track_count) != self.song.track_chunk_count {
            debug!(
                "Header declares {} track(s), found {}",
                self.song.track_count, self.song.track_chunk_count
            );
        }

        self.song.longest_event = self.song.calculate_longest_event();
        self.song.seconds_per_qnote = self.tempo.unwrap_or_else(|| {
            info!(
                "No explicit tempo, assuming {} s/qn",
                Song::DEFAULT_SECONDS_PER_QNOTE
            );
            Song::DEFAULT_SECONDS_PER_QNOTE
        });

        self.song
    }
}

/// Read a channel message data byte, which has its top bit clear
fn data(cursor: &mut ByteCursor, track: usize, status: u8) -> Result<u8, DecodeError> {
    let byte = cursor.u8()?;
    if byte & 0x80 != 0 {
        return Err(DecodeError::Protocol {
            track,
            error: ProtocolError::InvalidDataByte { status, byte },
        });
    }

    Ok(byte)
}

/// An error describing what could go wrong decoding a [`Song`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The data ended too soon, or a variable-length quantity was malformed
    #[error("Reading the song data failed")]
    Read(#[from] ReadError),

    /// Only format 1 files with at least one track and a ticks-per-quarter-note division
    /// are supported
    #[error(
        "Unsupported MThd: format {format}, {track_count} track(s), division {ticks_per_qnote:#06X}"
    )]
    UnsupportedHeader {
        format: u16,
        track_count: u16,
        ticks_per_qnote: u16,
    },

    /// A track holds event data that doesn't follow the protocol
    #[error("Malformed event data in track {track}")]
    Protocol {
        track: usize,
        #[source]
        error: ProtocolError,
    },
}

/// The ways in which track event data can break the protocol
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A data byte appeared where a status byte was expected, with no status to repeat
    #[error("Unexpected leading byte {lead:#04X}, running status unset")]
    RunningStatusUnset { lead: u8 },

    /// A channel message data byte had its top bit set
    #[error("Unexpected data byte {byte:#04X} after status {status:#04X}")]
    InvalidDataByte { status: u8, byte: u8 },

    /// A pitch wheel data byte had its top bit set
    #[error("Unexpected wheel data {lo:#04X}, {hi:#04X}")]
    InvalidWheel { lo: u8, hi: u8 },

    /// System common and realtime messages can't appear in a song
    #[error("Unsupported system message {status:#04X}")]
    UnsupportedSystemMessage { status: u8 },
}
