//! Songs and the events they're made of

mod decode;
mod encode;
pub mod event;

pub use decode::{DecodeError, ProtocolError};
pub use encode::EncodeError;
pub use event::{Event, EventId, EventKind, Note, Ticks};

use std::{
    fs::File,
    io::{self, Read, Write},
    ops::Range,
    path::Path,
    time::Duration,
};
use thiserror::Error;

/// A song: header information plus every event of every track, in time order
///
/// Songs are stored as MIDI-like files (format 1, ticks-per-quarter-note division). Unlike
/// a plain MIDI file, a [`Song`] never holds separate note offs: every note off is folded
/// into the [`Note`] it ends. All tracks share a single list of [`Event`]s, each event
/// remembering the track it came from.
///
/// ```no_run
/// # use posong::song::Song;
/// // Load a song from a path on disk
/// let mut song = Song::from_path("theme.mid")?;
///
/// // ...do some editing...
/// posong::pipeline::zap_input(&mut song);
///
/// // Write it back
/// song.to_path("theme.mid")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// The events are always sorted by time, with events at the same time kept in the order
/// they were added. [`Song::add_event`] keeps it that way. Code that changes an event's time
/// directly has to call [`Song::shuffle_for_changed_time`] afterwards.
#[derive(Debug, Clone)]
pub struct Song {
    /// The MIDI file format (always 1 for decoded songs)
    pub format: u16,

    /// The number of tracks the header claims
    ///
    /// This might disagree with [`Song::track_chunk_count`]. The mismatch is kept as is.
    pub track_count: u16,

    /// Ticks per quarter note, the header's "division"
    pub ticks_per_qnote: u16,

    /// The number of tracks actually found, and the number that will be encoded
    pub track_chunk_count: usize,

    /// The song's tempo, in seconds per quarter note
    ///
    /// Only a single tempo is supported: the first Set Tempo event found while decoding.
    pub seconds_per_qnote: f64,

    /// The duration of the longest note, so views know how far back to look for notes
    /// still sounding
    ///
    /// Only valid right after decoding. Editing operations don't keep it up to date.
    pub longest_event: Ticks,

    /// Every event of every track, sorted by time
    pub events: Vec<Event>,

    next_id: u64,
}

impl Song {
    /// The tempo used when a song doesn't set one: 120 beats per minute
    pub const DEFAULT_SECONDS_PER_QNOTE: f64 = 0.5;

    /// The division of a newly constructed song
    pub const DEFAULT_TICKS_PER_QNOTE: u16 = 48;

    /// Construct an empty song with one track
    pub fn new() -> Self {
        Self {
            format: 1,
            track_count: 1,
            ticks_per_qnote: Self::DEFAULT_TICKS_PER_QNOTE,
            track_chunk_count: 1,
            seconds_per_qnote: Self::DEFAULT_SECONDS_PER_QNOTE,
            longest_event: 0,
            events: Vec::new(),
            next_id: 0,
        }
    }

    /// Deserialize a song from an arbitrary I/O reader
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        Ok(Self::decode(&bytes)?)
    }

    /// Deserialize a song from a path on disk
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Ok(Self::from_reader(file)?)
    }

    /// Serialize the song to an arbitrary I/O writer
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), ToWriterError>
    where
        W: Write,
    {
        let bytes = self.encode()?;
        writer.write_all(&bytes)?;

        Ok(())
    }

    /// Serialize the song to a path on disk
    pub fn to_path<P>(&self, path: P) -> Result<(), ToWriterError>
    where
        P: AsRef<Path>,
    {
        // A failed encode must leave the file as it was
        let bytes = self.encode()?;
        File::create(path)?.write_all(&bytes)?;

        Ok(())
    }

    /// Insert a new event, keeping the events sorted
    ///
    /// The event goes after every existing event with the same time, so events added at the
    /// same tick stay in the order they were added. The new event is returned for the caller
    /// to adjust further.
    pub fn add_event(&mut self, time: Ticks, track: usize, kind: EventKind) -> &mut Event {
        let index = match self.events.last() {
            Some(last) if time < last.time => self.events.partition_point(|e| e.time <= time),
            _ => self.events.len(),
        };

        let id = EventId(self.next_id);
        self.next_id += 1;

        self.events.insert(
            index,
            Event {
                id,
                time,
                track,
                kind,
            },
        );

        &mut self.events[index]
    }

    /// Find the index of the first event at `time`
    ///
    /// If there is no event at exactly that time, this is the index at which one would be
    /// inserted.
    pub fn search_events(&self, time: Ticks) -> usize {
        self.events.partition_point(|e| e.time < time)
    }

    /// All events starting within a range of ticks
    pub fn events_in_range(&self, range: Range<Ticks>) -> &[Event] {
        let start = self.search_events(range.start);
        let end = self.search_events(range.end).max(start);

        &self.events[start..end]
    }

    /// The index of an event in [`Song::events`]
    pub fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|event| event.id == id)
    }

    /// Move an event whose time has been changed back to its sorted position
    ///
    /// The event is swapped with its neighbor until it's in order again, so an event that
    /// moved a little only takes a couple of steps. Returns the event's new index, or
    /// [`None`] if the song doesn't hold the event.
    pub fn shuffle_for_changed_time(&mut self, id: EventId) -> Option<usize> {
        let mut index = self.position(id)?;
        let time = self.events[index].time;

        while index > 0 && time < self.events[index - 1].time {
            self.events.swap(index, index - 1);
            index -= 1;
        }

        while index + 1 < self.events.len() && time > self.events[index + 1].time {
            self.events.swap(index, index + 1);
            index += 1;
        }

        Some(index)
    }

    /// Remove an event, returning whether the song held it at all
    pub fn remove_event(&mut self, id: EventId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    /// The tick at which the last event is over
    ///
    /// This isn't necessarily the last event's time: a long note could start before it
    /// and still be sounding.
    pub fn duration_ticks(&self) -> Ticks {
        self.events.iter().map(Event::end).max().unwrap_or(0)
    }

    /// The song's length in quarter notes, rounded up
    pub fn duration_qnotes(&self) -> Ticks {
        self.duration_ticks()
            .div_ceil(Ticks::from(self.ticks_per_qnote.max(1)))
    }

    /// The length of a single tick, in seconds
    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_qnote / f64::from(self.ticks_per_qnote.max(1))
    }

    /// Convert a number of ticks to wall-clock time at the song's tempo
    pub fn ticks_to_duration(&self, ticks: Ticks) -> Duration {
        Duration::try_from_secs_f64(f64::from(ticks) * self.seconds_per_tick())
            .unwrap_or_default()
    }

    /// The song's length in wall-clock time
    pub fn duration(&self) -> Duration {
        self.ticks_to_duration(self.duration_ticks())
    }

    pub(crate) fn calculate_longest_event(&self) -> Ticks {
        self.events.iter().map(Event::duration).max().unwrap_or(0)
    }
}

impl Default for Song {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that might be returned from [`Song::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Io(#[from] io::Error),

    /// The bytes could not be decoded into a song
    #[error("Decoding the song failed")]
    Decode(#[from] DecodeError),
}

/// Errors that might be returned from [`Song::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Opening the file itself failed
    #[error("Opening the file failed")]
    FileOpen(#[from] io::Error),

    /// Deserialization failed
    #[error("Reading the song from file failed")]
    Read(#[from] FromReaderError),
}

/// Errors that might be returned from [`Song::to_writer()`] and [`Song::to_path()`]
#[derive(Debug, Error)]
pub enum ToWriterError {
    /// The song could not be encoded
    #[error("Encoding the song failed")]
    Encode(#[from] EncodeError),

    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ux::u4;

    fn program(program: u8) -> EventKind {
        EventKind::Program {
            channel: u4::new(0),
            program,
        }
    }

    fn programs(song: &Song) -> Vec<(Ticks, u8)> {
        song.events
            .iter()
            .map(|event| match event.kind {
                EventKind::Program { program, .. } => (event.time, program),
                _ => panic!("unexpected event {event}"),
            })
            .collect()
    }

    #[test]
    fn add_event_sorted_and_stable() {
        let mut song = Song::new();

        for (index, time) in [30, 10, 20, 10, 0, 30, 10, 25].into_iter().enumerate() {
            song.add_event(time, 0, program(index as u8));
        }

        assert!(song.events.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(programs(&song), [
            (0, 4),
            (10, 1),
            (10, 3),
            (10, 6),
            (20, 2),
            (25, 7),
            (30, 0),
            (30, 5),
        ]);
    }

    #[test]
    fn add_event_returns_the_new_event() {
        let mut song = Song::new();
        song.add_event(10, 0, program(0));

        let event = song.add_event(5, 1, program(1));
        event.track = 2;
        let id = event.id();

        assert_eq!(song.position(id), Some(0));
        assert_eq!(song.event(id).map(|event| event.track), Some(2));
    }

    #[test]
    fn search_events() {
        let mut song = Song::new();
        assert_eq!(song.search_events(10), 0);

        for time in [0, 10, 10, 10, 20] {
            song.add_event(time, 0, program(0));
        }

        assert_eq!(song.search_events(0), 0);
        assert_eq!(song.search_events(10), 1);
        assert_eq!(song.search_events(15), 4);
        assert_eq!(song.search_events(20), 4);
        assert_eq!(song.search_events(21), 5);
    }

    #[test]
    fn events_in_range() {
        let mut song = Song::new();
        for time in [0, 10, 10, 20, 30] {
            song.add_event(time, 0, program(0));
        }

        let times = |range| {
            song.events_in_range(range)
                .iter()
                .map(|event| event.time)
                .collect::<Vec<_>>()
        };

        assert_eq!(times(10..30), [10, 10, 20]);
        assert_eq!(times(11..20), Vec::<Ticks>::new());
        assert_eq!(times(30..10), Vec::<Ticks>::new());
    }

    #[test]
    fn shuffle_for_changed_time() {
        let mut song = Song::new();
        let ids: Vec<_> = [0, 10, 20, 30, 40]
            .into_iter()
            .map(|time| song.add_event(time, 0, program(time as u8)).id())
            .collect();

        // Move the first event past two others
        song.event_mut(ids[0]).unwrap().time = 25;
        assert_eq!(song.shuffle_for_changed_time(ids[0]), Some(2));
        assert_eq!(programs(&song), [(10, 10), (20, 20), (25, 0), (30, 30), (40, 40)]);

        // And the last one all the way to the front
        song.event_mut(ids[4]).unwrap().time = 5;
        assert_eq!(song.shuffle_for_changed_time(ids[4]), Some(0));
        assert_eq!(programs(&song), [(5, 40), (10, 10), (20, 20), (25, 0), (30, 30)]);

        // Unchanged time stays put
        assert_eq!(song.shuffle_for_changed_time(ids[2]), Some(2));
    }

    #[test]
    fn shuffle_missing_event() {
        let mut song = Song::new();
        let id = song.add_event(0, 0, program(0)).id();
        assert!(song.remove_event(id));

        assert_eq!(song.shuffle_for_changed_time(id), None);
    }

    #[test]
    fn remove_event_by_identity() {
        let mut song = Song::new();
        let first = song.add_event(10, 0, program(1)).id();
        let second = song.add_event(10, 0, program(1)).id();

        assert!(song.remove_event(second));
        assert!(!song.remove_event(second));

        // The identical-looking first event is still there
        assert_eq!(song.events.len(), 1);
        assert_eq!(song.events[0].id(), first);
    }

    #[test]
    fn durations() {
        let mut song = Song::new();
        song.ticks_per_qnote = 96;
        assert_eq!(song.duration_ticks(), 0);

        let mut long = Note::new(u4::new(0), 60, 100);
        long.duration = 400;
        song.add_event(0, 0, EventKind::NoteOn(long));

        let mut short = Note::new(u4::new(0), 62, 100);
        short.duration = 10;
        song.add_event(300, 0, EventKind::NoteOn(short));
        song.add_event(350, 0, program(0));

        // The first note ends last
        assert_eq!(song.duration_ticks(), 400);
        assert_eq!(song.duration_qnotes(), 5);
        assert_eq!(song.calculate_longest_event(), 400);

        // 96 ticks per quarter note at half a second per quarter note
        assert_eq!(song.ticks_to_duration(96), Duration::from_millis(500));
        assert_eq!(song.duration().as_millis(), 2083);
    }

    #[test]
    fn failed_encode_keeps_file() {
        let path = std::env::temp_dir().join(format!("posong-keep-{}.mid", std::process::id()));
        let original = include_bytes!("../../test/two_tracks.mid");
        std::fs::write(&path, original).unwrap();

        // An event this late cannot be written as a delta
        let mut song = Song::from_path(&path).unwrap();
        song.add_event(u32::MAX, 0, program(0));

        let result = song.to_path(&path);
        let on_disk = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ToWriterError::Encode(_))));
        assert_eq!(on_disk, original);
    }
}
