use super::{CHANNEL_COUNT, channel_index};
use crate::song::{EventKind, Song};
use ux::u4;

/// Note-on velocities the player reads as "played by input n", indexed by input
const INPUT_VELOCITIES: [u8; 8] = [0x01, 0x38, 0x48, 0x58, 0x68, 0x78, 0x02, 0x03];

/// Make every note a plain note, not played by any input
pub fn zap_input(song: &mut Song) {
    for note in song.events.iter_mut().filter_map(|event| event.note_mut()) {
        note.velocity = INPUT_VELOCITIES[0];
    }
}

/// Convert a song that selects inputs through programs to one that uses velocities
///
/// Older songs picked a note's input with bits 3 to 5 of the program it plays with. Newer
/// ones carry the input in the note-on velocity and use the program for the wave alone.
/// Each note's velocity is set from its effective program (its own, or else its channel's),
/// and per-note programs lose their input bits. Program changes themselves are kept.
pub fn reformat(song: &mut Song) {
    let mut programs = [0; CHANNEL_COUNT];

    for event in &mut song.events {
        match &mut event.kind {
            EventKind::Program { channel, program } => {
                programs[channel_index(*channel)] = *program;
            }
            EventKind::NoteOn(note) => {
                let program = note.program.unwrap_or(programs[channel_index(note.channel)]);
                note.velocity = INPUT_VELOCITIES[usize::from((program >> 3) & 0x07)];

                if let Some(program) = &mut note.program {
                    *program &= 0x07;
                }
            }
            _ => (),
        }
    }
}

/// Replace all program changes with a single program 0 per channel, at the start of the song
///
/// Only channels that play notes get one. It goes on the track of the channel's first note,
/// after whatever already happens at tick zero.
pub fn reset_programs(song: &mut Song) {
    song.events
        .retain(|event| !matches!(event.kind, EventKind::Program { .. }));

    let mut tracks = [None; CHANNEL_COUNT];
    for event in &song.events {
        if let Some(note) = event.note() {
            tracks[channel_index(note.channel)].get_or_insert(event.track);
        }
    }

    for (channel, track) in tracks.iter().enumerate() {
        if let Some(track) = track {
            song.add_event(0, *track, EventKind::Program {
                channel: u4::new(channel as u8),
                program: 0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::{Note, Ticks};

    fn note(channel: u8, program: Option<u8>) -> EventKind {
        EventKind::NoteOn(Note {
            program,
            ..Note::new(u4::new(channel), 60, 100)
        })
    }

    fn program(channel: u8, program: u8) -> EventKind {
        EventKind::Program {
            channel: u4::new(channel),
            program,
        }
    }

    fn velocities(song: &Song) -> Vec<u8> {
        song.events
            .iter()
            .filter_map(|event| event.note().map(|note| note.velocity))
            .collect()
    }

    #[test]
    fn zap() {
        let mut song = Song::new();
        song.add_event(0, 0, note(0, None));
        song.add_event(0, 0, program(0, 0x18));
        song.add_event(10, 0, note(1, Some(0x10)));

        zap_input(&mut song);
        assert_eq!(velocities(&song), [0x01, 0x01]);

        // Programs are untouched
        assert_eq!(song.events[1].kind, program(0, 0x18));
    }

    #[test]
    fn reformat_by_channel_program() {
        let mut song = Song::new();
        song.add_event(0, 0, note(0, None)); // program 0 until told otherwise
        song.add_event(10, 0, program(0, 0x0A)); // input 1, wave 2
        song.add_event(20, 0, note(0, None));
        song.add_event(20, 0, note(1, None)); // other channel
        song.add_event(30, 0, program(1, 0x3F)); // input 7
        song.add_event(40, 0, note(1, None));

        reformat(&mut song);
        assert_eq!(velocities(&song), [0x01, 0x38, 0x01, 0x03]);

        // The program changes stay as they were
        assert_eq!(song.events[1].kind, program(0, 0x0A));
    }

    #[test]
    fn reformat_by_note_program() {
        let mut song = Song::new();
        song.add_event(0, 0, program(2, 0x08));
        song.add_event(10, 0, note(2, Some(0x2B))); // input 5, wave 3
        song.add_event(20, 0, note(2, None));

        reformat(&mut song);
        assert_eq!(velocities(&song), [0x78, 0x38]);
        assert_eq!(song.events[1].note().and_then(|note| note.program), Some(0x03));
        assert_eq!(song.events[2].note().and_then(|note| note.program), None);
    }

    #[test]
    fn reset() {
        let mut song = Song::new();
        song.track_chunk_count = 3;
        song.add_event(0, 0, note(5, None));
        song.add_event(0, 0, program(5, 0x12));
        song.add_event(10, 2, note(1, None));
        song.add_event(20, 1, program(9, 0x01)); // channel without notes
        song.add_event(30, 1, note(1, None));
        song.add_event(40, 1, note(5, None));

        reset_programs(&mut song);

        let summary: Vec<(Ticks, usize, Option<u8>, u8)> = song
            .events
            .iter()
            .map(|event| {
                (
                    event.time,
                    event.track,
                    event.channel().map(u8::from),
                    event.kind.status(),
                )
            })
            .collect();

        // The note already at tick zero stays ahead of the new programs
        assert_eq!(summary, [
            (0, 0, Some(5), 0x90),
            (0, 2, Some(1), 0xC0),
            (0, 0, Some(5), 0xC0),
            (10, 2, Some(1), 0x90),
            (30, 1, Some(1), 0x90),
            (40, 1, Some(5), 0x90),
        ]);
        assert!(song.events[1..3].iter().all(|event| matches!(
            event.kind,
            EventKind::Program { program: 0, .. }
        )));
    }

    #[test]
    fn reset_without_notes() {
        let mut song = Song::new();
        song.add_event(0, 0, program(0, 4));

        reset_programs(&mut song);
        assert!(song.events.is_empty());
    }
}
