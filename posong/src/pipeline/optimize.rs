use super::{CHANNEL_COUNT, channel_index};
use crate::song::{
    Event, EventKind, Song,
    event::{META_END_OF_TRACK, META_SET_TEMPO, META_TEXT_END},
};

/// Which parts of a song [`optimize`] should strip
///
/// The default removes nothing; [`OptimizeOptions::all`] removes everything the player
/// doesn't need.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Shift the song back so the first note starts at tick zero
    pub remove_leading_silence: bool,

    /// Move whatever comes after the final End of Track back onto it
    pub remove_trailing_silence: bool,

    pub remove_channel_pressure: bool,

    /// Remove polyphonic aftertouch
    pub remove_aftertouch: bool,

    pub remove_wheel: bool,

    /// Remove control changes (the player reacts to none of them)
    pub remove_unknown_control: bool,

    /// Remove program changes that select the program the channel is already on
    pub remove_redundant_program: bool,

    /// Remove text meta events, such as track names and lyrics
    pub remove_text: bool,

    /// Remove meta events other than text, Set Tempo and End of Track
    pub remove_unknown_meta: bool,

    pub remove_unknown_sysex: bool,
}

impl OptimizeOptions {
    /// Remove everything that can be removed
    pub fn all() -> Self {
        Self {
            remove_leading_silence: true,
            remove_trailing_silence: true,
            remove_channel_pressure: true,
            remove_aftertouch: true,
            remove_wheel: true,
            remove_unknown_control: true,
            remove_redundant_program: true,
            remove_text: true,
            remove_unknown_meta: true,
            remove_unknown_sysex: true,
        }
    }
}

/// Strip the events and silence the player has no use for
///
/// Notes, Set Tempo and End of Track events are never removed. Optimizing an optimized song
/// again changes nothing.
pub fn optimize(song: &mut Song, options: &OptimizeOptions) {
    let mut programs = [0; CHANNEL_COUNT];
    song.events.retain(|event| keep(event, options, &mut programs));

    if options.remove_leading_silence {
        remove_leading_silence(song);
    }

    if options.remove_trailing_silence {
        remove_trailing_silence(song);
    }
}

fn keep(event: &Event, options: &OptimizeOptions, programs: &mut [u8; CHANNEL_COUNT]) -> bool {
    match &event.kind {
        EventKind::NoteOn(_) => true,
        EventKind::NoteAdjust { .. } => !options.remove_aftertouch,
        EventKind::Control { .. } => !options.remove_unknown_control,
        EventKind::Pressure { .. } => !options.remove_channel_pressure,
        EventKind::Wheel { .. } => !options.remove_wheel,
        EventKind::Sysex { .. } => !options.remove_unknown_sysex,
        EventKind::Program { channel, program } => {
            let current = &mut programs[channel_index(*channel)];
            if options.remove_redundant_program && *program == *current {
                false
            } else {
                *current = *program;
                true
            }
        }
        EventKind::Meta { id, .. } => match *id {
            META_END_OF_TRACK | META_SET_TEMPO => true,
            id if id < META_TEXT_END => !options.remove_text,
            _ => !options.remove_unknown_meta,
        },
    }
}

fn remove_leading_silence(song: &mut Song) {
    let Some(start) = song.events.iter().find(|event| event.is_note()).map(|event| event.time)
    else {
        return;
    };

    for event in &mut song.events {
        event.time = event.time.saturating_sub(start);
    }
}

/// Move everything from the last End of Track that follows a note back to that End of Track
///
/// Only applies when no notes come after it.
fn remove_trailing_silence(song: &mut Song) {
    let mut notes_since = 0;
    let mut terminator = None;

    for (index, event) in song.events.iter().enumerate() {
        if event.is_note() {
            notes_since += 1;
        } else if event.is_end_of_track() && notes_since > 0 {
            terminator = Some(index);
            notes_since = 0;
        }
    }

    if notes_since > 0 {
        return;
    }

    if let Some(index) = terminator {
        let time = song.events[index].time;
        for event in &mut song.events[index..] {
            event.time = time;
        }
    }
}
