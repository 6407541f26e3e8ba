//! Whole-song transformations
//!
//! Every transformation takes the song by mutable reference and edits it in place. None of
//! them can fail. They leave the events sorted by time, but don't update
//! [`Song::longest_event`](crate::song::Song::longest_event).

mod optimize;
mod programs;

pub use optimize::{OptimizeOptions, optimize};
pub use programs::{reformat, reset_programs, zap_input};

use crate::song::Song;
use ux::u4;

/// The number of MIDI channels
const CHANNEL_COUNT: usize = 16;

/// Settings for [`quantize`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct QuantizeOptions {}

/// Snap events to a grid
///
/// No snapping has been defined yet, so this leaves the song as it is.
pub fn quantize(_song: &mut Song, _options: &QuantizeOptions) {}

/// Move every event on channel `from` over to channel `into`
///
/// Meta and sysex events have no channel and are left alone.
pub fn merge_channels(song: &mut Song, from: u4, into: u4) {
    for event in &mut song.events {
        if event.channel() == Some(from) {
            event.kind.set_channel(into);
        }
    }
}

fn channel_index(channel: u4) -> usize {
    usize::from(u8::from(channel))
}
