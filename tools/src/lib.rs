//! # Pocket Orchestra Song Tools
//!
//! Pocket Orchestra songs are MIDI files with a twist: the player reads the input that plays
//! a note from its program or velocity, and it has no use for most of what a sequencer
//! leaves behind in a file. This crate provides a command-line utility for looking into
//! songs and doing the song editor's bulk clean-ups without opening the editor.
//!
//! Every command that changes a song writes it back over the input, unless an output path
//! is given. Overwriting an existing file asks for confirmation first. Set `RUST_LOG` (to
//! `info` or `debug`, say) to see more of what happens while reading and writing songs.
//!
//! ## Inspect
//!
//! ```console
//! posong-tools-inspect 0.1.0
//! Inspect songs, or even entire directories for their contents
//!
//! USAGE:
//!     posong-tools inspect [OPTIONS] [PATH]...
//!
//! ARGS:
//!     <PATH>...    The path(s) to inspect
//!
//! OPTIONS:
//!     -e, --events       List every event in the song
//!     -h, --help         Print help information
//!     -r, --recursive    Search the folder recursively
//!     -V, --version      Print version information
//! ```
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > posong-tools inspect -e two_tracks.mid
//! two_tracks.mid                  f1 | 96 tpq | 0.6 s/qn
//!   tracks 2/2 | events 8 | notes 3 | longest 192
//!   length 288 ticks | 3 qnotes | 1s 800ms
//!        0 |  0 | meta 0x03, 4 bytes
//!        0 |  0 | meta 0x51, 3 bytes
//!        0 |  0 | program 0x0a (wave 2, input 1), chan 0 | Music Box
//!        0 |  0 | note c4, chan 0
//!       96 |  0 | meta 0x2f, 0 bytes
//!       96 |  1 | note e4, chan 1
//!       96 |  1 | note g4, chan 1
//!      288 |  1 | meta 0x2f, 0 bytes
//! ```
//!
//! ## Optimize
//!
//! ```console
//! posong-tools-optimize 0.1.0
//! Strip everything from a song the player doesn't need
//!
//! USAGE:
//!     posong-tools optimize [OPTIONS] <PATH>
//!
//! ARGS:
//!     <PATH>    The path to the song to optimize
//!
//! OPTIONS:
//!         --aftertouch           Remove polyphonic aftertouch
//!         --channel-pressure     Remove channel pressure
//!         --control              Remove control changes
//!     -h, --help                 Print help information
//!         --leading-silence      Shift the song back so the first note starts right away
//!         --meta                 Remove meta events other than text, tempo and End of Track
//!     -o, --output <OUTPUT>      The output path. Defaults to overwriting the input
//!         --redundant-program    Remove program changes to the program a channel is already on
//!         --sysex                Remove system exclusive messages
//!         --text                 Remove text meta events
//!         --trailing-silence     Move whatever follows the final End of Track back onto it
//!     -V, --version              Print version information
//!         --wheel                Remove pitch wheel changes
//! ```
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > posong-tools optimize theme.mid -o theme_small.mid
//! Removed 1207 of 1580 event(s)
//! Wrote theme_small.mid
//! ```
//!
//! ## Zap Input, Reformat, Reset Programs
//!
//! ```console
//! USAGE:
//!     posong-tools zap-input [OPTIONS] <PATH>
//!     posong-tools reformat [OPTIONS] <PATH>
//!     posong-tools reset-programs [OPTIONS] <PATH>
//!
//! OPTIONS:
//!     -o, --output <OUTPUT>    The output path. Defaults to overwriting the input
//! ```
//!
//! ## Merge Channels
//!
//! ```console
//! USAGE:
//!     posong-tools merge-channels [OPTIONS] --from <FROM> --into <INTO> <PATH>
//! ```
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > posong-tools merge-channels theme.mid --from 9 --into 3
//! theme.mid already exists. Do you want to overwrite it? Y/n
//! Y
//! Wrote theme.mid
//! ```

pub mod inspect;
pub mod optimize;
pub mod transform;
pub(crate) mod utils;
