//! Reading, writing and editing Pocket Orchestra songs
//!
//! Pocket Orchestra songs are MIDI files (format 1, with a ticks-per-quarter-note division)
//! that the player interprets in its own way: a program selects a wave and, in older songs,
//! the input that plays it, and newer songs put the input in the note-on velocity instead.
//!
//! This crate provides:
//!
//! * A [`Song`](song::Song) model holding every event in a single time-sorted list, with
//!   note offs folded into the notes they end
//! * [Decoding](song::Song::decode) and [encoding](song::Song::encode) songs from and to bytes
//! * The editor's whole-song transformations in [`pipeline`], such as
//!   [`optimize`](pipeline::optimize) and [`reformat`](pipeline::reformat)
//! * Naming helpers for notes, General MIDI programs and drums in [`midi`]
//!
//! The low-level byte readers and writers the codec is built on live in [`serde`].

pub mod midi;
pub mod pipeline;
pub mod serde;
pub mod song;

pub use ux::u4;
