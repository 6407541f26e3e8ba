//! Byte-level reading and writing for the song container format
//!
//! Songs are stored as a sequence of length-framed chunks holding big-endian integers and
//! [variable-length quantities](https://en.wikipedia.org/wiki/Variable-length_quantity).
//! [`ByteCursor`] reads those primitives from a borrowed buffer, [`ByteBuilder`] writes
//! them into an owned one. The chunk and event layout on top of this lives in
//! [`song`](crate::song).

mod reader;
mod writer;

pub use reader::{ByteCursor, ReadError};
pub use writer::{ByteBuilder, WriteError};

/// The largest value a variable-length quantity may hold (four 7-bit groups)
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;
