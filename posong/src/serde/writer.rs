use super::VLQ_MAX;
use thiserror::Error;

/// A growable byte buffer with big-endian and variable-length quantity writers
///
/// Length-framed blocks are written with the "commit" pattern: remember the
/// [`position`](ByteBuilder::position) before writing the payload, write the payload, then
/// call [`commit_u32belen`](ByteBuilder::commit_u32belen) or
/// [`commit_vlqlen`](ByteBuilder::commit_vlqlen) to slide the payload forward and put its
/// length in front of it.
///
/// ```
/// # use posong::serde::ByteBuilder;
/// let mut builder = ByteBuilder::new();
/// builder.raw("MTrk");
///
/// let start = builder.position();
/// builder.u8(0x00);
/// builder.u8(0xFF);
/// builder.commit_u32belen(start)?;
///
/// assert_eq!(builder.as_slice(), b"MTrk\x00\x00\x00\x02\x00\xFF");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct ByteBuilder {
    bytes: Vec<u8>,
}

impl ByteBuilder {
    /// Construct an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// The current write offset, which is also the number of bytes written
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    /// Everything written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the builder, returning the written bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write a single byte
    pub fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    /// Write a big-endian 16-bit integer
    pub fn u16be(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a big-endian 32-bit integer
    pub fn u32be(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Write raw bytes, or the UTF-8 encoding of a string
    pub fn raw<B>(&mut self, bytes: B)
    where
        B: AsRef<[u8]>,
    {
        self.bytes.extend_from_slice(bytes.as_ref());
    }

    /// Write a variable-length quantity, returning the number of bytes it took
    pub fn vlq(&mut self, value: u32) -> Result<usize, WriteError> {
        let (buffer, len) = encode_vlq(value)?;
        self.raw(&buffer[..len]);
        Ok(len)
    }

    /// Put a big-endian 32-bit length in front of everything written since `start`
    pub fn commit_u32belen(&mut self, start: usize) -> Result<(), WriteError> {
        let len = self.payload_len(start)?;
        let len = u32::try_from(len).map_err(|_| WriteError::LengthOutOfRange { len })?;

        self.bytes.splice(start..start, len.to_be_bytes());
        Ok(())
    }

    /// Put a variable-length quantity length in front of everything written since `start`
    pub fn commit_vlqlen(&mut self, start: usize) -> Result<(), WriteError> {
        let len = self.payload_len(start)?;
        let len = u32::try_from(len)
            .ok()
            .filter(|len| *len <= VLQ_MAX)
            .ok_or(WriteError::LengthOutOfRange { len })?;

        let (buffer, count) = encode_vlq(len)?;
        self.bytes.splice(start..start, buffer[..count].iter().copied());
        Ok(())
    }

    fn payload_len(&self, start: usize) -> Result<usize, WriteError> {
        self.position()
            .checked_sub(start)
            .ok_or(WriteError::CommitOutOfBounds {
                start,
                position: self.position(),
            })
    }
}

/// Encode a variable-length quantity into a scratch buffer, returning it and the used length
fn encode_vlq(value: u32) -> Result<([u8; 4], usize), WriteError> {
    if value > VLQ_MAX {
        return Err(WriteError::VlqOutOfRange { value });
    }

    let len = match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    };

    let mut buffer = [0; 4];
    for (index, byte) in buffer[..len].iter_mut().enumerate() {
        let shift = 7 * (len - 1 - index);
        *byte = ((value >> shift) & 0x7F) as u8;

        if index + 1 < len {
            *byte |= 0x80;
        }
    }

    Ok((buffer, len))
}

/// An error describing what could go wrong writing to a [`ByteBuilder`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WriteError {
    /// Variable-length quantities hold at most 28 bits
    #[error("{value:#X} does not fit a variable-length quantity")]
    VlqOutOfRange { value: u32 },

    /// A length-framed block grew larger than its length field can express
    #[error("A block of {len} bytes is too long for its length field")]
    LengthOutOfRange { len: usize },

    /// A commit was requested from a position that hasn't been written yet
    #[error("Cannot commit a length from {start}, only {position} bytes were written")]
    CommitOutOfBounds { start: usize, position: usize },
}
