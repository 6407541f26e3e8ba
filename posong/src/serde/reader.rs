use std::borrow::Cow;
use thiserror::Error;

/// The maximal number of bytes a variable-length quantity may span while decoding
const VLQ_MAX_LEN: usize = 5;

/// A bounds-checked sequential reader over a byte slice
///
/// Every read checks up front that enough bytes remain, so a failed read never consumes
/// anything. The one multi-step read, [`ByteCursor::vlq`], restores the position to where it
/// started when it fails.
///
/// ```
/// # use posong::serde::ByteCursor;
/// let mut cursor = ByteCursor::new(&[0x00, 0x60, 0x81, 0x00]);
/// assert_eq!(cursor.u16be()?, 0x60);
/// assert_eq!(cursor.vlq()?, 0x80);
/// assert_eq!(cursor.remaining(), 0);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Start reading at the beginning of a slice
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// The current read offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Are there any bytes left to read?
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn require(&self, needed: usize) -> Result<(), ReadError> {
        if needed <= self.remaining() {
            Ok(())
        } else {
            Err(ReadError::TruncatedInput {
                position: self.position,
                needed,
                remaining: self.remaining(),
            })
        }
    }

    /// Step back over bytes that have already been read
    pub fn unread(&mut self, count: usize) -> Result<(), ReadError> {
        if count > self.position {
            return Err(ReadError::RewindOutOfBounds {
                position: self.position,
                count,
            });
        }

        self.position -= count;
        Ok(())
    }

    /// Read a single byte
    pub fn u8(&mut self) -> Result<u8, ReadError> {
        self.require(1)?;
        let byte = self.bytes[self.position];
        self.position += 1;
        Ok(byte)
    }

    /// Read a big-endian 16-bit integer
    pub fn u16be(&mut self) -> Result<u16, ReadError> {
        let bytes = self.binary(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian 32-bit integer
    pub fn u32be(&mut self) -> Result<u32, ReadError> {
        let bytes = self.binary(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read the next `count` bytes
    ///
    /// The bytes are borrowed from the underlying buffer; call `to_vec()` on them when the
    /// data needs to outlive it.
    pub fn binary(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        self.require(count)?;
        let bytes = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Read the next `count` bytes as UTF-8 text
    ///
    /// Invalid sequences are replaced with U+FFFD instead of failing the read.
    pub fn string(&mut self, count: usize) -> Result<Cow<'a, str>, ReadError> {
        Ok(String::from_utf8_lossy(self.binary(count)?))
    }

    /// Read a variable-length quantity
    ///
    /// Seven bits of payload per byte, most significant group first, every byte but the last
    /// with its top bit set.
    pub fn vlq(&mut self) -> Result<u32, ReadError> {
        let start = self.position;
        let result = self.vlq_unchecked(start);

        if result.is_err() {
            self.position = start;
        }

        result
    }

    fn vlq_unchecked(&mut self, start: usize) -> Result<u32, ReadError> {
        let mut value = 0_u64;

        for _ in 0..VLQ_MAX_LEN {
            let byte = self.u8()?;
            value = (value << 7) | u64::from(byte & 0x7F);

            if byte & 0x80 == 0 {
                return u32::try_from(value).map_err(|_| ReadError::MalformedVlq { position: start });
            }
        }

        Err(ReadError::MalformedVlq { position: start })
    }

    /// Read a big-endian 32-bit length, followed by that many bytes
    pub fn u32belen(&mut self) -> Result<&'a [u8], ReadError> {
        let start = self.position;
        let len = self.u32be()?;

        match self.binary(len as usize) {
            Ok(bytes) => Ok(bytes),
            Err(error) => {
                self.position = start;
                Err(error)
            }
        }
    }

    /// Read a variable-length quantity length, followed by that many bytes
    pub fn vlqlen(&mut self) -> Result<&'a [u8], ReadError> {
        let start = self.position;
        let len = self.vlq()?;

        match self.binary(len as usize) {
            Ok(bytes) => Ok(bytes),
            Err(error) => {
                self.position = start;
                Err(error)
            }
        }
    }
}

/// An error describing what could go wrong reading from a [`ByteCursor`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    /// Fewer bytes remained than a read required. Nothing was consumed.
    #[error("Needed {needed} byte(s) at position {position}, but only {remaining} remain")]
    TruncatedInput {
        position: usize,
        needed: usize,
        remaining: usize,
    },

    /// A variable-length quantity did not terminate within five bytes, or did not fit 32 bits
    #[error("Malformed variable-length quantity at position {position}")]
    MalformedVlq { position: usize },

    /// An attempt was made to rewind past the start of the buffer
    #[error("Cannot rewind {count} byte(s) from position {position}")]
    RewindOutOfBounds { position: usize, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width() {
        let mut cursor = ByteCursor::new(&[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);

        assert_eq!(cursor.u8().unwrap(), 0x12);
        assert_eq!(cursor.u16be().unwrap(), 0x3456);
        assert_eq!(cursor.u32be().unwrap_err(), ReadError::TruncatedInput {
            position: 3,
            needed: 4,
            remaining: 3,
        });

        // The failed read didn't consume anything
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.binary(3).unwrap(), &[0x78, 0x9A, 0xBC]);
        assert!(cursor.is_empty());
    }

    #[test]
    fn vlq() {
        let mut cursor = ByteCursor::new(&[
            0x00, 0x40, 0x7F, 0x81, 0x00, 0xC0, 0x00, 0xFF, 0x7F, 0x81, 0x80, 0x00, 0xFF, 0xFF,
            0xFF, 0x7F,
        ]);

        assert_eq!(cursor.vlq().unwrap(), 0);
        assert_eq!(cursor.vlq().unwrap(), 0x40);
        assert_eq!(cursor.vlq().unwrap(), 0x7F);
        assert_eq!(cursor.vlq().unwrap(), 0x80);
        assert_eq!(cursor.vlq().unwrap(), 0x2000);
        assert_eq!(cursor.vlq().unwrap(), 0x3FFF);
        assert_eq!(cursor.vlq().unwrap(), 0x4000);
        assert_eq!(cursor.vlq().unwrap(), 0x0FFF_FFFF);
        assert!(cursor.is_empty());
    }

    #[test]
    fn vlq_five_continuations() {
        let mut cursor = ByteCursor::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);

        assert_eq!(cursor.vlq().unwrap_err(), ReadError::MalformedVlq { position: 0 });
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn vlq_five_bytes_terminated() {
        // Four continuations and a terminator is tolerated, as long as it fits 32 bits
        let mut cursor = ByteCursor::new(&[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(cursor.vlq().unwrap(), u32::MAX);

        let mut cursor = ByteCursor::new(&[0x9F, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(cursor.vlq().unwrap_err(), ReadError::MalformedVlq { position: 0 });
    }

    #[test]
    fn vlq_truncated() {
        let mut cursor = ByteCursor::new(&[0x00, 0x81, 0x80]);
        cursor.u8().unwrap();

        assert_eq!(cursor.vlq().unwrap_err(), ReadError::TruncatedInput {
            position: 3,
            needed: 1,
            remaining: 0,
        });

        // The cursor is back where the quantity started
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn unread() {
        let mut cursor = ByteCursor::new(&[0x90, 0x3C]);
        assert_eq!(cursor.u8().unwrap(), 0x90);

        cursor.unread(1).unwrap();
        assert_eq!(cursor.u8().unwrap(), 0x90);

        assert_eq!(cursor.unread(2).unwrap_err(), ReadError::RewindOutOfBounds {
            position: 1,
            count: 2,
        });
    }

    #[test]
    fn length_prefixed() {
        let mut cursor = ByteCursor::new(&[0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB, 0x03, 0x01]);

        assert_eq!(cursor.u32belen().unwrap(), &[0xAA, 0xBB]);

        // Claims three bytes, only has one
        assert!(matches!(
            cursor.vlqlen(),
            Err(ReadError::TruncatedInput { needed: 3, .. })
        ));
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn string() {
        let mut cursor = ByteCursor::new(b"MThd\xFFx");

        assert_eq!(cursor.string(4).unwrap(), "MThd");
        assert_eq!(cursor.string(2).unwrap(), "\u{FFFD}x");
    }
}
