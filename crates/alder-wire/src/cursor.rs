//! Byte buffer with an explicit read/write cursor.
//!
//! [`ByteCursor`] owns one contiguous byte region and tracks two
//! offsets: `position` (next read/write) and `limit` (end of valid
//! data). Invariant: `0 <= position <= limit <= capacity`. The buffer
//! is allocated once and never grown in place; a write past capacity
//! fails rather than reallocating.
//!
//! All multi-byte fixed-width values are big-endian (network byte
//! order). Varints are little-endian base-128 with a continuation bit,
//! bounded to the 32-bit range.
//!
//! Not safe for concurrent use on the same cursor without external
//! synchronization: every operation mutates the cursor.

use crate::error::WireError;

/// Default capacity for an empty cursor.
const DEFAULT_CAPACITY: usize = 128;

/// A fixed-capacity byte buffer with a moving read/write cursor.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    data: Vec<u8>,
    position: usize,
    limit: usize,
}

impl ByteCursor {
    /// Create an empty cursor with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty cursor with a fixed capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            position: 0,
            limit: 0,
        }
    }

    /// Wrap an existing byte sequence for reading.
    ///
    /// The limit is set to the full length of the input.
    #[must_use]
    pub fn wrap(bytes: Vec<u8>) -> Self {
        let limit = bytes.len();
        Self {
            data: bytes,
            position: 0,
            limit,
        }
    }

    /// Current cursor position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// End of valid data.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes left to read before the limit.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// All bytes written so far, independent of the read position.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.data[..self.limit]
    }

    /// Consume the cursor, returning the valid bytes.
    #[must_use]
    pub fn into_written(mut self) -> Vec<u8> {
        self.data.truncate(self.limit);
        self.data
    }

    fn check_read(&self, requested: usize) -> Result<(), WireError> {
        if requested > self.remaining() {
            return Err(WireError::BufferUnderflow {
                offset: self.position,
                requested,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        self.check_read(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Ok(out)
    }

    /// Read a signed byte.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::BufferUnderflow`] past the limit, as do all
    /// fixed-width reads below.
    pub fn read_i8(&mut self) -> Result<i8, WireError> {
        Ok(self.read_array::<1>()?[0] as i8)
    }

    /// Read an unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a big-endian unsigned 16-bit integer.
    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian signed 64-bit integer.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian unsigned 64-bit integer.
    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian IEEE-754 single.
    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian IEEE-754 double.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Decode a base-128 varint, low groups first.
    ///
    /// Bounded to five groups; the final group may carry at most four
    /// bits. A fifth byte with the continuation bit set, or one that
    /// would set bits above 32, is a format error rather than being
    /// consumed silently.
    ///
    /// # Errors
    ///
    /// [`WireError::VarIntOverflow`] on an overlong or out-of-range
    /// encoding, [`WireError::BufferUnderflow`] on truncation.
    pub fn read_var_int(&mut self) -> Result<u32, WireError> {
        let mut result: u32 = 0;
        for group in 0..5 {
            let byte = self.read_u8()?;
            let bits = u32::from(byte & 0x7f);
            if group == 4 && (byte & 0x80 != 0 || bits > 0x0f) {
                return Err(WireError::VarIntOverflow);
            }
            result |= bits << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(WireError::VarIntOverflow)
    }

    /// Copy `count` bytes out of the buffer and advance the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::BufferUnderflow`] if fewer than `count`
    /// bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, WireError> {
        self.check_read(count)?;
        let out = self.data[self.position..self.position + count].to_vec();
        self.position += count;
        Ok(out)
    }

    /// Copy the absolute range `start..end` and advance the cursor by
    /// its length.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidRange`] when `end < start`, the
    /// range runs past the limit, or advancing by the range length
    /// would push the position past the limit.
    pub fn read_bytes_range(&mut self, start: usize, end: usize) -> Result<Vec<u8>, WireError> {
        if end < start || end > self.limit || end - start > self.remaining() {
            return Err(WireError::InvalidRange { start, end });
        }
        let out = self.data[start..end].to_vec();
        self.position += out.len();
        Ok(out)
    }

    /// Read `count` bytes as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidUtf8`] if the bytes are not valid
    /// UTF-8.
    pub fn read_string(&mut self, count: usize) -> Result<String, WireError> {
        let offset = self.position;
        let bytes = self.read_bytes(count)?;
        String::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8 { offset })
    }

    fn check_write(&self, extra: usize) -> Result<(), WireError> {
        let requested = self.position + extra;
        if requested > self.data.len() {
            return Err(WireError::CapacityExceeded {
                capacity: self.data.len(),
                requested,
            });
        }
        Ok(())
    }

    /// Append raw bytes at the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::CapacityExceeded`] when the write would run
    /// past the fixed capacity, as do all writes below.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, WireError> {
        self.check_write(bytes.len())?;
        self.data[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        self.limit = self.limit.max(self.position);
        Ok(self)
    }

    /// Write a signed byte.
    pub fn write_i8(&mut self, value: i8) -> Result<&mut Self, WireError> {
        self.write_bytes(&[value as u8])
    }

    /// Write an unsigned byte.
    pub fn write_u8(&mut self, value: u8) -> Result<&mut Self, WireError> {
        self.write_bytes(&[value])
    }

    /// Write a big-endian unsigned 16-bit integer.
    pub fn write_u16(&mut self, value: u16) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian signed 32-bit integer.
    pub fn write_i32(&mut self, value: i32) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian unsigned 32-bit integer.
    pub fn write_u32(&mut self, value: u32) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian signed 64-bit integer.
    pub fn write_i64(&mut self, value: i64) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian unsigned 64-bit integer.
    pub fn write_u64(&mut self, value: u64) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian IEEE-754 single.
    pub fn write_f32(&mut self, value: f32) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Write a big-endian IEEE-754 double.
    pub fn write_f64(&mut self, value: f64) -> Result<&mut Self, WireError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Encode a base-128 varint, seven bits per byte, continuation bit
    /// on every byte but the last.
    ///
    /// The full encoded length is checked up front, so a failed write
    /// leaves the buffer unchanged.
    pub fn write_var_int(&mut self, value: u32) -> Result<&mut Self, WireError> {
        self.check_write(var_int_len(value))?;
        let mut value = value;
        loop {
            let bits = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                return self.write_u8(bits);
            }
            self.write_u8(bits | 0x80)?;
        }
    }

    /// Write a string as raw UTF-8 bytes, no length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<&mut Self, WireError> {
        self.write_bytes(value.as_bytes())
    }
}

impl Default for ByteCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of bytes `value` occupies as a varint.
#[must_use]
pub fn var_int_len(value: u32) -> usize {
    let mut value = value;
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}
