//! Error types for the Alder wire codec.

use thiserror::Error;

/// Wire-level errors.
///
/// Every decode failure carries enough context (offending offset,
/// expected vs. available length) to diagnose a wire-compatibility
/// break against the server's encoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Read past the valid region of the buffer
    #[error("buffer underflow at offset {offset}: requested {requested}, {available} available")]
    BufferUnderflow {
        /// Cursor position when the read was attempted
        offset: usize,
        /// Bytes the operation needed
        requested: usize,
        /// Bytes left before the limit
        available: usize,
    },

    /// Write past the fixed capacity of the buffer
    #[error("capacity exceeded: capacity {capacity}, write would need {requested}")]
    CapacityExceeded {
        /// Total capacity of the buffer
        capacity: usize,
        /// Bytes the buffer would need to hold
        requested: usize,
    },

    /// Absolute-range read with `end < start` or `end` past the limit
    #[error("invalid read range: {start}..{end}")]
    InvalidRange {
        /// Requested range start
        start: usize,
        /// Requested range end
        end: usize,
    },

    /// Varint ran past five groups or set bits above 32
    #[error("varint exceeds 32-bit range")]
    VarIntOverflow,

    /// Tag byte not valid in this position
    #[error("unexpected tag: 0x{0:02X}")]
    UnexpectedTag(u8),

    /// Token index outside the shared dictionary
    #[error("unknown token index: {0}")]
    UnknownToken(u8),

    /// Node list with a declared size of zero
    #[error("node list declared empty")]
    EmptyNode,

    /// String bytes are not valid UTF-8
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Cursor position where the string started
        offset: usize,
    },

    /// Input continues past the end of the root node
    #[error("trailing bytes after root node: consumed {consumed} of {limit}")]
    TrailingBytes {
        /// Bytes consumed by the root node
        consumed: usize,
        /// Total bytes in the input
        limit: usize,
    },

    /// Value too large for any length encoding of this format
    #[error("length {0} not representable in the wire format")]
    LengthOverflow(usize),
}
