// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Error taxonomy surfaced at the codec boundary.
//!
//! The set is closed: every decode rejection maps to exactly one of these
//! kinds, so callers can branch on the failure without string matching.
//! Errors are sticky on the engines; after the first failure every further
//! codec operation is a no-op and the public entry point returns the
//! recorded error.

use thiserror::Error;

/// Returned when encoding, decoding or an I/O target fails.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O read returned fewer bytes than requested.
    #[error("unexpected EOF: have {len} bytes, need {expected}")]
    UnexpectedEOF {
        /// Bytes actually available
        len: usize,
        /// Bytes requested
        expected: usize,
    },

    /// The encode target is narrower than the object's serialized size.
    #[error("buffer too small: have {len} bytes, need {expected}")]
    BufferTooSmall {
        /// Capacity of the provided buffer
        len: usize,
        /// Serialized size of the object
        expected: usize,
    },

    /// The bytes consumed by a decoded object differ from its slot size.
    #[error("object size mismatch: consumed {len} bytes of a {expected} byte slot")]
    ObjectSlotSizeMismatch {
        /// Bytes consumed
        len: usize,
        /// Slot size in bytes
        expected: usize,
    },

    /// The first offset of a container does not point at the end of its
    /// fixed region.
    #[error("first offset {offset} does not match the fixed size {fixed}")]
    FirstOffsetMismatch {
        /// Parsed first offset
        offset: u32,
        /// Fixed-region width of the container
        fixed: u32,
    },

    /// Successive offsets within a container decreased.
    #[error("offset {offset} is smaller than the previous offset {previous}")]
    BadOffsetProgression {
        /// Parsed offset
        offset: u32,
        /// Offset parsed before it
        previous: u32,
    },

    /// An offset points past the end of the enclosing message.
    #[error("offset {offset} is beyond the message capacity {capacity}")]
    OffsetBeyondCapacity {
        /// Parsed offset
        offset: u32,
        /// Length cap of the enclosing message
        capacity: u32,
    },

    /// The counter offset of a list of variable-size items is zero.
    #[error("zero counter offset at the start of a dynamic list")]
    ZeroCounterOffset,

    /// The counter offset of a list of variable-size items is not a
    /// multiple of the offset width.
    #[error("counter offset {offset} is not a multiple of 4")]
    BadCounterOffset {
        /// Parsed counter offset
        offset: u32,
    },

    /// Fewer than four bytes remain where a list counter offset is due.
    #[error("short counter offset: only {len} bytes left in the slot")]
    ShortCounterOffset {
        /// Bytes left in the slot
        len: usize,
    },

    /// A decoded item count exceeds the declared maximum.
    #[error("too many items: decoded {decoded}, maximum {max}")]
    MaxItemsExceeded {
        /// Decoded item count
        decoded: u64,
        /// Declared maximum
        max: u64,
    },

    /// A decoded blob length exceeds the declared maximum.
    #[error("blob too long: decoded {decoded} bytes, maximum {max}")]
    MaxLengthExceeded {
        /// Decoded byte length
        decoded: u64,
        /// Declared maximum
        max: u64,
    },

    /// A list of static items has a byte length that is not a multiple of
    /// the item size.
    #[error("dynamic slot of {length} bytes is not divisible by the {size} byte item size")]
    DynamicStaticsIndivisible {
        /// Byte length of the list slot
        length: u32,
        /// Encoded size of one item
        size: u32,
    },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {value:#04x}")]
    InvalidBoolean {
        /// The offending byte
        value: u8,
    },

    /// The underlying stream failed.
    #[error("io failure")]
    Io(#[from] std::io::Error),
}
