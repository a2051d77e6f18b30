// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! The deserialization engine.
//!
//! Decoding mirrors encoding: a schema's `*_offset` calls parse and
//! validate the fixed region while the `*_content` calls consume the
//! variable region, with each content length computed as the gap to the
//! next offset (or to the end of the enclosing slot for the last one).
//! Descending into a nested dynamic slot narrows the length cap; the
//! `descend`/`ascend` pair verifies the slot was consumed exactly.

use core::fmt;
use std::io::Read;

use smallvec::SmallVec;
use ssz_primitives::U256;

use crate::bitfield::{self, BitList, BitVector, bytes_for_bit_len};
use crate::error::Error;
use crate::fork::Fork;
use crate::object::Sizer;
use crate::pool::Reusable;

/// The source a decoder reads from.
pub enum Input<'a> {
    /// An arbitrary stream; bytes are consumed strictly in wire order.
    Stream(&'a mut dyn Read),
    /// A caller-owned byte slice with a read cursor.
    Buffer {
        /// The source bytes
        buf: &'a [u8],
        /// Bytes consumed so far
        pos: usize,
    },
}

impl fmt::Debug for Input<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stream(_) => f.debug_tuple("Stream").finish(),
            Input::Buffer { buf, pos } => f
                .debug_struct("Buffer")
                .field("len", &buf.len())
                .field("pos", pos)
                .finish(),
        }
    }
}

/// One suspended dynamic container: where it starts, how wide its fixed
/// region is, and which parsed offsets belong to it.
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    /// Absolute position where the container's encoding begins
    start: u32,
    /// Declared fixed-region width
    fixed: u32,
    /// Index into the offsets list where this frame's offsets begin
    mark: u32,
    /// Content slots consumed so far
    consumed: u32,
}

/// Reusable decoder state: the scratch buffer, parsed offsets and frame
/// stacks a [`Decoder`] works over. The built-in entry points draw these
/// from a process-wide pool; custom engine setups can own one directly.
#[derive(Debug, Default)]
pub struct DecoderState {
    /// Landing buffer for primitive reads
    scratch: [u8; 32],
    /// Parsed absolute offsets of all open frames
    offsets: SmallVec<[u32; 16]>,
    /// Stack of suspended dynamic containers
    frames: SmallVec<[Frame; 4]>,
    /// Suspended `(outer cap, slot start)` pairs
    caps: SmallVec<[(u32, u32); 4]>,
}

impl Reusable for DecoderState {
    fn reset(&mut self) {
        self.scratch = [0; 32];
        self.offsets.clear();
        self.frames.clear();
        self.caps.clear();
    }
}

/// The SSZ deserialization engine, bound to one input for one operation.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: Input<'a>,
    err: Option<Error>,
    fork: Fork,
    /// Absolute bytes consumed since the start of the message
    pos: u32,
    /// Absolute end of the current dynamic slot (the message end at the
    /// top level)
    length: u32,
    state: &'a mut DecoderState,
}

impl<'a> Decoder<'a> {
    /// Bind decoder state to an input for one decoding operation over a
    /// message of `length` bytes.
    pub fn bind(state: &'a mut DecoderState, input: Input<'a>, fork: Fork, length: u32) -> Self {
        Self {
            input,
            err: None,
            fork,
            pos: 0,
            length,
            state,
        }
    }

    /// The fork the operation runs under.
    pub fn fork(&self) -> Fork {
        self.fork
    }

    /// A sizing context for the operation's fork.
    pub fn sizer(&self) -> Sizer {
        Sizer::new(self.fork)
    }

    /// Record a failure; the first one sticks and every later read is a
    /// no-op.
    pub(crate) fn set_err(&mut self, err: Error) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Whether a failure has been recorded.
    pub(crate) fn failed(&self) -> bool {
        self.err.is_some()
    }

    /// The recorded failure, consuming the sticky slot.
    pub(crate) fn take_result(&mut self) -> Result<(), Error> {
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Bytes consumed so far.
    pub(crate) fn consumed(&self) -> u32 {
        self.pos
    }

    /// Absolute end of the current slot.
    pub(crate) fn cap(&self) -> u32 {
        self.length
    }

    /// Read exactly `out.len()` bytes into `out`.
    pub(crate) fn read_bytes(&mut self, out: &mut [u8]) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            out,
        );
    }

    /// Deserialize a boolean, rejecting any byte other than 0 and 1.
    pub fn decode_bool(&mut self, v: &mut bool) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..1],
        );
        if self.err.is_some() {
            return;
        }
        match self.state.scratch[0] {
            0 => *v = false,
            1 => *v = true,
            value => self.set_err(Error::InvalidBoolean { value }),
        }
    }

    /// Deserialize a uint8.
    pub fn decode_uint8(&mut self, v: &mut u8) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..1],
        );
        if self.err.is_none() {
            *v = self.state.scratch[0];
        }
    }

    /// Deserialize a little-endian uint16.
    pub fn decode_uint16(&mut self, v: &mut u16) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..2],
        );
        if self.err.is_none() {
            *v = u16::from_le_bytes(self.state.scratch[..2].try_into().expect("two bytes"));
        }
    }

    /// Deserialize a little-endian uint32.
    pub fn decode_uint32(&mut self, v: &mut u32) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..4],
        );
        if self.err.is_none() {
            *v = u32::from_le_bytes(self.state.scratch[..4].try_into().expect("four bytes"));
        }
    }

    /// Deserialize a little-endian uint64.
    pub fn decode_uint64(&mut self, v: &mut u64) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..8],
        );
        if self.err.is_none() {
            *v = u64::from_le_bytes(self.state.scratch[..8].try_into().expect("eight bytes"));
        }
    }

    /// Deserialize a 256-bit integer from 32 little-endian bytes.
    pub fn decode_uint256(&mut self, v: &mut U256) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch,
        );
        if self.err.is_none() {
            *v = U256::from_le_bytes::<32>(self.state.scratch);
        }
    }

    /// Deserialize a blob of exactly `size` bytes, growing the target in
    /// place so its capacity is reused across operations.
    pub fn decode_checked_bytes(&mut self, blob: &mut Vec<u8>, size: u32) {
        if self.err.is_some() {
            return;
        }
        blob.resize(size as usize, 0);
        self.read_bytes(&mut blob[..]);
    }

    /// Deserialize a run of little-endian uint64s, batched through the
    /// scratch buffer.
    pub fn decode_uint64s(&mut self, values: &mut [u64]) {
        for batch in values.chunks_mut(4) {
            let len = batch.len() * 8;
            read_from(
                &mut self.input,
                &mut self.err,
                &mut self.pos,
                self.length,
                &mut self.state.scratch[..len],
            );
            if self.err.is_some() {
                return;
            }
            for (i, v) in batch.iter_mut().enumerate() {
                *v = u64::from_le_bytes(
                    self.state.scratch[i * 8..i * 8 + 8]
                        .try_into()
                        .expect("eight bytes"),
                );
            }
        }
    }

    /// Deserialize a fixed-length bit vector, rejecting set bits past `N`.
    pub fn decode_array_of_bits<const N: usize>(&mut self, bits: &mut BitVector<N>) {
        if self.err.is_some() {
            return;
        }
        let mut raw: SmallVec<[u8; 128]> = SmallVec::from_elem(0, bytes_for_bit_len(N));
        self.read_bytes(&mut raw);
        if self.err.is_some() {
            return;
        }
        match BitVector::<N>::from_ssz_bytes(&raw) {
            Ok(decoded) => *bits = decoded,
            Err(err) => self.set_err(map_bitfield_err(err, N as u64)),
        }
    }

    /// Deserialize a bit list occupying `len` bytes of the variable
    /// region, capped at `N` meaningful bits.
    pub(crate) fn decode_bitlist_content<const N: usize>(
        &mut self,
        bits: &mut BitList<N>,
        len: u32,
    ) {
        if self.err.is_some() {
            return;
        }
        let max_bytes = bytes_for_bit_len(N + 1);
        if len as usize > max_bytes {
            self.set_err(Error::MaxLengthExceeded {
                decoded: len as u64,
                max: max_bytes as u64,
            });
            return;
        }
        let mut raw: SmallVec<[u8; 128]> = SmallVec::from_elem(0, len as usize);
        self.read_bytes(&mut raw);
        if self.err.is_some() {
            return;
        }
        match BitList::<N>::from_ssz_bytes(&raw) {
            Ok(decoded) => *bits = decoded,
            Err(err) => self.set_err(map_bitfield_err(err, N as u64)),
        }
    }

    /// Open a dynamic layout whose fixed region is `fixed` bytes wide.
    pub(crate) fn start_dynamics(&mut self, fixed: u32) {
        self.state.frames.push(Frame {
            start: self.pos,
            fixed,
            mark: self.state.offsets.len() as u32,
            consumed: 0,
        });
    }

    /// Close the innermost dynamic layout, discarding its offsets.
    pub(crate) fn finish_dynamics(&mut self) {
        if let Some(frame) = self.state.frames.pop() {
            self.state.offsets.truncate(frame.mark as usize);
        }
    }

    /// Parse and validate one offset of the innermost dynamic container.
    pub fn decode_offset(&mut self) {
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..4],
        );
        if self.err.is_some() {
            return;
        }
        let rel = u32::from_le_bytes(self.state.scratch[..4].try_into().expect("four bytes"));
        let frame = *self
            .state
            .frames
            .last()
            .expect("offset decoded outside a dynamic container");

        let capacity = self.length - frame.start;
        if rel > capacity {
            self.set_err(Error::OffsetBeyondCapacity {
                offset: rel,
                capacity,
            });
            return;
        }
        let abs = frame.start + rel;

        if self.state.offsets.len() as u32 == frame.mark {
            if rel != frame.fixed {
                self.set_err(Error::FirstOffsetMismatch {
                    offset: rel,
                    fixed: frame.fixed,
                });
                return;
            }
        } else {
            let previous = *self.state.offsets.last().expect("prior offset exists");
            if abs < previous {
                self.set_err(Error::BadOffsetProgression {
                    offset: rel,
                    previous: previous - frame.start,
                });
                return;
            }
        }
        self.state.offsets.push(abs);
    }

    /// The byte length of the next content slot of the innermost dynamic
    /// container: the gap to the following offset, or to the slot end for
    /// the last content.
    pub(crate) fn content_slot(&mut self) -> Option<u32> {
        if self.err.is_some() {
            return None;
        }
        let fi = self
            .state
            .frames
            .len()
            .checked_sub(1)
            .expect("content decoded outside a dynamic container");
        let frame = self.state.frames[fi];
        let idx = (frame.mark + frame.consumed) as usize;
        assert!(
            idx < self.state.offsets.len(),
            "content decoded before its offset"
        );
        let start = self.state.offsets[idx];
        let end = if idx + 1 < self.state.offsets.len() {
            self.state.offsets[idx + 1]
        } else {
            self.length
        };
        self.state.frames[fi].consumed += 1;

        // A gap here means an earlier content did not consume exactly its
        // declared slot.
        if self.pos != start {
            self.set_err(Error::ObjectSlotSizeMismatch {
                len: (self.pos - frame.start) as usize,
                expected: (start - frame.start) as usize,
            });
            return None;
        }
        Some(end - start)
    }

    /// Narrow the length cap to a nested slot of `len` bytes.
    pub(crate) fn descend_slot(&mut self, len: u32) {
        self.state.caps.push((self.length, self.pos));
        self.length = self.pos + len;
    }

    /// Restore the outer cap, verifying the slot was consumed exactly.
    pub(crate) fn ascend_slot(&mut self) {
        let (outer, start) = self.state.caps.pop().unwrap_or((self.length, 0));
        if self.err.is_none() && self.pos != self.length {
            self.set_err(Error::ObjectSlotSizeMismatch {
                len: (self.pos - start) as usize,
                expected: (self.length - start) as usize,
            });
        }
        self.length = outer;
    }

    /// Parse the offset table of a list of variable-size items occupying
    /// `slot_len` bytes. The first offset doubles as the item counter.
    /// Returns the item count; the caller decodes that many content slots
    /// and then closes the dynamics frame this opens.
    pub(crate) fn decode_item_offsets(&mut self, slot_len: u32, max_items: u64) -> Option<usize> {
        if self.err.is_some() {
            return None;
        }
        if slot_len == 0 {
            return Some(0);
        }
        if slot_len < 4 {
            self.set_err(Error::ShortCounterOffset {
                len: slot_len as usize,
            });
            return None;
        }
        let start = self.pos;
        read_from(
            &mut self.input,
            &mut self.err,
            &mut self.pos,
            self.length,
            &mut self.state.scratch[..4],
        );
        if self.err.is_some() {
            return None;
        }
        let counter = u32::from_le_bytes(self.state.scratch[..4].try_into().expect("four bytes"));
        if counter == 0 {
            self.set_err(Error::ZeroCounterOffset);
            return None;
        }
        if counter % 4 != 0 {
            self.set_err(Error::BadCounterOffset { offset: counter });
            return None;
        }
        let items = counter / 4;
        if items as u64 > max_items {
            self.set_err(Error::MaxItemsExceeded {
                decoded: items as u64,
                max: max_items,
            });
            return None;
        }
        if counter > slot_len {
            self.set_err(Error::OffsetBeyondCapacity {
                offset: counter,
                capacity: slot_len,
            });
            return None;
        }

        self.state.frames.push(Frame {
            start,
            fixed: counter,
            mark: self.state.offsets.len() as u32,
            consumed: 0,
        });
        self.state.offsets.push(start + counter);
        for _ in 1..items {
            self.decode_offset();
        }
        Some(items as usize)
    }

    /// Validate the byte length of a list of static items against the
    /// item size and cap, returning the item count.
    pub(crate) fn check_static_items(
        &mut self,
        slot_len: u32,
        item_size: u32,
        max_items: u64,
    ) -> Option<usize> {
        if self.err.is_some() {
            return None;
        }
        if slot_len == 0 {
            return Some(0);
        }
        if item_size == 0 || slot_len % item_size != 0 {
            self.set_err(Error::DynamicStaticsIndivisible {
                length: slot_len,
                size: item_size,
            });
            return None;
        }
        let items = slot_len / item_size;
        if items as u64 > max_items {
            self.set_err(Error::MaxItemsExceeded {
                decoded: items as u64,
                max: max_items,
            });
            return None;
        }
        Some(items as usize)
    }
}

fn read_from(
    input: &mut Input<'_>,
    err: &mut Option<Error>,
    pos: &mut u32,
    length: u32,
    out: &mut [u8],
) {
    if err.is_some() || out.is_empty() {
        return;
    }
    let want = out.len();
    let remaining = (length - *pos) as usize;
    if want > remaining {
        *err = Some(Error::UnexpectedEOF {
            len: remaining,
            expected: want,
        });
        return;
    }
    match input {
        Input::Stream(r) => match r.read_exact(out) {
            Ok(()) => {}
            Err(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                *err = Some(Error::UnexpectedEOF {
                    len: 0,
                    expected: want,
                });
                return;
            }
            Err(io) => {
                *err = Some(Error::Io(io));
                return;
            }
        },
        Input::Buffer { buf, pos: cursor } => {
            let avail = buf.len() - *cursor;
            if want > avail {
                *err = Some(Error::UnexpectedEOF {
                    len: avail,
                    expected: want,
                });
                return;
            }
            out.copy_from_slice(&buf[*cursor..*cursor + want]);
            *cursor += want;
        }
    }
    *pos += want as u32;
}

fn map_bitfield_err(err: bitfield::Error, max_bits: u64) -> Error {
    match err {
        bitfield::Error::OutOfBounds { i, .. } => Error::MaxItemsExceeded {
            decoded: i as u64,
            max: max_bits,
        },
        bitfield::Error::ExcessBits => Error::MaxItemsExceeded {
            decoded: max_bits + 1,
            max: max_bits,
        },
        // No sentinel bit means the encoding stopped short of one.
        bitfield::Error::MissingLengthInformation => Error::UnexpectedEOF {
            len: 0,
            expected: 1,
        },
        bitfield::Error::InvalidByteCount { given, expected } => Error::MaxLengthExceeded {
            decoded: given as u64,
            max: expected as u64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool;

    fn decode_from(bytes: &[u8], f: impl FnOnce(&mut Decoder<'_>)) -> Result<(), Error> {
        let mut state = pool::decoder_state();
        let mut dec = Decoder::bind(
            &mut state,
            Input::Buffer { buf: bytes, pos: 0 },
            Fork::Shanghai,
            bytes.len() as u32,
        );
        f(&mut dec);
        dec.take_result()
    }

    #[test]
    fn primitives() {
        let bytes = [1u8, 0x34, 0x12, 8, 7, 6, 5, 4, 3, 2, 1];
        decode_from(&bytes, |dec| {
            let mut flag = false;
            let mut short = 0u16;
            let mut long = 0u64;
            dec.decode_bool(&mut flag);
            dec.decode_uint16(&mut short);
            dec.decode_uint64(&mut long);
            assert!(flag);
            assert_eq!(short, 0x1234);
            assert_eq!(long, 0x0102_0304_0506_0708);
        })
        .unwrap();
    }

    #[test]
    fn invalid_boolean() {
        let err = decode_from(&[2u8], |dec| {
            let mut flag = false;
            dec.decode_bool(&mut flag);
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBoolean { value: 2 }));
    }

    #[test]
    fn short_read() {
        let err = decode_from(&[0u8; 3], |dec| {
            let mut v = 0u64;
            dec.decode_uint64(&mut v);
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEOF {
                len: 3,
                expected: 8
            }
        ));
    }

    #[test]
    fn first_offset_must_match_fixed_size() {
        // One dynamic field: fixed region is a single 4-byte offset.
        let bytes = [5u8, 0, 0, 0, 0xaa];
        let err = decode_from(&bytes, |dec| {
            dec.start_dynamics(4);
            dec.decode_offset();
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::FirstOffsetMismatch { offset: 5, fixed: 4 }
        ));
    }

    #[test]
    fn offsets_must_not_decrease() {
        let bytes = [8u8, 0, 0, 0, 7, 0, 0, 0, 0xaa];
        let err = decode_from(&bytes, |dec| {
            dec.start_dynamics(8);
            dec.decode_offset();
            dec.decode_offset();
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::BadOffsetProgression {
                offset: 7,
                previous: 8
            }
        ));
    }

    #[test]
    fn offset_beyond_capacity() {
        let bytes = [9u8, 0, 0, 0];
        let err = decode_from(&bytes, |dec| {
            dec.start_dynamics(4);
            dec.decode_offset();
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::OffsetBeyondCapacity {
                offset: 9,
                capacity: 4
            }
        ));
    }

    #[test]
    fn content_gaps() {
        // Two dynamic fields of 2 and 3 bytes after an 8-byte fixed region.
        let bytes = [8u8, 0, 0, 0, 10, 0, 0, 0, 0xaa, 0xbb, 0xcc, 0xdd, 0xee];
        decode_from(&bytes, |dec| {
            dec.start_dynamics(8);
            dec.decode_offset();
            dec.decode_offset();
            let first = dec.content_slot().unwrap();
            assert_eq!(first, 2);
            let mut blob = Vec::new();
            dec.decode_checked_bytes(&mut blob, first);
            assert_eq!(blob, vec![0xaa, 0xbb]);
            let second = dec.content_slot().unwrap();
            assert_eq!(second, 3);
            dec.decode_checked_bytes(&mut blob, second);
            assert_eq!(blob, vec![0xcc, 0xdd, 0xee]);
            dec.finish_dynamics();
        })
        .unwrap();
    }

    #[test]
    fn zero_counter_offset() {
        let bytes = [0u8, 0, 0, 0];
        let err = decode_from(&bytes, |dec| {
            dec.decode_item_offsets(4, 16);
        })
        .unwrap_err();
        assert!(matches!(err, Error::ZeroCounterOffset));
    }

    #[test]
    fn misaligned_counter_offset() {
        let bytes = [6u8, 0, 0, 0, 0, 0];
        let err = decode_from(&bytes, |dec| {
            dec.decode_item_offsets(6, 16);
        })
        .unwrap_err();
        assert!(matches!(err, Error::BadCounterOffset { offset: 6 }));
    }

    #[test]
    fn short_counter_offset() {
        let bytes = [4u8, 0, 0];
        let err = decode_from(&bytes, |dec| {
            dec.decode_item_offsets(3, 16);
        })
        .unwrap_err();
        assert!(matches!(err, Error::ShortCounterOffset { len: 3 }));
    }

    #[test]
    fn counter_item_cap() {
        let bytes = [8u8, 0, 0, 0, 8, 0, 0, 0];
        let err = decode_from(&bytes, |dec| {
            dec.decode_item_offsets(8, 1);
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MaxItemsExceeded { decoded: 2, max: 1 }
        ));
    }

    #[test]
    fn static_item_divisibility() {
        let err = decode_from(&[], |dec| {
            dec.check_static_items(44, 8, 1024);
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DynamicStaticsIndivisible {
                length: 44,
                size: 8
            }
        ));
    }

    #[test]
    fn slot_must_be_consumed_exactly() {
        let bytes = [0xaa, 0xbb, 0xcc];
        let err = decode_from(&bytes, |dec| {
            dec.descend_slot(3);
            let mut blob = Vec::new();
            dec.decode_checked_bytes(&mut blob, 2);
            dec.ascend_slot();
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ObjectSlotSizeMismatch {
                len: 2,
                expected: 3
            }
        ));
    }
}
