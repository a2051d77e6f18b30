// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! The serialization engine.
//!
//! The encoder writes the SSZ two-region layout in a single pass: a
//! schema's `*_offset` calls emit the fixed region (inline statics and
//! little-endian offsets) while the running offset tracks where each
//! dynamic field's content will land, and the subsequent `*_content`
//! calls emit the variable region in the same order. Descending into a
//! nested dynamic item suspends the running offset on a stack.

use core::fmt;
use std::io::Write;

use smallvec::SmallVec;
use ssz_primitives::U256;

use crate::error::Error;
use crate::fork::Fork;
use crate::object::Sizer;
use crate::pool::Reusable;

/// The sink an encoder writes to.
pub enum Output<'a> {
    /// An arbitrary stream; contents are written as produced.
    Stream(&'a mut dyn Write),
    /// A caller-owned buffer with a write cursor.
    Buffer {
        /// The target buffer
        buf: &'a mut [u8],
        /// Bytes written so far
        pos: usize,
    },
}

impl fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stream(_) => f.debug_tuple("Stream").finish(),
            Output::Buffer { buf, pos } => f
                .debug_struct("Buffer")
                .field("len", &buf.len())
                .field("pos", pos)
                .finish(),
        }
    }
}

/// Reusable encoder state: the scratch buffer and dynamics stack an
/// [`Encoder`] works over. The built-in entry points draw these from a
/// process-wide pool; custom engine setups can own one directly.
#[derive(Debug, Default)]
pub struct EncoderState {
    /// Conversion scratch for packing integers before writing
    scratch: [u8; 32],
    /// Offset where the next dynamic field's content will land
    offset: u32,
    /// Offsets suspended while encoding nested dynamic items
    offsets: SmallVec<[u32; 8]>,
}

impl Reusable for EncoderState {
    fn reset(&mut self) {
        self.scratch = [0; 32];
        self.offset = 0;
        self.offsets.clear();
    }
}

/// The SSZ serialization engine, bound to one output for one operation.
#[derive(Debug)]
pub struct Encoder<'a> {
    out: Output<'a>,
    err: Option<Error>,
    fork: Fork,
    state: &'a mut EncoderState,
}

impl<'a> Encoder<'a> {
    /// Bind encoder state to an output for one encoding operation.
    pub fn bind(state: &'a mut EncoderState, out: Output<'a>, fork: Fork) -> Self {
        Self {
            out,
            err: None,
            fork,
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

    /// Record a failure; the first one sticks and every later write is a
    /// no-op.
    pub(crate) fn set_err(&mut self, err: Error) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// The recorded failure, consuming the sticky slot.
    pub(crate) fn take_result(&mut self) -> Result<(), Error> {
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        write_to(&mut self.out, &mut self.err, bytes);
    }

    /// Serialize a boolean as a single `0x00` or `0x01` byte.
    pub fn encode_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    /// Serialize a uint8.
    pub fn encode_uint8(&mut self, v: u8) {
        self.write(&[v]);
    }

    /// Serialize a uint16 little-endian.
    pub fn encode_uint16(&mut self, v: u16) {
        self.write(&v.to_le_bytes());
    }

    /// Serialize a uint32 little-endian.
    pub fn encode_uint32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// Serialize a uint64 little-endian.
    pub fn encode_uint64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    /// Serialize a 256-bit integer as 32 little-endian bytes.
    pub fn encode_uint256(&mut self, v: &U256) {
        self.state.scratch = v.to_le_bytes::<32>();
        write_to(&mut self.out, &mut self.err, &self.state.scratch);
    }

    /// Serialize a blob of bytes verbatim: fixed byte arrays, checked
    /// bytes, bitfield bytes and dynamic blob contents all reduce to this.
    pub fn encode_bytes(&mut self, blob: &[u8]) {
        self.write(blob);
    }

    /// Serialize a run of uint64s little-endian, packed through the
    /// scratch buffer to batch stream writes.
    pub fn encode_uint64s(&mut self, values: &[u64]) {
        for batch in values.chunks(4) {
            for (i, v) in batch.iter().enumerate() {
                self.state.scratch[i * 8..i * 8 + 8].copy_from_slice(&v.to_le_bytes());
            }
            write_to(
                &mut self.out,
                &mut self.err,
                &self.state.scratch[..batch.len() * 8],
            );
        }
    }

    /// Serialize the running offset and advance it past a dynamic field's
    /// content. Offset arithmetic wraps at 32 bits; oversized messages are
    /// rejected by the decoder, not here.
    pub fn encode_offset(&mut self, content_size: u32) {
        let offset = self.state.offset;
        self.write(&offset.to_le_bytes());
        self.state.offset = offset.wrapping_add(content_size);
    }

    /// Open a dynamic layout: suspend the running offset and restart it at
    /// the container's fixed size.
    pub(crate) fn start_dynamics(&mut self, fixed_size: u32) {
        let offset = self.state.offset;
        self.state.offsets.push(offset);
        self.state.offset = fixed_size;
    }

    /// Close the innermost dynamic layout, restoring the suspended offset.
    pub(crate) fn finish_dynamics(&mut self) {
        self.state.offset = self.state.offsets.pop().unwrap_or(0);
    }
}

fn write_to(out: &mut Output<'_>, err: &mut Option<Error>, bytes: &[u8]) {
    if err.is_some() {
        return;
    }
    match out {
        Output::Stream(w) => {
            if let Err(io) = w.write_all(bytes) {
                *err = Some(Error::Io(io));
            }
        }
        Output::Buffer { buf, pos } => {
            let end = *pos + bytes.len();
            if end > buf.len() {
                *err = Some(Error::BufferTooSmall {
                    len: buf.len(),
                    expected: end,
                });
                return;
            }
            buf[*pos..end].copy_from_slice(bytes);
            *pos = end;
        }
    }
}
