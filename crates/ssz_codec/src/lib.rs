// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Schema-driven encoding, decoding and Merkle hashing in the
//! SimpleSerialize (SSZ) format designed for use in Ethereum 2.0.
//!
//! Adheres to the Ethereum 2.0 [SSZ
//! specification](https://github.com/ethereum/eth2.0-specs/blob/v0.12.1/ssz/simple-serialize.md).
//!
//! A type publishes one field-by-field schema via [`SszObject`] and gets
//! all three operations from it: adding or reordering a field changes
//! encode, decode and hash together.
//!
//! ```rust
//! use ssz_codec::{Address, Codec, Fork, Sizer, SszObject, StaticObject};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Withdrawal {
//!     index: u64,
//!     validator: u64,
//!     address: Address,
//!     amount: u64,
//! }
//!
//! impl SszObject for Withdrawal {
//!     const STATIC: bool = true;
//!
//!     fn size_ssz(&self, _sizer: &Sizer, _fixed: bool) -> u32 {
//!         8 + 8 + 20 + 8
//!     }
//!
//!     fn define_ssz(&mut self, codec: &mut Codec<'_>) {
//!         codec.define_uint64(&mut self.index);
//!         codec.define_uint64(&mut self.validator);
//!         codec.define_static_bytes(&mut self.address);
//!         codec.define_uint64(&mut self.amount);
//!     }
//! }
//!
//! impl StaticObject for Withdrawal {}
//!
//! let mut obj = Withdrawal::default();
//! let bytes = ssz_codec::encode_to_vec(&mut obj, Fork::Shanghai).unwrap();
//! assert_eq!(bytes.len(), 44);
//!
//! let mut decoded = Withdrawal::default();
//! ssz_codec::decode_from_bytes(&bytes, &mut decoded, Fork::Shanghai).unwrap();
//! assert_eq!(decoded, obj);
//!
//! let root = ssz_codec::hash_sequential(&mut obj, Fork::Shanghai);
//! assert_eq!(
//!     root.to_string(),
//!     "0xdb56114e00fdd4c1f85c892bf35ac9a89289aaecb1ebd0a96cde606a748b5d71"
//! );
//! ```
//!
//! Dynamic containers split every variable field into an `*_offset` call
//! (fixed region) and an `*_content` call (variable region); see the
//! [`codec`] module docs for the ordering contract.

#[cfg(test)]
use criterion as _;
#[cfg(test)]
use hex as _;
#[cfg(test)]
use rand as _;

use std::io::{Read, Write};

pub mod bitfield;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fork;
pub mod hasher;
mod object;
mod pool;
pub mod size;

pub use bitfield::{BitList, BitVector, Bitfield, Error as BitfieldError, Fixed, Variable};
pub use codec::{Codec, Engine};
pub use decoder::{Decoder, DecoderState, Input};
pub use encoder::{Encoder, EncoderState, Output};
pub use error::Error;
pub use fork::{Fork, ForkFilter, ParseForkError};
pub use hasher::{BYTES_PER_CHUNK, Hasher, ZERO_SUBTREE_ROOTS};
pub use object::{DynamicObject, Sizer, SszObject, StaticObject};
pub use size::BYTES_PER_LENGTH_OFFSET;
pub use ssz_primitives::{Address, Bloom, FixedBytes, Hash256, U128, U256};

/// Serialized size of an object under the given fork. For dynamic
/// objects this is the total width, fixed and variable regions both.
pub fn size_ssz<T: SszObject>(obj: &T, fork: Fork) -> u32 {
    obj.size_ssz(&Sizer::new(fork), false)
}

/// Serialize an object into a stream.
pub fn encode_to_stream<T: SszObject>(
    writer: &mut dyn Write,
    obj: &mut T,
    fork: Fork,
) -> Result<(), Error> {
    let mut state = pool::encoder_state();
    let encoder = Encoder::bind(&mut state, Output::Stream(writer), fork);
    let mut codec = Codec::with_engine(Engine::Encode(encoder));
    codec.run_encode(obj)
}

/// Serialize an object into a caller-owned buffer at least
/// [`size_ssz`] bytes wide.
pub fn encode_to_bytes<T: SszObject>(buf: &mut [u8], obj: &mut T, fork: Fork) -> Result<(), Error> {
    let size = size_ssz(obj, fork) as usize;
    if buf.len() < size {
        return Err(Error::BufferTooSmall {
            len: buf.len(),
            expected: size,
        });
    }
    let mut state = pool::encoder_state();
    let encoder = Encoder::bind(&mut state, Output::Buffer { buf, pos: 0 }, fork);
    let mut codec = Codec::with_engine(Engine::Encode(encoder));
    codec.run_encode(obj)
}

/// Convenience: serialize an object into a freshly allocated vector.
pub fn encode_to_vec<T: SszObject>(obj: &mut T, fork: Fork) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; size_ssz(obj, fork) as usize];
    encode_to_bytes(&mut out, obj, fork)?;
    Ok(out)
}

/// Deserialize an object from a byte slice, which must hold exactly one
/// serialized object.
pub fn decode_from_bytes<T: SszObject>(bytes: &[u8], obj: &mut T, fork: Fork) -> Result<(), Error> {
    let Ok(length) = u32::try_from(bytes.len()) else {
        return Err(Error::MaxLengthExceeded {
            decoded: bytes.len() as u64,
            max: u32::MAX as u64,
        });
    };
    let mut state = pool::decoder_state();
    let decoder = Decoder::bind(&mut state, Input::Buffer { buf: bytes, pos: 0 }, fork, length);
    let mut codec = Codec::with_engine(Engine::Decode(decoder));
    codec.run_decode(obj)
}

/// Deserialize an object from a stream carrying exactly `size` bytes of
/// SSZ data. SSZ is not self-describing, so the caller supplies the size.
pub fn decode_from_stream<T: SszObject>(
    reader: &mut dyn Read,
    obj: &mut T,
    size: u32,
    fork: Fork,
) -> Result<(), Error> {
    let mut state = pool::decoder_state();
    let decoder = Decoder::bind(&mut state, Input::Stream(reader), fork, size);
    let mut codec = Codec::with_engine(Engine::Decode(decoder));
    codec.run_decode(obj)
}

/// Compute the SSZ hash tree root of an object on the calling thread.
pub fn hash_sequential<T: SszObject>(obj: &mut T, fork: Fork) -> Hash256 {
    let mut hasher = pool::hasher();
    hasher.bind(fork, false);
    let mut codec = Codec::with_engine(Engine::Hash(&mut hasher));
    codec.run_hash(obj)
}

/// Compute the SSZ hash tree root, fanning large slices of static
/// objects out to worker threads. The result is identical to
/// [`hash_sequential`].
pub fn hash_concurrent<T: SszObject>(obj: &mut T, fork: Fork) -> Hash256 {
    let mut hasher = pool::hasher();
    hasher.bind(fork, true);
    let mut codec = Codec::with_engine(Engine::Hash(&mut hasher));
    codec.run_hash(obj)
}
