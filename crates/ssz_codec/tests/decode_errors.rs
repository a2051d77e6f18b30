// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Malformed-input rejection, one error kind at a time.

use criterion as _;
use digest as _;
use hex as _;
use rand as _;
use sha2 as _;
use smallvec as _;
use ssz_primitives as _;
use thiserror as _;

use ssz_codec::size::{size_of_slice_of_dynamic_bytes, size_of_slice_of_uint64s};
use ssz_codec::{BitList, Codec, DynamicObject, Error, Fork, Sizer, SszObject, StaticObject};

/// A container holding a single list of variable-size blobs.
#[derive(Debug, Default, Clone, PartialEq)]
struct BlobList {
    blobs: Vec<Vec<u8>>,
}

const MAX_BLOBS: u64 = 16;
const MAX_BLOB_SIZE: u64 = 64;

impl SszObject for BlobList {
    const STATIC: bool = false;

    fn size_ssz(&self, _sizer: &Sizer, fixed: bool) -> u32 {
        if fixed {
            return 4;
        }
        4 + size_of_slice_of_dynamic_bytes(&self.blobs)
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_slice_of_dynamic_bytes_offset(&mut self.blobs, MAX_BLOBS, MAX_BLOB_SIZE);
        codec.define_slice_of_dynamic_bytes_content(&mut self.blobs, MAX_BLOBS, MAX_BLOB_SIZE);
    }
}

impl DynamicObject for BlobList {}

/// A container holding a single list of uint64s.
#[derive(Debug, Default, Clone, PartialEq)]
struct Uint64List {
    values: Vec<u64>,
}

const MAX_VALUES: u64 = 1024;

impl SszObject for Uint64List {
    const STATIC: bool = false;

    fn size_ssz(&self, _sizer: &Sizer, fixed: bool) -> u32 {
        if fixed {
            return 4;
        }
        4 + size_of_slice_of_uint64s(&self.values)
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_slice_of_uint64s_offset(&mut self.values, MAX_VALUES);
        codec.define_slice_of_uint64s_content(&mut self.values, MAX_VALUES);
    }
}

impl DynamicObject for Uint64List {}

/// A container holding a single bit list capped at 32 bits.
#[derive(Debug, Default, Clone, PartialEq)]
struct Votes {
    bits: BitList<32>,
}

impl SszObject for Votes {
    const STATIC: bool = false;

    fn size_ssz(&self, _sizer: &Sizer, fixed: bool) -> u32 {
        if fixed {
            return 4;
        }
        4 + self.bits.len() as u32 / 8 + 1
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_bitlist_offset(&mut self.bits);
        codec.define_bitlist_content(&mut self.bits);
    }
}

impl DynamicObject for Votes {}

#[derive(Debug, Default, Clone, PartialEq)]
struct Flag {
    on: bool,
}

impl SszObject for Flag {
    const STATIC: bool = true;

    fn size_ssz(&self, _sizer: &Sizer, _fixed: bool) -> u32 {
        1
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_bool(&mut self.on);
    }
}

impl StaticObject for Flag {}

fn decode<T: SszObject + Default>(bytes: &[u8]) -> Result<T, Error> {
    let mut obj = T::default();
    ssz_codec::decode_from_bytes(bytes, &mut obj, Fork::Shanghai)?;
    Ok(obj)
}

#[test]
fn zero_counter_offset() {
    // The list slot begins with a zero first offset.
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    let err = decode::<BlobList>(&bytes).unwrap_err();
    assert!(matches!(err, Error::ZeroCounterOffset));
}

#[test]
fn misaligned_counter_offset() {
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&[6, 0, 0, 0, 0, 0]);
    let err = decode::<BlobList>(&bytes).unwrap_err();
    assert!(matches!(err, Error::BadCounterOffset { offset: 6 }));
}

#[test]
fn short_counter_offset() {
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&[4, 0, 0]);
    let err = decode::<BlobList>(&bytes).unwrap_err();
    assert!(matches!(err, Error::ShortCounterOffset { len: 3 }));
}

#[test]
fn too_many_variable_items() {
    // 17 items against a cap of 16: counter offset of 68.
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&68u32.to_le_bytes());
    bytes.resize(4 + 68, 0);
    let err = decode::<BlobList>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::MaxItemsExceeded {
            decoded: 17,
            max: 16
        }
    ));
}

#[test]
fn oversized_blob_item() {
    // One item of 65 bytes against a 64-byte cap.
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(&[0xaa; 65]);
    let err = decode::<BlobList>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::MaxLengthExceeded {
            decoded: 65,
            max: 64
        }
    ));
}

#[test]
fn static_items_must_divide_evenly() {
    // 44 content bytes for 8-byte items.
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&[0u8; 44]);
    let err = decode::<Uint64List>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::DynamicStaticsIndivisible {
            length: 44,
            size: 8
        }
    ));
}

#[test]
fn too_many_static_items() {
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&vec![0u8; 8 * 1025]);
    let err = decode::<Uint64List>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::MaxItemsExceeded {
            decoded: 1025,
            max: 1024
        }
    ));
}

#[test]
fn over_length_bitlist() {
    // 33 meaningful bits against a 32-bit cap: four full bytes plus a
    // sentinel one bit further.
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0b0000_0011]);
    let err = decode::<Votes>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::MaxItemsExceeded {
            decoded: 33,
            max: 32
        }
    ));
}

#[test]
fn bitlist_round_trip_at_cap() {
    let mut votes = Votes {
        bits: BitList::<32>::with_capacity(32).unwrap(),
    };
    votes.bits.set(0, true).unwrap();
    votes.bits.set(31, true).unwrap();

    let bytes = ssz_codec::encode_to_vec(&mut votes, Fork::Shanghai).unwrap();
    let decoded: Votes = decode(&bytes).unwrap();
    assert_eq!(decoded, votes);
}

#[test]
fn invalid_boolean_byte() {
    let err = decode::<Flag>(&[2u8]).unwrap_err();
    assert!(matches!(err, Error::InvalidBoolean { value: 2 }));
}

#[test]
fn trailing_bytes_rejected() {
    let err = decode::<Flag>(&[1u8, 0]).unwrap_err();
    assert!(matches!(
        err,
        Error::ObjectSlotSizeMismatch {
            len: 1,
            expected: 2
        }
    ));
}

#[test]
fn truncated_input_rejected() {
    let err = decode::<Uint64List>(&[4u8, 0]).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEOF { .. }));
}

#[test]
fn first_offset_mismatch() {
    // Fixed size is 4 but the offset claims 8.
    let mut bytes = vec![8u8, 0, 0, 0];
    bytes.extend_from_slice(&[0u8; 8]);
    let err = decode::<Uint64List>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::FirstOffsetMismatch { offset: 8, fixed: 4 }
    ));
}

#[test]
fn offset_beyond_message() {
    let bytes = vec![40u8, 0, 0, 0];
    let err = decode::<Uint64List>(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::OffsetBeyondCapacity {
            offset: 40,
            capacity: 4
        }
    ));
}

#[test]
fn decreasing_item_offsets() {
    // Two items whose offsets run backwards.
    let mut bytes = vec![4u8, 0, 0, 0];
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(&6u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 4]);
    let err = decode::<BlobList>(&bytes).unwrap_err();
    assert!(matches!(err, Error::BadOffsetProgression { .. }));
}

#[test]
fn empty_lists_decode_cleanly() {
    let mut obj = BlobList::default();
    let bytes = ssz_codec::encode_to_vec(&mut obj, Fork::Shanghai).unwrap();
    assert_eq!(bytes, vec![4u8, 0, 0, 0]);
    let decoded: BlobList = decode(&bytes).unwrap();
    assert!(decoded.blobs.is_empty());

    let mut obj = Uint64List::default();
    let bytes = ssz_codec::encode_to_vec(&mut obj, Fork::Shanghai).unwrap();
    let decoded: Uint64List = decode(&bytes).unwrap();
    assert!(decoded.values.is_empty());
}
