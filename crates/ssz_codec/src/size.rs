// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Sizing helpers shared by `size_ssz` implementations and the engines.
//!
//! The encoder advances offsets and the decoder checks slot gaps with
//! these same functions, which is what keeps the three operations in
//! lock-step for every supported shape.

use ssz_primitives::FixedBytes;

use crate::bitfield::BitList;
use crate::object::{DynamicObject, Sizer, StaticObject};

/// The number of bytes used to represent an offset.
pub const BYTES_PER_LENGTH_OFFSET: u32 = 4;

/// Serialized size of a dynamic byte blob.
pub fn size_of_dynamic_bytes(blob: &[u8]) -> u32 {
    blob.len() as u32
}

/// Serialized size of a list of 64-bit integers.
pub fn size_of_slice_of_uint64s(values: &[u64]) -> u32 {
    (values.len() as u32).wrapping_mul(8)
}

/// Serialized size of a bit list, including its length sentinel bit.
pub fn size_of_bitlist<const N: usize>(bits: &BitList<N>) -> u32 {
    bits.len() as u32 / 8 + 1
}

/// Serialized size of a list of static byte arrays.
pub fn size_of_slice_of_static_bytes<const M: usize>(blobs: &[FixedBytes<M>]) -> u32 {
    (blobs.len() as u32).wrapping_mul(M as u32)
}

/// Serialized size of a list of dynamic byte blobs: one offset plus the
/// content bytes per item.
pub fn size_of_slice_of_dynamic_bytes(blobs: &[Vec<u8>]) -> u32 {
    blobs.iter().fold(0u32, |size, blob| {
        size.wrapping_add(BYTES_PER_LENGTH_OFFSET)
            .wrapping_add(blob.len() as u32)
    })
}

/// Serialized size of a static object.
pub fn size_of_static_object<T: StaticObject>(sizer: &Sizer) -> u32 {
    T::default().size_ssz(sizer, true)
}

/// Serialized size of a dynamic object, fixed and variable regions both.
pub fn size_of_dynamic_object<T: DynamicObject>(sizer: &Sizer, obj: &T) -> u32 {
    obj.size_ssz(sizer, false)
}

/// Serialized size of a list of static objects.
pub fn size_of_slice_of_static_objects<T: StaticObject>(sizer: &Sizer, objs: &[T]) -> u32 {
    (objs.len() as u32).wrapping_mul(size_of_static_object::<T>(sizer))
}

/// Serialized size of a list of dynamic objects: one offset plus the
/// serialized object per item.
pub fn size_of_slice_of_dynamic_objects<T: DynamicObject>(sizer: &Sizer, objs: &[T]) -> u32 {
    objs.iter().fold(0u32, |size, obj| {
        size.wrapping_add(BYTES_PER_LENGTH_OFFSET)
            .wrapping_add(obj.size_ssz(sizer, false))
    })
}
