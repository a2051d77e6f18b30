// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Encode, decode and hash a large list many times.
//!
//! Useful for `cargo flamegraph`.

use criterion as _;
use digest as _;
use hex as _;
use rand as _;
use sha2 as _;
use smallvec as _;
use ssz_primitives as _;
use thiserror as _;

use ssz_codec::{Codec, DynamicObject, Fork, Sizer, SszObject, StaticObject};

/// A struct with 4 fixed length fields
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct FixedLen {
    a: u64,
    b: u64,
    c: u64,
    d: u64,
}

impl SszObject for FixedLen {
    const STATIC: bool = true;

    fn size_ssz(&self, _sizer: &Sizer, _fixed: bool) -> u32 {
        32
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_uint64(&mut self.a);
        codec.define_uint64(&mut self.b);
        codec.define_uint64(&mut self.c);
        codec.define_uint64(&mut self.d);
    }
}

impl StaticObject for FixedLen {}

#[derive(Debug, Default, Clone, PartialEq)]
struct FixedLenList {
    items: Vec<FixedLen>,
}

const MAX_ITEMS: u64 = 1 << 20;

impl SszObject for FixedLenList {
    const STATIC: bool = false;

    fn size_ssz(&self, sizer: &Sizer, fixed: bool) -> u32 {
        if fixed {
            return 4;
        }
        4 + ssz_codec::size::size_of_slice_of_static_objects(sizer, &self.items)
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_slice_of_static_objects_offset(&mut self.items, MAX_ITEMS);
        codec.define_slice_of_static_objects_content(&mut self.items, MAX_ITEMS);
    }
}

impl DynamicObject for FixedLenList {}

fn main() {
    let mut list = FixedLenList {
        items: vec![
            FixedLen {
                a: 42,
                b: 42,
                c: 42,
                d: 42,
            };
            8196
        ],
    };

    let mut roots = 0usize;
    for _ in 0..1_000 {
        let bytes = ssz_codec::encode_to_vec(&mut list, Fork::Shanghai).unwrap();
        let mut decoded = FixedLenList::default();
        ssz_codec::decode_from_bytes(&bytes, &mut decoded, Fork::Shanghai).unwrap();
        let root = ssz_codec::hash_concurrent(&mut decoded, Fork::Shanghai);
        roots += usize::from(!root.is_zero());
    }

    println!("{roots}");
}
