// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Hash determinism, concurrent parity and shape coverage.

use criterion as _;
use digest as _;
use hex as _;
use sha2 as _;
use smallvec as _;
use ssz_primitives as _;
use thiserror as _;

use rand::Rng;
use ssz_codec::size::{
    size_of_dynamic_bytes, size_of_slice_of_static_bytes, size_of_slice_of_static_objects,
};
use ssz_codec::{
    Address, BitVector, Codec, DynamicObject, FixedBytes, Fork, Hash256, Sizer, SszObject,
    StaticObject, U256,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Withdrawal {
    index: u64,
    validator: u64,
    address: Address,
    amount: u64,
}

impl SszObject for Withdrawal {
    const STATIC: bool = true;

    fn size_ssz(&self, _sizer: &Sizer, _fixed: bool) -> u32 {
        8 + 8 + 20 + 8
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_uint64(&mut self.index);
        codec.define_uint64(&mut self.validator);
        codec.define_static_bytes(&mut self.address);
        codec.define_uint64(&mut self.amount);
    }
}

impl StaticObject for Withdrawal {}

/// A container around one large list of static objects.
#[derive(Debug, Default, Clone, PartialEq)]
struct WithdrawalQueue {
    withdrawals: Vec<Withdrawal>,
}

const MAX_QUEUE: u64 = 1 << 20;

impl SszObject for WithdrawalQueue {
    const STATIC: bool = false;

    fn size_ssz(&self, sizer: &Sizer, fixed: bool) -> u32 {
        if fixed {
            return 4;
        }
        4 + size_of_slice_of_static_objects(sizer, &self.withdrawals)
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_slice_of_static_objects_offset(&mut self.withdrawals, MAX_QUEUE);
        codec.define_slice_of_static_objects_content(&mut self.withdrawals, MAX_QUEUE);
    }
}

impl DynamicObject for WithdrawalQueue {}

/// One field of every remaining shape the dispatcher supports.
#[derive(Debug, Clone, PartialEq)]
struct Kitchen {
    flag: bool,
    tag: u8,
    port: u16,
    epoch: u32,
    word: U256,
    commitment: FixedBytes<48>,
    keys: [Hash256; 3],
    counters: [u64; 5],
    bits: BitVector<12>,
    proof: Vec<u8>,
    receipts: [Withdrawal; 2],
    data: Vec<u8>,
    hashes: Vec<Hash256>,
}

const PROOF_SIZE: u32 = 21;
const MAX_DATA: u64 = 1024;
const MAX_HASHES: u64 = 64;

impl Default for Kitchen {
    fn default() -> Self {
        Self {
            flag: false,
            tag: 0,
            port: 0,
            epoch: 0,
            word: U256::ZERO,
            commitment: FixedBytes::zero(),
            keys: [Hash256::ZERO; 3],
            counters: [0; 5],
            bits: BitVector::new(),
            proof: vec![0; PROOF_SIZE as usize],
            receipts: [Withdrawal::default(), Withdrawal::default()],
            data: Vec::new(),
            hashes: Vec::new(),
        }
    }
}

impl SszObject for Kitchen {
    const STATIC: bool = false;

    fn size_ssz(&self, _sizer: &Sizer, fixed: bool) -> u32 {
        let size = 1 + 1 + 2 + 4 + 32 + 48 + 96 + 40 + 2 + PROOF_SIZE + 88 + 4 + 4;
        if fixed {
            return size;
        }
        size + size_of_dynamic_bytes(&self.data) + size_of_slice_of_static_bytes(&self.hashes)
    }

    fn define_ssz(&mut self, codec: &mut Codec<'_>) {
        codec.define_bool(&mut self.flag);
        codec.define_uint8(&mut self.tag);
        codec.define_uint16(&mut self.port);
        codec.define_uint32(&mut self.epoch);
        codec.define_uint256(&mut self.word);
        codec.define_static_bytes(&mut self.commitment);
        codec.define_array_of_static_bytes(&mut self.keys);
        codec.define_array_of_uint64s(&mut self.counters);
        codec.define_array_of_bits(&mut self.bits);
        codec.define_checked_bytes(&mut self.proof, PROOF_SIZE);
        codec.define_array_of_static_objects(&mut self.receipts);
        codec.define_dynamic_bytes_offset(&mut self.data, MAX_DATA);
        codec.define_slice_of_static_bytes_offset(&mut self.hashes, MAX_HASHES);
        codec.define_dynamic_bytes_content(&mut self.data, MAX_DATA);
        codec.define_slice_of_static_bytes_content(&mut self.hashes, MAX_HASHES);
    }
}

impl DynamicObject for Kitchen {}

fn big_queue(items: usize) -> WithdrawalQueue {
    WithdrawalQueue {
        withdrawals: (0..items as u64)
            .map(|i| Withdrawal {
                index: i,
                validator: i * 7,
                address: Address::repeat_byte((i % 251) as u8),
                amount: i * 1_000_000_000,
            })
            .collect(),
    }
}

#[test]
fn concurrent_matches_sequential_on_2048_items() {
    let mut obj = big_queue(2048);
    let sequential = ssz_codec::hash_sequential(&mut obj, Fork::Shanghai);
    let concurrent = ssz_codec::hash_concurrent(&mut obj, Fork::Shanghai);
    assert_eq!(sequential, concurrent);
}

#[test]
fn concurrent_matches_sequential_off_batch_boundaries() {
    // Sizes straddling power-of-two batch edges.
    for items in [1usize, 2, 1500, 2047, 2049] {
        let mut obj = big_queue(items);
        assert_eq!(
            ssz_codec::hash_sequential(&mut obj, Fork::Shanghai),
            ssz_codec::hash_concurrent(&mut obj, Fork::Shanghai),
            "mismatch at {items} items"
        );
    }
}

#[test]
fn identical_items_queue() {
    let mut obj = WithdrawalQueue {
        withdrawals: vec![Withdrawal::default(); 2048],
    };
    let sequential = ssz_codec::hash_sequential(&mut obj, Fork::Shanghai);
    let concurrent = ssz_codec::hash_concurrent(&mut obj, Fork::Shanghai);
    assert_eq!(sequential, concurrent);
}

#[test]
fn queue_round_trip() {
    let mut obj = big_queue(300);
    let bytes = ssz_codec::encode_to_vec(&mut obj, Fork::Shanghai).unwrap();
    assert_eq!(bytes.len() as u32, ssz_codec::size_ssz(&obj, Fork::Shanghai));

    let mut decoded = WithdrawalQueue::default();
    ssz_codec::decode_from_bytes(&bytes, &mut decoded, Fork::Shanghai).unwrap();
    assert_eq!(decoded, obj);
}

#[test]
fn kitchen_round_trip() {
    let mut obj = Kitchen {
        flag: true,
        tag: 9,
        port: 30303,
        epoch: 194_048,
        word: U256::from(123_456_789_u64),
        commitment: FixedBytes::repeat_byte(0xc0),
        keys: [
            Hash256::repeat_byte(1),
            Hash256::repeat_byte(2),
            Hash256::repeat_byte(3),
        ],
        counters: [10, 20, 30, 40, 50],
        bits: {
            let mut bits = BitVector::new();
            bits.set(0, true).unwrap();
            bits.set(11, true).unwrap();
            bits
        },
        proof: vec![0xaa; PROOF_SIZE as usize],
        receipts: [
            Withdrawal {
                index: 1,
                validator: 2,
                address: Address::repeat_byte(4),
                amount: 5,
            },
            Withdrawal::default(),
        ],
        data: vec![1, 2, 3, 4, 5],
        hashes: vec![Hash256::repeat_byte(0xee), Hash256::repeat_byte(0xdd)],
    };

    let bytes = ssz_codec::encode_to_vec(&mut obj, Fork::Shanghai).unwrap();
    assert_eq!(bytes.len() as u32, ssz_codec::size_ssz(&obj, Fork::Shanghai));

    let mut decoded = Kitchen::default();
    ssz_codec::decode_from_bytes(&bytes, &mut decoded, Fork::Shanghai).unwrap();
    assert_eq!(decoded, obj);

    // Hashing is deterministic across repeat runs and engine reuse.
    let root = ssz_codec::hash_sequential(&mut obj, Fork::Shanghai);
    assert_eq!(root, ssz_codec::hash_sequential(&mut decoded, Fork::Shanghai));
    assert_eq!(root, ssz_codec::hash_concurrent(&mut obj, Fork::Shanghai));
}

#[test]
fn random_round_trips() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let mut obj = big_queue(rng.gen_range(0..200));
        for w in obj.withdrawals.iter_mut() {
            w.index = rng.r#gen();
            w.validator = rng.r#gen();
            w.amount = rng.r#gen();
            w.address = Address::random_with(&mut rng);
        }

        let bytes = ssz_codec::encode_to_vec(&mut obj, Fork::Shanghai).unwrap();
        let mut decoded = WithdrawalQueue::default();
        ssz_codec::decode_from_bytes(&bytes, &mut decoded, Fork::Shanghai).unwrap();
        assert_eq!(decoded, obj);

        assert_eq!(
            ssz_codec::hash_sequential(&mut obj, Fork::Shanghai),
            ssz_codec::hash_concurrent(&mut decoded, Fork::Shanghai)
        );
    }
}

#[test]
fn empty_and_single_item_queues() {
    let mut empty = WithdrawalQueue::default();
    let mut single = big_queue(1);

    // Both hash cleanly and differ from each other.
    let empty_root = ssz_codec::hash_sequential(&mut empty, Fork::Shanghai);
    let single_root = ssz_codec::hash_sequential(&mut single, Fork::Shanghai);
    assert_ne!(empty_root, single_root);

    let bytes = ssz_codec::encode_to_vec(&mut empty, Fork::Shanghai).unwrap();
    assert_eq!(bytes, vec![4u8, 0, 0, 0]);
}
