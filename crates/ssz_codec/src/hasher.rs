// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! The Merkle hashing engine.
//!
//! Chunks accumulate into layer groups `(layer, depth, chunks)`: the layer
//! is a barrier keeping an outer subtree from collapsing into an inner
//! one, the depth counts how many pair-hashings a group has undergone.
//! Groups collapse in place whenever they fill an 8-chunk batch, so the
//! chunk vector stays proportional to the tree's fringe rather than its
//! leaf count. Closing a layer balances it to a single root, right-pads
//! with precomputed zero-subtree roots up to the declared capacity, and
//! hands the root to the parent layer as an ordinary chunk.

use std::sync::LazyLock;

use digest::Digest;
use ssz_primitives::{FixedBytes, Hash256, U256};

use crate::bitfield::{BitList, BitVector};
use crate::fork::Fork;
use crate::pool::Reusable;

/// Number of bytes in a Merkle chunk.
pub const BYTES_PER_CHUNK: usize = 32;

/// Chunks a group accumulates before collapsing in place.
const HASHER_BATCH: u32 = 8;

/// Number of precomputed zero-subtree roots; the index is the depth.
const ZERO_ROOT_COUNT: usize = 65;

/// Encoded size above which a slice of static objects is fanned out to
/// worker threads when concurrent hashing is enabled.
pub(crate) const CONCURRENCY_THRESHOLD: u64 = 65536;

/// Roots of all-zero subtrees: `z[0]` is the zero chunk and
/// `z[i+1] = sha256(z[i] || z[i])`.
pub static ZERO_SUBTREE_ROOTS: LazyLock<[Hash256; ZERO_ROOT_COUNT]> = LazyLock::new(|| {
    let mut roots = [Hash256::ZERO; ZERO_ROOT_COUNT];
    for i in 0..ZERO_ROOT_COUNT - 1 {
        roots[i + 1] = hash_pair(&roots[i], &roots[i]);
    }
    roots
});

/// Compress two chunks into their parent using any [`Digest`]
/// implementation.
pub fn hash32_concat<D: Digest + Default>(left: &[u8], right: &[u8]) -> [u8; 32] {
    let mut hasher = D::default();
    hasher.update(left);
    hasher.update(right);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    FixedBytes(hash32_concat::<sha2::Sha256>(left.as_slice(), right.as_slice()))
}

fn zero_root(depth: u32) -> Hash256 {
    ZERO_SUBTREE_ROOTS[depth as usize]
}

/// Chunks needed to hold `bytes` bytes.
fn chunks_for_bytes(bytes: u64) -> u64 {
    bytes.div_ceil(BYTES_PER_CHUNK as u64)
}

/// Chunks needed to hold `bits` packed bits.
fn chunks_for_bits(bits: u64) -> u64 {
    bits.div_ceil(8 * BYTES_PER_CHUNK as u64)
}

/// A run of pending chunks sharing a layer and a collapse depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    layer: u32,
    depth: u32,
    chunks: u32,
}

/// The SSZ Merkle hashing engine.
///
/// Infallible on well-formed in-memory values; internal invariant
/// violations panic.
#[derive(Debug, Default)]
pub struct Hasher {
    /// Pending chunks across all open layers
    chunks: Vec<Hash256>,
    /// Pending chunk groups, oldest first
    groups: Vec<Group>,
    /// Current layer; insertions are barriered per layer
    layer: u32,
    /// Whether large slices may fan out to worker threads
    threads: bool,
    fork: Fork,
}

impl Reusable for Hasher {
    fn reset(&mut self) {
        self.chunks.clear();
        self.groups.clear();
        self.layer = 0;
        self.threads = false;
        self.fork = Fork::Unknown;
    }
}

impl Hasher {
    /// Configure the hasher for one operation.
    pub fn bind(&mut self, fork: Fork, threads: bool) {
        self.fork = fork;
        self.threads = threads;
    }

    /// The fork the operation runs under.
    pub fn fork(&self) -> Fork {
        self.fork
    }

    /// Whether concurrent subtree hashing is enabled.
    pub(crate) fn threads(&self) -> bool {
        self.threads
    }

    /// Drop all pending state between worker batches, keeping capacity.
    pub(crate) fn clear_batch(&mut self) {
        self.chunks.clear();
        self.groups.clear();
        self.layer = 0;
    }

    /// Append one chunk at the given collapse depth within the current
    /// layer, collapsing the active group whenever it fills a batch.
    pub(crate) fn insert_chunk(&mut self, chunk: Hash256, depth: u32) {
        self.chunks.push(chunk);

        let matched = match self.groups.last_mut() {
            Some(last) if last.layer == self.layer && last.depth == depth => {
                last.chunks += 1;
                true
            }
            _ => false,
        };
        if !matched {
            self.groups.push(Group {
                layer: self.layer,
                depth,
                chunks: 1,
            });
            return;
        }

        let mut group = *self.groups.last().expect("group matched above");
        if group.chunks != HASHER_BATCH {
            return;
        }
        self.groups.pop();
        loop {
            self.collapse_tail(group.chunks);
            group.depth += 1;
            group.chunks /= 2;

            if let Some(prev) = self.groups.last().copied()
                && prev.layer == group.layer
                && prev.depth == group.depth
            {
                self.groups.pop();
                group.chunks += prev.chunks;
            }
            if group.chunks != HASHER_BATCH {
                break;
            }
        }
        self.groups.push(group);
    }

    /// Pair-hash the trailing `count` chunks in place, halving them.
    fn collapse_tail(&mut self, count: u32) {
        let count = count as usize;
        let start = self.chunks.len() - count;
        for i in 0..count / 2 {
            let parent = hash_pair(&self.chunks[start + 2 * i], &self.chunks[start + 2 * i + 1]);
            self.chunks[start + i] = parent;
        }
        self.chunks.truncate(start + count / 2);
    }

    /// Open a new hashing layer for a nested composite.
    pub(crate) fn descend_layer(&mut self) {
        self.layer += 1;
    }

    /// Open two layers: one for list contents, one for the length mix-in.
    pub(crate) fn descend_mixin_layer(&mut self) {
        self.layer += 2;
    }

    /// Collapse the current layer to a single root chunk, padding partial
    /// subtrees with zero-subtree roots as needed.
    fn balance_layer(&mut self) {
        loop {
            let total = self.groups.len();
            let Some(&last) = self.groups.last() else {
                break;
            };
            if last.layer != self.layer {
                break;
            }

            if last.chunks > 1 {
                let mut group = last;
                self.groups.pop();
                if group.chunks % 2 == 1 {
                    self.chunks.push(zero_root(group.depth));
                    group.chunks += 1;
                }
                self.collapse_tail(group.chunks);
                group.depth += 1;
                group.chunks /= 2;
                self.merge_previous(&mut group);
                self.groups.push(group);
                continue;
            }

            // A lone root: raise it until it can merge with a same-layer
            // predecessor, or stand alone.
            if total > 1 && self.groups[total - 2].layer == last.layer {
                let mut group = last;
                self.groups.pop();
                self.chunks.push(zero_root(group.depth));
                self.collapse_tail(2);
                group.depth += 1;
                self.merge_previous(&mut group);
                self.groups.push(group);
                continue;
            }
            break;
        }
    }

    fn merge_previous(&mut self, group: &mut Group) {
        if let Some(prev) = self.groups.last().copied()
            && prev.layer == group.layer
            && prev.depth == group.depth
        {
            self.groups.pop();
            group.chunks += prev.chunks;
        }
    }

    /// Close the current layer: balance it, right-pad the surviving root
    /// with zero subtrees until its subtree spans `capacity` chunks, and
    /// insert the result into the parent layer.
    pub(crate) fn ascend_layer(&mut self, capacity: u64) {
        // An empty layer merkleizes as a single zero chunk.
        if self.groups.last().is_none_or(|g| g.layer != self.layer) {
            self.insert_chunk(Hash256::ZERO, 0);
        }
        self.balance_layer();

        let group = self.groups.last_mut().expect("balanced layer has a root");
        debug_assert!(group.layer == self.layer && group.chunks == 1);
        while group.depth < 64 && (1u64 << group.depth) < capacity {
            let root = *self.chunks.last().expect("root chunk present");
            let padded = hash_pair(&root, &zero_root(group.depth));
            *self.chunks.last_mut().expect("root chunk present") = padded;
            group.depth += 1;
        }

        let root = self.chunks.pop().expect("root chunk present");
        self.groups.pop();
        self.layer -= 1;
        self.insert_chunk(root, 0);
    }

    /// Close a list's content layer, mix in the length, and close the
    /// mix-in layer.
    pub(crate) fn ascend_mixin_layer(&mut self, length: u64, capacity: u64) {
        self.ascend_layer(capacity);

        let mut chunk = Hash256::ZERO;
        chunk.as_mut_slice()[..8].copy_from_slice(&length.to_le_bytes());
        self.insert_chunk(chunk, 0);

        self.ascend_layer(0);
    }

    /// Balance the current layer and return the surviving root and its
    /// depth, without touching the parent layer. Used by concurrent
    /// workers to extract sub-roots.
    pub(crate) fn balanced_root(&mut self) -> (Hash256, u32) {
        self.balance_layer();
        let group = self.groups.last().expect("balanced layer has a root");
        let root = *self.chunks.last().expect("root chunk present");
        (root, group.depth)
    }

    /// The sole remaining chunk after the root layer was closed.
    pub(crate) fn extract_root(&mut self) -> Hash256 {
        assert!(
            self.layer == 0 && self.groups.len() == 1 && self.groups[0].chunks == 1,
            "hashing terminated with an unbalanced accumulator"
        );
        self.groups.pop();
        self.chunks.pop().expect("root chunk present")
    }

    /// Split a blob into chunks, zero-padding the last one.
    fn insert_blob_chunks(&mut self, blob: &[u8]) {
        for piece in blob.chunks(BYTES_PER_CHUNK) {
            self.insert_chunk(Hash256::right_padding_from(piece), 0);
        }
    }

    fn insert_packed_uint64s(&mut self, values: &[u64]) {
        for batch in values.chunks(4) {
            let mut chunk = Hash256::ZERO;
            for (i, v) in batch.iter().enumerate() {
                chunk.as_mut_slice()[i * 8..i * 8 + 8].copy_from_slice(&v.to_le_bytes());
            }
            self.insert_chunk(chunk, 0);
        }
    }

    /// Merkleize a boolean into a single padded chunk.
    pub fn hash_bool(&mut self, v: bool) {
        let mut chunk = Hash256::ZERO;
        chunk.as_mut_slice()[0] = v as u8;
        self.insert_chunk(chunk, 0);
    }

    /// Merkleize a uint8.
    pub fn hash_uint8(&mut self, v: u8) {
        let mut chunk = Hash256::ZERO;
        chunk.as_mut_slice()[0] = v;
        self.insert_chunk(chunk, 0);
    }

    /// Merkleize a uint16.
    pub fn hash_uint16(&mut self, v: u16) {
        let mut chunk = Hash256::ZERO;
        chunk.as_mut_slice()[..2].copy_from_slice(&v.to_le_bytes());
        self.insert_chunk(chunk, 0);
    }

    /// Merkleize a uint32.
    pub fn hash_uint32(&mut self, v: u32) {
        let mut chunk = Hash256::ZERO;
        chunk.as_mut_slice()[..4].copy_from_slice(&v.to_le_bytes());
        self.insert_chunk(chunk, 0);
    }

    /// Merkleize a uint64.
    pub fn hash_uint64(&mut self, v: u64) {
        let mut chunk = Hash256::ZERO;
        chunk.as_mut_slice()[..8].copy_from_slice(&v.to_le_bytes());
        self.insert_chunk(chunk, 0);
    }

    /// Merkleize a 256-bit integer as one little-endian chunk.
    pub fn hash_uint256(&mut self, v: &U256) {
        self.insert_chunk(FixedBytes(v.to_le_bytes::<32>()), 0);
    }

    /// Merkleize a fixed byte array: one padded chunk up to 32 bytes, a
    /// chunked subtree above that.
    pub fn hash_static_bytes<const N: usize>(&mut self, v: &FixedBytes<N>) {
        if N <= BYTES_PER_CHUNK {
            self.insert_chunk(Hash256::right_padding_from(v.as_slice()), 0);
        } else {
            self.descend_layer();
            self.insert_blob_chunks(v.as_slice());
            self.ascend_layer(chunks_for_bytes(N as u64));
        }
    }

    /// Merkleize a runtime-sized blob with vector semantics (no length
    /// mix-in).
    pub fn hash_checked_bytes(&mut self, blob: &[u8]) {
        if blob.len() <= BYTES_PER_CHUNK {
            self.insert_chunk(Hash256::right_padding_from(blob), 0);
        } else {
            self.descend_layer();
            self.insert_blob_chunks(blob);
            self.ascend_layer(chunks_for_bytes(blob.len() as u64));
        }
    }

    /// Merkleize a dynamic blob: chunked contents padded to the byte cap,
    /// with the byte length mixed in.
    pub fn hash_dynamic_bytes(&mut self, blob: &[u8], max_size: u64) {
        self.descend_mixin_layer();
        self.insert_blob_chunks(blob);
        self.ascend_mixin_layer(blob.len() as u64, chunks_for_bytes(max_size));
    }

    /// Merkleize a fixed bit vector (no length mix-in).
    pub fn hash_array_of_bits<const N: usize>(&mut self, bits: &BitVector<N>) {
        self.descend_layer();
        self.insert_blob_chunks(bits.as_slice());
        self.ascend_layer(chunks_for_bits(N as u64));
    }

    /// Merkleize a bit list: contents without the sentinel bit, padded to
    /// the bit cap, with the bit count mixed in.
    pub fn hash_bitlist<const N: usize>(&mut self, bits: &BitList<N>) {
        self.descend_mixin_layer();
        self.insert_blob_chunks(bits.as_slice());
        self.ascend_mixin_layer(bits.len() as u64, chunks_for_bits(N as u64));
    }

    /// Merkleize a fixed array of uint64s, four to a chunk.
    pub fn hash_array_of_uint64s(&mut self, values: &[u64]) {
        self.descend_layer();
        self.insert_packed_uint64s(values);
        self.ascend_layer((values.len() as u64).div_ceil(4));
    }

    /// Merkleize a list of uint64s with the item count mixed in.
    pub fn hash_slice_of_uint64s(&mut self, values: &[u64], max_items: u64) {
        self.descend_mixin_layer();
        self.insert_packed_uint64s(values);
        self.ascend_mixin_layer(values.len() as u64, max_items.div_ceil(4));
    }

    fn insert_static_bytes_roots<const M: usize>(&mut self, items: &[FixedBytes<M>]) {
        for item in items {
            if M <= BYTES_PER_CHUNK {
                self.insert_chunk(Hash256::right_padding_from(item.as_slice()), 0);
            } else {
                self.descend_layer();
                self.insert_blob_chunks(item.as_slice());
                self.ascend_layer(chunks_for_bytes(M as u64));
            }
        }
    }

    /// Merkleize a fixed array of static byte arrays.
    pub fn hash_array_of_static_bytes<const M: usize>(&mut self, items: &[FixedBytes<M>]) {
        self.descend_layer();
        self.insert_static_bytes_roots(items);
        self.ascend_layer(items.len() as u64);
    }

    /// Merkleize a list of static byte arrays with the item count mixed
    /// in.
    pub fn hash_slice_of_static_bytes<const M: usize>(
        &mut self,
        items: &[FixedBytes<M>],
        max_items: u64,
    ) {
        self.descend_mixin_layer();
        self.insert_static_bytes_roots(items);
        self.ascend_mixin_layer(items.len() as u64, max_items);
    }

    /// Merkleize a list of dynamic blobs: every blob is a mixed-in
    /// subtree, and the item count is mixed in above them.
    pub fn hash_slice_of_dynamic_bytes(
        &mut self,
        blobs: &[Vec<u8>],
        max_items: u64,
        max_size: u64,
    ) {
        self.descend_mixin_layer();
        for blob in blobs {
            self.descend_mixin_layer();
            self.insert_blob_chunks(blob);
            self.ascend_mixin_layer(blob.len() as u64, chunks_for_bytes(max_size));
        }
        self.ascend_mixin_layer(blobs.len() as u64, max_items);
    }
}
