// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! The schema dispatcher.
//!
//! A [`Codec`] owns whichever engine the current operation runs: encoder,
//! decoder or hasher. Every `define_*` primitive routes to the matching
//! engine operation, so one schema describes all three behaviours.
//!
//! Static shapes have a single `define_X`. Dynamic shapes come as a
//! `define_X_offset` / `define_X_content` pair: a dynamic container's
//! schema lists every offset call first (the fixed region, in field
//! declaration order) and then every content call in the same order. In
//! hash mode the offset call does the hashing, which keeps Merkle leaves
//! in declaration order, and the content call is a no-op.
//!
//! Every primitive also has an `_on_fork` variant gating the field on a
//! [`ForkFilter`]: a skipped field contributes no bytes to the encoding,
//! is reset to its default on decode, and contributes one all-zero chunk
//! to the hash.

use ssz_primitives::{FixedBytes, Hash256, U256};

use crate::bitfield::{BitList, BitVector};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Error;
use crate::fork::{Fork, ForkFilter};
use crate::hasher::{CONCURRENCY_THRESHOLD, Hasher};
use crate::object::{DynamicObject, Sizer, SszObject, StaticObject};
use crate::pool;
use crate::size::{
    size_of_bitlist, size_of_dynamic_bytes, size_of_slice_of_dynamic_bytes,
    size_of_slice_of_dynamic_objects, size_of_slice_of_static_bytes,
    size_of_slice_of_static_objects, size_of_slice_of_uint64s, size_of_static_object,
};

/// The engine a [`Codec`] drives for the current operation.
#[derive(Debug)]
pub enum Engine<'a> {
    /// Serialization.
    Encode(Encoder<'a>),
    /// Deserialization.
    Decode(Decoder<'a>),
    /// Merkle hashing.
    Hash(&'a mut Hasher),
}

/// The schema dispatcher: routes every `define_*` call to the active
/// engine.
#[derive(Debug)]
pub struct Codec<'a> {
    engine: Engine<'a>,
}

impl<'a> Codec<'a> {
    /// Wrap an engine. Downstream wrappers can use this to drive schemas
    /// with their own engine setup; the built-in entry points cover the
    /// common cases.
    pub fn with_engine(engine: Engine<'a>) -> Self {
        Self { engine }
    }

    /// The fork the current operation runs under.
    pub fn fork(&self) -> Fork {
        match &self.engine {
            Engine::Encode(enc) => enc.fork(),
            Engine::Decode(dec) => dec.fork(),
            Engine::Hash(has) => has.fork(),
        }
    }

    /// A sizing context for the operation's fork.
    pub fn sizer(&self) -> Sizer {
        Sizer::new(self.fork())
    }

    fn is_hash(&self) -> bool {
        matches!(self.engine, Engine::Hash(_))
    }

    fn is_encode(&self) -> bool {
        matches!(self.engine, Engine::Encode(_))
    }

    fn is_decode(&self) -> bool {
        matches!(self.engine, Engine::Decode(_))
    }

    fn encoder(&mut self) -> &mut Encoder<'a> {
        match &mut self.engine {
            Engine::Encode(enc) => enc,
            _ => panic!("encoder accessed outside an encode operation"),
        }
    }

    fn decoder(&mut self) -> &mut Decoder<'a> {
        match &mut self.engine {
            Engine::Decode(dec) => dec,
            _ => panic!("decoder accessed outside a decode operation"),
        }
    }

    fn hasher(&mut self) -> &mut Hasher {
        match &mut self.engine {
            Engine::Hash(has) => has,
            _ => panic!("hasher accessed outside a hash operation"),
        }
    }

    fn active(&self, filter: ForkFilter) -> bool {
        filter.covers(self.fork())
    }

    /// A fork-skipped field: nothing on encode, reset on decode, one zero
    /// chunk on hash.
    fn skipped<T: Default>(&mut self, v: &mut T) {
        match &mut self.engine {
            Engine::Encode(_) => {}
            Engine::Decode(_) => *v = T::default(),
            Engine::Hash(has) => has.insert_chunk(Hash256::ZERO, 0),
        }
    }

    /// A fork-skipped fixed array field.
    fn skipped_slice<T: Default>(&mut self, items: &mut [T]) {
        match &mut self.engine {
            Engine::Encode(_) => {}
            Engine::Decode(_) => {
                for item in items.iter_mut() {
                    *item = T::default();
                }
            }
            Engine::Hash(has) => has.insert_chunk(Hash256::ZERO, 0),
        }
    }

    // ---- booleans and unsigned integers ----

    /// A boolean field.
    pub fn define_bool(&mut self, v: &mut bool) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_bool(*v),
            Engine::Decode(dec) => dec.decode_bool(v),
            Engine::Hash(has) => has.hash_bool(*v),
        }
    }

    /// A uint8 field.
    pub fn define_uint8(&mut self, v: &mut u8) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint8(*v),
            Engine::Decode(dec) => dec.decode_uint8(v),
            Engine::Hash(has) => has.hash_uint8(*v),
        }
    }

    /// A uint16 field.
    pub fn define_uint16(&mut self, v: &mut u16) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint16(*v),
            Engine::Decode(dec) => dec.decode_uint16(v),
            Engine::Hash(has) => has.hash_uint16(*v),
        }
    }

    /// A uint32 field.
    pub fn define_uint32(&mut self, v: &mut u32) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint32(*v),
            Engine::Decode(dec) => dec.decode_uint32(v),
            Engine::Hash(has) => has.hash_uint32(*v),
        }
    }

    /// A uint64 field.
    pub fn define_uint64(&mut self, v: &mut u64) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint64(*v),
            Engine::Decode(dec) => dec.decode_uint64(v),
            Engine::Hash(has) => has.hash_uint64(*v),
        }
    }

    /// A 256-bit integer field, 32 bytes little-endian.
    pub fn define_uint256(&mut self, v: &mut U256) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint256(v),
            Engine::Decode(dec) => dec.decode_uint256(v),
            Engine::Hash(has) => has.hash_uint256(v),
        }
    }

    // ---- static byte shapes ----

    /// A fixed-size byte array field.
    pub fn define_static_bytes<const N: usize>(&mut self, v: &mut FixedBytes<N>) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_bytes(v.as_slice()),
            Engine::Decode(dec) => dec.read_bytes(v.as_mut_slice()),
            Engine::Hash(has) => has.hash_static_bytes(v),
        }
    }

    /// A byte blob field of a runtime-known fixed `size`.
    pub fn define_checked_bytes(&mut self, blob: &mut Vec<u8>, size: u32) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_bytes(blob),
            Engine::Decode(dec) => dec.decode_checked_bytes(blob, size),
            Engine::Hash(has) => has.hash_checked_bytes(blob),
        }
    }

    /// A fixed array of uint64s.
    pub fn define_array_of_uint64s(&mut self, values: &mut [u64]) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint64s(values),
            Engine::Decode(dec) => dec.decode_uint64s(values),
            Engine::Hash(has) => has.hash_array_of_uint64s(values),
        }
    }

    /// A fixed array of static byte arrays.
    pub fn define_array_of_static_bytes<const M: usize>(&mut self, items: &mut [FixedBytes<M>]) {
        match &mut self.engine {
            Engine::Encode(enc) => {
                for item in items.iter() {
                    enc.encode_bytes(item.as_slice());
                }
            }
            Engine::Decode(dec) => {
                for item in items.iter_mut() {
                    dec.read_bytes(item.as_mut_slice());
                }
            }
            Engine::Hash(has) => has.hash_array_of_static_bytes(items),
        }
    }

    /// A fixed array of packed bits.
    pub fn define_array_of_bits<const N: usize>(&mut self, bits: &mut BitVector<N>) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_bytes(bits.as_slice()),
            Engine::Decode(dec) => dec.decode_array_of_bits(bits),
            Engine::Hash(has) => has.hash_array_of_bits(bits),
        }
    }

    // ---- nested objects ----

    /// A static object field; its schema runs inline.
    pub fn define_static_object<T: StaticObject>(&mut self, obj: &mut T) {
        if self.is_hash() {
            self.hasher().descend_layer();
            obj.define_ssz(self);
            self.hasher().ascend_layer(0);
        } else {
            obj.define_ssz(self);
        }
    }

    /// A fixed array of static objects.
    pub fn define_array_of_static_objects<T: StaticObject>(&mut self, objs: &mut [T]) {
        if self.is_hash() {
            self.hasher().descend_layer();
            for obj in objs.iter_mut() {
                self.hasher().descend_layer();
                obj.define_ssz(self);
                self.hasher().ascend_layer(0);
            }
            self.hasher().ascend_layer(objs.len() as u64);
        } else {
            for obj in objs.iter_mut() {
                obj.define_ssz(self);
            }
        }
    }

    // ---- dynamic byte shapes ----

    /// Offset of a dynamic byte blob capped at `max_size` bytes.
    pub fn define_dynamic_bytes_offset(&mut self, blob: &mut Vec<u8>, max_size: u64) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_offset(size_of_dynamic_bytes(blob)),
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(has) => has.hash_dynamic_bytes(blob, max_size),
        }
    }

    /// Content of a dynamic byte blob.
    pub fn define_dynamic_bytes_content(&mut self, blob: &mut Vec<u8>, max_size: u64) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_bytes(blob),
            Engine::Decode(dec) => {
                let Some(len) = dec.content_slot() else { return };
                if len as u64 > max_size {
                    dec.set_err(Error::MaxLengthExceeded {
                        decoded: len as u64,
                        max: max_size,
                    });
                    return;
                }
                blob.resize(len as usize, 0);
                dec.read_bytes(blob);
            }
            Engine::Hash(_) => {}
        }
    }

    /// Offset of a bit list capped at `N` bits.
    pub fn define_bitlist_offset<const N: usize>(&mut self, bits: &mut BitList<N>) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_offset(size_of_bitlist(bits)),
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(has) => has.hash_bitlist(bits),
        }
    }

    /// Content of a bit list.
    pub fn define_bitlist_content<const N: usize>(&mut self, bits: &mut BitList<N>) {
        match &mut self.engine {
            Engine::Encode(enc) => {
                let bytes = bits.to_ssz_bytes();
                enc.encode_bytes(&bytes);
            }
            Engine::Decode(dec) => {
                let Some(len) = dec.content_slot() else { return };
                dec.decode_bitlist_content(bits, len);
            }
            Engine::Hash(_) => {}
        }
    }

    /// Offset of a list of uint64s capped at `max_items`.
    pub fn define_slice_of_uint64s_offset(&mut self, values: &mut Vec<u64>, max_items: u64) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_offset(size_of_slice_of_uint64s(values)),
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(has) => has.hash_slice_of_uint64s(values, max_items),
        }
    }

    /// Content of a list of uint64s.
    pub fn define_slice_of_uint64s_content(&mut self, values: &mut Vec<u64>, max_items: u64) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_uint64s(values),
            Engine::Decode(dec) => {
                let Some(len) = dec.content_slot() else { return };
                let Some(items) = dec.check_static_items(len, 8, max_items) else {
                    return;
                };
                values.resize(items, 0);
                dec.decode_uint64s(values);
            }
            Engine::Hash(_) => {}
        }
    }

    /// Offset of a list of static byte arrays capped at `max_items`.
    pub fn define_slice_of_static_bytes_offset<const M: usize>(
        &mut self,
        items: &mut Vec<FixedBytes<M>>,
        max_items: u64,
    ) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_offset(size_of_slice_of_static_bytes(items)),
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(has) => has.hash_slice_of_static_bytes(items, max_items),
        }
    }

    /// Content of a list of static byte arrays.
    pub fn define_slice_of_static_bytes_content<const M: usize>(
        &mut self,
        items: &mut Vec<FixedBytes<M>>,
        max_items: u64,
    ) {
        match &mut self.engine {
            Engine::Encode(enc) => {
                for item in items.iter() {
                    enc.encode_bytes(item.as_slice());
                }
            }
            Engine::Decode(dec) => {
                let Some(len) = dec.content_slot() else { return };
                let Some(count) = dec.check_static_items(len, M as u32, max_items) else {
                    return;
                };
                items.resize_with(count, FixedBytes::zero);
                for item in items.iter_mut() {
                    dec.read_bytes(item.as_mut_slice());
                }
            }
            Engine::Hash(_) => {}
        }
    }

    /// Offset of a list of dynamic byte blobs, capped at `max_items`
    /// items of `max_size` bytes each.
    pub fn define_slice_of_dynamic_bytes_offset(
        &mut self,
        blobs: &mut Vec<Vec<u8>>,
        max_items: u64,
        max_size: u64,
    ) {
        match &mut self.engine {
            Engine::Encode(enc) => enc.encode_offset(size_of_slice_of_dynamic_bytes(blobs)),
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(has) => has.hash_slice_of_dynamic_bytes(blobs, max_items, max_size),
        }
    }

    /// Content of a list of dynamic byte blobs.
    pub fn define_slice_of_dynamic_bytes_content(
        &mut self,
        blobs: &mut Vec<Vec<u8>>,
        max_items: u64,
        max_size: u64,
    ) {
        match &mut self.engine {
            Engine::Encode(enc) => {
                enc.start_dynamics(4 * blobs.len() as u32);
                for blob in blobs.iter() {
                    enc.encode_offset(size_of_dynamic_bytes(blob));
                }
                for blob in blobs.iter() {
                    enc.encode_bytes(blob);
                }
                enc.finish_dynamics();
            }
            Engine::Decode(dec) => {
                let Some(len) = dec.content_slot() else { return };
                dec.descend_slot(len);
                if let Some(items) = dec.decode_item_offsets(len, max_items) {
                    blobs.resize_with(items, Vec::new);
                    for blob in blobs.iter_mut() {
                        let Some(blen) = dec.content_slot() else { break };
                        if blen as u64 > max_size {
                            dec.set_err(Error::MaxLengthExceeded {
                                decoded: blen as u64,
                                max: max_size,
                            });
                            break;
                        }
                        blob.resize(blen as usize, 0);
                        dec.read_bytes(blob);
                    }
                    if items > 0 {
                        dec.finish_dynamics();
                    }
                }
                dec.ascend_slot();
            }
            Engine::Hash(_) => {}
        }
    }

    // ---- dynamic objects ----

    /// Offset of a dynamic object field.
    pub fn define_dynamic_object_offset<T: DynamicObject>(&mut self, obj: &mut T) {
        if self.is_hash() {
            self.hasher().descend_layer();
            obj.define_ssz(self);
            self.hasher().ascend_layer(0);
            return;
        }
        match &mut self.engine {
            Engine::Encode(enc) => {
                let size = obj.size_ssz(&enc.sizer(), false);
                enc.encode_offset(size);
            }
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(_) => {}
        }
    }

    /// Content of a dynamic object field; its schema runs inside a nested
    /// dynamic layout.
    pub fn define_dynamic_object_content<T: DynamicObject>(&mut self, obj: &mut T) {
        if self.is_encode() {
            let fixed = obj.size_ssz(&self.sizer(), true);
            self.encoder().start_dynamics(fixed);
            obj.define_ssz(self);
            self.encoder().finish_dynamics();
        } else if self.is_decode() {
            let sizer = self.sizer();
            let dec = self.decoder();
            let Some(len) = dec.content_slot() else { return };
            dec.descend_slot(len);
            let fixed = obj.size_ssz(&sizer, true);
            self.decoder().start_dynamics(fixed);
            obj.define_ssz(self);
            let dec = self.decoder();
            dec.finish_dynamics();
            dec.ascend_slot();
        }
    }

    /// Offset of a list of static objects capped at `max_items`. `Send`
    /// lets the hasher fan large slices out to worker threads.
    pub fn define_slice_of_static_objects_offset<T: StaticObject + Send>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
    ) {
        if self.is_hash() {
            self.hash_slice_of_static_objects(objs, max_items);
            return;
        }
        match &mut self.engine {
            Engine::Encode(enc) => {
                let size = size_of_slice_of_static_objects(&enc.sizer(), objs);
                enc.encode_offset(size);
            }
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(_) => {}
        }
    }

    /// Content of a list of static objects.
    pub fn define_slice_of_static_objects_content<T: StaticObject>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
    ) {
        if self.is_encode() {
            for obj in objs.iter_mut() {
                obj.define_ssz(self);
            }
        } else if self.is_decode() {
            let item_size = size_of_static_object::<T>(&self.sizer());
            let dec = self.decoder();
            let Some(len) = dec.content_slot() else { return };
            let Some(count) = dec.check_static_items(len, item_size, max_items) else {
                return;
            };
            objs.resize_with(count, T::default);
            for obj in objs.iter_mut() {
                obj.define_ssz(self);
            }
        }
    }

    /// Offset of a list of dynamic objects capped at `max_items`.
    pub fn define_slice_of_dynamic_objects_offset<T: DynamicObject>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
    ) {
        if self.is_hash() {
            self.hasher().descend_mixin_layer();
            for obj in objs.iter_mut() {
                self.hasher().descend_layer();
                obj.define_ssz(self);
                self.hasher().ascend_layer(0);
            }
            let len = objs.len() as u64;
            self.hasher().ascend_mixin_layer(len, max_items);
            return;
        }
        match &mut self.engine {
            Engine::Encode(enc) => {
                let size = size_of_slice_of_dynamic_objects(&enc.sizer(), objs);
                enc.encode_offset(size);
            }
            Engine::Decode(dec) => dec.decode_offset(),
            Engine::Hash(_) => {}
        }
    }

    /// Content of a list of dynamic objects.
    pub fn define_slice_of_dynamic_objects_content<T: DynamicObject>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
    ) {
        if self.is_encode() {
            let sizer = self.sizer();
            self.encoder().start_dynamics(4 * objs.len() as u32);
            for obj in objs.iter() {
                let size = obj.size_ssz(&sizer, false);
                self.encoder().encode_offset(size);
            }
            for obj in objs.iter_mut() {
                let fixed = obj.size_ssz(&sizer, true);
                self.encoder().start_dynamics(fixed);
                obj.define_ssz(self);
                self.encoder().finish_dynamics();
            }
            self.encoder().finish_dynamics();
        } else if self.is_decode() {
            let sizer = self.sizer();
            let dec = self.decoder();
            let Some(len) = dec.content_slot() else { return };
            dec.descend_slot(len);
            let items = dec.decode_item_offsets(len, max_items);
            if let Some(items) = items {
                objs.resize_with(items, T::default);
                for i in 0..items {
                    let dec = self.decoder();
                    let Some(ilen) = dec.content_slot() else { break };
                    dec.descend_slot(ilen);
                    let fixed = objs[i].size_ssz(&sizer, true);
                    self.decoder().start_dynamics(fixed);
                    objs[i].define_ssz(self);
                    let dec = self.decoder();
                    dec.finish_dynamics();
                    dec.ascend_slot();
                }
                if items > 0 {
                    self.decoder().finish_dynamics();
                }
            }
            self.decoder().ascend_slot();
        }
    }

    fn hash_slice_of_static_objects<T: StaticObject + Send>(
        &mut self,
        objs: &mut [T],
        max_items: u64,
    ) {
        let fork = self.fork();
        let sizer = Sizer::new(fork);
        let total = size_of_static_object::<T>(&sizer) as u64 * objs.len() as u64;

        self.hasher().descend_mixin_layer();
        if self.hasher().threads() && total >= CONCURRENCY_THRESHOLD && objs.len() > 1 {
            self.hash_static_objects_concurrent(objs, fork);
        } else {
            for obj in objs.iter_mut() {
                self.hasher().descend_layer();
                obj.define_ssz(self);
                self.hasher().ascend_layer(0);
            }
        }
        self.hasher().ascend_mixin_layer(objs.len() as u64, max_items);
    }

    /// Fan a large slice out to scoped worker threads: power-of-two
    /// sub-batches sized to roughly 4x the hardware parallelism, each
    /// hashed in a pooled child hasher, with the sub-roots re-inserted in
    /// index order at their collapse depth.
    fn hash_static_objects_concurrent<T: StaticObject + Send>(
        &mut self,
        objs: &mut [T],
        fork: Fork,
    ) {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let batch = (objs.len() / (4 * threads)).max(1).next_power_of_two();
        let full = objs.len() - objs.len() % batch;
        let run = (full / batch).div_ceil(threads).max(1) * batch;

        let (head, tail) = objs.split_at_mut(full);
        let results: Vec<Vec<(Hash256, u32)>> = std::thread::scope(|scope| {
            let handles: Vec<_> = head
                .chunks_mut(run)
                .map(|run_items| {
                    scope.spawn(move || {
                        let mut child = pool::child_hasher();
                        child.bind(fork, false);
                        let mut roots = Vec::new();
                        for batch_items in run_items.chunks_mut(batch) {
                            child.clear_batch();
                            {
                                let mut codec = Codec::with_engine(Engine::Hash(&mut child));
                                for obj in batch_items.iter_mut() {
                                    codec.define_static_object(obj);
                                }
                            }
                            roots.push(child.balanced_root());
                        }
                        roots
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("hash worker panicked"))
                .collect()
        });

        for (root, depth) in results.into_iter().flatten() {
            self.hasher().insert_chunk(root, depth);
        }
        for obj in tail.iter_mut() {
            self.hasher().descend_layer();
            obj.define_ssz(self);
            self.hasher().ascend_layer(0);
        }
    }

    // ---- asymmetric schemas ----

    /// Run `f` only when encoding; pairs with [`define_decoder`] for
    /// types whose two directions differ.
    ///
    /// [`define_decoder`]: Self::define_decoder
    pub fn define_encoder(&mut self, f: impl FnOnce(&mut Self)) {
        if self.is_encode() {
            f(self);
        }
    }

    /// Run `f` only when decoding.
    pub fn define_decoder(&mut self, f: impl FnOnce(&mut Self)) {
        if self.is_decode() {
            f(self);
        }
    }

    /// Run `f` only when hashing.
    pub fn define_hasher(&mut self, f: impl FnOnce(&mut Self)) {
        if self.is_hash() {
            f(self);
        }
    }

    // ---- fork-gated variants ----

    /// [`define_bool`](Self::define_bool) gated on a fork range.
    pub fn define_bool_on_fork(&mut self, v: &mut bool, filter: ForkFilter) {
        if self.active(filter) {
            self.define_bool(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_uint8`](Self::define_uint8) gated on a fork range.
    pub fn define_uint8_on_fork(&mut self, v: &mut u8, filter: ForkFilter) {
        if self.active(filter) {
            self.define_uint8(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_uint16`](Self::define_uint16) gated on a fork range.
    pub fn define_uint16_on_fork(&mut self, v: &mut u16, filter: ForkFilter) {
        if self.active(filter) {
            self.define_uint16(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_uint32`](Self::define_uint32) gated on a fork range.
    pub fn define_uint32_on_fork(&mut self, v: &mut u32, filter: ForkFilter) {
        if self.active(filter) {
            self.define_uint32(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_uint64`](Self::define_uint64) gated on a fork range.
    pub fn define_uint64_on_fork(&mut self, v: &mut u64, filter: ForkFilter) {
        if self.active(filter) {
            self.define_uint64(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_uint256`](Self::define_uint256) gated on a fork range.
    pub fn define_uint256_on_fork(&mut self, v: &mut U256, filter: ForkFilter) {
        if self.active(filter) {
            self.define_uint256(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_static_bytes`](Self::define_static_bytes) gated on a fork
    /// range.
    pub fn define_static_bytes_on_fork<const N: usize>(
        &mut self,
        v: &mut FixedBytes<N>,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_static_bytes(v);
        } else {
            self.skipped(v);
        }
    }

    /// [`define_checked_bytes`](Self::define_checked_bytes) gated on a
    /// fork range.
    pub fn define_checked_bytes_on_fork(
        &mut self,
        blob: &mut Vec<u8>,
        size: u32,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_checked_bytes(blob, size);
        } else {
            self.skipped(blob);
        }
    }

    /// [`define_array_of_uint64s`](Self::define_array_of_uint64s) gated
    /// on a fork range.
    pub fn define_array_of_uint64s_on_fork(&mut self, values: &mut [u64], filter: ForkFilter) {
        if self.active(filter) {
            self.define_array_of_uint64s(values);
        } else {
            self.skipped_slice(values);
        }
    }

    /// [`define_array_of_static_bytes`](Self::define_array_of_static_bytes)
    /// gated on a fork range.
    pub fn define_array_of_static_bytes_on_fork<const M: usize>(
        &mut self,
        items: &mut [FixedBytes<M>],
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_array_of_static_bytes(items);
        } else {
            self.skipped_slice(items);
        }
    }

    /// [`define_array_of_bits`](Self::define_array_of_bits) gated on a
    /// fork range.
    pub fn define_array_of_bits_on_fork<const N: usize>(
        &mut self,
        bits: &mut BitVector<N>,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_array_of_bits(bits);
        } else {
            self.skipped(bits);
        }
    }

    /// [`define_static_object`](Self::define_static_object) gated on a
    /// fork range.
    pub fn define_static_object_on_fork<T: StaticObject>(
        &mut self,
        obj: &mut T,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_static_object(obj);
        } else {
            self.skipped(obj);
        }
    }

    /// [`define_array_of_static_objects`](Self::define_array_of_static_objects)
    /// gated on a fork range.
    pub fn define_array_of_static_objects_on_fork<T: StaticObject>(
        &mut self,
        objs: &mut [T],
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_array_of_static_objects(objs);
        } else {
            self.skipped_slice(objs);
        }
    }

    /// [`define_dynamic_bytes_offset`](Self::define_dynamic_bytes_offset)
    /// gated on a fork range.
    pub fn define_dynamic_bytes_offset_on_fork(
        &mut self,
        blob: &mut Vec<u8>,
        max_size: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_dynamic_bytes_offset(blob, max_size);
        } else {
            self.skipped(blob);
        }
    }

    /// [`define_dynamic_bytes_content`](Self::define_dynamic_bytes_content)
    /// gated on a fork range.
    pub fn define_dynamic_bytes_content_on_fork(
        &mut self,
        blob: &mut Vec<u8>,
        max_size: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_dynamic_bytes_content(blob, max_size);
        }
    }

    /// [`define_bitlist_offset`](Self::define_bitlist_offset) gated on a
    /// fork range.
    pub fn define_bitlist_offset_on_fork<const N: usize>(
        &mut self,
        bits: &mut BitList<N>,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_bitlist_offset(bits);
        } else {
            self.skipped(bits);
        }
    }

    /// [`define_bitlist_content`](Self::define_bitlist_content) gated on
    /// a fork range.
    pub fn define_bitlist_content_on_fork<const N: usize>(
        &mut self,
        bits: &mut BitList<N>,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_bitlist_content(bits);
        }
    }

    /// [`define_slice_of_uint64s_offset`](Self::define_slice_of_uint64s_offset)
    /// gated on a fork range.
    pub fn define_slice_of_uint64s_offset_on_fork(
        &mut self,
        values: &mut Vec<u64>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_uint64s_offset(values, max_items);
        } else {
            self.skipped(values);
        }
    }

    /// [`define_slice_of_uint64s_content`](Self::define_slice_of_uint64s_content)
    /// gated on a fork range.
    pub fn define_slice_of_uint64s_content_on_fork(
        &mut self,
        values: &mut Vec<u64>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_uint64s_content(values, max_items);
        }
    }

    /// [`define_slice_of_static_bytes_offset`](Self::define_slice_of_static_bytes_offset)
    /// gated on a fork range.
    pub fn define_slice_of_static_bytes_offset_on_fork<const M: usize>(
        &mut self,
        items: &mut Vec<FixedBytes<M>>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_static_bytes_offset(items, max_items);
        } else {
            self.skipped(items);
        }
    }

    /// [`define_slice_of_static_bytes_content`](Self::define_slice_of_static_bytes_content)
    /// gated on a fork range.
    pub fn define_slice_of_static_bytes_content_on_fork<const M: usize>(
        &mut self,
        items: &mut Vec<FixedBytes<M>>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_static_bytes_content(items, max_items);
        }
    }

    /// [`define_slice_of_dynamic_bytes_offset`](Self::define_slice_of_dynamic_bytes_offset)
    /// gated on a fork range.
    pub fn define_slice_of_dynamic_bytes_offset_on_fork(
        &mut self,
        blobs: &mut Vec<Vec<u8>>,
        max_items: u64,
        max_size: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_dynamic_bytes_offset(blobs, max_items, max_size);
        } else {
            self.skipped(blobs);
        }
    }

    /// [`define_slice_of_dynamic_bytes_content`](Self::define_slice_of_dynamic_bytes_content)
    /// gated on a fork range.
    pub fn define_slice_of_dynamic_bytes_content_on_fork(
        &mut self,
        blobs: &mut Vec<Vec<u8>>,
        max_items: u64,
        max_size: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_dynamic_bytes_content(blobs, max_items, max_size);
        }
    }

    /// [`define_dynamic_object_offset`](Self::define_dynamic_object_offset)
    /// gated on a fork range.
    pub fn define_dynamic_object_offset_on_fork<T: DynamicObject>(
        &mut self,
        obj: &mut T,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_dynamic_object_offset(obj);
        } else {
            self.skipped(obj);
        }
    }

    /// [`define_dynamic_object_content`](Self::define_dynamic_object_content)
    /// gated on a fork range.
    pub fn define_dynamic_object_content_on_fork<T: DynamicObject>(
        &mut self,
        obj: &mut T,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_dynamic_object_content(obj);
        }
    }

    /// [`define_slice_of_static_objects_offset`](Self::define_slice_of_static_objects_offset)
    /// gated on a fork range.
    pub fn define_slice_of_static_objects_offset_on_fork<T: StaticObject + Send>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_static_objects_offset(objs, max_items);
        } else {
            self.skipped(objs);
        }
    }

    /// [`define_slice_of_static_objects_content`](Self::define_slice_of_static_objects_content)
    /// gated on a fork range.
    pub fn define_slice_of_static_objects_content_on_fork<T: StaticObject>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_static_objects_content(objs, max_items);
        }
    }

    /// [`define_slice_of_dynamic_objects_offset`](Self::define_slice_of_dynamic_objects_offset)
    /// gated on a fork range.
    pub fn define_slice_of_dynamic_objects_offset_on_fork<T: DynamicObject>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_dynamic_objects_offset(objs, max_items);
        } else {
            self.skipped(objs);
        }
    }

    /// [`define_slice_of_dynamic_objects_content`](Self::define_slice_of_dynamic_objects_content)
    /// gated on a fork range.
    pub fn define_slice_of_dynamic_objects_content_on_fork<T: DynamicObject>(
        &mut self,
        objs: &mut Vec<T>,
        max_items: u64,
        filter: ForkFilter,
    ) {
        if self.active(filter) {
            self.define_slice_of_dynamic_objects_content(objs, max_items);
        }
    }

    // ---- operation drivers ----

    /// Drive one encode operation over `obj`.
    pub(crate) fn run_encode<T: SszObject>(&mut self, obj: &mut T) -> Result<(), Error> {
        if T::STATIC {
            obj.define_ssz(self);
        } else {
            let fixed = obj.size_ssz(&self.sizer(), true);
            self.encoder().start_dynamics(fixed);
            obj.define_ssz(self);
            self.encoder().finish_dynamics();
        }
        self.encoder().take_result()
    }

    /// Drive one decode operation over `obj`, verifying the message was
    /// consumed exactly.
    pub(crate) fn run_decode<T: SszObject>(&mut self, obj: &mut T) -> Result<(), Error> {
        if T::STATIC {
            obj.define_ssz(self);
        } else {
            let fixed = obj.size_ssz(&self.sizer(), true);
            self.decoder().start_dynamics(fixed);
            obj.define_ssz(self);
            self.decoder().finish_dynamics();
        }
        let dec = self.decoder();
        if !dec.failed() && dec.consumed() != dec.cap() {
            let (len, expected) = (dec.consumed() as usize, dec.cap() as usize);
            dec.set_err(Error::ObjectSlotSizeMismatch { len, expected });
        }
        dec.take_result()
    }

    /// Drive one hash operation over `obj`, returning the tree root.
    pub(crate) fn run_hash<T: SszObject>(&mut self, obj: &mut T) -> Hash256 {
        self.hasher().descend_layer();
        obj.define_ssz(self);
        self.hasher().ascend_layer(0);
        self.hasher().extract_root()
    }
}
