//! # Hive Chunk
//!
//! A fixed-capacity block of raw, 16-byte aligned slot storage.
//!
//! ```text
//! storage:      [slot 0][slot 1][slot 2] ... [slot capacity-1]   (stride bytes each)
//! occupied:     1 bit per slot, set while the slot holds a live record
//! generations:  u16 per slot, bumped every time the slot is freed
//! bumped:       slots [0, bumped) have been handed out at least once
//! ```
//!
//! The chunk knows nothing about free lists; it only stores bytes and
//! per-slot bookkeeping. [`Hive`](super::Hive) owns the allocation policy.

// SAFETY: This module owns the raw chunk allocation. Every pointer it hands
// out is derived from `storage` and bounds-checked against `capacity`.
#![allow(unsafe_code)]

use std::ptr::NonNull;

/// Alignment of every chunk allocation, and the largest component
/// alignment the engine supports.
pub const CHUNK_ALIGN: usize = 16;

/// Allocation unit; gives the chunk its alignment.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
struct Block([u8; CHUNK_ALIGN]);

/// Raw storage for up to `capacity` fixed-stride slots.
pub(crate) struct Chunk {
    /// Start of the boxed `[Block]` allocation.
    storage: NonNull<u8>,
    /// Number of `Block`s in the allocation.
    blocks: usize,
    /// Bytes per slot.
    stride: usize,
    /// Number of slots.
    capacity: usize,
    /// Slots handed out by bump allocation so far.
    bumped: usize,
    /// Occupancy bitset, 64 slots per word.
    occupied: Box<[u64]>,
    /// Per-slot generation counters.
    generations: Box<[u16]>,
    /// Number of set bits in `occupied`.
    live: usize,
}

impl Chunk {
    /// Allocates a zeroed chunk.
    pub(crate) fn new(stride: usize, capacity: usize) -> Self {
        debug_assert!(stride > 0, "stride must be non-zero");
        debug_assert!(capacity > 0, "capacity must be non-zero");

        let bytes = stride * capacity;
        let blocks = bytes.div_ceil(CHUNK_ALIGN);
        let boxed: Box<[Block]> = vec![Block([0; CHUNK_ALIGN]); blocks].into_boxed_slice();
        let raw = Box::into_raw(boxed).cast::<u8>();

        Self {
            // SAFETY: Box::into_raw never returns null.
            storage: unsafe { NonNull::new_unchecked(raw) },
            blocks,
            stride,
            capacity,
            bumped: 0,
            occupied: vec![0u64; capacity.div_ceil(64)].into_boxed_slice(),
            generations: vec![0u16; capacity].into_boxed_slice(),
            live: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Hands out the next never-used slot, if any remain.
    #[inline]
    pub(crate) fn bump(&mut self) -> Option<usize> {
        if self.bumped < self.capacity {
            let slot = self.bumped;
            self.bumped += 1;
            Some(slot)
        } else {
            None
        }
    }

    /// Checks whether `slot` currently holds a live record.
    #[inline]
    pub(crate) fn is_occupied(&self, slot: usize) -> bool {
        slot < self.bumped && (self.occupied[slot / 64] >> (slot % 64)) & 1 == 1
    }

    /// Marks `slot` live.
    #[inline]
    pub(crate) fn set_occupied(&mut self, slot: usize) {
        debug_assert!(!self.is_occupied(slot), "slot {slot} is already live");
        self.occupied[slot / 64] |= 1 << (slot % 64);
        self.live += 1;
    }

    /// Marks `slot` free.
    #[inline]
    pub(crate) fn clear_occupied(&mut self, slot: usize) {
        debug_assert!(self.is_occupied(slot), "slot {slot} is not live");
        self.occupied[slot / 64] &= !(1 << (slot % 64));
        self.live -= 1;
    }

    #[inline]
    pub(crate) fn generation(&self, slot: usize) -> u16 {
        self.generations[slot]
    }

    /// Invalidates every handle issued for `slot` so far.
    #[inline]
    pub(crate) fn advance_generation(&mut self, slot: usize) {
        self.generations[slot] = self.generations[slot].wrapping_add(1);
    }

    /// Finds the first live slot at or after `from`.
    ///
    /// Skips whole empty words with `trailing_zeros`, so sparse chunks are
    /// cheap to walk.
    pub(crate) fn next_occupied(&self, from: usize) -> Option<usize> {
        if from >= self.bumped {
            return None;
        }
        let mut word_idx = from / 64;
        let mut word = self.occupied[word_idx] & (u64::MAX << (from % 64));
        loop {
            if word != 0 {
                let slot = word_idx * 64 + word.trailing_zeros() as usize;
                return (slot < self.bumped).then_some(slot);
            }
            word_idx += 1;
            if word_idx * 64 >= self.bumped {
                return None;
            }
            word = self.occupied[word_idx];
        }
    }

    /// Borrows the first `len` bytes of `slot`.
    #[inline]
    pub(crate) fn bytes(&self, slot: usize, len: usize) -> &[u8] {
        assert!(slot < self.capacity && len <= self.stride, "slot access out of bounds");
        // SAFETY: slot < capacity and len <= stride keep the range inside the
        // allocation; the allocation is zero-initialized so every byte is valid u8.
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr().add(slot * self.stride), len) }
    }

    /// Mutably borrows the first `len` bytes of `slot`.
    #[inline]
    pub(crate) fn bytes_mut(&mut self, slot: usize, len: usize) -> &mut [u8] {
        assert!(slot < self.capacity && len <= self.stride, "slot access out of bounds");
        // SAFETY: as in `bytes`; `&mut self` guarantees exclusivity.
        unsafe {
            std::slice::from_raw_parts_mut(self.storage.as_ptr().add(slot * self.stride), len)
        }
    }

    /// Raw pointer to the start of `slot`.
    ///
    /// The pointer is aligned to the chunk alignment plus a multiple of the
    /// stride. Callers that write through it must hold exclusive access to
    /// the owning world.
    #[inline]
    pub(crate) fn record_ptr(&self, slot: usize) -> NonNull<u8> {
        assert!(slot < self.capacity, "slot access out of bounds");
        // SAFETY: slot < capacity keeps the offset inside the allocation,
        // which is non-null.
        unsafe { NonNull::new_unchecked(self.storage.as_ptr().add(slot * self.stride)) }
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: `storage` and `blocks` describe exactly the boxed slice
        // produced in `new`, and it is released only here.
        unsafe {
            let slice = std::ptr::slice_from_raw_parts_mut(self.storage.as_ptr().cast::<Block>(), self.blocks);
            drop(Box::from_raw(slice));
        }
    }
}

// SAFETY: Chunk uniquely owns its allocation, like a Box<[u8]>.
unsafe impl Send for Chunk {}
// SAFETY: shared access only reads; writes through `record_ptr` require
// exclusive access to the owning world.
unsafe impl Sync for Chunk {}
