//! # Hive Allocator
//!
//! Chunked slot allocator with stable addresses and LIFO slot reuse.
//!
//! ## Addressing
//!
//! ```text
//! HiveIndex (u32):  [ chunk: u16 | slot: u16 ]
//! ```
//!
//! A slot keeps its address for as long as it is live. Removing a record
//! never moves another one.
//!
//! ## Free list
//!
//! A freed slot stores the address of the previous free-list head in its
//! own first four bytes, so the free list costs no memory beyond the slots
//! themselves:
//!
//! ```text
//! next_free -> (0, 7) -> (2, 1) -> (0, 3) -> NONE
//! ```
//!
//! `create` pops the head when there is one, otherwise it bump-allocates in
//! the newest chunk and appends a chunk once that one is exhausted.

use super::chunk::{Chunk, CHUNK_ALIGN};
use crate::config::DEFAULT_CHUNK_CAPACITY;
use crate::error::{StrataError, StrataResult};

/// Bytes a free slot needs to hold its free-list link.
pub const LINK_SIZE: usize = std::mem::size_of::<u32>();

/// Encoded "no next free slot".
const LINK_NONE: u32 = u32::MAX;

/// Stable two-level address of a hive slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct HiveIndex(u32);

impl HiveIndex {
    /// Builds an address from its chunk and in-chunk parts.
    #[inline]
    #[must_use]
    pub const fn new(chunk: u16, slot: u16) -> Self {
        Self(((chunk as u32) << 16) | slot as u32)
    }

    /// Chunk part of the address.
    #[inline]
    #[must_use]
    pub const fn chunk(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// In-chunk part of the address.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u16 {
        self.0 as u16
    }

    /// Packed representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    /// Inverse of [`HiveIndex::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
#[inline]
const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Chunked allocator for fixed-size records.
///
/// # Example
///
/// ```rust
/// use strata_core::Hive;
///
/// let mut hive = Hive::new(8, 4);
/// let (a, bytes) = hive.create().unwrap();
/// bytes.copy_from_slice(&[1; 8]);
/// hive.remove(a).unwrap();
///
/// // LIFO reuse: the freed address comes back first.
/// let (b, _) = hive.create().unwrap();
/// assert_eq!(a, b);
/// ```
pub struct Hive {
    /// Chunks in creation order; the last one is the bump target.
    chunks: Vec<Chunk>,
    /// Head of the intrusive free list.
    next_free: Option<HiveIndex>,
    /// Bytes a caller may use per slot.
    record_size: usize,
    /// Bytes between consecutive slots.
    stride: usize,
    /// Slots per chunk.
    chunk_capacity: usize,
    /// Chunk limit.
    max_chunks: usize,
    /// Live slots across all chunks.
    len: usize,
}

impl Hive {
    /// Creates an empty hive with the default chunk capacity and no chunk
    /// limit beyond the address space.
    ///
    /// # Panics
    ///
    /// Panics if `record_align` is not a power of two or exceeds 16.
    #[must_use]
    pub fn new(record_size: usize, record_align: usize) -> Self {
        Self::with_limits(record_size, record_align, DEFAULT_CHUNK_CAPACITY, u16::MAX)
    }

    /// Creates an empty hive with explicit limits.
    ///
    /// # Panics
    ///
    /// Panics if `record_align` is not a power of two or exceeds 16, or if
    /// either limit is zero.
    #[must_use]
    pub fn with_limits(
        record_size: usize,
        record_align: usize,
        chunk_capacity: u16,
        max_chunks: u16,
    ) -> Self {
        assert!(
            record_align.is_power_of_two() && record_align <= CHUNK_ALIGN,
            "record alignment must be a power of two no larger than {CHUNK_ALIGN}"
        );
        assert!(chunk_capacity > 0 && max_chunks > 0, "hive limits must be non-zero");

        let stride = align_up(record_size.max(LINK_SIZE), record_align);
        Self {
            chunks: Vec::new(),
            next_free: None,
            record_size,
            stride,
            chunk_capacity: usize::from(chunk_capacity),
            max_chunks: usize::from(max_chunks),
            len: 0,
        }
    }

    /// Returns the number of live slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if no slot is live.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots across all allocated chunks.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_capacity
    }

    /// Returns the number of allocated chunks.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the bytes available to callers per slot.
    #[inline]
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Returns the distance in bytes between consecutive slots.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Allocates a slot.
    ///
    /// The returned bytes are stale: a recycled slot still holds its old
    /// record (and its free-list link). Callers must overwrite all of them.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::HiveExhausted`] when every slot of every
    /// permitted chunk is live.
    pub fn create(&mut self) -> StrataResult<(HiveIndex, &mut [u8])> {
        let index = match self.next_free {
            Some(head) => {
                let chunk = &mut self.chunks[usize::from(head.chunk())];
                let slot = usize::from(head.slot());
                let mut link = [0u8; LINK_SIZE];
                link.copy_from_slice(chunk.bytes(slot, LINK_SIZE));
                self.next_free = decode_link(u32::from_le_bytes(link));
                head
            }
            None => self.bump()?,
        };

        let chunk = &mut self.chunks[usize::from(index.chunk())];
        let slot = usize::from(index.slot());
        chunk.set_occupied(slot);
        self.len += 1;
        Ok((index, chunk.bytes_mut(slot, self.record_size)))
    }

    /// Bump-allocates in the newest chunk, appending one if it is full.
    fn bump(&mut self) -> StrataResult<HiveIndex> {
        if let Some(slot) = self.chunks.last_mut().and_then(Chunk::bump) {
            let chunk = self.chunks.len() - 1;
            return Ok(HiveIndex::new(chunk as u16, slot as u16));
        }

        if self.chunks.len() >= self.max_chunks {
            tracing::warn!(
                chunks = self.chunks.len(),
                chunk_capacity = self.chunk_capacity,
                "hive exhausted"
            );
            return Err(StrataError::HiveExhausted {
                chunks: self.chunks.len(),
                chunk_capacity: self.chunk_capacity,
            });
        }

        let mut chunk = Chunk::new(self.stride, self.chunk_capacity);
        let slot = chunk.bump().unwrap_or_default();
        self.chunks.push(chunk);
        tracing::trace!(
            chunks = self.chunks.len(),
            stride = self.stride,
            "hive grew by one chunk"
        );
        Ok(HiveIndex::new((self.chunks.len() - 1) as u16, slot as u16))
    }

    /// Borrows the record bytes of a live slot.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::SlotOutOfRange`] or [`StrataError::SlotNotLive`].
    pub fn get(&self, index: HiveIndex) -> StrataResult<&[u8]> {
        let (chunk, slot) = self.live_chunk(index)?;
        Ok(self.chunks[chunk].bytes(slot, self.record_size))
    }

    /// Mutably borrows the record bytes of a live slot.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::SlotOutOfRange`] or [`StrataError::SlotNotLive`].
    pub fn get_mut(&mut self, index: HiveIndex) -> StrataResult<&mut [u8]> {
        let (chunk, slot) = self.live_chunk(index)?;
        let record_size = self.record_size;
        Ok(self.chunks[chunk].bytes_mut(slot, record_size))
    }

    /// Frees a live slot and pushes it onto the free list.
    ///
    /// The slot's generation advances, so handles stamped with the old
    /// generation no longer match.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::SlotOutOfRange`] or [`StrataError::SlotNotLive`];
    /// in both cases nothing changes.
    pub fn remove(&mut self, index: HiveIndex) -> StrataResult<()> {
        let (chunk, slot) = self.live_chunk(index)?;
        let link = encode_link(self.next_free);
        let chunk = &mut self.chunks[chunk];
        chunk.bytes_mut(slot, LINK_SIZE).copy_from_slice(&link.to_le_bytes());
        chunk.clear_occupied(slot);
        chunk.advance_generation(slot);
        self.next_free = Some(index);
        self.len -= 1;
        Ok(())
    }

    /// Checks whether `index` addresses a live slot.
    #[must_use]
    pub fn contains(&self, index: HiveIndex) -> bool {
        self.live_chunk(index).is_ok()
    }

    /// Current generation of a slot, live or free.
    ///
    /// Returns `None` for addresses outside the allocated chunks.
    #[must_use]
    pub fn generation(&self, index: HiveIndex) -> Option<u16> {
        let chunk = self.chunks.get(usize::from(index.chunk()))?;
        let slot = usize::from(index.slot());
        (slot < chunk.capacity()).then(|| chunk.generation(slot))
    }

    /// Iterates over live slots in address order.
    #[must_use]
    pub fn iter(&self) -> HiveIter<'_> {
        debug_assert_eq!(self.chunks.iter().map(Chunk::live).sum::<usize>(), self.len);
        HiveIter {
            hive: self,
            cursor: Some(HiveIndex::new(0, 0)),
        }
    }

    /// First live slot at or after `from`, in address order.
    pub(crate) fn seek(&self, from: HiveIndex) -> Option<HiveIndex> {
        let mut chunk = usize::from(from.chunk());
        let mut slot = usize::from(from.slot());
        while let Some(current) = self.chunks.get(chunk) {
            if let Some(found) = current.next_occupied(slot) {
                return Some(HiveIndex::new(chunk as u16, found as u16));
            }
            chunk += 1;
            slot = 0;
        }
        None
    }

    /// Address following `index` in scan order, or `None` past the last
    /// possible slot.
    pub(crate) fn successor(&self, index: HiveIndex) -> Option<HiveIndex> {
        let slot = usize::from(index.slot()) + 1;
        if slot < self.chunk_capacity {
            Some(HiveIndex::new(index.chunk(), slot as u16))
        } else {
            let chunk = usize::from(index.chunk()) + 1;
            (chunk < self.chunks.len()).then(|| HiveIndex::new(chunk as u16, 0))
        }
    }

    /// Raw pointer to a slot's record. The slot must be live.
    pub(crate) fn record_ptr(&self, index: HiveIndex) -> std::ptr::NonNull<u8> {
        self.chunks[usize::from(index.chunk())].record_ptr(usize::from(index.slot()))
    }

    /// Resolves `index` to (chunk, slot) if it addresses a live slot.
    fn live_chunk(&self, index: HiveIndex) -> StrataResult<(usize, usize)> {
        let chunk = usize::from(index.chunk());
        let slot = usize::from(index.slot());
        match self.chunks.get(chunk) {
            Some(c) if slot < c.capacity() => {
                if c.is_occupied(slot) {
                    Ok((chunk, slot))
                } else {
                    Err(StrataError::SlotNotLive {
                        chunk: index.chunk(),
                        slot: index.slot(),
                    })
                }
            }
            _ => Err(StrataError::SlotOutOfRange {
                chunk: index.chunk(),
                slot: index.slot(),
            }),
        }
    }
}

impl std::fmt::Debug for Hive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hive")
            .field("len", &self.len)
            .field("chunks", &self.chunks.len())
            .field("record_size", &self.record_size)
            .field("stride", &self.stride)
            .field("next_free", &self.next_free)
            .finish()
    }
}

#[inline]
fn encode_link(next: Option<HiveIndex>) -> u32 {
    next.map_or(LINK_NONE, HiveIndex::to_bits)
}

#[inline]
fn decode_link(bits: u32) -> Option<HiveIndex> {
    (bits != LINK_NONE).then_some(HiveIndex::from_bits(bits))
}

/// Iterator over the live slots of a [`Hive`].
pub struct HiveIter<'a> {
    hive: &'a Hive,
    cursor: Option<HiveIndex>,
}

impl<'a> Iterator for HiveIter<'a> {
    type Item = (HiveIndex, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.hive.seek(self.cursor?)?;
        self.cursor = self.hive.successor(found);
        let chunk = &self.hive.chunks[usize::from(found.chunk())];
        Some((found, chunk.bytes(usize::from(found.slot()), self.hive.record_size)))
    }
}

impl std::iter::FusedIterator for HiveIter<'_> {}
