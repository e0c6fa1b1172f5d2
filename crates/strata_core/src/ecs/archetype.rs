//! # Archetype Storage
//!
//! One archetype per exact component mask. Its records are packed byte
//! strings laid out by [`RecordLayout`], stored in a [`Hive`] so that
//! removal never moves another record.
//!
//! ## Memory Layout
//!
//! ```text
//! chunk 0: [rec 0][rec 1][free ][rec 3] ...   stride = align_up(size, align)
//! chunk 1: [rec 0][rec 1] ...
//! ```

use super::layout::RecordLayout;
use super::mask::ComponentMask;
use crate::config::WorldConfig;
use crate::error::{StrataError, StrataResult};
use crate::memory::{Hive, HiveIndex, HiveIter};

/// Storage for every record with one exact component mask.
#[derive(Debug)]
pub struct Archetype {
    /// Position in the world's archetype list.
    id: u16,
    /// Components present in every record.
    mask: ComponentMask,
    /// Size and alignment of one record.
    layout: RecordLayout,
    /// Slot storage.
    storage: Hive,
}

impl Archetype {
    /// Creates an empty archetype.
    ///
    /// # Arguments
    ///
    /// * `id` - Position of the archetype in its world
    /// * `mask` - Components every record holds
    /// * `layout` - Layout computed for `mask`
    /// * `config` - Chunk limits for the backing hive
    #[must_use]
    pub fn new(id: u16, mask: ComponentMask, layout: RecordLayout, config: &WorldConfig) -> Self {
        Self {
            id,
            mask,
            layout,
            storage: Hive::with_limits(
                layout.size,
                layout.align,
                config.chunk_capacity,
                config.max_chunks,
            ),
        }
    }

    /// Returns the archetype id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Returns the component mask.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Returns the record layout.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Returns the size of one record in bytes.
    #[inline]
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.layout.size
    }

    /// Returns the distance between consecutive slots in bytes.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.storage.stride()
    }

    /// Returns the number of live records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Checks if the archetype holds no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns the number of slots currently allocated.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Copies a complete record into a fresh slot.
    ///
    /// # Errors
    ///
    /// - [`StrataError::RecordSizeMismatch`] if `record` is not exactly one
    ///   record long
    /// - [`StrataError::HiveExhausted`] if no slot can be allocated
    pub fn insert(&mut self, record: &[u8]) -> StrataResult<HiveIndex> {
        if record.len() != self.layout.size {
            return Err(StrataError::RecordSizeMismatch {
                expected: self.layout.size,
                actual: record.len(),
            });
        }
        let (slot, bytes) = self.storage.create()?;
        bytes.copy_from_slice(record);
        Ok(slot)
    }

    /// Borrows the record at `slot`.
    ///
    /// # Errors
    ///
    /// Returns a hive address error if `slot` is not live.
    #[inline]
    pub fn at(&self, slot: HiveIndex) -> StrataResult<&[u8]> {
        self.storage.get(slot)
    }

    /// Mutably borrows the record at `slot`.
    ///
    /// # Errors
    ///
    /// Returns a hive address error if `slot` is not live.
    #[inline]
    pub fn at_mut(&mut self, slot: HiveIndex) -> StrataResult<&mut [u8]> {
        self.storage.get_mut(slot)
    }

    /// Frees the record at `slot`. Other records keep their addresses.
    ///
    /// # Errors
    ///
    /// Returns a hive address error if `slot` is not live.
    pub fn remove(&mut self, slot: HiveIndex) -> StrataResult<()> {
        self.storage.remove(slot)?;
        tracing::trace!(archetype = self.id, ?slot, "removed record");
        Ok(())
    }

    /// Current generation of `slot`.
    #[inline]
    #[must_use]
    pub fn generation(&self, slot: HiveIndex) -> Option<u16> {
        self.storage.generation(slot)
    }

    /// Iterates over live records in address order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> HiveIter<'_> {
        self.storage.iter()
    }

    /// Backing hive.
    #[inline]
    pub(crate) fn hive(&self) -> &Hive {
        &self.storage
    }
}
