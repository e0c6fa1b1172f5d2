//! # Entity Handles
//!
//! An [`Entity`] is an opaque 64-bit handle:
//!
//! ```text
//! [ generation: 16 | archetype: 16 | chunk: 16 | slot: 16 ]
//!   bits 63..48      bits 47..32     bits 31..0 = HiveIndex
//! ```
//!
//! Handles are produced by [`World::insert`](crate::World::insert) and
//! decoded only inside the crate. The generation is the slot's generation
//! at insert time; removing the record advances it, which turns every copy
//! of the handle stale.

use std::fmt;

use crate::memory::HiveIndex;

/// Opaque handle to one record in a [`World`](crate::World).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Packed representation, for storing handles outside the world.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from [`Entity::to_bits`].
    ///
    /// Bits that never came from `to_bits` decode to some location; the
    /// world rejects them on use unless they happen to name a live record.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = EntityLocation::unpack(*self);
        write!(
            f,
            "Entity({}:{}:{}v{})",
            location.archetype,
            location.slot.chunk(),
            location.slot.slot(),
            location.generation
        )
    }
}

/// Decoded form of an [`Entity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EntityLocation {
    pub(crate) generation: u16,
    pub(crate) archetype: u16,
    pub(crate) slot: HiveIndex,
}

impl EntityLocation {
    #[inline]
    pub(crate) const fn pack(self) -> Entity {
        Entity(
            ((self.generation as u64) << 48)
                | ((self.archetype as u64) << 32)
                | self.slot.to_bits() as u64,
        )
    }

    #[inline]
    pub(crate) const fn unpack(entity: Entity) -> Self {
        Self {
            generation: (entity.0 >> 48) as u16,
            archetype: (entity.0 >> 32) as u16,
            slot: HiveIndex::from_bits(entity.0 as u32),
        }
    }
}
