//! # World
//!
//! Owns the registry and every archetype, and translates entity handles
//! into (archetype, slot) coordinates.
//!
//! ## Insert Path
//!
//! ```text
//! (Speed, Pos) ──register──▶ indices [1, 0] ──▶ mask {0, 1}
//!                                                  │
//!            find_or_create_archetype(mask) ◀──────┘
//!                          │
//!     scratch: [ Pos | Speed ]   (registry order, not argument order)
//!                          │
//!              archetype.insert(scratch) ──▶ Entity
//! ```

use super::access::{fetch_one, mask_of, Bundle, ComponentSet, ExclusiveRecords, Fetch, Projection};
use super::archetype::Archetype;
use super::component::Component;
use super::entity::{Entity, EntityLocation};
use super::layout::{offset_in, RecordLayout};
use super::mask::ComponentMask;
use super::query::Query;
use super::registry::{DynamicRegistry, Registry, StaticRegistry};
use crate::config::WorldConfig;
use crate::error::{StrataError, StrataResult};
use crate::memory::HiveIndex;

/// Component capacity of [`DynamicWorld`]'s registry.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 16;

/// A world whose registry assigns indices on first use.
pub type DynamicWorld = World<DynamicRegistry<DEFAULT_REGISTRY_CAPACITY>>;

/// A world over a closed component list `L`.
pub type StaticWorld<L> = World<StaticRegistry<L>>;

/// The archetype store.
///
/// # Example
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
/// use strata_core::{Component, DynamicWorld};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Pos { x: f32, y: f32 }
/// impl Component for Pos {}
///
/// #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Speed { x: f32, y: f32 }
/// impl Component for Speed {}
///
/// let mut world = DynamicWorld::new();
/// let e = world.insert((Pos { x: 0.0, y: 0.0 }, Speed { x: 1.0, y: 2.0 })).unwrap();
///
/// for (pos, speed) in world.query::<(Pos, Speed)>().unwrap() {
///     pos.x += speed.x;
///     pos.y += speed.y;
/// }
///
/// let (pos,) = world.entity::<(Pos,)>(e).unwrap();
/// assert_eq!(*pos, Pos { x: 1.0, y: 2.0 });
/// ```
pub struct World<R: Registry = DynamicRegistry<DEFAULT_REGISTRY_CAPACITY>> {
    registry: R,
    /// Indexed by archetype id. Never shrinks.
    archetypes: Vec<Archetype>,
    config: WorldConfig,
    /// Record assembly buffer reused across inserts.
    scratch: Vec<u8>,
}

impl<R: Registry + Default> World<R> {
    /// Creates an empty world with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::assemble(R::default(), WorldConfig::default())
    }

    /// Creates an empty world with the given limits.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(config: WorldConfig) -> StrataResult<Self> {
        Self::with_registry(R::default(), config)
    }
}

impl<R: Registry + Default> Default for World<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registry> World<R> {
    /// Creates an empty world around an existing registry.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidConfig`] if `config` does not validate.
    pub fn with_registry(registry: R, config: WorldConfig) -> StrataResult<Self> {
        config.validate()?;
        Ok(Self::assemble(registry, config))
    }

    fn assemble(registry: R, config: WorldConfig) -> Self {
        tracing::debug!(
            chunk_capacity = config.chunk_capacity,
            max_chunks = config.max_chunks,
            max_archetypes = config.max_archetypes,
            "created world"
        );
        Self {
            registry,
            archetypes: Vec::new(),
            config,
            scratch: Vec::new(),
        }
    }

    /// Returns the registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns the limits.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns all archetypes, indexed by id.
    #[inline]
    #[must_use]
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Returns the archetype with `id`.
    #[inline]
    #[must_use]
    pub fn archetype(&self, id: u16) -> Option<&Archetype> {
        self.archetypes.get(usize::from(id))
    }

    /// Returns the number of live records across all archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archetypes.iter().map(Archetype::len).sum()
    }

    /// Checks if no record is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archetypes.iter().all(Archetype::is_empty)
    }

    /// Resolves the mask of a component set, registering unseen types.
    ///
    /// # Errors
    ///
    /// Propagates registry errors and rejects duplicate members.
    pub fn as_type_set<S: ComponentSet>(&mut self) -> StrataResult<ComponentMask> {
        let indices = S::register(&mut self.registry)?;
        Ok(mask_of(indices.as_ref()))
    }

    /// Byte offset of `T` inside records with components `mask`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnknownComponent`] if the registry does not
    /// know `T`.
    pub fn offset_in<T: Component>(&self, mask: ComponentMask) -> StrataResult<usize> {
        let index = self
            .registry
            .lookup::<T>()
            .ok_or(StrataError::UnknownComponent {
                name: std::any::type_name::<T>(),
            })?;
        Ok(offset_in(&self.registry, index, mask))
    }

    /// Returns the archetype for `mask`, creating it if needed.
    ///
    /// # Errors
    ///
    /// - [`StrataError::ArchetypeLimit`] if a new archetype is needed but
    ///   the configured limit is reached
    /// - layout errors if the mask's components cannot be packed soundly
    pub fn find_or_create_archetype(&mut self, mask: ComponentMask) -> StrataResult<&mut Archetype> {
        let index = self.resolve_archetype(mask)?;
        Ok(&mut self.archetypes[index])
    }

    fn resolve_archetype(&mut self, mask: ComponentMask) -> StrataResult<usize> {
        if let Some(index) = self.archetypes.iter().position(|a| a.mask() == mask) {
            return Ok(index);
        }

        let limit = usize::from(self.config.max_archetypes);
        if self.archetypes.len() >= limit {
            tracing::warn!(limit, ?mask, "archetype limit reached");
            return Err(StrataError::ArchetypeLimit { limit });
        }

        let layout = RecordLayout::for_mask(&self.registry, mask)?;
        let id = self.archetypes.len();
        let archetype = Archetype::new(id as u16, mask, layout, &self.config);
        tracing::debug!(
            id,
            ?mask,
            record_size = layout.size,
            align = layout.align,
            stride = archetype.stride(),
            "created archetype"
        );
        self.archetypes.push(archetype);
        Ok(id)
    }

    /// Stores a record and returns its handle.
    ///
    /// Members are laid out by registry index, so `(A, B)` and `(B, A)`
    /// produce identical records in the same archetype.
    ///
    /// # Errors
    ///
    /// Propagates registry, layout and allocation errors. A failed insert
    /// stores nothing.
    pub fn insert<B: Bundle>(&mut self, bundle: B) -> StrataResult<Entity> {
        let indices = B::register(&mut self.registry)?;
        let mask = mask_of(indices.as_ref());
        let index = self.resolve_archetype(mask)?;

        let registry = &self.registry;
        let archetype = &mut self.archetypes[index];
        let scratch = &mut self.scratch;
        scratch.clear();
        scratch.resize(archetype.record_size(), 0);
        bundle.for_each_component(|position, bytes| {
            let offset = offset_in(registry, indices.as_ref()[position], mask);
            scratch[offset..offset + bytes.len()].copy_from_slice(bytes);
        });

        let slot = archetype.insert(scratch.as_slice())?;
        let generation = archetype.generation(slot).unwrap_or_default();
        Ok(EntityLocation {
            generation,
            archetype: archetype.id(),
            slot,
        }
        .pack())
    }

    /// Borrows components of one record.
    ///
    /// The references point into storage: writes are visible to later
    /// lookups and queries.
    ///
    /// # Errors
    ///
    /// - [`StrataError::UnknownArchetype`], [`StrataError::SlotOutOfRange`],
    ///   [`StrataError::StaleEntity`] or [`StrataError::SlotNotLive`] if the
    ///   handle does not name a live record
    /// - [`StrataError::MissingComponents`] if the record lacks a member,
    ///   including one the registry has never seen (nothing is registered)
    /// - [`StrataError::DuplicateComponent`] if `F` repeats a type
    pub fn entity<F: Fetch>(&mut self, entity: Entity) -> StrataResult<F::Item<'_>> {
        let indices = F::resolve(&self.registry)?;
        let (index, slot) = self.locate(entity)?;
        let archetype = &mut self.archetypes[index];
        let projection = indices
            .and_then(|indices| Projection::<F>::new(&self.registry, &indices, archetype))
            .ok_or_else(|| StrataError::MissingComponents {
                requested: F::known_mask(&self.registry).bits(),
                available: archetype.mask().bits(),
            })?;
        fetch_one(archetype, &projection, slot)
    }

    /// Removes a record. Its handle, and every copy of it, becomes stale.
    ///
    /// # Errors
    ///
    /// Same handle errors as [`World::entity`].
    pub fn remove(&mut self, entity: Entity) -> StrataResult<()> {
        let (index, slot) = self.locate(entity)?;
        self.archetypes[index].remove(slot)
    }

    /// Checks whether `entity` names a live record.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.locate(entity).is_ok()
    }

    /// Iterates over `F`'s components in every record that has all of them.
    ///
    /// Never registers anything: a member no record has ever held makes
    /// the query empty.
    ///
    /// # Errors
    ///
    /// Rejects duplicate members.
    pub fn query<F: Fetch>(&mut self) -> StrataResult<Query<'_, R, F>> {
        let indices = F::resolve(&self.registry)?;
        let records = ExclusiveRecords::new(&mut self.archetypes);
        Ok(Query::new(&self.registry, records, indices))
    }

    /// Decodes a handle and checks it names a live record.
    fn locate(&self, entity: Entity) -> StrataResult<(usize, HiveIndex)> {
        let location = EntityLocation::unpack(entity);
        let index = usize::from(location.archetype);
        let archetype = self
            .archetypes
            .get(index)
            .ok_or(StrataError::UnknownArchetype(location.archetype))?;

        let found = archetype
            .generation(location.slot)
            .ok_or(StrataError::SlotOutOfRange {
                chunk: location.slot.chunk(),
                slot: location.slot.slot(),
            })?;
        if found != location.generation {
            return Err(StrataError::StaleEntity {
                expected: location.generation,
                found,
            });
        }

        archetype.at(location.slot)?;
        Ok((index, location.slot))
    }
}

impl<R: Registry> std::fmt::Debug for World<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("archetypes", &self.archetypes.len())
            .field("len", &self.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
