//! # Typed Record Access
//!
//! The only place where record bytes become typed references.
//!
//! - [`ComponentSet`]: a tuple of component types, resolved to registry
//!   indices
//! - [`Bundle`]: a tuple of component values, written into a record
//! - [`Fetch`]: a tuple of component types, projected out of a record as
//!   `&mut` references
//!
//! All three are implemented for tuples of up to 12 components and sealed.
//! `Projection` and `ExclusiveRecords` are the crate-internal gate in front
//! of [`Fetch::fetch`]: a projection can only be built for an archetype that
//! holds every requested component, and exclusive records hand out each
//! record at most once per borrow of the world.

// SAFETY: Typed projection of raw records. Every `&mut T` is produced from
// a live, aligned record of an archetype whose mask contains `T`, while the
// owning world is exclusively borrowed.
#![allow(unsafe_code)]

use std::any::TypeId;
use std::fmt;
use std::ptr::NonNull;

use super::archetype::Archetype;
use super::component::Component;
use super::layout::offset_in;
use super::mask::ComponentMask;
use super::registry::Registry;
use crate::error::{StrataError, StrataResult};
use crate::memory::HiveIndex;

mod sealed {
    pub trait Sealed {}
}

/// A tuple of distinct component types.
pub trait ComponentSet: sealed::Sealed + 'static {
    /// One registry index per tuple position.
    type Indices: Copy + Default + AsRef<[usize]> + AsMut<[usize]> + fmt::Debug + Send + Sync;

    /// Resolves the registry index of every member, registering unseen types
    /// when the registry supports it.
    ///
    /// # Errors
    ///
    /// Propagates registry errors, and returns
    /// [`StrataError::DuplicateComponent`] if a type appears twice.
    ///
    /// Nothing is registered unless every member can be: a failed call
    /// leaves the registry as it was.
    fn register<R: Registry>(registry: &mut R) -> StrataResult<Self::Indices>;

    /// Resolves the registry index of every member without registering
    /// anything. Returns `Ok(None)` if some member is not known yet.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::DuplicateComponent`] if a type appears twice.
    fn resolve<R: Registry>(registry: &R) -> StrataResult<Option<Self::Indices>>;

    /// Mask of the members the registry already knows.
    fn known_mask<R: Registry>(registry: &R) -> ComponentMask;
}

/// A tuple of component values that can be stored as one record.
pub trait Bundle: ComponentSet {
    /// Calls `f` with the tuple position and raw bytes of every member.
    fn for_each_component(&self, f: impl FnMut(usize, &[u8]));
}

/// A tuple of component types that can be borrowed out of one record.
pub trait Fetch: ComponentSet {
    /// `(&'w mut A, &'w mut B, ...)`.
    type Item<'w>;

    /// Builds the references for one record.
    ///
    /// # Safety
    ///
    /// `record` must point at a live record, valid and not otherwise
    /// borrowed for `'w`, that holds member `k` at byte offset `offsets[k]`
    /// with correct alignment. Offsets must be pairwise distinct.
    unsafe fn fetch<'w>(record: NonNull<u8>, offsets: &Self::Indices) -> Self::Item<'w>;
}

fn check_distinct(ids: &[TypeId], names: &[&'static str]) -> StrataResult<()> {
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(StrataError::DuplicateComponent { name: names[i] });
        }
    }
    Ok(())
}

/// Mask holding every index in `indices`.
#[inline]
pub(crate) fn mask_of(indices: &[usize]) -> ComponentMask {
    indices
        .iter()
        .fold(ComponentMask::EMPTY, |mask, &index| mask.with(index))
}

macro_rules! impl_component_set {
    ($n:literal => $($idx:tt $T:ident),*) => {
        impl<$($T: Component),*> sealed::Sealed for ($($T,)*) {}

        impl<$($T: Component),*> ComponentSet for ($($T,)*) {
            type Indices = [usize; $n];

            #[allow(unused_variables, unused_mut)]
            fn register<R: Registry>(registry: &mut R) -> StrataResult<[usize; $n]> {
                let names: [&'static str; $n] = [$(std::any::type_name::<$T>()),*];
                check_distinct(&[$(TypeId::of::<$T>()),*], &names)?;

                let mut unseen: [&'static str; $n] = [""; $n];
                let mut count = 0;
                $(
                    if registry.lookup::<$T>().is_none() {
                        unseen[count] = names[$idx];
                        count += 1;
                    }
                )*
                registry.admit(&unseen[..count])?;

                Ok([$(registry.index_of::<$T>()?),*])
            }

            #[allow(unused_variables, unused_mut)]
            fn resolve<R: Registry>(registry: &R) -> StrataResult<Option<[usize; $n]>> {
                check_distinct(
                    &[$(TypeId::of::<$T>()),*],
                    &[$(std::any::type_name::<$T>()),*],
                )?;
                let mut indices = [0usize; $n];
                $(
                    match registry.lookup::<$T>() {
                        Some(index) => indices[$idx] = index,
                        None => return Ok(None),
                    }
                )*
                Ok(Some(indices))
            }

            #[allow(unused_variables)]
            fn known_mask<R: Registry>(registry: &R) -> ComponentMask {
                let mask = ComponentMask::EMPTY;
                $( let mask = registry.lookup::<$T>().map_or(mask, |index| mask.with(index)); )*
                mask
            }
        }

        impl<$($T: Component),*> Bundle for ($($T,)*) {
            #[allow(unused_variables, unused_mut)]
            fn for_each_component(&self, mut f: impl FnMut(usize, &[u8])) {
                $( f($idx, bytemuck::bytes_of(&self.$idx)); )*
            }
        }

        impl<$($T: Component),*> Fetch for ($($T,)*) {
            type Item<'w> = ($(&'w mut $T,)*);

            #[allow(unused_variables, clippy::unused_unit)]
            unsafe fn fetch<'w>(record: NonNull<u8>, offsets: &[usize; $n]) -> Self::Item<'w> {
                ($( &mut *record.as_ptr().add(offsets[$idx]).cast::<$T>(), )*)
            }
        }
    };
}

impl_component_set!(0 =>);
impl_component_set!(1 => 0 A);
impl_component_set!(2 => 0 A, 1 B);
impl_component_set!(3 => 0 A, 1 B, 2 C);
impl_component_set!(4 => 0 A, 1 B, 2 C, 3 D);
impl_component_set!(5 => 0 A, 1 B, 2 C, 3 D, 4 E);
impl_component_set!(6 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_component_set!(7 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_component_set!(8 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
impl_component_set!(9 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I);
impl_component_set!(10 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J);
impl_component_set!(11 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K);
impl_component_set!(12 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L);

/// Byte offsets of a fetch's members inside one archetype's records.
pub(crate) struct Projection<F: Fetch> {
    archetype: u16,
    offsets: F::Indices,
}

impl<F: Fetch> Projection<F> {
    /// Computes offsets for `archetype`, or `None` if it lacks a member or
    /// `indices` repeats one.
    pub(crate) fn new<R: Registry>(
        registry: &R,
        indices: &F::Indices,
        archetype: &Archetype,
    ) -> Option<Self> {
        let indices = indices.as_ref();
        let requested = mask_of(indices);
        if requested.len() != indices.len() || !archetype.mask().is_superset_of(requested) {
            return None;
        }

        let mut offsets = F::Indices::default();
        for (offset, &index) in offsets.as_mut().iter_mut().zip(indices) {
            *offset = offset_in(registry, index, archetype.mask());
        }
        debug_assert!(
            offsets.as_ref().iter().zip(indices).all(|(&offset, &index)| {
                offset + registry.size_of(index).unwrap_or_default() <= archetype.record_size()
            }),
            "projection offsets exceed the record"
        );
        Some(Self {
            archetype: archetype.id(),
            offsets,
        })
    }

    /// Archetype the offsets were computed for.
    #[inline]
    pub(crate) fn archetype(&self) -> u16 {
        self.archetype
    }
}

impl<F: Fetch> fmt::Debug for Projection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("archetype", &self.archetype)
            .field("offsets", &self.offsets)
            .finish()
    }
}

/// Borrows one record of an exclusively borrowed archetype.
///
/// # Errors
///
/// Returns a hive address error if `slot` is not live, and
/// [`StrataError::UnknownArchetype`] if `projection` was computed for a
/// different archetype.
pub(crate) fn fetch_one<'w, F: Fetch>(
    archetype: &'w mut Archetype,
    projection: &Projection<F>,
    slot: HiveIndex,
) -> StrataResult<F::Item<'w>> {
    if projection.archetype != archetype.id() {
        return Err(StrataError::UnknownArchetype(projection.archetype));
    }
    archetype.at(slot)?;
    let record = archetype.hive().record_ptr(slot);
    // SAFETY: the slot is live; the projection belongs to this archetype so
    // its offsets are distinct and aligned inside the record; `&'w mut`
    // rules out any other borrow of the archetype for 'w.
    Ok(unsafe { F::fetch(record, &projection.offsets) })
}

/// Hands out each record of an exclusively borrowed archetype list at most
/// once, in strictly increasing (archetype, slot) order.
pub(crate) struct ExclusiveRecords<'w> {
    archetypes: &'w [Archetype],
    last: Option<(u16, HiveIndex)>,
}

impl<'w> ExclusiveRecords<'w> {
    pub(crate) fn new(archetypes: &'w mut [Archetype]) -> Self {
        Self {
            archetypes,
            last: None,
        }
    }

    /// Read-only view for scanning; never used to reach record bytes.
    #[inline]
    pub(crate) fn archetypes(&self) -> &'w [Archetype] {
        self.archetypes
    }

    /// Borrows the record at `slot` of the projection's archetype.
    ///
    /// Returns `None` if the slot is not live or does not come after the
    /// previously fetched record.
    pub(crate) fn fetch<F: Fetch>(
        &mut self,
        projection: &Projection<F>,
        slot: HiveIndex,
    ) -> Option<F::Item<'w>> {
        let archetype = self.archetypes.get(usize::from(projection.archetype))?;
        let key = (projection.archetype, slot);
        if self.last.is_some_and(|last| last >= key) || !archetype.hive().contains(slot) {
            return None;
        }
        self.last = Some(key);
        let record = archetype.hive().record_ptr(slot);
        // SAFETY: the slot is live and the projection belongs to its
        // archetype. The list was borrowed mutably for 'w and keys strictly
        // increase, so no two items alias.
        Some(unsafe { F::fetch(record, &projection.offsets) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::ecs::layout::RecordLayout;
    use crate::ecs::{DynamicRegistry, StaticRegistry};
    use bytemuck::{Pod, Zeroable};

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Pos {
        x: f32,
        y: f32,
    }
    impl Component for Pos {}

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Mass(f32);
    impl Component for Mass {}

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Tag(u32);
    impl Component for Tag {}

    type Reg = StaticRegistry<(Pos, Mass)>;

    fn archetype_for(registry: &Reg, mask: ComponentMask) -> Archetype {
        let layout = RecordLayout::for_mask(registry, mask).unwrap();
        Archetype::new(0, mask, layout, &WorldConfig::default())
    }

    #[test]
    fn test_register_resolves_in_tuple_order() {
        let mut registry = Reg::new();
        assert_eq!(<(Mass, Pos)>::register(&mut registry).unwrap(), [1, 0]);
        assert_eq!(<()>::register(&mut registry).unwrap(), [0usize; 0]);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = DynamicRegistry::<4>::new();
        let err = <(Pos, Mass, Pos)>::register(&mut registry).unwrap_err();
        assert!(matches!(err, StrataError::DuplicateComponent { name } if name.ends_with("Pos")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_is_all_or_nothing() {
        let mut registry = DynamicRegistry::<2>::new();
        <(Mass,)>::register(&mut registry).unwrap();

        let err = <(Mass, Pos, Tag)>::register(&mut registry).unwrap_err();
        assert!(matches!(err, StrataError::RegistryFull { capacity: 2, name } if name.ends_with("Tag")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup::<Pos>(), None);

        assert_eq!(<(Pos, Mass)>::register(&mut registry).unwrap(), [1, 0]);
    }

    #[test]
    fn test_resolve_never_registers() {
        let mut registry = DynamicRegistry::<4>::new();
        assert_eq!(<(Pos,)>::resolve(&registry), Ok(None));
        assert!(registry.is_empty());

        registry.index_of::<Mass>().unwrap();
        registry.index_of::<Pos>().unwrap();
        assert_eq!(<(Pos, Mass)>::resolve(&registry), Ok(Some([1, 0])));
        assert_eq!(<()>::resolve(&registry), Ok(Some([])));
        assert_eq!(
            <(Tag, Pos)>::known_mask(&registry),
            ComponentMask::EMPTY.with(1)
        );
        assert!(matches!(
            <(Mass, Mass)>::resolve(&registry),
            Err(StrataError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn test_bundle_yields_bytes_by_position() {
        let bundle = (Mass(2.0), Pos { x: 1.0, y: 3.0 });
        let mut seen = Vec::new();
        bundle.for_each_component(|position, bytes| seen.push((position, bytes.len())));
        assert_eq!(seen, vec![(0, 4), (1, 8)]);
    }

    #[test]
    fn test_projection_requires_superset() {
        let registry = Reg::new();
        let archetype = archetype_for(&registry, ComponentMask::EMPTY.with(0));
        assert!(Projection::<(Pos,)>::new(&registry, &[0], &archetype).is_some());
        assert!(Projection::<(Pos, Mass)>::new(&registry, &[0, 1], &archetype).is_none());
    }

    #[test]
    fn test_fetch_one_reads_and_writes() {
        let registry = Reg::new();
        let mask = ComponentMask::EMPTY.with(0).with(1);
        let mut archetype = archetype_for(&registry, mask);
        let mut record = Vec::new();
        record.extend_from_slice(bytemuck::bytes_of(&Pos { x: 1.0, y: 2.0 }));
        record.extend_from_slice(bytemuck::bytes_of(&Mass(5.0)));
        let slot = archetype.insert(&record).unwrap();

        let projection = Projection::<(Mass, Pos)>::new(&registry, &[1, 0], &archetype).unwrap();
        let (mass, pos) = fetch_one(&mut archetype, &projection, slot).unwrap();
        assert_eq!(*mass, Mass(5.0));
        assert_eq!(*pos, Pos { x: 1.0, y: 2.0 });
        pos.x = 10.0;

        assert_eq!(&archetype.at(slot).unwrap()[..4], bytemuck::bytes_of(&10.0f32));
    }

    #[test]
    fn test_exclusive_records_refuse_revisits() {
        let registry = Reg::new();
        let mask = ComponentMask::EMPTY.with(1);
        let mut archetypes = vec![archetype_for(&registry, mask)];
        let a = archetypes[0].insert(bytemuck::bytes_of(&Mass(1.0))).unwrap();
        let b = archetypes[0].insert(bytemuck::bytes_of(&Mass(2.0))).unwrap();

        let projection = Projection::<(Mass,)>::new(&registry, &[1], &archetypes[0]).unwrap();
        let mut records = ExclusiveRecords::new(&mut archetypes);
        assert!(records.fetch(&projection, a).is_some());
        assert!(records.fetch(&projection, a).is_none());
        let (mass,) = records.fetch(&projection, b).unwrap();
        assert_eq!(*mass, Mass(2.0));
    }
}
