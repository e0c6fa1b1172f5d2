//! # Query Iterator
//!
//! Visits every record whose archetype holds all requested components.
//!
//! ```text
//!            ┌──────────────────────┐  superset found   ┌────────────────────┐
//!  start ──▶ │ ScanningArchetypes   │ ────────────────▶ │ ScanningRecords    │
//!            │ next: usize          │ ◀──────────────── │ archetype, cursor  │
//!            └──────────────────────┘  archetype done   └────────────────────┘
//!                       │ list exhausted
//!                       ▼
//!                  Exhausted
//! ```
//!
//! Offsets are recomputed each time a new archetype is entered: the same
//! component may sit at different offsets in different archetypes.
//!
//! A query borrows its world mutably, so the world cannot be changed while
//! the query or any reference it yielded is alive.

use std::iter::FusedIterator;

use super::access::{mask_of, ExclusiveRecords, Fetch, Projection};
use super::entity::{Entity, EntityLocation};
use super::mask::ComponentMask;
use super::registry::Registry;
use crate::memory::HiveIndex;

enum QueryState<F: Fetch> {
    /// Looking for the next matching archetype at or after `next`.
    ScanningArchetypes { next: usize },
    /// Walking the live records of one archetype.
    ScanningRecords {
        archetype: usize,
        projection: Projection<F>,
        cursor: Option<HiveIndex>,
    },
    Exhausted,
}

/// Iterator over `F`'s components in every matching record.
///
/// Created by [`World::query`](crate::World::query).
pub struct Query<'w, R: Registry, F: Fetch> {
    registry: &'w R,
    records: ExclusiveRecords<'w>,
    indices: F::Indices,
    mask: ComponentMask,
    state: QueryState<F>,
}

impl<'w, R: Registry, F: Fetch> Query<'w, R, F> {
    /// `None` indices mean some member was never registered, so no record
    /// can match and the query starts exhausted.
    pub(crate) fn new(
        registry: &'w R,
        records: ExclusiveRecords<'w>,
        indices: Option<F::Indices>,
    ) -> Self {
        let (indices, mask, state) = match indices {
            Some(indices) => (
                indices,
                mask_of(indices.as_ref()),
                QueryState::ScanningArchetypes { next: 0 },
            ),
            None => (F::Indices::default(), F::known_mask(registry), QueryState::Exhausted),
        };
        Self {
            registry,
            records,
            indices,
            mask,
            state,
        }
    }

    /// Mask of the requested components.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Checks whether the query has run past its last archetype.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, QueryState::Exhausted)
    }

    /// Also yields the handle of every visited record.
    #[must_use]
    pub fn with_entities(self) -> QueryWithEntities<'w, R, F> {
        QueryWithEntities { inner: self }
    }

    fn advance(&mut self) -> Option<(Entity, F::Item<'w>)> {
        loop {
            match &mut self.state {
                QueryState::ScanningArchetypes { next } => {
                    let archetypes = self.records.archetypes();
                    let start = *next;
                    let found = archetypes
                        .get(start..)
                        .and_then(|rest| rest.iter().position(|a| a.mask().is_superset_of(self.mask)));
                    self.state = match found {
                        Some(offset) => {
                            let index = start + offset;
                            match Projection::new(self.registry, &self.indices, &archetypes[index]) {
                                Some(projection) => QueryState::ScanningRecords {
                                    archetype: index,
                                    projection,
                                    cursor: Some(HiveIndex::new(0, 0)),
                                },
                                None => QueryState::ScanningArchetypes { next: index + 1 },
                            }
                        }
                        None => QueryState::Exhausted,
                    };
                }
                QueryState::ScanningRecords {
                    archetype,
                    projection,
                    cursor,
                } => {
                    let hive = self.records.archetypes()[*archetype].hive();
                    let Some(slot) = cursor.and_then(|from| hive.seek(from)) else {
                        let next = *archetype + 1;
                        self.state = QueryState::ScanningArchetypes { next };
                        continue;
                    };
                    *cursor = hive.successor(slot);

                    let entity = EntityLocation {
                        generation: hive.generation(slot).unwrap_or_default(),
                        archetype: projection.archetype(),
                        slot,
                    }
                    .pack();
                    if let Some(item) = self.records.fetch(projection, slot) {
                        return Some((entity, item));
                    }
                }
                QueryState::Exhausted => return None,
            }
        }
    }
}

impl<'w, R: Registry, F: Fetch> Iterator for Query<'w, R, F> {
    type Item = F::Item<'w>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(|(_, item)| item)
    }
}

impl<R: Registry, F: Fetch> FusedIterator for Query<'_, R, F> {}

/// [`Query`] that also yields record handles.
pub struct QueryWithEntities<'w, R: Registry, F: Fetch> {
    inner: Query<'w, R, F>,
}

impl<'w, R: Registry, F: Fetch> Iterator for QueryWithEntities<'w, R, F> {
    type Item = (Entity, F::Item<'w>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.advance()
    }
}

impl<R: Registry, F: Fetch> FusedIterator for QueryWithEntities<'_, R, F> {}

#[cfg(test)]
mod tests {
    use crate::ecs::{Component, DynamicWorld, Registry};
    use bytemuck::{Pod, Zeroable};

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Pos(f32);
    impl Component for Pos {}

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Vel(f32);
    impl Component for Vel {}

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Tag(u32);
    impl Component for Tag {}

    #[test]
    fn test_empty_world_is_exhausted_immediately() {
        let mut world = DynamicWorld::new();
        world.as_type_set::<(Pos,)>().unwrap();
        let mut query = world.query::<(Pos,)>().unwrap();
        assert!(!query.is_exhausted());
        assert!(query.next().is_none());
        assert!(query.is_exhausted());
        assert!(query.next().is_none());
    }

    #[test]
    fn test_skips_non_matching_archetypes() {
        let mut world = DynamicWorld::new();
        world.insert((Tag(1),)).unwrap();
        world.insert((Pos(1.0), Vel(1.0))).unwrap();
        world.insert((Tag(2),)).unwrap();
        world.insert((Pos(2.0),)).unwrap();

        let mut seen: Vec<f32> = world.query::<(Pos,)>().unwrap().map(|(p,)| p.0).collect();
        seen.sort_by(f32::total_cmp);
        assert_eq!(seen, vec![1.0, 2.0]);
    }

    #[test]
    fn test_skips_empty_matching_archetype() {
        let mut world = DynamicWorld::new();
        let e = world.insert((Pos(1.0), Vel(0.0))).unwrap();
        world.insert((Pos(2.0),)).unwrap();
        world.remove(e).unwrap();

        let seen: Vec<f32> = world.query::<(Pos,)>().unwrap().map(|(p,)| p.0).collect();
        assert_eq!(seen, vec![2.0]);
    }

    #[test]
    fn test_with_entities_yields_live_handles() {
        let mut world = DynamicWorld::new();
        let a = world.insert((Pos(1.0),)).unwrap();
        let b = world.insert((Pos(2.0),)).unwrap();

        let handles: Vec<_> = world
            .query::<(Pos,)>()
            .unwrap()
            .with_entities()
            .map(|(entity, _)| entity)
            .collect();
        assert_eq!(handles, vec![a, b]);
    }

    #[test]
    fn test_unregistered_member_yields_nothing() {
        let mut world = DynamicWorld::new();
        world.insert((Pos(1.0),)).unwrap();

        let mut query = world.query::<(Pos, Vel)>().unwrap();
        assert!(query.is_exhausted());
        assert!(query.next().is_none());
        assert_eq!(world.registry().len(), 1);
    }

    #[test]
    fn test_mutation_through_query_persists() {
        let mut world = DynamicWorld::new();
        let e = world.insert((Pos(1.0), Vel(2.0))).unwrap();
        for (pos, vel) in world.query::<(Pos, Vel)>().unwrap() {
            pos.0 += vel.0;
        }
        let (pos,) = world.entity::<(Pos,)>(e).unwrap();
        assert_eq!(*pos, Pos(3.0));
    }
}
