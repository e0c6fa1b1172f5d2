//! # World Property Tests
//!
//! End-to-end checks of the storage contract:
//!
//! 1. **Layout**: record bytes follow registry order, never argument order
//! 2. **Round-trip**: inserted values come back unchanged
//! 3. **Queries**: every matching record is visited exactly once
//! 4. **Hive reuse**: freed slots come back last-in, first-out
//! 5. **Handles**: removed records leave stale handles behind
//!
//! Run with: cargo test -p strata_core --test world_properties

use bytemuck::{Pod, Zeroable};
use strata_core::{
    Component, DynamicWorld, Entity, Hive, StaticWorld, StrataError, WorldConfig,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Pos {
    x: f32,
    y: f32,
}
impl Component for Pos {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Speed {
    x: f32,
    y: f32,
}
impl Component for Speed {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Mass(f32);
impl Component for Mass {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Id(u32);
impl Component for Id {}

const fn pos(x: f32, y: f32) -> Pos {
    Pos { x, y }
}

const fn speed(x: f32, y: f32) -> Speed {
    Speed { x, y }
}

// ============================================================================
// LAYOUT
// ============================================================================

#[test]
fn verify_layout_is_registry_ordered() {
    let mut world = StaticWorld::<(Pos, Speed, Mass)>::new();
    let all = world.as_type_set::<(Mass, Speed, Pos)>().unwrap();
    assert_eq!(world.offset_in::<Pos>(all).unwrap(), 0);
    assert_eq!(world.offset_in::<Speed>(all).unwrap(), 8);
    assert_eq!(world.offset_in::<Mass>(all).unwrap(), 16);

    let pos_mass = world.as_type_set::<(Mass, Pos)>().unwrap();
    assert_eq!(world.offset_in::<Mass>(pos_mass).unwrap(), 8);

    let speed_mass = world.as_type_set::<(Speed, Mass)>().unwrap();
    assert_eq!(world.offset_in::<Mass>(speed_mass).unwrap(), 8);
    assert_eq!(world.offset_in::<Speed>(speed_mass).unwrap(), 0);
}

#[test]
fn verify_offsets_are_idempotent() {
    let mut world = DynamicWorld::new();
    world.insert((Mass(1.0), Pos::default(), Id(0))).unwrap();
    let mask = world.as_type_set::<(Pos, Mass, Id)>().unwrap();

    let first: Vec<usize> = vec![
        world.offset_in::<Pos>(mask).unwrap(),
        world.offset_in::<Mass>(mask).unwrap(),
        world.offset_in::<Id>(mask).unwrap(),
    ];
    for _ in 0..100 {
        assert_eq!(world.offset_in::<Pos>(mask).unwrap(), first[0]);
        assert_eq!(world.offset_in::<Mass>(mask).unwrap(), first[1]);
        assert_eq!(world.offset_in::<Id>(mask).unwrap(), first[2]);
    }
    // Dynamic registry: first-use order was Mass, Pos, Id.
    assert_eq!(first, vec![0, 4, 12]);
}

#[test]
fn verify_insert_order_independence() {
    let mut world = DynamicWorld::new();
    let a = world.insert((pos(1.0, 2.0), speed(3.0, 4.0), Mass(5.0))).unwrap();
    let b = world.insert((Mass(5.0), speed(3.0, 4.0), pos(1.0, 2.0))).unwrap();
    let c = world.insert((speed(3.0, 4.0), Mass(5.0), pos(1.0, 2.0))).unwrap();

    assert_eq!(world.archetypes().len(), 1);
    for e in [a, b, c] {
        let (p, s, m) = world.entity::<(Pos, Speed, Mass)>(e).unwrap();
        assert_eq!((*p, *s, *m), (pos(1.0, 2.0), speed(3.0, 4.0), Mass(5.0)));
    }
}

// ============================================================================
// ROUND-TRIP
// ============================================================================

#[test]
fn verify_round_trip_across_archetypes() {
    let mut world = DynamicWorld::new();
    let mut expected: Vec<(Entity, Pos, Option<Speed>)> = Vec::new();

    for i in 0..2_500u32 {
        let p = pos(i as f32, -(i as f32));
        if i % 3 == 0 {
            let s = speed(0.5 * i as f32, 1.0);
            expected.push((world.insert((s, p)).unwrap(), p, Some(s)));
        } else {
            expected.push((world.insert((p,)).unwrap(), p, None));
        }
    }

    assert_eq!(world.len(), 2_500);
    for (e, p, s) in expected {
        assert_eq!(*world.entity::<(Pos,)>(e).unwrap().0, p);
        match s {
            Some(s) => assert_eq!(*world.entity::<(Speed,)>(e).unwrap().0, s),
            None => assert!(matches!(
                world.entity::<(Speed,)>(e),
                Err(StrataError::MissingComponents { .. })
            )),
        }
    }
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn verify_query_visits_every_match_once() {
    let mut world = DynamicWorld::new();
    for i in 0..100u32 {
        world.insert((Id(i), pos(0.0, 0.0))).unwrap();
        world.insert((Id(100 + i), Mass(1.0))).unwrap();
        world.insert((Id(200 + i), pos(0.0, 0.0), Mass(1.0))).unwrap();
        world.insert((pos(0.0, 0.0),)).unwrap();
    }

    let mut ids: Vec<u32> = world.query::<(Id,)>().unwrap().map(|(id,)| id.0).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..300).collect::<Vec<_>>());

    let mut with_pos: Vec<u32> = world
        .query::<(Pos, Id)>()
        .unwrap()
        .map(|(_, id)| id.0)
        .collect();
    with_pos.sort_unstable();
    let expected: Vec<u32> = (0..100).chain(200..300).collect();
    assert_eq!(with_pos, expected);

    assert_eq!(world.query::<(Pos,)>().unwrap().count(), 300);
    assert_eq!(world.query::<()>().unwrap().count(), 400);
}

#[test]
fn verify_query_reads_correct_offsets_per_archetype() {
    let mut world = StaticWorld::<(Pos, Speed, Mass)>::new();
    // Mass sits at offset 8 in {Pos, Mass} and at offset 0 in {Mass}.
    world.insert((pos(1.0, 1.0), Mass(10.0))).unwrap();
    world.insert((Mass(20.0),)).unwrap();
    world.insert((pos(1.0, 1.0), speed(1.0, 1.0), Mass(30.0))).unwrap();

    let mut masses: Vec<f32> = world.query::<(Mass,)>().unwrap().map(|(m,)| m.0).collect();
    masses.sort_by(f32::total_cmp);
    assert_eq!(masses, vec![10.0, 20.0, 30.0]);
}

#[test]
fn verify_pos_speed_scenario() {
    let mut world = DynamicWorld::new();
    let e0 = world.insert((pos(0.0, 0.0), speed(1.0, 1.0))).unwrap();
    let e1 = world.insert((pos(10.0, 10.0), speed(2.0, 2.0))).unwrap();
    let e2 = world.insert((pos(20.0, 20.0), speed(3.0, 3.0))).unwrap();

    {
        let (p, _) = world.entity::<(Pos, Speed)>(e1).unwrap();
        p.x = 99.0;
    }

    let seen: Vec<(Pos, Speed)> = world
        .query::<(Pos, Speed)>()
        .unwrap()
        .map(|(p, s)| (*p, *s))
        .collect();
    assert_eq!(
        seen,
        vec![
            (pos(0.0, 0.0), speed(1.0, 1.0)),
            (pos(99.0, 10.0), speed(2.0, 2.0)),
            (pos(20.0, 20.0), speed(3.0, 3.0)),
        ]
    );

    for (p, s) in world.query::<(Pos, Speed)>().unwrap() {
        p.x += s.x;
        p.y += s.y;
    }
    assert_eq!(*world.entity::<(Pos,)>(e0).unwrap().0, pos(1.0, 1.0));
    assert_eq!(*world.entity::<(Pos,)>(e1).unwrap().0, pos(101.0, 12.0));
    assert_eq!(*world.entity::<(Pos,)>(e2).unwrap().0, pos(23.0, 23.0));
}

#[test]
fn verify_query_skips_removed_records() {
    let mut world = DynamicWorld::new();
    let handles: Vec<Entity> = (0..10u32).map(|i| world.insert((Id(i),)).unwrap()).collect();
    for e in handles.iter().step_by(2) {
        world.remove(*e).unwrap();
    }

    let ids: Vec<u32> = world.query::<(Id,)>().unwrap().map(|(id,)| id.0).collect();
    assert_eq!(ids, vec![1, 3, 5, 7, 9]);

    let visited: Vec<Entity> = world
        .query::<(Id,)>()
        .unwrap()
        .with_entities()
        .map(|(e, _)| e)
        .collect();
    assert!(visited.iter().all(|e| world.contains(*e)));
    assert_eq!(visited.len(), 5);
}

// ============================================================================
// HIVE REUSE
// ============================================================================

#[test]
fn verify_hive_lifo_reuse() {
    let mut hive = Hive::with_limits(16, 4, 8, 4);
    let slots: Vec<_> = (0..20).map(|_| hive.create().unwrap().0).collect();
    assert_eq!(hive.chunk_count(), 3);

    hive.remove(slots[3]).unwrap();
    hive.remove(slots[17]).unwrap();
    hive.remove(slots[9]).unwrap();

    assert_eq!(hive.create().unwrap().0, slots[9]);
    assert_eq!(hive.create().unwrap().0, slots[17]);
    assert_eq!(hive.create().unwrap().0, slots[3]);
    assert_eq!(hive.len(), 20);

    // Free list is empty again: the next slot is bumped.
    let fresh = hive.create().unwrap().0;
    assert!(!slots.contains(&fresh));
}

#[test]
fn verify_world_reuses_removed_slots() {
    let config = WorldConfig {
        chunk_capacity: 4,
        ..WorldConfig::default()
    };
    let mut world = DynamicWorld::with_config(config).unwrap();
    let handles: Vec<Entity> = (0..8u32).map(|i| world.insert((Id(i),)).unwrap()).collect();
    let capacity = world.archetypes()[0].capacity();

    for e in &handles {
        world.remove(*e).unwrap();
    }
    for i in 0..8u32 {
        world.insert((Id(i),)).unwrap();
    }
    assert_eq!(world.archetypes()[0].capacity(), capacity);
    assert_eq!(world.len(), 8);
}

// ============================================================================
// HANDLES
// ============================================================================

#[test]
fn verify_stale_handles_are_rejected() {
    let mut world = DynamicWorld::new();
    let keep = world.insert((Id(1),)).unwrap();
    let gone = world.insert((Id(2),)).unwrap();
    world.remove(gone).unwrap();
    let reused = world.insert((Id(3),)).unwrap();

    assert!(matches!(
        world.entity::<(Id,)>(gone),
        Err(StrataError::StaleEntity { .. })
    ));
    assert_eq!(*world.entity::<(Id,)>(reused).unwrap().0, Id(3));
    assert_eq!(*world.entity::<(Id,)>(keep).unwrap().0, Id(1));
}

#[test]
fn verify_handles_survive_serialization() {
    let mut world = DynamicWorld::new();
    let e = world.insert((Mass(4.5),)).unwrap();
    let restored = Entity::from_bits(e.to_bits());
    assert_eq!(*world.entity::<(Mass,)>(restored).unwrap().0, Mass(4.5));
}
