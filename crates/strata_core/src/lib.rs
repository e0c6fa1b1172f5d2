//! # STRATA Core
//!
//! Archetype-packed entity storage:
//! - Entities with the same component set share one archetype
//! - Each archetype stores fixed-stride byte records in a chunked hive
//! - Queries walk every archetype holding a superset of the requested
//!   components and hand out `&mut` references straight into storage
//!
//! ## Architecture Rules
//!
//! 1. **Plain old data only** - components are `Pod`, records are copied as bytes
//! 2. **No per-entity heap allocation** - records live in pre-sized chunks
//! 3. **Unsafe code is fenced** - only `memory::chunk` and the typed access
//!    module may use it
//!
//! ## Example
//!
//! ```rust
//! use bytemuck::{Pod, Zeroable};
//! use strata_core::{Component, DynamicWorld};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
//! #[repr(C)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let mut world = DynamicWorld::new();
//! let e = world.insert((Health(10),)).unwrap();
//! world.entity::<(Health,)>(e).unwrap().0.0 -= 3;
//! assert_eq!(*world.entity::<(Health,)>(e).unwrap().0, Health(7));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::WorldConfig;
pub use ecs::{
    offset_in, Archetype, At, Bundle, Component, ComponentInfo, ComponentList, ComponentMask,
    ComponentSet, Contains, DynamicRegistry, DynamicWorld, Entity, Fetch, Query,
    QueryWithEntities, RecordLayout, Registry, StaticRegistry, StaticWorld, World,
};
pub use error::{StrataError, StrataResult};
pub use memory::{Hive, HiveIndex};
