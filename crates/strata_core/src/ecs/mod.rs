//! # Entity Component System
//!
//! Archetype-packed record storage.
//!
//! ## Design Principles
//!
//! 1. **One archetype per exact component mask** - records never mix layouts
//! 2. **Registry-ordered layout** - a record's bytes depend only on its mask
//! 3. **Stable addresses** - removal never moves another record
//! 4. **Generational handles** - a removed record's handle stays stale forever

mod access;
mod archetype;
mod component;
mod entity;
mod layout;
mod mask;
mod query;
mod registry;
mod world;

pub use access::{Bundle, ComponentSet, Fetch};
pub use archetype::Archetype;
pub use component::{Component, ComponentInfo};
pub use entity::Entity;
pub use layout::{offset_in, RecordLayout};
pub use mask::{ComponentMask, MAX_COMPONENTS};
pub use query::{Query, QueryWithEntities};
pub use registry::{At, ComponentList, Contains, DynamicRegistry, Registry, StaticRegistry};
pub use world::{DynamicWorld, StaticWorld, World, DEFAULT_REGISTRY_CAPACITY};
