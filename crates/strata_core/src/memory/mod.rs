//! # Memory Management
//!
//! Slot storage underneath every archetype.
//!
//! - `Chunk`: one fixed-capacity, 16-byte aligned block of slots
//! - [`Hive`]: a growable list of chunks with stable addresses and an
//!   intrusive LIFO free list

mod chunk;
mod hive;

pub use chunk::CHUNK_ALIGN;
pub use hive::{Hive, HiveIndex, HiveIter, LINK_SIZE};
