//! # Storage Error Types
//!
//! All errors that can occur in the storage engine.
//!
//! Every variant describes a programmer error or a hard resource limit.
//! None of them is transient: retrying the same call yields the same error.

use thiserror::Error;

/// Errors that can occur in the storage engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrataError {
    /// The component type is not part of a static registry's type list.
    #[error("component `{name}` is not part of the registry's type list")]
    UnknownComponent {
        /// Type name of the rejected component.
        name: &'static str,
    },

    /// A dynamic registry ran out of component slots.
    #[error("component registry is full: capacity {capacity}, cannot register `{name}`")]
    RegistryFull {
        /// Maximum number of component types.
        capacity: usize,
        /// Type name of the rejected component.
        name: &'static str,
    },

    /// The component needs a stronger alignment than chunk storage provides.
    #[error("component `{name}` requires alignment {align}, storage supports at most {max}")]
    UnsupportedAlignment {
        /// Type name of the component.
        name: &'static str,
        /// Alignment the component requires.
        align: usize,
        /// Largest supported alignment.
        max: usize,
    },

    /// The packed record layout would misalign a component.
    #[error("component `{name}` would be stored at offset {offset}, which is not {align}-aligned")]
    MisalignedLayout {
        /// Type name of the component.
        name: &'static str,
        /// Byte offset inside the record.
        offset: usize,
        /// Alignment the component requires.
        align: usize,
    },

    /// The same component type was named twice in one request.
    #[error("component `{name}` appears more than once in the same request")]
    DuplicateComponent {
        /// Type name of the repeated component.
        name: &'static str,
    },

    /// A raw record does not match the archetype's record size.
    #[error("record size mismatch: expected {expected} bytes, got {actual}")]
    RecordSizeMismatch {
        /// Record size of the archetype.
        expected: usize,
        /// Size of the supplied bytes.
        actual: usize,
    },

    /// A hive address points outside the allocated chunks.
    #[error("slot (chunk {chunk}, slot {slot}) is out of range")]
    SlotOutOfRange {
        /// Chunk part of the address.
        chunk: u16,
        /// In-chunk part of the address.
        slot: u16,
    },

    /// A hive address points at a slot that is not currently live.
    #[error("slot (chunk {chunk}, slot {slot}) is not live")]
    SlotNotLive {
        /// Chunk part of the address.
        chunk: u16,
        /// In-chunk part of the address.
        slot: u16,
    },

    /// An entity handle names an archetype that does not exist.
    #[error("archetype {0} does not exist")]
    UnknownArchetype(u16),

    /// An entity handle outlived the record it referred to.
    #[error("stale entity handle: slot is at generation {found}, handle carries {expected}")]
    StaleEntity {
        /// Generation stored in the handle.
        expected: u16,
        /// Generation currently stored in the slot.
        found: u16,
    },

    /// The entity's archetype lacks some of the requested components.
    #[error("archetype mask {available:#b} lacks requested components (known mask {requested:#b})")]
    MissingComponents {
        /// Requested component mask. Types the registry has never seen
        /// have no bit, so this may be a subset of `available`.
        requested: u64,
        /// Mask of the entity's archetype.
        available: u64,
    },

    /// No further archetypes can be created.
    #[error("archetype limit reached: {limit}")]
    ArchetypeLimit {
        /// Configured archetype limit.
        limit: usize,
    },

    /// An archetype's hive cannot grow any further.
    #[error("hive exhausted: {chunks} chunks of {chunk_capacity} slots are all live")]
    HiveExhausted {
        /// Number of chunks allocated.
        chunks: usize,
        /// Slots per chunk.
        chunk_capacity: usize,
    },

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for storage operations.
pub type StrataResult<T> = Result<T, StrataError>;
