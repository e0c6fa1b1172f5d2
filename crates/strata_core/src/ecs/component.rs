//! # Component System
//!
//! Components are pure data containers with no behavior.
//! Records are moved around as raw bytes, so components must be plain old
//! data with a fixed size.

use std::any::TypeId;

use bytemuck::{Pod, Zeroable};

/// Marker trait for storable components.
///
/// Components must be:
/// - `Copy`: no heap allocations, bitwise copyable
/// - `Pod`: plain old data, every byte pattern is valid
/// - `Zeroable`: can be safely zeroed
///
/// # Example
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
/// use strata_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: Copy + Pod + Zeroable + Send + Sync + 'static {}

/// Runtime description of a registered component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Identity of the type.
    pub type_id: TypeId,
    /// Type name, for diagnostics only.
    pub name: &'static str,
    /// `size_of::<T>()`.
    pub size: usize,
    /// `align_of::<T>()`.
    pub align: usize,
}

impl ComponentInfo {
    /// Describes `T`.
    #[inline]
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }
}
