//! # Type Registry
//!
//! Maps component types to small, stable indices and reports their sizes.
//! The index decides both the mask bit of a type and its position inside
//! every record layout.
//!
//! Two flavors:
//!
//! - [`StaticRegistry`]: a closed type list given as a tuple type. Indices
//!   are tuple positions, resolved by monomorphized `TypeId` comparisons.
//! - [`DynamicRegistry`]: an array-backed table that appends unseen types
//!   on first use, up to a fixed capacity.

use std::any::TypeId;
use std::marker::PhantomData;

use super::component::{Component, ComponentInfo};
use super::mask::MAX_COMPONENTS;
use crate::error::{StrataError, StrataResult};

mod sealed {
    pub trait Sealed {}
}

/// Authority mapping component types to indices.
///
/// Sealed: layouts and typed access trust the sizes a registry reports,
/// so only the two registries below implement it.
pub trait Registry: sealed::Sealed {
    /// Largest number of distinct component types this registry can hold.
    const MAX_COMPONENTS: usize;

    /// Returns the index of `T`, registering it first if the registry
    /// supports that.
    ///
    /// # Errors
    ///
    /// [`StrataError::UnknownComponent`] for a static registry that does not
    /// list `T`; [`StrataError::RegistryFull`] for a dynamic registry at
    /// capacity.
    fn index_of<T: Component>(&mut self) -> StrataResult<usize>;

    /// Returns the index of `T` if it is already known. Never registers.
    fn lookup<T: Component>(&self) -> Option<usize>;

    /// Checks that every type named in `unseen` could be registered right
    /// now, without registering any of them.
    ///
    /// # Errors
    ///
    /// The error [`Registry::index_of`] would return for the first type
    /// that does not fit.
    fn admit(&self, unseen: &[&'static str]) -> StrataResult<()>;

    /// Describes the type at `index`.
    fn info(&self, index: usize) -> Option<ComponentInfo>;

    /// Number of types currently known.
    fn len(&self) -> usize;

    /// Checks if no type is known yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte size of the type at `index`.
    fn size_of(&self, index: usize) -> Option<usize> {
        self.info(index).map(|info| info.size)
    }
}

// =============================================================================
// Static registry
// =============================================================================

/// A closed list of component types, written as a tuple type.
///
/// Implemented for tuples of up to 16 components. A type listed twice keeps
/// its first index; the second position is unreachable.
pub trait ComponentList: 'static {
    /// Number of listed types.
    const LEN: usize;

    /// Position of the type with identity `id`.
    fn position(id: TypeId) -> Option<usize>;

    /// Describes the type at `index`.
    fn info(index: usize) -> Option<ComponentInfo>;
}

macro_rules! impl_component_list {
    ($len:literal => $($idx:tt $T:ident),*) => {
        impl<$($T: Component),*> ComponentList for ($($T,)*) {
            const LEN: usize = $len;

            #[inline]
            fn position(id: TypeId) -> Option<usize> {
                $(
                    if id == TypeId::of::<$T>() {
                        return Some($idx);
                    }
                )*
                None
            }

            fn info(index: usize) -> Option<ComponentInfo> {
                match index {
                    $($idx => Some(ComponentInfo::of::<$T>()),)*
                    _ => None,
                }
            }
        }
    };
}

impl_component_list!(1 => 0 A);
impl_component_list!(2 => 0 A, 1 B);
impl_component_list!(3 => 0 A, 1 B, 2 C);
impl_component_list!(4 => 0 A, 1 B, 2 C, 3 D);
impl_component_list!(5 => 0 A, 1 B, 2 C, 3 D, 4 E);
impl_component_list!(6 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_component_list!(7 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_component_list!(8 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
impl_component_list!(9 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I);
impl_component_list!(10 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J);
impl_component_list!(11 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K);
impl_component_list!(12 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L);
impl_component_list!(13 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M);
impl_component_list!(14 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M, 13 N);
impl_component_list!(15 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M, 13 N, 14 O);
impl_component_list!(16 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M, 13 N, 14 O, 15 P);

/// Type-level position marker for [`Contains`].
#[derive(Clone, Copy, Debug, Default)]
pub struct At<const K: usize>;

/// Proof that a component list holds `T` at position `I`.
///
/// The position is inferred, so `L: Contains<T, I>` resolves only when `T`
/// is listed exactly once. Used by [`StaticRegistry::index`] to turn an
/// unlisted type into a build error.
pub trait Contains<T: Component, I>: ComponentList {
    /// Position of `T` in the list.
    const INDEX: usize;
}

macro_rules! impl_contains {
    (@one [$($T:ident),*], $idx:tt, $S:ident) => {
        impl<$($T: Component),*> Contains<$S, At<$idx>> for ($($T,)*) {
            const INDEX: usize = $idx;
        }
    };
    ($list:tt ;) => {};
    ($list:tt ; $idx:tt $S:ident $(, $rest_idx:tt $rest:ident)*) => {
        impl_contains!(@one $list, $idx, $S);
        impl_contains!($list ; $($rest_idx $rest),*);
    };
}

impl_contains!([A] ; 0 A);
impl_contains!([A, B] ; 0 A, 1 B);
impl_contains!([A, B, C] ; 0 A, 1 B, 2 C);
impl_contains!([A, B, C, D] ; 0 A, 1 B, 2 C, 3 D);
impl_contains!([A, B, C, D, E] ; 0 A, 1 B, 2 C, 3 D, 4 E);
impl_contains!([A, B, C, D, E, F] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_contains!([A, B, C, D, E, F, G] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_contains!([A, B, C, D, E, F, G, H] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
impl_contains!([A, B, C, D, E, F, G, H, I] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I);
impl_contains!([A, B, C, D, E, F, G, H, I, J] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J);
impl_contains!([A, B, C, D, E, F, G, H, I, J, K] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K);
impl_contains!([A, B, C, D, E, F, G, H, I, J, K, L] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L);
impl_contains!([A, B, C, D, E, F, G, H, I, J, K, L, M] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M);
impl_contains!([A, B, C, D, E, F, G, H, I, J, K, L, M, N] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M, 13 N);
impl_contains!([A, B, C, D, E, F, G, H, I, J, K, L, M, N, O] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M, 13 N, 14 O);
impl_contains!([A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P] ; 0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L, 12 M, 13 N, 14 O, 15 P);

/// Registry over a closed type list.
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
/// use strata_core::{Component, Registry, StaticRegistry};
///
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct Pos(f32, f32);
/// impl Component for Pos {}
///
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct Mass(f32);
/// impl Component for Mass {}
///
/// let mut registry = StaticRegistry::<(Pos, Mass)>::new();
/// assert_eq!(registry.index_of::<Mass>().unwrap(), 1);
/// assert_eq!(registry.size_of(0), Some(8));
///
/// // Same index, resolved at build time.
/// assert_eq!(StaticRegistry::<(Pos, Mass)>::index::<Mass, _>(), 1);
/// ```
pub struct StaticRegistry<L: ComponentList> {
    _list: PhantomData<fn() -> L>,
}

impl<L: ComponentList> StaticRegistry<L> {
    /// Creates the registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { _list: PhantomData }
    }

    /// Index of `T`, checked when the program is built.
    ///
    /// [`Registry::index_of`] has to accept any component type and can only
    /// reject an unlisted one when it runs. This method cannot be called
    /// for an unlisted type at all:
    ///
    /// ```compile_fail
    /// use bytemuck::{Pod, Zeroable};
    /// use strata_core::{Component, StaticRegistry};
    ///
    /// #[derive(Clone, Copy, Pod, Zeroable)]
    /// #[repr(C)]
    /// struct Listed(u32);
    /// impl Component for Listed {}
    ///
    /// #[derive(Clone, Copy, Pod, Zeroable)]
    /// #[repr(C)]
    /// struct Unlisted(u32);
    /// impl Component for Unlisted {}
    ///
    /// let index = StaticRegistry::<(Listed,)>::index::<Unlisted, _>();
    /// ```
    #[inline]
    #[must_use]
    pub const fn index<T: Component, I>() -> usize
    where
        L: Contains<T, I>,
    {
        <L as Contains<T, I>>::INDEX
    }
}

impl<L: ComponentList> Default for StaticRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ComponentList> std::fmt::Debug for StaticRegistry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries((0..L::LEN).filter_map(L::info).map(|info| info.name))
            .finish()
    }
}

impl<L: ComponentList> sealed::Sealed for StaticRegistry<L> {}

impl<L: ComponentList> Registry for StaticRegistry<L> {
    const MAX_COMPONENTS: usize = L::LEN;

    #[inline]
    fn index_of<T: Component>(&mut self) -> StrataResult<usize> {
        self.lookup::<T>().ok_or(StrataError::UnknownComponent {
            name: std::any::type_name::<T>(),
        })
    }

    #[inline]
    fn lookup<T: Component>(&self) -> Option<usize> {
        L::position(TypeId::of::<T>())
    }

    fn admit(&self, unseen: &[&'static str]) -> StrataResult<()> {
        match unseen.first() {
            Some(&name) => Err(StrataError::UnknownComponent { name }),
            None => Ok(()),
        }
    }

    #[inline]
    fn info(&self, index: usize) -> Option<ComponentInfo> {
        L::info(index)
    }

    #[inline]
    fn len(&self) -> usize {
        L::LEN
    }
}

// =============================================================================
// Dynamic registry
// =============================================================================

/// Registry that assigns indices in first-use order.
///
/// `N` is the capacity, at most 64 so every index fits a mask bit.
#[derive(Clone, Debug)]
pub struct DynamicRegistry<const N: usize> {
    entries: [Option<ComponentInfo>; N],
    len: usize,
}

impl<const N: usize> DynamicRegistry<N> {
    const CAPACITY_IN_RANGE: () = assert!(
        N > 0 && N <= MAX_COMPONENTS,
        "dynamic registry capacity must be between 1 and 64"
    );

    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::CAPACITY_IN_RANGE;
        Self {
            entries: [None; N],
            len: 0,
        }
    }

    /// Iterates over registered types in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.entries[..self.len].iter().flatten()
    }

    fn position(&self, id: TypeId) -> Option<usize> {
        self.iter().position(|info| info.type_id == id)
    }
}

impl<const N: usize> Default for DynamicRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> sealed::Sealed for DynamicRegistry<N> {}

impl<const N: usize> Registry for DynamicRegistry<N> {
    const MAX_COMPONENTS: usize = N;

    fn index_of<T: Component>(&mut self) -> StrataResult<usize> {
        if let Some(index) = self.position(TypeId::of::<T>()) {
            return Ok(index);
        }

        let info = ComponentInfo::of::<T>();
        if self.len == N {
            tracing::warn!(capacity = N, component = info.name, "component registry full");
            return Err(StrataError::RegistryFull {
                capacity: N,
                name: info.name,
            });
        }

        let index = self.len;
        self.entries[index] = Some(info);
        self.len += 1;
        tracing::debug!(
            index,
            component = info.name,
            size = info.size,
            align = info.align,
            "registered component"
        );
        Ok(index)
    }

    #[inline]
    fn lookup<T: Component>(&self) -> Option<usize> {
        self.position(TypeId::of::<T>())
    }

    fn admit(&self, unseen: &[&'static str]) -> StrataResult<()> {
        let room = N - self.len;
        match unseen.get(room) {
            Some(&name) => {
                tracing::warn!(capacity = N, component = name, "component registry full");
                Err(StrataError::RegistryFull { capacity: N, name })
            }
            None => Ok(()),
        }
    }

    #[inline]
    fn info(&self, index: usize) -> Option<ComponentInfo> {
        self.entries.get(index).copied().flatten()
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}
