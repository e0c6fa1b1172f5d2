//! # Component Masks
//!
//! 64-bit set of registry indices. Bit `i` is set when the component with
//! registry index `i` is present. An archetype is identified by its mask.

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Largest number of component types a mask can describe.
pub const MAX_COMPONENTS: usize = 64;

/// Set of registry indices.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Wraps raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns the set plus `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64`.
    #[inline]
    #[must_use]
    pub const fn with(self, index: usize) -> Self {
        assert!(index < MAX_COMPONENTS, "registry index out of mask range");
        Self(self.0 | (1 << index))
    }

    /// Checks whether `index` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < MAX_COMPONENTS && (self.0 >> index) & 1 == 1
    }

    /// Checks whether every index of `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn is_superset_of(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of indices in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Checks if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(index)
        })
    }
}

impl BitOr for ComponentMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for ComponentMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentMask({:#b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_contains() {
        let mask = ComponentMask::EMPTY.with(0).with(5).with(63);
        assert!(mask.contains(0));
        assert!(mask.contains(5));
        assert!(mask.contains(63));
        assert!(!mask.contains(1));
        assert!(!mask.contains(64));
        assert_eq!(mask.len(), 3);
    }

    #[test]
    fn test_superset() {
        let ab = ComponentMask::EMPTY.with(0).with(1);
        let a = ComponentMask::EMPTY.with(0);
        assert!(ab.is_superset_of(a));
        assert!(!a.is_superset_of(ab));
        assert!(a.is_superset_of(ComponentMask::EMPTY));
    }

    #[test]
    fn test_iter_ascending() {
        let mask = ComponentMask::from_bits(0b1010_0110);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![1, 2, 5, 7]);
    }

    #[test]
    fn test_set_ops() {
        let a = ComponentMask::from_bits(0b0011);
        let b = ComponentMask::from_bits(0b0110);
        assert_eq!((a | b).bits(), 0b0111);
        assert_eq!((a & b).bits(), 0b0010);
    }
}
