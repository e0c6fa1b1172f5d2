//! # Record Layout
//!
//! A record is the concatenation of its components in registry-index
//! order, restricted to the components in the archetype's mask:
//!
//! ```text
//! registry:  0: Pos (8)   1: Speed (8)   2: Info (12)
//! mask {0, 2}:  [ Pos | Info ]          Info at offset 8
//! mask {1, 2}:  [ Speed | Info ]        Info at offset 8
//! mask {2}:     [ Info ]                Info at offset 0
//! ```
//!
//! Argument order at insert time never matters. Offsets are recomputed
//! on demand; the loop is bounded by the registry's arity.

use super::mask::ComponentMask;
use super::registry::Registry;
use crate::error::{StrataError, StrataResult};
use crate::memory::CHUNK_ALIGN;

/// Byte offset of component `index` inside a record with components `mask`.
///
/// Sums the sizes of every index in `mask` lower than `index`. `index`
/// itself need not be in `mask`.
#[inline]
#[must_use]
pub fn offset_in<R: Registry>(registry: &R, index: usize, mask: ComponentMask) -> usize {
    mask.iter()
        .take_while(|&i| i < index)
        .filter_map(|i| registry.size_of(i))
        .sum()
}

/// Size and alignment of one archetype's records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Sum of component sizes.
    pub size: usize,
    /// Largest component alignment, at least 1.
    pub align: usize,
}

impl RecordLayout {
    /// Computes and checks the layout for `mask`.
    ///
    /// # Errors
    ///
    /// - [`StrataError::UnsupportedAlignment`] if a component needs more
    ///   than chunk alignment
    /// - [`StrataError::MisalignedLayout`] if packing places a component at
    ///   an offset its alignment does not divide
    pub fn for_mask<R: Registry>(registry: &R, mask: ComponentMask) -> StrataResult<Self> {
        let mut size = 0;
        let mut align = 1;
        for info in mask.iter().filter_map(|i| registry.info(i)) {
            if info.align > CHUNK_ALIGN {
                return Err(StrataError::UnsupportedAlignment {
                    name: info.name,
                    align: info.align,
                    max: CHUNK_ALIGN,
                });
            }
            if size % info.align != 0 {
                return Err(StrataError::MisalignedLayout {
                    name: info.name,
                    offset: size,
                    align: info.align,
                });
            }
            size += info.size;
            align = align.max(info.align);
        }
        Ok(Self { size, align })
    }
}
