//! Index types for polyhedron elements.
//!
//! Points, edges, loops, faces and shells are all addressed by position in
//! flat arrays. Wrapping those positions in distinct newtypes keeps an edge
//! index from being used where a loop index is expected. The wrappers are
//! generic over the underlying integer so small meshes can use `u16`.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can back a mesh index.
///
/// Implemented for `u16`, `u32` and `u64`. The largest value of each type is
/// reserved as the invalid sentinel.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// # Panics
    /// Panics in debug builds if the value is too large for this index type.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX - 1;
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v as u128 <= Self::MAX as u128,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// Index into the shared point-position array.
///
/// Points are owned by the surrounding mesh, not by the polyhedron; edges
/// only refer to them.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct PointId<I: MeshIndex = u32>(I);

/// Index of a half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// Index of a loop (one closed contour of a face).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct LoopId<I: MeshIndex = u32>(I);

/// Index of a face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// Index of a shell (a grouping label on faces).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ShellId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Get the raw value of the underlying type.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(PointId, "P");
impl_index_type!(EdgeId, "E");
impl_index_type!(LoopId, "L");
impl_index_type!(FaceId, "F");
impl_index_type!(ShellId, "S");

/// Converts a slice of typed ids to plain positions.
pub(crate) fn to_indices<T: Copy + Into<usize>>(ids: &[T]) -> Vec<usize> {
    ids.iter().map(|&id| id.into()).collect()
}

macro_rules! impl_into_usize {
    ($name:ident) => {
        impl<I: MeshIndex> From<$name<I>> for usize {
            #[inline]
            fn from(id: $name<I>) -> usize {
                id.index()
            }
        }
    };
}

impl_into_usize!(PointId);
impl_into_usize!(EdgeId);
impl_into_usize!(LoopId);
impl_into_usize!(FaceId);
impl_into_usize!(ShellId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id() {
        let e: EdgeId = EdgeId::new(42);
        assert_eq!(e.index(), 42);
        assert!(e.is_valid());

        let invalid: EdgeId = EdgeId::invalid();
        assert!(!invalid.is_valid());
        assert_eq!(EdgeId::<u32>::default(), invalid);
    }

    #[test]
    fn test_type_safety() {
        // Distinct types sharing one raw value
        let p: PointId = PointId::new(0);
        let l: LoopId = LoopId::new(0);
        let f: FaceId = FaceId::new(0);

        assert_eq!(p.index(), l.index());
        assert_eq!(l.index(), f.index());
    }

    #[test]
    fn test_small_indices() {
        let e: EdgeId<u16> = EdgeId::new(1000);
        assert_eq!(e.index(), 1000);
        assert_eq!(e.raw(), 1000u16);
        assert_eq!(<u16 as MeshIndex>::INVALID, u16::MAX);
    }

    #[test]
    fn test_debug_format() {
        let l: LoopId = LoopId::new(7);
        assert_eq!(format!("{:?}", l), "L(7)");

        let invalid: ShellId = ShellId::invalid();
        assert_eq!(format!("{:?}", invalid), "S(INVALID)");
    }

    #[test]
    fn test_to_indices() {
        let ids: Vec<EdgeId> = vec![EdgeId::new(3), EdgeId::new(1)];
        assert_eq!(to_indices(&ids), vec![3, 1]);
    }
}
