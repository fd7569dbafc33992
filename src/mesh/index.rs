//! Index types for mesh elements.
//!
//! Triangles and vertices are identified by type-safe `u32` wrappers. Query
//! engines report "no such element" (for example, the nearest triangle of an
//! empty mesh) with the `INVALID` sentinel instead of an `Option`, so result
//! buffers stay flat.

use std::fmt::{self, Debug};

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe triangle (face) index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Sentinel for "no element".
            pub const INVALID: Self = Self(u32::MAX);

            /// Create a new index from a raw value.
            ///
            /// Ids are 32-bit. [`TriangleMesh`](crate::mesh::TriangleMesh)
            /// rejects meshes with more than `u32::MAX` vertices or triangles,
            /// so ids taken from a valid mesh always fit.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit below the sentinel.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-sentinel) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(FaceId, "F");

/// An undirected edge, stored as its two vertex indices in ascending order.
///
/// Both triangles sharing an edge produce the same key regardless of their
/// winding, which is what lets edge pseudonormals be looked up consistently.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EdgeKey(usize, usize);

impl EdgeKey {
    /// Create the key for the edge between two vertices.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The smaller vertex index.
    #[inline]
    pub fn lo(self) -> usize {
        self.0
    }

    /// The larger vertex index.
    #[inline]
    pub fn hi(self) -> usize {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_id() {
        let f = FaceId::new(42);
        assert_eq!(f.index(), 42);
        assert!(f.is_valid());
        assert!(!FaceId::INVALID.is_valid());
        assert_eq!(FaceId::default(), FaceId::INVALID);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(7)), "V(7)");
        assert_eq!(format!("{:?}", FaceId::INVALID), "F(INVALID)");
    }

    #[test]
    fn test_edge_key_is_undirected() {
        assert_eq!(EdgeKey::new(3, 9), EdgeKey::new(9, 3));
        let e = EdgeKey::new(9, 3);
        assert_eq!((e.lo(), e.hi()), (3, 9));
    }
}
