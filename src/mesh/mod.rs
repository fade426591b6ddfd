//! Core polyhedron data structures.
//!
//! This module provides the indexed polygon-with-holes representation edited
//! by the [`euler`](crate::euler) operators.
//!
//! # Overview
//!
//! The primary type is [`Polyhedron`]: faces own contiguous ranges of loops,
//! loops are cycles of the edge `next` permutation, and edges point at an
//! origin in a caller-owned point array. Companion edges are derived on demand
//! by [`EdgeAdjacency`].
//!
//! # Index Types
//!
//! Elements are identified by type-safe index wrappers:
//! - [`PointId`] - Identifies a point in the caller's position array
//! - [`EdgeId`] - Identifies a half-edge
//! - [`LoopId`] - Identifies a loop
//! - [`FaceId`] - Identifies a face
//! - [`ShellId`] - Identifies a shell
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`]),
//! allowing `u16`, `u32`, or `u64` depending on mesh size.
//!
//! # Construction
//!
//! ```
//! use polyloop::mesh::{build_from_polygons, EdgeAdjacency, Polyhedron};
//!
//! let polyhedron: Polyhedron = build_from_polygons(4, &[vec![0, 1, 2, 3]]).unwrap();
//! let adjacency = EdgeAdjacency::build(&polyhedron);
//! assert_eq!(adjacency.boundary_count(), 4);
//! ```

mod adjacency;
mod builder;
mod index;
mod polyhedron;
mod table;

pub use adjacency::EdgeAdjacency;
pub use builder::{build_from_polygons, to_polygons, PolyhedronBuilder};
pub(crate) use index::to_indices;
pub use index::{EdgeId, FaceId, LoopId, MeshIndex, PointId, ShellId};
pub use polyhedron::{
    newell_normal, ElementCounts, LoopEdgeIter, MaterialId, Polyhedron, ShellType,
};
pub use table::{AttributeTable, Column, TableCopier};
