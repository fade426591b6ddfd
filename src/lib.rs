//! # Polyloop
//!
//! Polygon-mesh topology with holes, shells and batched Euler operators.
//!
//! A [`Polyhedron`](mesh::Polyhedron) stores faces as ranges of loops (an
//! outer boundary followed by holes) and loops as cycles of a flat `next`
//! permutation over edges. Point positions stay with the caller and are
//! passed in where geometry is needed.
//!
//! ## Features
//!
//! - **Flat topology arrays**: no per-element allocation, type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Attribute tables**: named per-face, per-edge and per-vertex columns
//!   that follow their elements through every edit
//! - **Batched Euler operators**: edge dissolve ([`kill_edge_make_loop`](euler::kill_edge_make_loop))
//!   and edge collapse ([`kill_edge_and_vertex`](euler::kill_edge_and_vertex)),
//!   applied atomically to whole edge lists
//!
//! ## Quick Start
//!
//! ```
//! use polyloop::prelude::*;
//! use nalgebra::Point3;
//!
//! // A 2x1 strip of unit squares
//! let points: Vec<Point3<f64>> = (0..6)
//!     .map(|i| Point3::new((i % 3) as f64, (i / 3) as f64, 0.0))
//!     .collect();
//! let mut polyhedron: Polyhedron =
//!     build_from_polygons(points.len(), &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
//!
//! // Collapse the shared edge 1 -> 4: both quads become triangles
//! let adjacency = EdgeAdjacency::build(&polyhedron);
//! let summary =
//!     kill_edge_and_vertex(&mut polyhedron, &[EdgeId::new(1)], &adjacency, points.len()).unwrap();
//!
//! assert_eq!(summary.after.edges, 6);
//! assert_eq!(to_polygons(&polyhedron), vec![vec![vec![0, 4, 3]], vec![vec![4, 2, 5]]]);
//! ```
//!
//! ## Logging
//!
//! Operators report through the [`log`](https://docs.rs/log) facade: a
//! `debug` summary per batch, `trace` per resolved edge, `warn` for skipped
//! inputs and `error` when a batch is abandoned. Install any logger to see
//! them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod euler;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use polyloop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::euler::{kill_edge_and_vertex, kill_edge_make_loop, EditSummary, EulerOptions};
    pub use crate::mesh::{
        build_from_polygons, to_polygons, EdgeAdjacency, EdgeId, FaceId, LoopId, MeshIndex,
        PointId, Polyhedron, PolyhedronBuilder, ShellId, ShellType,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
