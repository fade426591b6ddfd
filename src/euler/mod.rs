//! Batched Euler operators.
//!
//! Two topology edits are provided, each applied to a whole list of edges at
//! once:
//!
//! - [`kill_edge_make_loop`] dissolves edges. Two faces sharing an edge merge,
//!   and a loop that touches itself along an edge splits into two loops.
//! - [`kill_edge_and_vertex`] collapses edges, merging each edge's origin
//!   point into its destination.
//!
//! Both operators work on private copies and replace the polyhedron only
//! when the whole batch succeeds. Afterwards the companion lookup is stale
//! and must be rebuilt with [`EdgeAdjacency::build`](crate::mesh::EdgeAdjacency::build).
//!
//! # Example
//!
//! ```
//! use nalgebra::Point3;
//! use polyloop::euler::{kill_edge_make_loop, EulerOptions};
//! use polyloop::mesh::{build_from_polygons, EdgeAdjacency, EdgeId, Polyhedron};
//!
//! // 3---4---5
//! // |   |   |
//! // 0---1---2
//! let points: Vec<Point3<f64>> = (0..6)
//!     .map(|i| Point3::new((i % 3) as f64, (i / 3) as f64, 0.0))
//!     .collect();
//! let mut polyhedron: Polyhedron =
//!     build_from_polygons(points.len(), &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
//! let adjacency = EdgeAdjacency::build(&polyhedron);
//! let normals = polyhedron.face_normals(&points);
//!
//! // Edge 1 runs from point 1 to point 4
//! let summary = kill_edge_make_loop(
//!     &mut polyhedron,
//!     &[EdgeId::new(1)],
//!     &adjacency,
//!     &points,
//!     &normals,
//!     &EulerOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(summary.after.faces, 1);
//! assert_eq!(polyhedron.num_edges(), 6);
//! ```

mod batch;
mod compact;
mod keml;
mod kev;
mod lookup;
mod remap;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fmt;

pub use keml::kill_edge_make_loop;
pub use kev::kill_edge_and_vertex;
pub use lookup::{is_polyline, EdgeLoopFaceLookup, LoopWalk};
pub use remap::{deletion_prefix_sum, IndexRemap};

use crate::error::{MeshError, Result};
use crate::mesh::ElementCounts;

/// Default tolerance for comparing a loop normal against its face normal.
pub const DEFAULT_NORMAL_TOLERANCE: f64 = 0.1;

/// Options for [`kill_edge_make_loop`].
#[derive(Debug, Clone, PartialEq)]
pub struct EulerOptions {
    /// A split-off loop counts as an outer boundary when the dot product of
    /// its unit normal with the face normal is within this distance of 1.
    pub normal_tolerance: f64,
}

impl Default for EulerOptions {
    fn default() -> Self {
        Self {
            normal_tolerance: DEFAULT_NORMAL_TOLERANCE,
        }
    }
}

impl EulerOptions {
    /// Set the normal comparison tolerance.
    pub fn with_normal_tolerance(mut self, tolerance: f64) -> Self {
        self.normal_tolerance = tolerance;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        let t = self.normal_tolerance;
        if !(t > 0.0 && t <= 2.0) {
            return Err(MeshError::invalid_param(
                "normal_tolerance",
                t,
                "must be in (0, 2]",
            ));
        }
        Ok(())
    }
}

/// What a batch edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSummary {
    /// Element counts before the edit.
    pub before: ElementCounts,
    /// Element counts after the edit.
    pub after: ElementCounts,
    /// Faces marked as changed (their selection is set to 1).
    pub touched_faces: usize,
}

impl EditSummary {
    /// Net number of edges removed.
    pub fn removed_edges(&self) -> usize {
        self.before.edges.saturating_sub(self.after.edges)
    }

    /// Net number of faces removed.
    pub fn removed_faces(&self) -> usize {
        self.before.faces.saturating_sub(self.after.faces)
    }
}

impl fmt::Display for EditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} faces touched)",
            self.before, self.after, self.touched_faces
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_validation() {
        assert!(EulerOptions::default().validate().is_ok());
        assert!(EulerOptions::default().with_normal_tolerance(2.0).validate().is_ok());

        for bad in [0.0, -0.5, 2.5, f64::NAN] {
            let result = EulerOptions::default().with_normal_tolerance(bad).validate();
            assert!(
                matches!(result, Err(MeshError::InvalidParameter { name: "normal_tolerance", .. })),
                "tolerance {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_summary_display() {
        let summary = EditSummary {
            before: ElementCounts {
                faces: 2,
                loops: 2,
                edges: 8,
                shells: 1,
            },
            after: ElementCounts {
                faces: 1,
                loops: 1,
                edges: 6,
                shells: 1,
            },
            touched_faces: 1,
        };
        assert_eq!(summary.removed_edges(), 2);
        assert_eq!(summary.removed_faces(), 1);
        assert_eq!(
            summary.to_string(),
            "2 faces, 2 loops, 8 edges, 1 shells -> 1 faces, 1 loops, 6 edges, 1 shells (1 faces touched)"
        );
    }
}
