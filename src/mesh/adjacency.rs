//! Companion (opposite half-edge) lookup.
//!
//! For an edge running from point `a` to point `b`, its companion is an edge
//! running from `b` to `a`. Edges without one lie on the mesh boundary; they
//! are recorded as their own companion so that the companion array stays a
//! total function over edges.

use rayon::prelude::*;

use super::index::{EdgeId, MeshIndex};
use super::polyhedron::Polyhedron;

/// Boundary flags and companions for every edge of a polyhedron.
///
/// The lookup is a snapshot: it must be rebuilt after any topology edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAdjacency<I: MeshIndex = u32> {
    pub(crate) boundary: Vec<bool>,
    pub(crate) companions: Vec<EdgeId<I>>,
}

impl<I: MeshIndex> EdgeAdjacency<I> {
    /// Derive companions by matching reversed point pairs. Runs in parallel
    /// over edges.
    pub fn build(polyhedron: &Polyhedron<I>) -> Self {
        let edge_points = polyhedron.edge_points();
        let next_edges = polyhedron.next_edges();

        let point_count = edge_points
            .iter()
            .map(|p| p.index() + 1)
            .max()
            .unwrap_or(0);
        let mut point_out_edges: Vec<Vec<EdgeId<I>>> = vec![Vec::new(); point_count];
        for (edge, point) in edge_points.iter().enumerate() {
            point_out_edges[point.index()].push(EdgeId::new(edge));
        }

        let companions: Vec<Option<EdgeId<I>>> = (0..edge_points.len())
            .into_par_iter()
            .map(|edge| {
                let origin = edge_points[edge];
                let dest = edge_points[next_edges[edge].index()];
                point_out_edges[dest.index()]
                    .iter()
                    .copied()
                    .find(|candidate| edge_points[next_edges[candidate.index()].index()] == origin)
            })
            .collect();

        let boundary = companions.iter().map(Option::is_none).collect();
        let companions = companions
            .into_iter()
            .enumerate()
            .map(|(edge, companion)| companion.unwrap_or_else(|| EdgeId::new(edge)))
            .collect();

        Self {
            boundary,
            companions,
        }
    }

    /// Assemble a lookup from explicit arrays.
    ///
    /// Boundary edges are expected to be their own companion.
    pub fn from_parts(boundary: Vec<bool>, companions: Vec<EdgeId<I>>) -> Self {
        Self {
            boundary,
            companions,
        }
    }

    /// Number of edges covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.companions.len()
    }

    /// True if the lookup covers no edges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }

    /// True if the edge has no companion.
    #[inline]
    pub fn is_boundary(&self, e: EdgeId<I>) -> bool {
        self.boundary[e.index()]
    }

    /// The opposite half-edge (the edge itself on the boundary).
    #[inline]
    pub fn companion(&self, e: EdgeId<I>) -> EdgeId<I> {
        self.companions[e.index()]
    }

    /// Boundary flags, indexed by edge.
    pub fn boundary_edges(&self) -> &[bool] {
        &self.boundary
    }

    /// Companions, indexed by edge.
    pub fn companions(&self) -> &[EdgeId<I>] {
        &self.companions
    }

    /// Number of boundary edges.
    pub fn boundary_count(&self) -> usize {
        self.boundary.iter().filter(|&&b| b).count()
    }

    /// Check that companion is an involution on non-boundary edges and the
    /// identity on boundary edges.
    pub fn is_involution(&self) -> bool {
        if self.boundary.len() != self.companions.len() {
            return false;
        }
        self.companions.iter().enumerate().all(|(edge, companion)| {
            let c = companion.index();
            if self.boundary[edge] {
                c == edge
            } else {
                c < self.companions.len() && c != edge && self.companions[c].index() == edge
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    #[test]
    fn test_single_square_is_all_boundary() {
        let polyhedron: Polyhedron = build_from_polygons(4, &[vec![0, 1, 2, 3]]).unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);

        assert_eq!(adjacency.len(), 4);
        assert_eq!(adjacency.boundary_count(), 4);
        for e in polyhedron.edge_ids() {
            assert_eq!(adjacency.companion(e), e);
        }
        assert!(adjacency.is_involution());
    }

    #[test]
    fn test_shared_edge() {
        // Edge 1 (1 -> 4) in the first square, edge 7 (4 -> 1) in the second
        let polyhedron: Polyhedron =
            build_from_polygons(6, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);

        assert_eq!(adjacency.boundary_count(), 6);
        assert!(!adjacency.is_boundary(EdgeId::new(1)));
        assert_eq!(adjacency.companion(EdgeId::new(1)).index(), 7);
        assert_eq!(adjacency.companion(EdgeId::new(7)).index(), 1);
        assert!(adjacency.is_involution());
    }

    #[test]
    fn test_broken_involution_detected() {
        let adjacency = EdgeAdjacency::<u32>::from_parts(
            vec![false, false, false],
            vec![EdgeId::new(1), EdgeId::new(2), EdgeId::new(0)],
        );
        assert!(!adjacency.is_involution());
    }
}
