//! Working state shared by the batch operators.
//!
//! An operator never edits the caller's polyhedron directly. It copies the
//! topology into plain `usize` arrays, edits those while accumulating
//! deletion flags, and hands the result to [`compact`](super::compact).

use super::lookup::{EdgeLoopFaceLookup, LoopWalk};
use crate::error::{MeshError, Result};
use crate::mesh::{to_indices, EdgeAdjacency, EdgeId, MeshIndex, Polyhedron};

/// Mutable copies of the topology arrays plus deletion bitmaps.
#[derive(Debug, Clone)]
pub(crate) struct EditState {
    pub(crate) operation: &'static str,

    pub(crate) face_first_loops: Vec<usize>,
    pub(crate) face_loop_counts: Vec<usize>,
    /// 1.0 for faces changed by the batch.
    pub(crate) face_selections: Vec<f64>,
    /// Input face whose attributes and normal a face inherits.
    pub(crate) face_sources: Vec<usize>,

    pub(crate) loop_first_edges: Vec<usize>,

    pub(crate) edge_points: Vec<usize>,
    pub(crate) next: Vec<usize>,
    pub(crate) prev: Vec<usize>,
    pub(crate) companions: Vec<usize>,
    pub(crate) boundary: Vec<bool>,

    pub(crate) lookup: EdgeLoopFaceLookup,

    pub(crate) deleted_faces: Vec<bool>,
    pub(crate) deleted_loops: Vec<bool>,
    pub(crate) deleted_edges: Vec<bool>,
}

impl EditState {
    pub(crate) fn new<I: MeshIndex>(
        operation: &'static str,
        polyhedron: &Polyhedron<I>,
        adjacency: &EdgeAdjacency<I>,
    ) -> Self {
        let face_count = polyhedron.num_faces();
        let loop_count = polyhedron.num_loops();
        let edge_count = polyhedron.num_edges();

        let face_first_loops = to_indices(&polyhedron.face_first_loops);
        let face_loop_counts = polyhedron.face_loop_counts.clone();
        let loop_first_edges = to_indices(&polyhedron.loop_first_edges);
        let next = to_indices(&polyhedron.next_edges);

        let mut prev = vec![0; edge_count];
        for (edge, &n) in next.iter().enumerate() {
            prev[n] = edge;
        }

        let lookup =
            EdgeLoopFaceLookup::build(&face_first_loops, &face_loop_counts, &loop_first_edges, &next);

        Self {
            operation,
            face_first_loops,
            face_loop_counts,
            face_selections: vec![0.0; face_count],
            face_sources: (0..face_count).collect(),
            loop_first_edges,
            edge_points: to_indices(&polyhedron.edge_points),
            next,
            prev,
            companions: to_indices(adjacency.companions()),
            boundary: adjacency.boundary_edges().to_vec(),
            lookup,
            deleted_faces: vec![false; face_count],
            deleted_loops: vec![false; loop_count],
            deleted_edges: vec![false; edge_count],
        }
    }

    /// Fail the batch with a contract violation unless `condition` holds.
    pub(crate) fn ensure(&self, condition: bool, details: impl FnOnce() -> String) -> Result<()> {
        if condition {
            Ok(())
        } else {
            Err(MeshError::contract(self.operation, details()))
        }
    }

    #[inline]
    pub(crate) fn edge_loop(&self, edge: usize) -> usize {
        self.lookup.edge_loop(edge)
    }

    #[inline]
    pub(crate) fn loop_face(&self, l: usize) -> usize {
        self.lookup.loop_face(l)
    }

    #[inline]
    pub(crate) fn edge_face(&self, edge: usize) -> usize {
        self.loop_face(self.edge_loop(edge))
    }

    /// True if `l` is the outer boundary of its face.
    #[inline]
    pub(crate) fn is_primary(&self, l: usize) -> bool {
        self.face_first_loops[self.loop_face(l)] == l
    }

    pub(crate) fn loop_len(&self, l: usize) -> usize {
        LoopWalk::new(&self.next, self.loop_first_edges[l]).count()
    }

    pub(crate) fn walk(&self, first_edge: usize) -> LoopWalk<'_> {
        LoopWalk::new(&self.next, first_edge)
    }

    pub(crate) fn is_polyline(&self, first_edge: usize) -> bool {
        self.lookup.is_polyline(first_edge, &self.next, &self.companions)
    }

    pub(crate) fn touch(&mut self, face: usize) {
        self.face_selections[face] = 1.0;
    }

    /// Remove the consecutive run `first ..= last` from its cycle and return
    /// the edge that now follows the run's predecessor.
    ///
    /// The removed edges keep their stale links and are not flagged here.
    pub(crate) fn unlink_run(&mut self, first: usize, last: usize) -> usize {
        let before = self.prev[first];
        let after = self.next[last];
        self.next[before] = after;
        self.prev[after] = before;
        after
    }

    /// Exchange the successors of `a` and `b` after cutting both out: the
    /// predecessor of `a` continues at `b`'s successor and vice versa.
    ///
    /// On one cycle this splits it in two, on two cycles it joins them.
    pub(crate) fn exchange_successors(&mut self, a: usize, b: usize) {
        let (prev_a, next_a) = (self.prev[a], self.next[a]);
        let (prev_b, next_b) = (self.prev[b], self.next[b]);
        self.next[prev_a] = next_b;
        self.prev[next_b] = prev_a;
        self.next[prev_b] = next_a;
        self.prev[next_a] = prev_b;
    }

    /// Append a hole loop to `face`, starting at `first_edge`.
    pub(crate) fn add_hole(&mut self, face: usize, first_edge: usize) -> usize {
        let l = self.push_loop(face, first_edge);
        self.face_loop_counts[face] += 1;
        l
    }

    /// Create a face whose outer boundary is the cycle through `first_edge`,
    /// inheriting attributes from the face `source` was created from.
    pub(crate) fn add_face(&mut self, source: usize, first_edge: usize) -> usize {
        let face = self.face_first_loops.len();
        self.face_first_loops.push(self.loop_first_edges.len());
        self.face_loop_counts.push(1);
        self.face_selections.push(1.0);
        self.face_sources.push(self.face_sources[source]);
        self.deleted_faces.push(false);
        self.push_loop(face, first_edge);
        face
    }

    fn push_loop(&mut self, face: usize, first_edge: usize) -> usize {
        let l = self.lookup.push_loop(face);
        self.loop_first_edges.push(first_edge);
        self.deleted_loops.push(false);
        self.lookup.set_edge_loop(l, first_edge, &self.next);
        l
    }

    fn delete_loop_edges(&mut self, l: usize) {
        for edge in LoopWalk::new(&self.next, self.loop_first_edges[l]) {
            self.deleted_edges[edge] = true;
        }
    }

    /// Delete a loop and its edges. Deleting a face's outer boundary deletes
    /// the face along with every hole still attached to it.
    pub(crate) fn delete_loop(&mut self, l: usize) {
        if self.deleted_loops[l] {
            return;
        }
        let face = self.loop_face(l);
        self.deleted_loops[l] = true;
        self.delete_loop_edges(l);
        self.face_loop_counts[face] = self.face_loop_counts[face].saturating_sub(1);

        if self.face_first_loops[face] != l {
            return;
        }
        self.deleted_faces[face] = true;
        for other in 0..self.loop_first_edges.len() {
            if self.loop_face(other) == face && !self.deleted_loops[other] {
                self.deleted_loops[other] = true;
                self.delete_loop_edges(other);
                self.face_loop_counts[face] = self.face_loop_counts[face].saturating_sub(1);
            }
        }
        log::trace!("{}: deleted face {face} with its outer loop {l}", self.operation);
    }

    /// Delete `l` if it consists of exactly two edges, and make the edges on
    /// the far side of the two collapsing edges companions of each other.
    ///
    /// Returns true if the loop was deleted.
    pub(crate) fn delete_loop_if_degenerate(&mut self, l: usize) -> bool {
        let first = self.loop_first_edges[l];
        let second = self.next[first];
        if second == first || self.next[second] != first {
            return false;
        }

        self.delete_loop(l);
        self.stitch_companions(first, second);
        log::trace!("{}: removed two-edge loop {l}", self.operation);
        true
    }

    /// Eliminate a loop that is too short to bound anything.
    ///
    /// Returns true if the loop was deleted.
    pub(crate) fn collapse_short_loop(&mut self, l: usize) -> bool {
        if self.deleted_loops[l] {
            return false;
        }
        match self.loop_len(l) {
            2 => self.delete_loop_if_degenerate(l),
            0 | 1 => {
                self.delete_loop(l);
                true
            }
            _ => false,
        }
    }

    /// Join the companions of two edges that are being removed together.
    ///
    /// A side without a companion leaves the other side on the boundary.
    fn stitch_companions(&mut self, a: usize, b: usize) {
        let (across_a, across_b) = (self.companions[a], self.companions[b]);
        if across_a == b {
            // a and b were each other's companions: nothing on either side
            return;
        }
        match (across_a == a, across_b == b) {
            (false, false) => {
                self.companions[across_a] = across_b;
                self.companions[across_b] = across_a;
            }
            (true, false) => {
                self.companions[across_b] = across_b;
                self.boundary[across_b] = true;
            }
            (false, true) => {
                self.companions[across_a] = across_a;
                self.boundary[across_a] = true;
            }
            (true, true) => {}
        }
    }

    /// Number of faces marked as changed.
    pub(crate) fn touched_faces(&self) -> usize {
        self.face_selections
            .iter()
            .zip(&self.deleted_faces)
            .filter(|&(&selection, &deleted)| selection > 0.0 && !deleted)
            .count()
    }
}

/// Shared input checks: topology, adjacency and the edge list.
///
/// Outer loops of two edges are accepted so sliver faces can be removed.
pub(crate) fn check_inputs<I: MeshIndex>(
    polyhedron: &Polyhedron<I>,
    edges: &[EdgeId<I>],
    adjacency: &EdgeAdjacency<I>,
) -> Result<()> {
    polyhedron.check_invariants(2)?;

    let edge_count = polyhedron.num_edges();
    MeshError::check_len("edge adjacency", edge_count, adjacency.len())?;
    MeshError::check_len("boundary flags", edge_count, adjacency.boundary_edges().len())?;
    if !adjacency.is_involution() {
        return Err(MeshError::InvalidState(
            "edge companions are not an involution".to_string(),
        ));
    }

    if let Some(edge) = edges
        .iter()
        .find(|e| !e.is_valid() || e.index() >= edge_count)
    {
        return Err(MeshError::InvalidEdgeIndex {
            edge: edge.index(),
            edge_count,
        });
    }
    Ok(())
}

/// Check that every edge origin lies inside a point array of `point_count`.
pub(crate) fn check_point_range<I: MeshIndex>(
    polyhedron: &Polyhedron<I>,
    point_count: usize,
) -> Result<()> {
    for f in polyhedron.face_ids() {
        if let Some(e) = polyhedron
            .face_edges(f)
            .find(|&e| polyhedron.edge_point(e).index() >= point_count)
        {
            return Err(MeshError::InvalidPointIndex {
                face: f.index(),
                point: polyhedron.edge_point(e).index(),
            });
        }
    }
    Ok(())
}
