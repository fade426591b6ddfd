//! Edge-to-loop and loop-to-face side tables.
//!
//! Loops do not record their face and edges do not record their loop. The
//! operators need both directions, so they build this lookup once per batch
//! and patch it as loops are split, merged and appended.

use crate::mesh::{MeshIndex, Polyhedron};

/// Sentinel for entries not stamped by any loop.
const UNSET: usize = usize::MAX;

/// Walk over one cycle of a successor array, starting at `first`.
///
/// Bounded by the array length, so a corrupted permutation terminates.
#[derive(Debug, Clone)]
pub struct LoopWalk<'a> {
    next: &'a [usize],
    first: usize,
    current: usize,
    remaining: usize,
}

impl<'a> LoopWalk<'a> {
    /// Start a walk at `first`.
    pub fn new(next: &'a [usize], first: usize) -> Self {
        let remaining = if first < next.len() { next.len() } else { 0 };
        Self {
            next,
            first,
            current: first,
            remaining,
        }
    }
}

impl Iterator for LoopWalk<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let edge = self.current;
        match self.next.get(edge) {
            Some(&n) if n != self.first => self.current = n,
            _ => self.remaining = 0,
        }
        Some(edge)
    }
}

/// True if the loop through `first_edge` is really a dangling polyline:
/// every edge has a companion, and that companion lies in the same loop.
pub fn is_polyline(
    first_edge: usize,
    next: &[usize],
    edge_loops: &[usize],
    companions: &[usize],
) -> bool {
    LoopWalk::new(next, first_edge).all(|edge| {
        let companion = companions[edge];
        companion != edge && edge_loops[companion] == edge_loops[edge]
    })
}

/// Edge→loop and loop→face maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLoopFaceLookup {
    edge_loops: Vec<usize>,
    loop_faces: Vec<usize>,
}

impl EdgeLoopFaceLookup {
    /// Stamp both maps by walking every loop of every face.
    ///
    /// Requires each face's loops to be stored contiguously, which holds for
    /// freshly built or compacted polyhedra.
    pub fn build(
        face_first_loops: &[usize],
        face_loop_counts: &[usize],
        loop_first_edges: &[usize],
        next: &[usize],
    ) -> Self {
        let mut lookup = Self {
            edge_loops: vec![UNSET; next.len()],
            loop_faces: vec![UNSET; loop_first_edges.len()],
        };

        for (face, (&first_loop, &count)) in face_first_loops.iter().zip(face_loop_counts).enumerate() {
            for l in first_loop..first_loop + count {
                lookup.loop_faces[l] = face;
                lookup.set_edge_loop(l, loop_first_edges[l], next);
            }
        }

        lookup
    }

    /// Build the lookup for a polyhedron.
    pub fn from_polyhedron<I: MeshIndex>(polyhedron: &Polyhedron<I>) -> Self {
        let first_loops: Vec<usize> = polyhedron.face_ids().map(|f| polyhedron.face_first_loop(f).index()).collect();
        let counts: Vec<usize> = polyhedron.face_ids().map(|f| polyhedron.face_loop_count(f)).collect();
        let first_edges: Vec<usize> = (0..polyhedron.num_loops())
            .map(|l| polyhedron.loop_first_edge(l.into()).index())
            .collect();
        let next: Vec<usize> = polyhedron.next_edges().iter().map(|e| e.index()).collect();

        Self::build(&first_loops, &counts, &first_edges, &next)
    }

    /// Loop containing an edge.
    #[inline]
    pub fn edge_loop(&self, edge: usize) -> usize {
        self.edge_loops[edge]
    }

    /// Face owning a loop.
    #[inline]
    pub fn loop_face(&self, l: usize) -> usize {
        self.loop_faces[l]
    }

    /// Loop of every edge.
    pub fn edge_loops(&self) -> &[usize] {
        &self.edge_loops
    }

    /// Face of every loop.
    pub fn loop_faces(&self) -> &[usize] {
        &self.loop_faces
    }

    /// Stamp `l` on every edge of the cycle through `first_edge`.
    pub fn set_edge_loop(&mut self, l: usize, first_edge: usize, next: &[usize]) {
        for edge in LoopWalk::new(next, first_edge) {
            self.edge_loops[edge] = l;
        }
    }

    /// Register a new loop owned by `face` and return its index.
    ///
    /// Its edges still need [`set_edge_loop`](Self::set_edge_loop).
    pub fn push_loop(&mut self, face: usize) -> usize {
        self.loop_faces.push(face);
        self.loop_faces.len() - 1
    }

    /// Move every loop of face `from` that is not flagged in `skip` over to
    /// face `to`. Returns how many loops moved.
    pub fn reassign_loops(&mut self, from: usize, to: usize, skip: &[bool]) -> usize {
        let mut moved = 0;
        for (l, face) in self.loop_faces.iter_mut().enumerate() {
            if *face == from && !skip[l] {
                *face = to;
                moved += 1;
            }
        }
        moved
    }

    /// [`is_polyline`] against this lookup's edge→loop map.
    pub fn is_polyline(&self, first_edge: usize, next: &[usize], companions: &[usize]) -> bool {
        is_polyline(first_edge, next, &self.edge_loops, companions)
    }
}
