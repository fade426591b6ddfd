//! Polyhedron topology stored as parallel index arrays.
//!
//! # Structure
//!
//! - Every **edge** is a directed half-edge with an origin point and a `next`
//!   edge (its clockwise successor). `next` is a permutation of edge indices;
//!   its cycles are the **loops**.
//! - A **loop** is identified by one of its edges (`loop_first_edges`).
//! - A **face** owns a contiguous range of loops starting at
//!   `face_first_loops[f]`. The first loop is the outer boundary, the others
//!   are holes.
//! - A **shell** is a label on faces; the topology never depends on it.
//!
//! Points are not stored here. Edges hold [`PointId`]s into a position array
//! owned by the caller, which is why geometric queries take `&[Point3<f64>]`.
//!
//! The opposite half-edge of an edge (its companion) is not stored either; it
//! is derived on demand by [`EdgeAdjacency`](super::EdgeAdjacency).

use std::fmt;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::index::{EdgeId, FaceId, LoopId, MeshIndex, PointId, ShellId};
use super::table::AttributeTable;
use crate::error::{MeshError, Result};

/// Opaque material handle attached to faces.
pub type MaterialId = u32;

/// How the faces of a shell are meant to be interpreted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShellType {
    /// Plain polygons.
    #[default]
    Polygons,
    /// Catmull-Clark subdivision cage.
    CatmullClark,
}

/// Number of elements of each kind in a polyhedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementCounts {
    /// Number of faces.
    pub faces: usize,
    /// Number of loops.
    pub loops: usize,
    /// Number of edges.
    pub edges: usize,
    /// Number of shells.
    pub shells: usize,
}

impl fmt::Display for ElementCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} faces, {} loops, {} edges, {} shells",
            self.faces, self.loops, self.edges, self.shells
        )
    }
}

/// A polygonal surface with holes, stored as flat parallel arrays.
#[derive(Debug, Clone, Default)]
pub struct Polyhedron<I: MeshIndex = u32> {
    pub(crate) shell_types: Vec<ShellType>,

    pub(crate) face_shells: Vec<ShellId<I>>,
    pub(crate) face_first_loops: Vec<LoopId<I>>,
    pub(crate) face_loop_counts: Vec<usize>,
    pub(crate) face_selections: Vec<f64>,
    pub(crate) face_materials: Vec<Option<MaterialId>>,

    pub(crate) loop_first_edges: Vec<EdgeId<I>>,

    pub(crate) edge_points: Vec<PointId<I>>,
    pub(crate) next_edges: Vec<EdgeId<I>>,
    pub(crate) edge_selections: Vec<f64>,
    pub(crate) vertex_selections: Vec<f64>,

    pub(crate) face_attributes: AttributeTable,
    pub(crate) edge_attributes: AttributeTable,
    pub(crate) vertex_attributes: AttributeTable,
}

impl<I: MeshIndex> Polyhedron<I> {
    /// Create a new empty polyhedron.
    pub fn new() -> Self {
        Self {
            shell_types: Vec::new(),
            face_shells: Vec::new(),
            face_first_loops: Vec::new(),
            face_loop_counts: Vec::new(),
            face_selections: Vec::new(),
            face_materials: Vec::new(),
            loop_first_edges: Vec::new(),
            edge_points: Vec::new(),
            next_edges: Vec::new(),
            edge_selections: Vec::new(),
            vertex_selections: Vec::new(),
            face_attributes: AttributeTable::new(),
            edge_attributes: AttributeTable::new(),
            vertex_attributes: AttributeTable::new(),
        }
    }

    // ==================== Counts ====================

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_first_loops.len()
    }

    /// Get the number of loops.
    #[inline]
    pub fn num_loops(&self) -> usize {
        self.loop_first_edges.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.next_edges.len()
    }

    /// Get the number of shells.
    #[inline]
    pub fn num_shells(&self) -> usize {
        self.shell_types.len()
    }

    /// All element counts at once.
    pub fn element_counts(&self) -> ElementCounts {
        ElementCounts {
            faces: self.num_faces(),
            loops: self.num_loops(),
            edges: self.num_edges(),
            shells: self.num_shells(),
        }
    }

    // ==================== Accessors ====================

    /// Get the type of a shell.
    #[inline]
    pub fn shell_type(&self, s: ShellId<I>) -> ShellType {
        self.shell_types[s.index()]
    }

    /// Get the shell a face belongs to.
    #[inline]
    pub fn face_shell(&self, f: FaceId<I>) -> ShellId<I> {
        self.face_shells[f.index()]
    }

    /// Get the outer boundary loop of a face.
    #[inline]
    pub fn face_first_loop(&self, f: FaceId<I>) -> LoopId<I> {
        self.face_first_loops[f.index()]
    }

    /// Get the number of loops (boundary plus holes) of a face.
    #[inline]
    pub fn face_loop_count(&self, f: FaceId<I>) -> usize {
        self.face_loop_counts[f.index()]
    }

    /// Get the selection weight of a face.
    #[inline]
    pub fn face_selection(&self, f: FaceId<I>) -> f64 {
        self.face_selections[f.index()]
    }

    /// Set the selection weight of a face.
    #[inline]
    pub fn set_face_selection(&mut self, f: FaceId<I>, weight: f64) {
        self.face_selections[f.index()] = weight;
    }

    /// Get the material of a face.
    #[inline]
    pub fn face_material(&self, f: FaceId<I>) -> Option<MaterialId> {
        self.face_materials[f.index()]
    }

    /// Set the material of a face.
    #[inline]
    pub fn set_face_material(&mut self, f: FaceId<I>, material: Option<MaterialId>) {
        self.face_materials[f.index()] = material;
    }

    /// Get the first edge of a loop.
    #[inline]
    pub fn loop_first_edge(&self, l: LoopId<I>) -> EdgeId<I> {
        self.loop_first_edges[l.index()]
    }

    /// Get the origin point of an edge.
    #[inline]
    pub fn edge_point(&self, e: EdgeId<I>) -> PointId<I> {
        self.edge_points[e.index()]
    }

    /// Get the next (clockwise) edge in the loop.
    #[inline]
    pub fn next(&self, e: EdgeId<I>) -> EdgeId<I> {
        self.next_edges[e.index()]
    }

    /// Get the destination point of an edge.
    #[inline]
    pub fn dest(&self, e: EdgeId<I>) -> PointId<I> {
        self.edge_point(self.next(e))
    }

    /// Get the selection weight of an edge.
    #[inline]
    pub fn edge_selection(&self, e: EdgeId<I>) -> f64 {
        self.edge_selections[e.index()]
    }

    /// Set the selection weight of an edge.
    #[inline]
    pub fn set_edge_selection(&mut self, e: EdgeId<I>, weight: f64) {
        self.edge_selections[e.index()] = weight;
    }

    /// Get the selection weight of the face-vertex at the origin of an edge.
    #[inline]
    pub fn vertex_selection(&self, e: EdgeId<I>) -> f64 {
        self.vertex_selections[e.index()]
    }

    /// Set the selection weight of the face-vertex at the origin of an edge.
    #[inline]
    pub fn set_vertex_selection(&mut self, e: EdgeId<I>, weight: f64) {
        self.vertex_selections[e.index()] = weight;
    }

    /// Shell types, indexed by shell.
    pub fn shell_types(&self) -> &[ShellType] {
        &self.shell_types
    }

    /// Face shells, indexed by face.
    pub fn face_shells(&self) -> &[ShellId<I>] {
        &self.face_shells
    }

    /// Origin points, indexed by edge.
    pub fn edge_points(&self) -> &[PointId<I>] {
        &self.edge_points
    }

    /// Clockwise successors, indexed by edge.
    pub fn next_edges(&self) -> &[EdgeId<I>] {
        &self.next_edges
    }

    /// Per-face attributes.
    pub fn face_attributes(&self) -> &AttributeTable {
        &self.face_attributes
    }

    /// Mutable per-face attributes.
    pub fn face_attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.face_attributes
    }

    /// Per-edge attributes.
    pub fn edge_attributes(&self) -> &AttributeTable {
        &self.edge_attributes
    }

    /// Mutable per-edge attributes.
    pub fn edge_attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.edge_attributes
    }

    /// Per-face-vertex attributes (one row per edge, at its origin).
    pub fn vertex_attributes(&self) -> &AttributeTable {
        &self.vertex_attributes
    }

    /// Mutable per-face-vertex attributes.
    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.vertex_attributes
    }

    // ==================== Iteration ====================

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.num_faces()).map(FaceId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.num_edges()).map(EdgeId::new)
    }

    /// Iterate over the loops of a face, outer boundary first.
    pub fn face_loops(&self, f: FaceId<I>) -> impl Iterator<Item = LoopId<I>> {
        let first = self.face_first_loop(f).index();
        (first..first + self.face_loop_count(f)).map(LoopId::new)
    }

    /// Iterate over the edges of a loop, starting at its first edge.
    pub fn loop_edges(&self, l: LoopId<I>) -> LoopEdgeIter<'_, I> {
        self.edges_from(self.loop_first_edge(l))
    }

    /// Iterate over the cycle of edges that contains `first`.
    pub fn edges_from(&self, first: EdgeId<I>) -> LoopEdgeIter<'_, I> {
        LoopEdgeIter::new(&self.next_edges, first)
    }

    /// Iterate over all edges of all loops of a face.
    pub fn face_edges(&self, f: FaceId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.face_loops(f).flat_map(move |l| self.loop_edges(l))
    }

    /// Number of edges in a loop.
    pub fn loop_len(&self, l: LoopId<I>) -> usize {
        self.loop_edges(l).count()
    }

    /// Points visited by a loop, in order.
    pub fn loop_points(&self, l: LoopId<I>) -> Vec<PointId<I>> {
        self.loop_edges(l).map(|e| self.edge_point(e)).collect()
    }

    /// Build the predecessor lookup (the inverse of `next`).
    pub fn previous_edges(&self) -> Vec<EdgeId<I>> {
        let mut previous = vec![EdgeId::invalid(); self.num_edges()];
        for (edge, next) in self.next_edges.iter().enumerate() {
            previous[next.index()] = EdgeId::new(edge);
        }
        previous
    }

    /// Distinct points referenced by any edge, in ascending order.
    pub fn referenced_points(&self) -> Vec<PointId<I>> {
        let mut points = self.edge_points.clone();
        points.sort_unstable();
        points.dedup();
        points
    }

    // ==================== Geometry ====================

    /// Newell normal of a loop (half the summed cross terms, not normalized).
    ///
    /// # Panics
    /// Panics if the loop references a point outside `points`.
    pub fn loop_normal(&self, l: LoopId<I>, points: &[Point3<f64>]) -> Vector3<f64> {
        newell_normal(
            self.loop_edges(l)
                .map(|e| &points[self.edge_point(e).index()]),
        )
    }

    /// Unit normal of every face, taken from its outer boundary.
    ///
    /// Faces whose boundary has no area get a zero vector. Computed in parallel.
    pub fn face_normals(&self, points: &[Point3<f64>]) -> Vec<Vector3<f64>> {
        (0..self.num_faces())
            .into_par_iter()
            .map(|f| {
                let l = self.face_first_loop(FaceId::new(f));
                self.loop_normal(l, points)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect()
    }

    // ==================== Validation ====================

    /// Check if the polyhedron satisfies every topological invariant.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the topological invariants, reporting the first violation.
    ///
    /// - Per-face and per-edge arrays (and attribute tables) are index-aligned.
    /// - `next` is a fixed-point-free permutation.
    /// - Every loop belongs to exactly one face range, every edge to exactly
    ///   one loop.
    /// - Outer boundary loops have at least three edges.
    /// - Face shells name existing shells.
    pub fn validate(&self) -> Result<()> {
        self.check_invariants(3)
    }

    /// Same checks as [`validate`](Self::validate), with a configurable
    /// minimum outer-loop length so sliver faces can be accepted as input.
    pub(crate) fn check_invariants(&self, min_outer_edges: usize) -> Result<()> {
        let face_count = self.num_faces();
        let loop_count = self.num_loops();
        let edge_count = self.num_edges();

        let face_lengths = [
            ("face shells", self.face_shells.len()),
            ("face loop counts", self.face_loop_counts.len()),
            ("face selections", self.face_selections.len()),
            ("face materials", self.face_materials.len()),
        ];
        for (what, len) in face_lengths {
            MeshError::check_len(what, face_count, len)?;
        }
        let edge_lengths = [
            ("edge points", self.edge_points.len()),
            ("edge selections", self.edge_selections.len()),
            ("vertex selections", self.vertex_selections.len()),
        ];
        for (what, len) in edge_lengths {
            MeshError::check_len(what, edge_count, len)?;
        }
        let tables = [
            ("face attributes", &self.face_attributes, face_count),
            ("edge attributes", &self.edge_attributes, edge_count),
            ("vertex attributes", &self.vertex_attributes, edge_count),
        ];
        for (what, table, count) in tables {
            if !table.matches_len(count) {
                return Err(MeshError::InvalidState(format!(
                    "{what} do not have {count} rows"
                )));
            }
        }

        // next is a fixed-point-free permutation
        let mut has_predecessor = vec![false; edge_count];
        for (edge, next) in self.next_edges.iter().enumerate() {
            let n = next.index();
            if !next.is_valid() || n >= edge_count {
                return Err(MeshError::InvalidState(format!(
                    "edge {edge} has out-of-range successor {next:?}"
                )));
            }
            if n == edge {
                return Err(MeshError::InvalidState(format!(
                    "edge {edge} is its own successor"
                )));
            }
            if std::mem::replace(&mut has_predecessor[n], true) {
                return Err(MeshError::InvalidState(format!(
                    "edge {n} has more than one predecessor"
                )));
            }
        }

        for (edge, point) in self.edge_points.iter().enumerate() {
            if !point.is_valid() {
                return Err(MeshError::InvalidState(format!(
                    "edge {edge} has no origin point"
                )));
            }
        }

        for (face, shell) in self.face_shells.iter().enumerate() {
            if shell.index() >= self.num_shells() {
                return Err(MeshError::InvalidState(format!(
                    "face {face} references missing shell {shell:?}"
                )));
            }
        }

        // Loop ranges partition the loops, cycles partition the edges
        let mut loop_owned = vec![false; loop_count];
        let mut edge_owned = vec![false; edge_count];
        for f in self.face_ids() {
            let first = self.face_first_loop(f);
            let count = self.face_loop_count(f);
            if count == 0 || !first.is_valid() || first.index() + count > loop_count {
                return Err(MeshError::InvalidState(format!(
                    "face {} has invalid loop range {first:?} + {count}",
                    f.index()
                )));
            }
            for l in self.face_loops(f) {
                if std::mem::replace(&mut loop_owned[l.index()], true) {
                    return Err(MeshError::InvalidState(format!(
                        "loop {} belongs to more than one face",
                        l.index()
                    )));
                }
                let first_edge = self.loop_first_edge(l);
                if !first_edge.is_valid() || first_edge.index() >= edge_count {
                    return Err(MeshError::InvalidState(format!(
                        "loop {} has invalid first edge {first_edge:?}",
                        l.index()
                    )));
                }
                let mut len = 0;
                for e in self.edges_from(first_edge) {
                    if std::mem::replace(&mut edge_owned[e.index()], true) {
                        return Err(MeshError::InvalidState(format!(
                            "edge {} belongs to more than one loop",
                            e.index()
                        )));
                    }
                    len += 1;
                }
                if l == first && len < min_outer_edges {
                    return Err(MeshError::InvalidState(format!(
                        "outer loop {} of face {} has only {len} edges",
                        l.index(),
                        f.index()
                    )));
                }
            }
        }
        if let Some(l) = loop_owned.iter().position(|&owned| !owned) {
            return Err(MeshError::InvalidState(format!(
                "loop {l} does not belong to any face"
            )));
        }
        if let Some(e) = edge_owned.iter().position(|&owned| !owned) {
            return Err(MeshError::InvalidState(format!(
                "edge {e} does not belong to any loop"
            )));
        }

        Ok(())
    }
}

/// Newell's summation normal of a closed polygon.
///
/// Robust against zero-length edges and non-planar loops. Returns half the
/// summed cross terms, so its length is the projected area.
pub fn newell_normal<'a>(positions: impl IntoIterator<Item = &'a Point3<f64>>) -> Vector3<f64> {
    let mut positions = positions.into_iter();
    let Some(first) = positions.next() else {
        return Vector3::zeros();
    };

    let mut sum = Vector3::zeros();
    let mut accumulate = |i: &Point3<f64>, j: &Point3<f64>| {
        sum.x += (i.y + j.y) * (j.z - i.z);
        sum.y += (i.z + j.z) * (j.x - i.x);
        sum.z += (i.x + j.x) * (j.y - i.y);
    };

    let mut previous = first;
    for current in positions {
        accumulate(previous, current);
        previous = current;
    }
    accumulate(previous, first);

    0.5 * sum
}

/// Iterator over the edges of one cycle of the `next` permutation.
///
/// Stops when the walk returns to its first edge, or after visiting as many
/// edges as exist, so a corrupted permutation cannot loop forever.
pub struct LoopEdgeIter<'a, I: MeshIndex = u32> {
    next: &'a [EdgeId<I>],
    start: EdgeId<I>,
    current: EdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> LoopEdgeIter<'a, I> {
    fn new(next: &'a [EdgeId<I>], start: EdgeId<I>) -> Self {
        let remaining = if start.is_valid() && start.index() < next.len() {
            next.len()
        } else {
            0
        };
        Self {
            next,
            start,
            current: start,
            remaining,
        }
    }
}

impl<'a, I: MeshIndex> Iterator for LoopEdgeIter<'a, I> {
    type Item = EdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        self.current = self.next.get(result.index()).copied().unwrap_or_default();

        if self.current == self.start || !self.current.is_valid() {
            self.remaining = 0;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;

    fn unit_square() -> (Vec<Point3<f64>>, Polyhedron) {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let polyhedron = build_from_polygons(points.len(), &[vec![0, 1, 2, 3]]).unwrap();
        (points, polyhedron)
    }

    #[test]
    fn test_empty_polyhedron() {
        let polyhedron = Polyhedron::<u32>::new();
        assert_eq!(polyhedron.element_counts(), ElementCounts::default());
        assert!(polyhedron.is_valid());
    }

    #[test]
    fn test_loop_traversal() {
        let (_, polyhedron) = unit_square();
        let l = LoopId::new(0);

        assert_eq!(polyhedron.loop_len(l), 4);
        let points: Vec<usize> = polyhedron.loop_points(l).iter().map(|p| p.index()).collect();
        assert_eq!(points, vec![0, 1, 2, 3]);
        assert_eq!(polyhedron.dest(EdgeId::new(3)).index(), 0);

        let previous = polyhedron.previous_edges();
        for e in polyhedron.edge_ids() {
            assert_eq!(previous[polyhedron.next(e).index()], e);
        }
    }

    #[test]
    fn test_newell_normal_area() {
        let (points, polyhedron) = unit_square();
        let n = polyhedron.loop_normal(LoopId::new(0), &points);
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);

        let normals = polyhedron.face_normals(&points);
        assert_eq!(normals.len(), 1);
        assert!((normals[0].z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_newell_normal_reversed_and_degenerate() {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!((newell_normal(&square).z + 4.0).abs() < 1e-12);

        let polyline = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)];
        assert_eq!(newell_normal(&polyline), Vector3::zeros());
        assert_eq!(newell_normal(std::iter::empty()), Vector3::zeros());
    }

    #[test]
    fn test_validate_rejects_broken_permutation() {
        let (_, mut polyhedron) = unit_square();
        assert!(polyhedron.validate().is_ok());

        polyhedron.next_edges[3] = EdgeId::new(1);
        assert!(matches!(
            polyhedron.validate(),
            Err(MeshError::InvalidState(msg)) if msg.contains("predecessor")
        ));
    }

    #[test]
    fn test_validate_rejects_misaligned_arrays() {
        let (_, mut polyhedron) = unit_square();
        polyhedron.edge_selections.pop();
        assert!(matches!(
            polyhedron.validate(),
            Err(MeshError::LengthMismatch { what: "edge selections", .. })
        ));
    }

    #[test]
    fn test_corrupt_cycle_iteration_terminates() {
        // 0 -> 1 -> 2 -> 1: never returns to 0
        let next: Vec<EdgeId> = vec![EdgeId::new(1), EdgeId::new(2), EdgeId::new(1)];
        let visited: Vec<EdgeId> = LoopEdgeIter::new(&next, EdgeId::new(0)).collect();
        assert_eq!(visited.len(), 3);
    }
}
