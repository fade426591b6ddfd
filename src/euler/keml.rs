//! Kill-edge-make-loop: dissolve edges between or within loops.

use nalgebra::{Point3, Vector3};

use super::batch::{check_inputs, check_point_range, EditState};
use super::compact::compact;
use super::{EditSummary, EulerOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{newell_normal, to_indices, EdgeAdjacency, EdgeId, MeshIndex, Polyhedron};

const OPERATION: &str = "kill_edge_make_loop";

/// Dissolve every listed edge together with its companion.
///
/// Depending on where the two halves sit, dissolving an edge:
/// - merges two faces (the companion's face folds into the edge's face),
/// - merges two loops of one face,
/// - removes a dangling whisker, or a two-edge sliver loop,
/// - splits one loop in two. The piece that still faces along the face
///   normal (within `options.normal_tolerance`) stays the outer boundary and
///   the other becomes a hole. If both pieces qualify, the second one becomes
///   a new face in the same shell.
///
/// Boundary edges are skipped, and listing both halves of an edge is the same
/// as listing one. `face_normals` holds the unit normal of every input face,
/// as returned by [`Polyhedron::face_normals`].
///
/// On success the polyhedron is replaced by the compacted result: touched
/// faces are selected, materials are cleared and edge/vertex selections are
/// zeroed. On error it is left untouched.
///
/// # Errors
/// - [`MeshError::InvalidEdgeIndex`], [`MeshError::LengthMismatch`],
///   [`MeshError::InvalidPointIndex`], [`MeshError::InvalidState`] and
///   [`MeshError::InvalidParameter`] for unusable inputs.
/// - [`MeshError::UnsupportedTopology`] if an edge joins hole loops of two
///   different faces.
/// - [`MeshError::ContractViolation`] if a split would leave a face without
///   an outer boundary, or the edited state fails a consistency check.
pub fn kill_edge_make_loop<I: MeshIndex>(
    polyhedron: &mut Polyhedron<I>,
    edges: &[EdgeId<I>],
    adjacency: &EdgeAdjacency<I>,
    points: &[Point3<f64>],
    face_normals: &[Vector3<f64>],
    options: &EulerOptions,
) -> Result<EditSummary> {
    options.validate()?;
    check_inputs(polyhedron, edges, adjacency)?;
    MeshError::check_len("face normals", polyhedron.num_faces(), face_normals.len())?;
    check_point_range(polyhedron, points.len())?;

    let before = polyhedron.element_counts();
    let requested = to_indices(edges);
    let mut state = EditState::new(OPERATION, polyhedron, adjacency);
    reject_unsupported(&state, &requested)?;

    let mut dissolver = Dissolver {
        state: &mut state,
        points,
        face_normals,
        tolerance: options.normal_tolerance,
    };
    let result = requested
        .iter()
        .try_for_each(|&edge| dissolver.dissolve(edge))
        .and_then(|()| compact(polyhedron, &state));

    let output = match result {
        Ok(output) => output,
        Err(err) => {
            log::error!("{OPERATION}: batch of {} edges aborted: {err}", requested.len());
            return Err(err);
        }
    };

    let summary = EditSummary {
        before,
        after: output.element_counts(),
        touched_faces: state.touched_faces(),
    };
    *polyhedron = output;
    log::debug!("{OPERATION}: {summary}");
    Ok(summary)
}

/// Two hole loops of different faces cannot be merged; refuse the whole
/// batch before anything is edited.
fn reject_unsupported(state: &EditState, requested: &[usize]) -> Result<()> {
    for &edge in requested {
        let companion = state.companions[edge];
        if state.boundary[edge] || companion == edge {
            continue;
        }
        if joins_foreign_holes(state, edge, companion) {
            return Err(MeshError::UnsupportedTopology { edge, companion });
        }
    }
    Ok(())
}

fn joins_foreign_holes(state: &EditState, edge: usize, companion: usize) -> bool {
    let (l, cl) = (state.edge_loop(edge), state.edge_loop(companion));
    l != cl
        && state.loop_face(l) != state.loop_face(cl)
        && !state.is_primary(l)
        && !state.is_primary(cl)
}

struct Dissolver<'a> {
    state: &'a mut EditState,
    points: &'a [Point3<f64>],
    face_normals: &'a [Vector3<f64>],
    tolerance: f64,
}

impl Dissolver<'_> {
    fn dissolve(&mut self, requested: usize) -> Result<()> {
        let state = &*self.state;
        let companion = state.companions[requested];
        if state.boundary[requested] || companion == requested {
            log::warn!("{OPERATION}: skipping boundary edge {requested}");
            return Ok(());
        }
        if state.deleted_edges[requested] {
            if state.deleted_edges[companion] {
                log::trace!("{OPERATION}: edge {requested} already dissolved");
            } else {
                log::warn!("{OPERATION}: skipping edge {requested}, removed with its loop");
            }
            return Ok(());
        }
        state.ensure(!state.deleted_edges[companion], || {
            format!("companion {companion} of edge {requested} already deleted")
        })?;

        // Always work from the hole side when exactly one side is an outer loop
        let swap = state.is_primary(state.edge_loop(requested))
            && !state.is_primary(state.edge_loop(companion));
        let (edge, companion) = if swap {
            (companion, requested)
        } else {
            (requested, companion)
        };

        let (l, cl) = (state.edge_loop(edge), state.edge_loop(companion));
        let (face, companion_face) = (state.loop_face(l), state.loop_face(cl));
        state.ensure(!state.deleted_loops[l] && !state.deleted_loops[cl], || {
            format!("edge {edge} or companion {companion} lies on a deleted loop")
        })?;
        state.ensure(!state.deleted_faces[face] && !state.deleted_faces[companion_face], || {
            format!("edge {edge} or companion {companion} lies on a deleted face")
        })?;
        for e in [edge, companion] {
            state.ensure(state.next[state.prev[e]] == e && state.prev[state.next[e]] == e, || {
                format!("links around edge {e} are inconsistent")
            })?;
        }

        if state.next[state.next[edge]] == edge {
            self.remove_two_edge_loop(edge, companion, l);
            return Ok(());
        }

        if l == cl {
            self.state.deleted_edges[edge] = true;
            self.state.deleted_edges[companion] = true;
            self.state.touch(face);
            self.split_loop(edge, companion, l, face)
        } else if face == companion_face {
            self.merge_loops(edge, companion, l, cl, face);
            Ok(())
        } else if self.state.is_primary(cl) {
            self.fold_face(edge, companion, l, face, cl, companion_face);
            Ok(())
        } else {
            Err(MeshError::UnsupportedTopology { edge, companion })
        }
    }

    fn remove_two_edge_loop(&mut self, edge: usize, companion: usize, l: usize) {
        let state = &mut *self.state;
        state.touch(state.loop_face(l));
        if state.next[edge] == companion {
            // An isolated whisker: both halves form the loop
            state.delete_loop(l);
        } else {
            let across = state.edge_face(companion);
            state.delete_loop_if_degenerate(l);
            state.touch(across);
        }
        log::trace!("{OPERATION}: edge {edge} removed its two-edge loop {l}");
    }

    fn split_loop(&mut self, edge: usize, companion: usize, l: usize, face: usize) -> Result<()> {
        let state = &mut *self.state;

        // Adjacent halves form a whisker tip: drop both, nothing splits
        if state.next[edge] == companion || state.next[companion] == edge {
            let (first, last) = if state.next[edge] == companion {
                (edge, companion)
            } else {
                (companion, edge)
            };
            let survivor = state.unlink_run(first, last);
            state.loop_first_edges[l] = survivor;
            state.collapse_short_loop(l);
            log::trace!("{OPERATION}: edge {edge} removed a whisker from loop {l}");
            return Ok(());
        }

        let after_edge = state.next[edge];
        let after_companion = state.next[companion];
        state.exchange_successors(edge, companion);

        let normal = self.face_normals[self.state.face_sources[face]];
        let companion_piece_ok = self.faces_along(after_companion, &normal);
        let (kept, split_off, new_face) = if self.state.is_primary(l) {
            let edge_piece_ok = self.faces_along(after_edge, &normal);
            match (companion_piece_ok, edge_piece_ok) {
                (true, true) => (after_companion, after_edge, true),
                (true, false) => (after_companion, after_edge, false),
                (false, true) => (after_edge, after_companion, false),
                (false, false) => {
                    return Err(MeshError::contract(
                        OPERATION,
                        format!("splitting outer loop {l} at edge {edge} leaves no outward piece"),
                    ));
                }
            }
        } else if companion_piece_ok {
            (after_companion, after_edge, false)
        } else {
            (after_edge, after_companion, false)
        };

        let state = &mut *self.state;
        state.loop_first_edges[l] = kept;
        let new_loop = if new_face {
            let f = state.add_face(face, split_off);
            log::trace!("{OPERATION}: edge {edge} split face {face}, creating face {f}");
            state.face_first_loops[f]
        } else {
            let hole = state.add_hole(face, split_off);
            log::trace!("{OPERATION}: edge {edge} split loop {l}, creating hole {hole}");
            hole
        };
        state.collapse_short_loop(l);
        state.collapse_short_loop(new_loop);
        Ok(())
    }

    /// True if the cycle through `first_edge` is a proper boundary facing
    /// along `normal`.
    fn faces_along(&self, first_edge: usize, normal: &Vector3<f64>) -> bool {
        let state = &*self.state;
        if state.is_polyline(first_edge) {
            return false;
        }
        let n = newell_normal(
            state
                .walk(first_edge)
                .map(|e| &self.points[state.edge_points[e]]),
        );
        n.try_normalize(f64::EPSILON)
            .map_or(false, |n| (n.dot(normal) - 1.0).abs() < self.tolerance)
    }

    /// Join two loops of the same face. An outer loop keeps its id.
    fn merge_loops(&mut self, edge: usize, companion: usize, l: usize, cl: usize, face: usize) {
        let state = &mut *self.state;
        let (kept, removed) = if state.is_primary(cl) { (cl, l) } else { (l, cl) };
        let anchor = state.prev[edge];

        state.deleted_edges[edge] = true;
        state.deleted_edges[companion] = true;
        state.exchange_successors(edge, companion);
        state.loop_first_edges[kept] = anchor;
        state.lookup.set_edge_loop(kept, anchor, &state.next);
        state.deleted_loops[removed] = true;
        state.face_loop_counts[face] -= 1;
        state.touch(face);
        state.collapse_short_loop(kept);
        log::trace!("{OPERATION}: edge {edge} merged loop {removed} into loop {kept}");
    }

    /// Fold the companion's face into the edge's face through the shared edge.
    fn fold_face(
        &mut self,
        edge: usize,
        companion: usize,
        l: usize,
        face: usize,
        cl: usize,
        companion_face: usize,
    ) {
        let state = &mut *self.state;
        let anchor = state.prev[edge];

        state.deleted_edges[edge] = true;
        state.deleted_edges[companion] = true;
        state.exchange_successors(edge, companion);
        state.loop_first_edges[l] = anchor;
        state.lookup.set_edge_loop(l, anchor, &state.next);

        state.deleted_loops[cl] = true;
        state.deleted_faces[companion_face] = true;
        state.face_loop_counts[companion_face] -= 1;
        let moved = state
            .lookup
            .reassign_loops(companion_face, face, &state.deleted_loops);
        state.face_loop_counts[face] += moved;
        state.face_loop_counts[companion_face] -= moved;
        state.touch(face);
        state.collapse_short_loop(l);
        log::trace!("{OPERATION}: edge {edge} folded face {companion_face} into face {face}");
    }
}
