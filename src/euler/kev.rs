//! Kill-edge-and-vertex: collapse edges, merging their endpoints.

use super::batch::{check_inputs, check_point_range, EditState};
use super::compact::compact;
use super::EditSummary;
use crate::error::Result;
use crate::mesh::{to_indices, EdgeAdjacency, EdgeId, MeshIndex, Polyhedron};

const OPERATION: &str = "kill_edge_and_vertex";

/// Collapse every listed edge, merging its origin point into its destination.
///
/// Each listed edge is spliced out of its loop. Edges whose endpoints coincide
/// after points are merged are spliced out as well, and loops left with two
/// edges or fewer are removed together with their faces.
///
/// A point is merged at most once: when several listed edges start at the
/// same point, the first one decides where it goes. Chains of merges are
/// followed to their end, and points that would merge into each other in a
/// cycle keep their original index.
///
/// Points themselves are never removed: the caller's point array keeps its
/// length and merged points simply become unreferenced.
///
/// # Errors
/// - [`MeshError::InvalidEdgeIndex`](crate::error::MeshError::InvalidEdgeIndex),
///   [`MeshError::LengthMismatch`](crate::error::MeshError::LengthMismatch),
///   [`MeshError::InvalidPointIndex`](crate::error::MeshError::InvalidPointIndex)
///   and [`MeshError::InvalidState`](crate::error::MeshError::InvalidState)
///   for unusable inputs.
/// - [`MeshError::ContractViolation`](crate::error::MeshError::ContractViolation)
///   if the edited state fails a consistency check. The polyhedron is left
///   untouched.
pub fn kill_edge_and_vertex<I: MeshIndex>(
    polyhedron: &mut Polyhedron<I>,
    edges: &[EdgeId<I>],
    adjacency: &EdgeAdjacency<I>,
    point_count: usize,
) -> Result<EditSummary> {
    check_inputs(polyhedron, edges, adjacency)?;
    check_point_range(polyhedron, point_count)?;

    let before = polyhedron.element_counts();
    let requested = to_indices(edges);
    let mut state = EditState::new(OPERATION, polyhedron, adjacency);
    let mut point_map: Vec<usize> = (0..point_count).collect();

    let result = requested
        .iter()
        .try_for_each(|&edge| collapse_edge(&mut state, &mut point_map, edge))
        .and_then(|()| {
            let merged = apply_point_map(&mut state, &point_map);
            log::trace!("{OPERATION}: re-pointed {merged} edges");
            remove_zero_length_edges(&mut state)
        })
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

fn collapse_edge(state: &mut EditState, point_map: &mut [usize], edge: usize) -> Result<()> {
    if state.deleted_edges[edge] {
        log::trace!("{OPERATION}: edge {edge} already removed");
        return Ok(());
    }

    let companion = state.companions[edge];
    if !state.deleted_edges[companion] {
        let origin = state.edge_points[edge];
        if point_map[origin] == origin {
            point_map[origin] = state.edge_points[state.next[edge]];
        }
    }

    let l = state.edge_loop(edge);
    state.touch(state.loop_face(l));
    if state.loop_len(l) <= 2 {
        state.collapse_short_loop(l);
        return Ok(());
    }

    let after = if companion != edge && companion == state.prev[edge] {
        // Whisker ending at this edge's origin
        state.deleted_edges[companion] = true;
        state.unlink_run(companion, edge)
    } else if companion != edge && companion == state.next[edge] {
        state.deleted_edges[companion] = true;
        state.unlink_run(edge, companion)
    } else {
        let (before, after) = (state.prev[edge], state.next[edge]);
        state.ensure(state.edge_loop(before) == state.edge_loop(after), || {
            format!("neighbours of edge {edge} lie on different loops")
        })?;
        state.unlink_run(edge, edge)
    };
    state.deleted_edges[edge] = true;

    splice_repair(state, l, after);
    Ok(())
}

/// Point the loop at a surviving edge and drop it if it got too short.
fn splice_repair(state: &mut EditState, l: usize, survivor: usize) {
    if state.deleted_edges[state.loop_first_edges[l]] {
        state.loop_first_edges[l] = survivor;
    }
    state.collapse_short_loop(l);
}

/// Follow merges from `point` to the point it finally lands on.
fn resolve(point_map: &[usize], point: usize) -> usize {
    let mut current = point;
    for _ in 0..point_map.len() {
        let target = point_map[current];
        if target == current {
            return current;
        }
        current = target;
    }
    point
}

/// Re-point every surviving edge through `point_map`. Returns how many edges
/// changed.
fn apply_point_map(state: &mut EditState, point_map: &[usize]) -> usize {
    let mut changed = 0;
    for edge in 0..state.edge_points.len() {
        if state.deleted_edges[edge] {
            continue;
        }
        let point = state.edge_points[edge];
        let target = resolve(point_map, point);
        if target != point {
            state.edge_points[edge] = target;
            state.touch(state.edge_face(edge));
            changed += 1;
        }
    }
    changed
}

fn remove_zero_length_edges(state: &mut EditState) -> Result<()> {
    for edge in 0..state.next.len() {
        if state.deleted_edges[edge] {
            continue;
        }
        let next = state.next[edge];
        if state.edge_points[edge] != state.edge_points[next] {
            continue;
        }

        let l = state.edge_loop(edge);
        state.ensure(!state.deleted_loops[l], || {
            format!("live edge {edge} lies on deleted loop {l}")
        })?;
        state.touch(state.loop_face(l));
        if state.loop_len(l) <= 2 {
            state.delete_loop(l);
            continue;
        }
        let after = state.unlink_run(edge, edge);
        state.deleted_edges[edge] = true;
        splice_repair(state, l, after);
        log::trace!("{OPERATION}: removed zero-length edge {edge}");
    }
    Ok(())
}
