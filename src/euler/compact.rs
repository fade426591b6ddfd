//! Rebuilds a contiguous polyhedron from an edited working state.
//!
//! Four passes:
//! 1. Every surviving outer loop opens a new face and reserves slots for the
//!    face's holes right after it.
//! 2. Every surviving hole fills the next free slot of its face.
//! 3. Surviving edges are copied with their successors renumbered.
//! 4. Shells left without faces are removed and higher shell ids shift down.

use super::batch::EditState;
use super::remap::IndexRemap;
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, LoopId, MeshIndex, PointId, Polyhedron, ShellId, TableCopier};

const UNFILLED: usize = usize::MAX;

/// Compact `state` into a new polyhedron, copying attribute rows from `source`.
///
/// Face materials come back unset and edge/vertex selections zeroed; face
/// selections carry the state's touched markers.
pub(crate) fn compact<I: MeshIndex>(source: &Polyhedron<I>, state: &EditState) -> Result<Polyhedron<I>> {
    let edges = IndexRemap::new(&state.deleted_edges);
    let loop_count = state.loop_first_edges.len();
    let face_count = state.face_first_loops.len();

    let remap_first_edge = |l: usize| {
        let first = state.loop_first_edges[l];
        edges.new_index(first).ok_or_else(|| {
            MeshError::contract(
                state.operation,
                format!("loop {l} starts at deleted edge {first}"),
            )
        })
    };

    let mut face_attributes = source.face_attributes.clone_empty();
    let mut face_copier = TableCopier::new(&source.face_attributes, &mut face_attributes);

    // Pass 1: outer loops
    let mut face_map = vec![UNFILLED; face_count];
    let mut face_first_loops = Vec::new();
    let mut face_loop_counts = Vec::new();
    let mut face_selections = Vec::new();
    let mut face_shells = Vec::new();
    let mut loop_first_edges = Vec::new();
    for l in 0..loop_count {
        if state.deleted_loops[l] {
            continue;
        }
        let face = state.loop_face(l);
        state.ensure(!state.deleted_faces[face], || {
            format!("loop {l} survives but its face {face} was deleted")
        })?;
        if state.face_first_loops[face] != l {
            continue;
        }

        let count = state.face_loop_counts[face];
        state.ensure(count > 0, || format!("face {face} has no loops left"))?;

        let source_face = state.face_sources[face];
        face_map[face] = face_first_loops.len();
        face_first_loops.push(loop_first_edges.len());
        face_loop_counts.push(count);
        face_selections.push(state.face_selections[face]);
        face_shells.push(source.face_shells[source_face].index());
        face_copier.push_row(source_face);

        loop_first_edges.push(remap_first_edge(l)?);
        loop_first_edges.resize(loop_first_edges.len() + count - 1, UNFILLED);
    }

    let live_faces = state.deleted_faces.iter().filter(|&&deleted| !deleted).count();
    state.ensure(face_first_loops.len() == live_faces, || {
        format!(
            "{live_faces} faces survive but only {} kept their outer loop",
            face_first_loops.len()
        )
    })?;

    // Pass 2: holes
    let mut filled = vec![1usize; face_first_loops.len()];
    for l in 0..loop_count {
        if state.deleted_loops[l] || state.is_primary(l) {
            continue;
        }
        let face = state.loop_face(l);
        let new_face = face_map[face];
        state.ensure(new_face != UNFILLED, || {
            format!("hole {l} belongs to face {face}, which has no outer loop")
        })?;
        state.ensure(filled[new_face] < face_loop_counts[new_face], || {
            format!(
                "face {face} has more loops than its count of {}",
                face_loop_counts[new_face]
            )
        })?;

        loop_first_edges[face_first_loops[new_face] + filled[new_face]] = remap_first_edge(l)?;
        filled[new_face] += 1;
    }
    if let Some(new_face) = (0..filled.len()).find(|&f| filled[f] != face_loop_counts[f]) {
        return Err(MeshError::contract(
            state.operation,
            format!(
                "output face {new_face} reserved {} loops but {} were placed",
                face_loop_counts[new_face], filled[new_face]
            ),
        ));
    }

    // Pass 3: edges
    let mut edge_attributes = source.edge_attributes.clone_empty();
    let mut vertex_attributes = source.vertex_attributes.clone_empty();
    let mut edge_copier = TableCopier::new(&source.edge_attributes, &mut edge_attributes);
    let mut vertex_copier = TableCopier::new(&source.vertex_attributes, &mut vertex_attributes);
    let mut edge_points = Vec::with_capacity(edges.new_len());
    let mut next_edges = Vec::with_capacity(edges.new_len());
    for edge in 0..edges.old_len() {
        if edges.is_deleted(edge) {
            continue;
        }
        let next = state.next[edge];
        let new_next = edges.new_index(next).ok_or_else(|| {
            MeshError::contract(state.operation, format!("edge {edge} links to deleted edge {next}"))
        })?;

        edge_points.push(PointId::new(state.edge_points[edge]));
        next_edges.push(EdgeId::new(new_next));
        edge_copier.push_row(edge);
        vertex_copier.push_row(edge);
    }

    // Pass 4: shells
    let mut shell_types = source.shell_types.clone();
    let mut members = vec![0usize; shell_types.len()];
    for &shell in &face_shells {
        members[shell] += 1;
    }
    for shell in (0..shell_types.len()).rev() {
        if members[shell] > 0 {
            continue;
        }
        shell_types.remove(shell);
        for face_shell in face_shells.iter_mut().filter(|s| **s > shell) {
            *face_shell -= 1;
        }
        log::trace!("{}: removed empty shell {shell}", state.operation);
    }

    let new_face_count = face_first_loops.len();
    let new_edge_count = next_edges.len();
    Ok(Polyhedron {
        shell_types,
        face_shells: face_shells.into_iter().map(ShellId::new).collect(),
        face_first_loops: face_first_loops.into_iter().map(LoopId::new).collect(),
        face_loop_counts,
        face_selections,
        face_materials: vec![None; new_face_count],
        loop_first_edges: loop_first_edges.into_iter().map(EdgeId::new).collect(),
        edge_points,
        next_edges,
        edge_selections: vec![0.0; new_edge_count],
        vertex_selections: vec![0.0; new_edge_count],
        face_attributes,
        edge_attributes,
        vertex_attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{
        build_from_polygons, to_polygons, AttributeTable, Column, EdgeAdjacency, PolyhedronBuilder,
        ShellType,
    };

    #[test]
    fn test_nothing_deleted_roundtrips() {
        let polyhedron: Polyhedron =
            build_from_polygons(6, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);
        let state = EditState::new("test", &polyhedron, &adjacency);

        let output = compact(&polyhedron, &state).unwrap();
        assert_eq!(output.element_counts(), polyhedron.element_counts());
        assert_eq!(to_polygons(&output), to_polygons(&polyhedron));
        assert!(output.is_valid());
    }

    #[test]
    fn test_shell_excision() {
        let mut builder = PolyhedronBuilder::<u32>::new(9);
        let s0 = builder.add_shell(ShellType::Polygons);
        let s1 = builder.add_shell(ShellType::CatmullClark);
        builder.add_polygon(s0, &[0, 1, 4, 3]).unwrap();
        builder.add_polygon(s1, &[1, 2, 5, 4]).unwrap();
        builder.add_polygon(s1, &[4, 5, 8, 7]).unwrap();
        let polyhedron = builder.build().unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);

        let mut state = EditState::new("test", &polyhedron, &adjacency);
        state.delete_loop(0);
        let output = compact(&polyhedron, &state).unwrap();

        assert_eq!(output.num_shells(), 1);
        assert_eq!(output.shell_types(), &[ShellType::CatmullClark]);
        assert!(output.face_shells().iter().all(|s| s.index() == 0));
        assert_eq!(output.num_edges(), 8);
        assert!(output.is_valid());
    }

    #[test]
    fn test_attribute_rows_follow_survivors() {
        let mut polyhedron: Polyhedron =
            build_from_polygons(6, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
        polyhedron.face_attributes_mut().insert_column("id", Column::I32(vec![10, 20]));
        *polyhedron.edge_attributes_mut() = AttributeTable::new()
            .with_column("w", Column::F64((0..8).map(|i| i as f64).collect()));
        let adjacency = EdgeAdjacency::build(&polyhedron);

        let mut state = EditState::new("test", &polyhedron, &adjacency);
        state.delete_loop(0);
        let output = compact(&polyhedron, &state).unwrap();

        assert_eq!(output.face_attributes().column("id"), Some(&Column::I32(vec![20])));
        assert_eq!(
            output.edge_attributes().column("w"),
            Some(&Column::F64(vec![4.0, 5.0, 6.0, 7.0]))
        );
        assert!(output.vertex_attributes().is_empty());
        assert!(output.is_valid());
    }

    #[test]
    fn test_hole_slots_refilled_after_reordering() {
        // The hole is appended after the outer loops of both faces
        let mut builder = PolyhedronBuilder::<u32>::new(11);
        let shell = builder.add_shell(ShellType::Polygons);
        builder
            .add_face(shell, &[0, 1, 2, 3], &[vec![4, 7, 6, 5]])
            .unwrap();
        builder.add_polygon(shell, &[8, 9, 10]).unwrap();
        let polyhedron = builder.build().unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);

        let mut state = EditState::new("test", &polyhedron, &adjacency);
        // Move the hole to a fresh loop slot at the end
        state.deleted_loops[1] = true;
        state.face_loop_counts[0] -= 1;
        state.add_hole(0, 4);

        let output = compact(&polyhedron, &state).unwrap();
        assert_eq!(output.num_loops(), 3);
        assert_eq!(to_polygons(&output)[0][1], vec![4, 7, 6, 5]);
        assert!(output.is_valid());
    }

    #[test]
    fn test_loop_count_mismatch_is_contract_violation() {
        let polyhedron: Polyhedron =
            build_from_polygons(6, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);

        let mut state = EditState::new("test", &polyhedron, &adjacency);
        state.face_loop_counts[1] = 2;
        assert!(matches!(
            compact(&polyhedron, &state),
            Err(MeshError::ContractViolation { operation: "test", .. })
        ));
    }

    #[test]
    fn test_dangling_successor_is_contract_violation() {
        let polyhedron: Polyhedron = build_from_polygons(4, &[vec![0, 1, 2, 3]]).unwrap();
        let adjacency = EdgeAdjacency::build(&polyhedron);

        let mut state = EditState::new("test", &polyhedron, &adjacency);
        state.deleted_edges[2] = true;
        let err = compact(&polyhedron, &state).unwrap_err();
        assert!(err.to_string().contains("deleted edge 2"));
    }
}
