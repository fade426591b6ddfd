//! Polyhedron construction utilities.
//!
//! This module builds polyhedra from face-point lists as commonly found in
//! mesh file formats: each face is an outer loop of point indices, optionally
//! followed by hole loops.

use super::index::{EdgeId, FaceId, LoopId, MeshIndex, PointId, ShellId};
use super::polyhedron::{Polyhedron, ShellType};
use crate::error::{MeshError, Result};

/// Incremental polyhedron builder.
///
/// # Example
/// ```
/// use polyloop::mesh::{PolyhedronBuilder, Polyhedron, ShellType};
///
/// let mut builder = PolyhedronBuilder::new(8);
/// let shell = builder.add_shell(ShellType::Polygons);
/// builder.add_polygon(shell, &[0, 1, 2, 3]).unwrap();
/// builder.add_face(shell, &[4, 5, 6, 7], &[]).unwrap();
///
/// let polyhedron: Polyhedron = builder.build().unwrap();
/// assert_eq!(polyhedron.num_faces(), 2);
/// assert_eq!(polyhedron.num_edges(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct PolyhedronBuilder<I: MeshIndex = u32> {
    point_count: usize,
    polyhedron: Polyhedron<I>,
}

impl<I: MeshIndex> PolyhedronBuilder<I> {
    /// Start a builder for faces referencing `point_count` points.
    pub fn new(point_count: usize) -> Self {
        Self {
            point_count,
            polyhedron: Polyhedron::new(),
        }
    }

    /// Add a shell and return its ID.
    pub fn add_shell(&mut self, shell_type: ShellType) -> ShellId<I> {
        let id = ShellId::new(self.polyhedron.shell_types.len());
        self.polyhedron.shell_types.push(shell_type);
        id
    }

    /// Add a face without holes.
    pub fn add_polygon(&mut self, shell: ShellId<I>, points: &[usize]) -> Result<FaceId<I>> {
        self.add_face(shell, points, &[])
    }

    /// Add a face with an outer boundary and any number of holes.
    ///
    /// Every loop needs at least two edges and no point repeated on two
    /// consecutive corners. Two-edge loops are accepted so that degenerate
    /// sliver faces can be expressed; [`Polyhedron::validate`] reports them.
    pub fn add_face(
        &mut self,
        shell: ShellId<I>,
        outer: &[usize],
        holes: &[Vec<usize>],
    ) -> Result<FaceId<I>> {
        let face = self.polyhedron.num_faces();
        if shell.index() >= self.polyhedron.num_shells() {
            return Err(MeshError::invalid_param(
                "shell",
                shell.index(),
                "shell has not been added",
            ));
        }

        let loops = std::iter::once(outer).chain(holes.iter().map(Vec::as_slice));
        for points in loops.clone() {
            self.check_loop(face, points)?;
        }

        let p = &mut self.polyhedron;
        p.face_first_loops.push(LoopId::new(p.loop_first_edges.len()));
        p.face_loop_counts.push(1 + holes.len());
        p.face_shells.push(shell);
        p.face_selections.push(0.0);
        p.face_materials.push(None);

        for points in loops {
            let first = p.next_edges.len();
            p.loop_first_edges.push(EdgeId::new(first));
            for (i, &point) in points.iter().enumerate() {
                let next = if i + 1 == points.len() { first } else { first + i + 1 };
                p.edge_points.push(PointId::new(point));
                p.next_edges.push(EdgeId::new(next));
                p.edge_selections.push(0.0);
                p.vertex_selections.push(0.0);
            }
        }

        Ok(FaceId::new(face))
    }

    fn check_loop(&self, face: usize, points: &[usize]) -> Result<()> {
        if let Some(&point) = points.iter().find(|&&p| p >= self.point_count) {
            return Err(MeshError::InvalidPointIndex { face, point });
        }
        if points.len() < 2 {
            return Err(MeshError::DegenerateFace { face });
        }
        let repeated = (0..points.len()).any(|i| points[i] == points[(i + 1) % points.len()]);
        if repeated {
            return Err(MeshError::DegenerateFace { face });
        }
        Ok(())
    }

    /// Finish construction.
    pub fn build(self) -> Result<Polyhedron<I>> {
        if self.polyhedron.num_faces() == 0 {
            return Err(MeshError::EmptyMesh);
        }
        Ok(self.polyhedron)
    }
}

/// Build a single-shell polyhedron from hole-free polygons.
///
/// # Example
/// ```
/// use polyloop::mesh::{build_from_polygons, Polyhedron};
///
/// // Two unit squares sharing the edge 1-4
/// let polygons = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]];
/// let polyhedron: Polyhedron = build_from_polygons(6, &polygons).unwrap();
///
/// assert_eq!(polyhedron.num_faces(), 2);
/// assert_eq!(polyhedron.num_edges(), 8);
/// assert!(polyhedron.is_valid());
/// ```
pub fn build_from_polygons<I: MeshIndex>(
    point_count: usize,
    polygons: &[Vec<usize>],
) -> Result<Polyhedron<I>> {
    let mut builder = PolyhedronBuilder::new(point_count);
    let shell = builder.add_shell(ShellType::Polygons);
    for polygon in polygons {
        builder.add_polygon(shell, polygon)?;
    }
    builder.build()
}

/// Convert a polyhedron back to point lists: one entry per face, holding one
/// point list per loop (outer boundary first).
pub fn to_polygons<I: MeshIndex>(polyhedron: &Polyhedron<I>) -> Vec<Vec<Vec<usize>>> {
    polyhedron
        .face_ids()
        .map(|f| {
            polyhedron
                .face_loops(f)
                .map(|l| {
                    polyhedron
                        .loop_points(l)
                        .into_iter()
                        .map(PointId::index)
                        .collect()
                })
                .collect()
        })
        .collect()
}
