//! Small planar test meshes shared by the operator tests.

use nalgebra::{Point3, Vector3};

use super::{kill_edge_and_vertex, kill_edge_make_loop, EditSummary, EulerOptions};
use crate::error::Result;
use crate::mesh::{
    build_from_polygons, EdgeAdjacency, EdgeId, Polyhedron, PolyhedronBuilder, ShellType,
};

pub(crate) struct Fixture {
    pub(crate) polyhedron: Polyhedron,
    pub(crate) adjacency: EdgeAdjacency,
    pub(crate) points: Vec<Point3<f64>>,
}

impl Fixture {
    fn new(points: Vec<Point3<f64>>, polyhedron: Polyhedron) -> Self {
        let adjacency = EdgeAdjacency::build(&polyhedron);
        Self {
            polyhedron,
            adjacency,
            points,
        }
    }

    pub(crate) fn normals(&self) -> Vec<Vector3<f64>> {
        self.polyhedron.face_normals(&self.points)
    }

    pub(crate) fn keml(&mut self, edges: &[usize]) -> Result<EditSummary> {
        let normals = self.normals();
        let summary = kill_edge_make_loop(
            &mut self.polyhedron,
            &edge_ids(edges),
            &self.adjacency,
            &self.points,
            &normals,
            &EulerOptions::default(),
        )?;
        self.adjacency = EdgeAdjacency::build(&self.polyhedron);
        Ok(summary)
    }

    pub(crate) fn kev(&mut self, edges: &[usize]) -> Result<EditSummary> {
        let summary = kill_edge_and_vertex(
            &mut self.polyhedron,
            &edge_ids(edges),
            &self.adjacency,
            self.points.len(),
        )?;
        self.adjacency = EdgeAdjacency::build(&self.polyhedron);
        Ok(summary)
    }

    /// One half of every interior edge pair.
    pub(crate) fn interior_edges(&self) -> Vec<usize> {
        self.adjacency
            .companions()
            .iter()
            .enumerate()
            .filter(|&(edge, companion)| edge < companion.index())
            .map(|(edge, _)| edge)
            .collect()
    }
}

fn edge_ids(edges: &[usize]) -> Vec<EdgeId> {
    edges.iter().map(|&e| EdgeId::new(e)).collect()
}

fn xy(coords: &[(f64, f64)]) -> Vec<Point3<f64>> {
    coords.iter().map(|&(x, y)| Point3::new(x, y, 0.0)).collect()
}

/// Two unit squares sharing the edge 1 -> 4 (edge 1, companion 7).
///
/// ```text
/// 3---4---5
/// |   |   |
/// 0---1---2
/// ```
pub(crate) fn quad_pair() -> Fixture {
    let points = (0..6)
        .map(|i| Point3::new((i % 3) as f64, (i / 3) as f64, 0.0))
        .collect();
    let polyhedron = build_from_polygons(6, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
    Fixture::new(points, polyhedron)
}

/// [`quad_pair`] with the left quad in shell 1 and the right one in shell 0.
pub(crate) fn quad_pair_in_shells() -> Fixture {
    let mut fixture = quad_pair();
    let mut builder = PolyhedronBuilder::new(6);
    let polygons = builder.add_shell(ShellType::Polygons);
    let cage = builder.add_shell(ShellType::CatmullClark);
    builder.add_polygon(cage, &[0, 1, 4, 3]).unwrap();
    builder.add_polygon(polygons, &[1, 2, 5, 4]).unwrap();
    fixture.polyhedron = builder.build().unwrap();
    fixture.adjacency = EdgeAdjacency::build(&fixture.polyhedron);
    fixture
}

/// A hexagon whose boundary runs in along a bridge (edges 6 and 10), around
/// a clockwise triangle, and back out.
pub(crate) fn keyhole() -> Fixture {
    let mut points: Vec<Point3<f64>> = (0..6)
        .map(|k| {
            let angle = k as f64 * std::f64::consts::FRAC_PI_3;
            Point3::new(3.0 * angle.cos(), 3.0 * angle.sin(), 0.0)
        })
        .collect();
    points.extend(xy(&[(1.0, 0.0), (-0.5, 0.8), (-0.5, -0.8)]));

    let polyhedron =
        build_from_polygons(9, &[vec![0, 1, 2, 3, 4, 5, 0, 6, 8, 7, 6]]).unwrap();
    Fixture::new(points, polyhedron)
}

/// Two squares joined by a bridge (edges 1 and 6) into a single loop.
pub(crate) fn figure_eight() -> Fixture {
    let points = xy(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (3.0, 0.0),
        (4.0, 0.0),
        (4.0, 1.0),
        (3.0, 1.0),
    ]);
    let polyhedron = build_from_polygons(8, &[vec![0, 1, 4, 5, 6, 7, 4, 1, 2, 3]]).unwrap();
    Fixture::new(points, polyhedron)
}

/// A triangle with a two-edge sliver face glued to its edge 0 -> 1.
///
/// The sliver's far edge is on the boundary, so the companions are given
/// explicitly rather than matched by point pairs.
pub(crate) fn sliver() -> Fixture {
    let points = xy(&[(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]);
    let polyhedron = build_from_polygons(3, &[vec![0, 1, 2], vec![1, 0]]).unwrap();
    let mut fixture = Fixture::new(points, polyhedron);
    fixture.adjacency = EdgeAdjacency::from_parts(
        vec![false, true, true, false, true],
        [3, 1, 2, 0, 4].map(EdgeId::new).to_vec(),
    );
    fixture
}

/// A 3x3 square with a unit square hole, filled by a separate island face.
///
/// Hole edges are 4..8 and the island's edges 8..12; edge 8 pairs with 7.
pub(crate) fn island() -> Fixture {
    let points = xy(&[
        (0.0, 0.0),
        (3.0, 0.0),
        (3.0, 3.0),
        (0.0, 3.0),
        (1.0, 1.0),
        (2.0, 1.0),
        (2.0, 2.0),
        (1.0, 2.0),
    ]);
    let mut builder = PolyhedronBuilder::new(8);
    let shell = builder.add_shell(ShellType::Polygons);
    builder
        .add_face(shell, &[0, 1, 2, 3], &[vec![4, 7, 6, 5]])
        .unwrap();
    builder.add_polygon(shell, &[4, 5, 6, 7]).unwrap();
    Fixture::new(points, builder.build().unwrap())
}

/// A unit square whose only hole is the whisker 4 -> 5 -> 4 (edges 4 and 5).
pub(crate) fn whisker_hole() -> Fixture {
    let points = xy(&[
        (0.0, 0.0),
        (3.0, 0.0),
        (3.0, 3.0),
        (0.0, 3.0),
        (1.0, 1.0),
        (2.0, 2.0),
    ]);
    let mut builder = PolyhedronBuilder::new(6);
    let shell = builder.add_shell(ShellType::Polygons);
    builder
        .add_face(shell, &[0, 1, 2, 3], &[vec![4, 5]])
        .unwrap();
    Fixture::new(points, builder.build().unwrap())
}

/// Two faces whose holes share the edge 5 -> 6 (edge 5, companion 11).
pub(crate) fn facing_holes() -> Fixture {
    let points = (0..12)
        .map(|i| Point3::new(i as f64, (i * i % 7) as f64, 0.0))
        .collect();
    let mut builder = PolyhedronBuilder::new(12);
    let shell = builder.add_shell(ShellType::Polygons);
    builder
        .add_face(shell, &[0, 1, 2, 3], &[vec![4, 5, 6]])
        .unwrap();
    builder
        .add_face(shell, &[7, 8, 9, 10], &[vec![6, 5, 11]])
        .unwrap();
    Fixture::new(points, builder.build().unwrap())
}

/// An `n` x `n` grid of unit quads; point (i, j) has index `j * (n + 1) + i`.
pub(crate) fn quad_grid(n: usize) -> Fixture {
    let side = n + 1;
    let points = (0..side * side)
        .map(|p| Point3::new((p % side) as f64, (p / side) as f64, 0.0))
        .collect();
    let polygons: Vec<Vec<usize>> = (0..n)
        .flat_map(|j| (0..n).map(move |i| (i, j)))
        .map(|(i, j)| {
            let p = j * side + i;
            vec![p, p + 1, p + side + 1, p + side]
        })
        .collect();
    let polyhedron = build_from_polygons(side * side, &polygons).unwrap();
    Fixture::new(points, polyhedron)
}

/// [`quad_pair`] split into four triangles; edge 1 runs 1 -> 4.
pub(crate) fn triangle_strip() -> Fixture {
    let mut fixture = quad_pair();
    fixture.polyhedron = build_from_polygons(
        6,
        &[vec![0, 1, 4], vec![0, 4, 3], vec![1, 2, 5], vec![1, 5, 4]],
    )
    .unwrap();
    fixture.adjacency = EdgeAdjacency::build(&fixture.polyhedron);
    fixture
}

/// A unit square with a whisker from corner 2 to point 4 at its centre.
///
/// Edge 2 runs 2 -> 4 and edge 3 returns 4 -> 2.
pub(crate) fn antenna() -> Fixture {
    let points = xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)]);
    let polyhedron = build_from_polygons(5, &[vec![0, 1, 2, 4, 2, 3]]).unwrap();
    Fixture::new(points, polyhedron)
}
