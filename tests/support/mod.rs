//! Test support library
//! Provides fixtures and comparison helpers shared by the integration tests.
#![allow(dead_code)]

use bingrid::{
    float_types::{OVERLAP, Real},
    mesh::{Mesh, bsp::BspEngine},
    traits::BooleanEngine,
};
use nalgebra::{Point3, Vector3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Returns `[min_x, min_y, min_z, max_x, max_y, max_z]` of a mesh.
pub fn bounding_box(mesh: &Mesh) -> [Real; 6] {
    let bb = mesh.bounding_box().expect("mesh has vertices");
    [bb.mins.x, bb.mins.y, bb.mins.z, bb.maxs.x, bb.maxs.y, bb.maxs.z]
}

/// Assert the mesh spans `[0, size]` on every axis.
pub fn assert_spans(mesh: &Mesh, size: [Real; 3], eps: Real) {
    let bb = bounding_box(mesh);
    for axis in 0..3 {
        assert!(approx_eq(bb[axis], 0.0, eps), "min[{axis}] = {}", bb[axis]);
        assert!(
            approx_eq(bb[axis + 3], size[axis], eps),
            "max[{axis}] = {}, expected {}",
            bb[axis + 3],
            size[axis]
        );
    }
}

/// Solid block from the origin to `(x, y, z)`.
pub fn block(x: Real, y: Real, z: Real) -> Mesh {
    Mesh::cuboid(Point3::origin(), Point3::new(x, y, z))
}

/// Open-topped box with the given outer size, wall and floor thickness.
pub fn hollow_bin(x: Real, y: Real, z: Real, wall: Real, floor: Real) -> Mesh {
    let engine = BspEngine::new();
    let parts = [
        Mesh::cuboid(Point3::origin(), Point3::new(x, y, floor)),
        Mesh::cuboid(Point3::origin(), Point3::new(x, wall, z)),
        Mesh::cuboid(Point3::new(0.0, y - wall, 0.0), Point3::new(x, y, z)),
        Mesh::cuboid(Point3::origin(), Point3::new(wall, y, z)),
        Mesh::cuboid(Point3::new(x - wall, 0.0, 0.0), Point3::new(x, y, z)),
    ];
    parts
        .into_iter()
        .reduce(|acc, part| engine.union(&acc, &part).expect("union of overlapping boxes"))
        .expect("at least one part")
}

/// Layout of [`styled_bin`]: chamfered corners, a raised frame along every
/// grid line and a recessed floor in the middle of each cell.
#[derive(Debug, Clone, Copy)]
pub struct Styled {
    pub cells: (usize, usize),
    pub cell: Real,
    pub height: Real,
}

impl Styled {
    pub const WALL: Real = 2.0;
    pub const BASE: Real = 1.0;
    pub const FRAME: Real = 2.0;
    /// Half-width of the raised frame either side of a grid line.
    pub const FRAME_HALF_WIDTH: Real = 8.0;
    pub const CHAMFER: Real = 3.0;

    pub const fn new(cells: (usize, usize), cell: Real, height: Real) -> Self {
        Styled { cells, cell, height }
    }

    pub fn size(&self) -> Vector3<Real> {
        Vector3::new(
            self.cells.0 as Real * self.cell,
            self.cells.1 as Real * self.cell,
            self.height,
        )
    }

    /// L1 radius of the diamond whose sides cut the corner chamfers.
    fn diamond(&self) -> Real {
        let size = self.size();
        (size.x + size.y) / 2.0 - Self::CHAMFER
    }

    fn near_grid_line(&self, v: Real) -> bool {
        let offset = v.rem_euclid(self.cell);
        offset < Self::FRAME_HALF_WIDTH || offset > self.cell - Self::FRAME_HALF_WIDTH
    }

    /// Exact membership of `p` in the solid.
    pub fn contains(&self, p: &Point3<Real>) -> bool {
        let size = self.size();
        let inside_box = (0..3).all(|i| p[i] > 0.0 && p[i] < size[i]);
        let centre = (p.x - size.x / 2.0).abs() + (p.y - size.y / 2.0).abs();
        if !inside_box || centre > self.diamond() {
            return false;
        }
        let wall = p.x < Self::WALL
            || p.y < Self::WALL
            || p.x > size.x - Self::WALL
            || p.y > size.y - Self::WALL;
        let frame = p.z < Self::FRAME && (self.near_grid_line(p.x) || self.near_grid_line(p.y));
        wall || frame || p.z < Self::BASE
    }

    /// Whether `p` is at least `margin` away from every face of the solid and
    /// from the planes a cell is cut along for corner radius `r`.
    pub fn is_clear(&self, p: &Point3<Real>, r: Real, margin: Real) -> bool {
        let size = self.size();
        // Offsets from a grid line of the frame edge and of the region cuts.
        let from_line = [0.0, OVERLAP, r - OVERLAP, r, r + OVERLAP, Self::FRAME_HALF_WIDTH];
        let clear_along = |v: Real, len: Real| {
            let offset = v.rem_euclid(self.cell);
            [Self::WALL, len - Self::WALL].iter().all(|w| (v - w).abs() >= margin)
                && from_line.iter().all(|d| {
                    (offset - d).abs() >= margin && (self.cell - offset - d).abs() >= margin
                })
        };
        let z_planes = [
            0.0,
            Self::BASE,
            Self::FRAME,
            r - OVERLAP,
            r + OVERLAP,
            size.z - r - OVERLAP,
            size.z - r + OVERLAP,
            size.z,
        ];
        let centre = (p.x - size.x / 2.0).abs() + (p.y - size.y / 2.0).abs();
        clear_along(p.x, size.x)
            && clear_along(p.y, size.y)
            && z_planes.iter().all(|z| (p.z - z).abs() >= margin)
            && (centre - self.diamond()).abs() >= 2.0 * margin
    }
}

/// Bin with chamfered vertical corners, a raised frame along the grid lines
/// and a recess in the floor of every cell; see [`Styled::contains`].
pub fn styled_bin(layout: Styled) -> Mesh {
    let engine = BspEngine::new();
    let size = layout.size();
    let (x, y, z) = (size.x, size.y, size.z);
    let wall = Styled::WALL;
    let half = Styled::FRAME_HALF_WIDTH;
    let boxes = |lo: [Real; 3], hi: [Real; 3]| Mesh::cuboid(Point3::from(lo), Point3::from(hi));

    let mut parts = vec![
        boxes([0.0, 0.0, 0.0], [x, y, Styled::BASE]),
        boxes([0.0, 0.0, 0.5], [x, wall, z]),
        boxes([0.0, y - wall, 0.5], [x, y, z]),
        boxes([0.0, 0.0, 0.5], [wall, y, z]),
        boxes([x - wall, 0.0, 0.5], [x, y, z]),
    ];
    for k in 0..=layout.cells.0 {
        let line = k as Real * layout.cell;
        parts.push(boxes(
            [(line - half).max(0.0), 0.0, 0.5],
            [(line + half).min(x), y, Styled::FRAME],
        ));
    }
    for k in 0..=layout.cells.1 {
        let line = k as Real * layout.cell;
        parts.push(boxes(
            [0.0, (line - half).max(0.0), 0.5],
            [x, (line + half).min(y), Styled::FRAME],
        ));
    }
    let body = parts
        .into_iter()
        .reduce(|acc, part| engine.union(&acc, &part).expect("union of overlapping boxes"))
        .expect("at least one part");

    let d = layout.diamond();
    let side = d * std::f64::consts::SQRT_2 as Real;
    let diamond = boxes([0.0, 0.0, 0.0], [side, side, z + 2.0])
        .rotate_z(std::f64::consts::FRAC_PI_4 as Real)
        .expect("square prism rotates")
        .translate(x / 2.0 - d, y / 2.0 - d, -1.0);
    engine.intersection(&body, &diamond).expect("chamfer cut")
}

/// Whether the ray from `origin` along `dir` crosses triangle `tri` ahead of it.
fn ray_hits(origin: &Point3<Real>, dir: &Vector3<Real>, [a, b, c]: [Point3<Real>; 3]) -> bool {
    let (e1, e2) = (b - a, c - a);
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < 1e-12 {
        return false;
    }
    let s = origin.coords - a.coords;
    let u = s.dot(&h) / det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = s.cross(&e1);
    let v = dir.dot(&q) / det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    e2.dot(&q) / det > 1e-9
}

/// Point-in-solid by crossing parity, majority over three skewed rays.
pub fn contains(mesh: &Mesh, p: &Point3<Real>) -> bool {
    let rays = [
        Vector3::new(0.31, 0.47, 0.83),
        Vector3::new(-0.59, 0.23, 0.71),
        Vector3::new(0.17, -0.79, -0.53),
    ];
    let votes = rays
        .iter()
        .filter(|dir| mesh.triangles().filter(|&tri| ray_hits(p, dir, tri)).count() % 2 == 1)
        .count();
    votes >= 2
}

/// Possibly overlapping closed pieces, queried as one solid.
pub struct Pieces {
    parts: Vec<([Real; 6], Mesh)>,
}

impl Pieces {
    pub fn new(meshes: impl IntoIterator<Item = Mesh>) -> Self {
        let parts = meshes.into_iter().map(|m| (bounding_box(&m), m)).collect();
        Pieces { parts }
    }

    /// Whether `p` lies inside any piece.
    pub fn contains(&self, p: &Point3<Real>) -> bool {
        self.parts.iter().any(|(bb, mesh)| {
            (0..3).all(|i| p[i] >= bb[i] && p[i] <= bb[i + 3]) && contains(mesh, p)
        })
    }
}

/// Binary STL bytes for a mesh.
pub fn stl_bytes(mesh: &Mesh) -> Vec<u8> {
    mesh.to_stl_binary("fixture").expect("in-memory STL write")
}
