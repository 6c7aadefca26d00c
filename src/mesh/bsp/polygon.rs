use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::bsp::plane::Plane;
use nalgebra::Point3;

/// A convex planar polygon with counter-clockwise vertices seen from the front of `plane`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<Real>>,
    pub plane: Plane,
}

impl Polygon {
    pub const fn new(vertices: Vec<Point3<Real>>, plane: Plane) -> Self {
        Polygon { vertices, plane }
    }

    /// Polygon for a mesh triangle; `None` when the triangle has no area.
    pub fn from_triangle([a, b, c]: [Point3<Real>; 3]) -> Option<Self> {
        let plane = Plane::from_points(&a, &b, &c)?;
        Some(Polygon::new(vec![a, b, c], plane))
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    pub fn bounding_box(&self) -> Aabb {
        self.vertices.iter().fold(Aabb::new_invalid(), |bb, p| {
            Aabb::new(bb.mins.inf(p), bb.maxs.sup(p))
        })
    }

    /// Fan triangulation from the first vertex; valid because polygons stay convex under splitting.
    pub fn triangulate(&self) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
        let first = self.vertices.first().copied();
        self.vertices
            .windows(2)
            .skip(1)
            .filter_map(move |pair| first.map(|a| [a, pair[0], pair[1]]))
    }
}
