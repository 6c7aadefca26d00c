//! Oriented splitting planes

use crate::float_types::{Real, tolerance};
use crate::mesh::bsp::polygon::Polygon;
use nalgebra::{Point3, Vector3};

// Point and polygon classifications. Polygons OR their vertex classes together.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// Plane `normal · p = w` with a unit normal; the front side is where the normal points.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

/// Result of splitting one polygon: (coplanar-front, coplanar-back, front, back).
pub type SplitParts = (Vec<Polygon>, Vec<Polygon>, Vec<Polygon>, Vec<Polygon>);

impl Plane {
    /// Plane through three counter-clockwise points, `None` if they are collinear.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Option<Plane> {
        let eps = tolerance();
        let normal = (b - a).cross(&(c - a)).try_normalize(eps * eps)?;
        Some(Plane {
            w: normal.dot(&a.coords),
            normal,
        })
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Signed distance of `point` from the plane.
    pub fn distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let t = self.distance(point);
        let eps = tolerance();
        if t > eps {
            FRONT
        } else if t < -eps {
            BACK
        } else {
            COPLANAR
        }
    }

    pub fn classify_polygon(&self, polygon: &Polygon) -> i8 {
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | self.orient_point(v))
    }

    /// Split `polygon` by this plane.
    ///
    /// Coplanar polygons go to one of the first two buckets depending on
    /// whether they face the same way as the plane. Spanning polygons are cut
    /// along the plane; pieces with fewer than three vertices are discarded.
    pub fn split_polygon(&self, polygon: &Polygon) -> SplitParts {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let types: Vec<i8> = polygon.vertices.iter().map(|v| self.orient_point(v)).collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let count = polygon.vertices.len();
                let mut split_front = Vec::with_capacity(count + 1);
                let mut split_back = Vec::with_capacity(count + 1);

                for i in 0..count {
                    let j = (i + 1) % count;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);

                    if ti != BACK {
                        split_front.push(vi);
                    }
                    if ti != FRONT {
                        split_back.push(vi);
                    }

                    if (ti | tj) == SPANNING {
                        let denom = self.normal.dot(&(vj - vi));
                        // Spanning edges always have a non-zero denominator.
                        let t = (self.w - self.normal.dot(&vi.coords)) / denom;
                        let v = vi + (vj - vi) * t;
                        split_front.push(v);
                        split_back.push(v);
                    }
                }

                if split_front.len() >= 3 {
                    front.push(Polygon::new(split_front, polygon.plane.clone()));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::new(split_back, polygon.plane.clone()));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }
}
