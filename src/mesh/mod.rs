//! `Mesh` triangle buffer, bounding volumes and validation checkpoints

use crate::errors::GridError;
use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingSphere},
};
use nalgebra::{Point3, Vector3};

pub mod bsp;
pub mod manifold;
pub mod repair;
pub mod transform;

pub use transform::Axis;

/// A triangle mesh.
///
/// Without `indices` the positions form a flat triangle soup (three points per
/// triangle). With `indices` each entry references three positions. `normals`
/// and `uvs`, when present, are per-vertex and parallel to `positions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<Real>>,
    pub indices: Option<Vec<[usize; 3]>>,
    pub normals: Option<Vec<Vector3<Real>>>,
    pub uvs: Option<Vec<[Real; 2]>>,
}

impl Mesh {
    /// An empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a triangle soup from explicit corner triples.
    pub fn from_triangles(triangles: impl IntoIterator<Item = [Point3<Real>; 3]>) -> Self {
        Mesh {
            positions: triangles.into_iter().flatten().collect(),
            ..Default::default()
        }
    }

    /// Build an indexed mesh from shared positions and triangle indices.
    pub fn from_indexed(positions: Vec<Point3<Real>>, indices: Vec<[usize; 3]>) -> Self {
        Mesh {
            positions,
            indices: Some(indices),
            ..Default::default()
        }
    }

    /// Closed axis-aligned box with outward-facing counter-clockwise triangles.
    ///
    /// Used as the cutter for every boolean cut in the pipeline.
    pub fn cuboid(mins: Point3<Real>, maxs: Point3<Real>) -> Self {
        let corner = |i: usize| {
            Point3::new(
                if i & 1 == 0 { mins.x } else { maxs.x },
                if i & 2 == 0 { mins.y } else { maxs.y },
                if i & 4 == 0 { mins.z } else { maxs.z },
            )
        };
        let positions = (0..8).map(corner).collect();

        // Each face as a quad wound counter-clockwise seen from outside.
        let faces: [[usize; 4]; 6] = [
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
        ];
        let indices = faces
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();

        Mesh::from_indexed(positions, indices)
    }

    /// Concatenate meshes into one indexed buffer without merging anything.
    ///
    /// Per-vertex attributes are dropped since the pieces rarely agree on them;
    /// repair recomputes normals afterwards.
    pub fn concat(meshes: impl IntoIterator<Item = Mesh>) -> Mesh {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for mesh in meshes {
            let offset = positions.len();
            indices.extend(
                mesh.triangle_indices()
                    .into_iter()
                    .map(|tri| tri.map(|i| i + offset)),
            );
            positions.extend(mesh.positions);
        }
        Mesh::from_indexed(positions, indices)
    }

    pub const fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len() / 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Vertex indices of every triangle, synthesised for soups.
    pub fn triangle_indices(&self) -> Vec<[usize; 3]> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.positions.len() / 3)
                .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
                .collect(),
        }
    }

    /// Corner positions of every triangle, in winding order.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
        let count = self.triangle_count();
        (0..count).map(move |t| match &self.indices {
            Some(indices) => indices[t].map(|i| self.positions[i]),
            None => [
                self.positions[3 * t],
                self.positions[3 * t + 1],
                self.positions[3 * t + 2],
            ],
        })
    }

    /// Convert a soup to indexed form with one index per position.
    ///
    /// No positions are merged; welding is a separate repair step.
    pub fn into_indexed(mut self) -> Mesh {
        if self.indices.is_none() {
            let count = self.positions.len() / 3;
            self.positions.truncate(count * 3);
            if let Some(normals) = self.normals.as_mut() {
                normals.truncate(count * 3);
            }
            if let Some(uvs) = self.uvs.as_mut() {
                uvs.truncate(count * 3);
            }
            self.indices = Some(self.triangle_indices());
        }
        self
    }

    /// Axis-aligned bounds of all positions.
    ///
    /// Recomputed on every call; nothing is cached across transforms.
    pub fn bounding_box(&self) -> Result<Aabb, GridError> {
        let mut points = self.positions.iter();
        let first = points.next().ok_or_else(|| {
            GridError::DegenerateGeometry("cannot bound a mesh with no vertices".into())
        })?;

        let (mins, maxs) = points.fold((*first, *first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
        Ok(Aabb::new(mins, maxs))
    }

    /// Bounding sphere enclosing the bounding box.
    pub fn bounding_sphere(&self) -> Result<BoundingSphere, GridError> {
        Ok(self.bounding_box()?.bounding_sphere())
    }

    /// Extent along each axis.
    pub fn size(&self) -> Result<Vector3<Real>, GridError> {
        Ok(self.bounding_box()?.extents())
    }

    /// Validation checkpoint run after every stage that produces geometry.
    ///
    /// Rejects empty buffers, soups whose length is not a multiple of three,
    /// out-of-range indices, non-finite coordinates and a non-finite bounding sphere.
    pub fn validate(&self, checkpoint: &str) -> Result<(), GridError> {
        if self.positions.is_empty() {
            return Err(GridError::validation(checkpoint, "mesh has no vertices"));
        }

        match &self.indices {
            Some(indices) => {
                let count = self.positions.len();
                if let Some(tri) = indices.iter().find(|tri| tri.iter().any(|&i| i >= count)) {
                    return Err(GridError::validation(
                        checkpoint,
                        format!("triangle {tri:?} indexes past {count} vertices"),
                    ));
                }
            },
            None if self.positions.len() % 3 != 0 => {
                return Err(GridError::validation(
                    checkpoint,
                    format!("triangle soup of {} points is not a multiple of 3", self.positions.len()),
                ));
            },
            None => {},
        }

        if let Some(p) = self.positions.iter().find(|p| p.iter().any(|c| !c.is_finite())) {
            return Err(GridError::validation(checkpoint, format!("non-finite vertex {p}")));
        }

        let sphere = self.bounding_sphere()?;
        if !sphere.radius().is_finite() || sphere.center().iter().any(|c| !c.is_finite()) {
            return Err(GridError::validation(checkpoint, "bounding sphere is not finite"));
        }

        log::trace!(
            "`{checkpoint}` ok: {} vertices, {} triangles",
            self.vertex_count(),
            self.triangle_count()
        );
        Ok(())
    }

    /// Recompute per-vertex normals.
    ///
    /// Indexed meshes accumulate area-weighted face normals on shared
    /// vertices; soups give each corner its own face normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.positions.len()];
        for tri in self.triangle_indices() {
            let [a, b, c] = tri.map(|i| self.positions[i]);
            // Unnormalised cross product weights by twice the triangle area.
            let face = (b - a).cross(&(c - a));
            for i in tri {
                normals[i] += face;
            }
        }
        for n in &mut normals {
            *n = n.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::z);
        }
        self.normals = Some(normals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_point_outward() {
        let block = Mesh::cuboid(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        let center = Point3::origin();
        for [a, b, c] in block.triangles() {
            let normal = (b - a).cross(&(c - a));
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            assert!(normal.dot(&(centroid - center)) > 0.0);
        }
        assert_eq!(block.triangle_count(), 12);
    }

    #[test]
    fn concat_offsets_indices() {
        let a = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = a.clone();
        let merged = Mesh::concat([a, b]);
        assert_eq!(merged.vertex_count(), 16);
        assert_eq!(merged.triangle_count(), 24);
        assert!(merged.triangle_indices()[12..].iter().flatten().all(|&i| i >= 8));
    }

    #[test]
    fn validate_rejects_nan() {
        let mut mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.positions[3].y = Real::NAN;
        assert!(matches!(
            mesh.validate("nan"),
            Err(GridError::MeshValidation { .. })
        ));
    }

    #[test]
    fn empty_mesh_has_no_bounding_box() {
        assert!(matches!(
            Mesh::new().bounding_box(),
            Err(GridError::DegenerateGeometry(_))
        ));
    }
}
