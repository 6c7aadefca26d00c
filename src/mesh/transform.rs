//! Affine operations on [`Mesh`].
//!
//! Every operation consumes the mesh and returns the transformed copy. The
//! ones that can move geometry off the origin (rotate, mirror, scale) also
//! normalise it back, so callers never chain a separate normalisation step.

use crate::errors::GridError;
use crate::float_types::{FRAC_PI_2, Real, tolerance};
use crate::mesh::Mesh;
use nalgebra::{Matrix3, Matrix4, Translation3, Vector3};

/// Coordinate axis, used to pick the mirror plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Round values that are within tolerance of -1, 0 or 1 onto them.
fn snap_unit(value: Real) -> Real {
    let eps = tolerance();
    for exact in [-1.0, 0.0, 1.0] {
        if (value - exact).abs() < eps {
            return exact;
        }
    }
    value
}

impl Mesh {
    /// Apply an affine transform to positions and normals.
    ///
    /// Normals use the inverse-transpose of the linear part; if that does not
    /// exist (a zero scale) they are dropped.
    pub fn transform(mut self, mat: &Matrix4<Real>) -> Mesh {
        for p in &mut self.positions {
            *p = mat.transform_point(p);
        }

        if let Some(normals) = self.normals.take() {
            let linear: Matrix3<Real> = mat.fixed_view::<3, 3>(0, 0).into_owned();
            self.normals = linear.try_inverse().map(|inv| {
                let normal_matrix = inv.transpose();
                normals
                    .into_iter()
                    .map(|n| {
                        let m = normal_matrix * n;
                        m.try_normalize(Real::EPSILON).unwrap_or(m)
                    })
                    .collect()
            });
        }
        self
    }

    /// Pure translation. Does not normalise; used for final placement.
    pub fn translate(self, x: Real, y: Real, z: Real) -> Mesh {
        self.translate_vector(Vector3::new(x, y, z))
    }

    pub fn translate_vector(self, vector: Vector3<Real>) -> Mesh {
        if vector == Vector3::zeros() {
            return self;
        }
        self.transform(&Translation3::from(vector).to_homogeneous())
    }

    /// Translate so the bounding-box minimum sits at the origin.
    pub fn normalize_to_origin(self) -> Result<Mesh, GridError> {
        let mins = self.bounding_box()?.mins;
        Ok(self.translate_vector(-mins.coords))
    }

    /// Rotate about +Z by `angle` radians, then normalise.
    ///
    /// Sine and cosine are snapped to exact values near multiples of 90° so
    /// quarter turns keep axis-aligned faces exactly axis-aligned.
    pub fn rotate_z(self, angle: Real) -> Result<Mesh, GridError> {
        let (s, c) = angle.sin_cos();
        let (s, c) = (snap_unit(s), snap_unit(c));
        #[rustfmt::skip]
        let mat = Matrix4::new(
            c,  -s,  0.0, 0.0,
            s,   c,  0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        self.transform(&mat).normalize_to_origin()
    }

    /// Rotate by `turns` counter-clockwise quarter turns about +Z (negative turns go clockwise).
    pub fn quarter_turns(self, turns: i32) -> Result<Mesh, GridError> {
        match turns.rem_euclid(4) {
            0 => Ok(self),
            t => self.rotate_z(t as Real * FRAC_PI_2),
        }
    }

    /// Reflect across the plane perpendicular to `axis`, then normalise.
    ///
    /// Triangle winding is reversed so faces keep pointing outward, and
    /// normals, if present, are recomputed.
    pub fn mirror(self, axis: Axis) -> Result<Mesh, GridError> {
        let mut factors = Vector3::repeat(1.0);
        factors[axis.index()] = -1.0;
        let had_normals = self.normals.is_some();

        let mut mesh = self.transform(&Matrix4::new_nonuniform_scaling(&factors));
        match mesh.indices.as_mut() {
            Some(indices) => indices.iter_mut().for_each(|tri| tri.reverse()),
            None => {
                mesh.positions.chunks_exact_mut(3).for_each(<[_]>::reverse);
                if let Some(uvs) = mesh.uvs.as_mut() {
                    uvs.chunks_exact_mut(3).for_each(<[_]>::reverse);
                }
            },
        }
        if had_normals {
            mesh.compute_vertex_normals();
        }
        mesh.normalize_to_origin()
    }

    /// Non-uniform scale about the origin, then normalise.
    pub fn scale(self, sx: Real, sy: Real, sz: Real) -> Result<Mesh, GridError> {
        if (sx, sy, sz) == (1.0, 1.0, 1.0) {
            return self.normalize_to_origin();
        }
        let mat = Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz));
        self.transform(&mat).normalize_to_origin()
    }
}
