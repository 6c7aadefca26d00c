//! Cut one representative cell out of a multi-cell container.

use crate::errors::GridError;
use crate::float_types::{OVERLAP, Real};
use crate::grid::GridSize;
use crate::mesh::Mesh;
use crate::traits::BooleanEngine;
use nalgebra::{Point3, Vector3};

/// A single cell cut from the input, normalised to the origin.
///
/// The sizes are the cell's nominal footprint, not the bounds of `mesh`:
/// the cut reaches [`OVERLAP`] past the footprint toward the neighbouring cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CellResult {
    pub mesh: Mesh,
    pub size_x: Real,
    pub size_y: Real,
    pub size_z: Real,
}

impl CellResult {
    pub fn size(&self) -> Vector3<Real> {
        Vector3::new(self.size_x, self.size_y, self.size_z)
    }

    /// Multiply geometry and nominal sizes by `factor` about the origin.
    pub fn scaled(self, factor: Real) -> Result<CellResult, GridError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(GridError::InvalidParameter {
                name: "scale factor",
                value: factor as f64,
                reason: "must be positive and finite",
            });
        }
        Ok(CellResult {
            mesh: self.mesh.scale(factor, factor, factor)?,
            size_x: self.size_x * factor,
            size_y: self.size_y * factor,
            size_z: self.size_z * factor,
        })
    }
}

/// Extract the near-left cell of a solid laid out as `grid.x` by `grid.y` cells.
///
/// Both counts must be at least 2 so the extracted cell has a genuine seam on
/// its far sides; the check happens before any geometry is touched.
pub fn extract_cell(
    solid: &Mesh,
    grid: GridSize,
    engine: &dyn BooleanEngine,
) -> Result<CellResult, GridError> {
    if grid.x < 2 || grid.y < 2 {
        return Err(GridError::InvalidGridSize {
            x: grid.x,
            y: grid.y,
            reason: "the input must contain at least 2x2 cells",
        });
    }

    let bb = solid.bounding_box()?;
    let size = bb.extents();
    let cell_x = size.x / grid.x as Real;
    let cell_y = size.y / grid.y as Real;
    if !(cell_x > 0.0 && cell_y > 0.0 && size.z > 0.0) {
        return Err(GridError::DegenerateGeometry(format!(
            "input extent {size:?} has no volume"
        )));
    }

    let pad = Vector3::repeat(OVERLAP);
    let cutter = Mesh::cuboid(
        bb.mins - pad,
        Point3::new(bb.mins.x + cell_x, bb.mins.y + cell_y, bb.maxs.z) + pad,
    );

    let mesh = engine.intersection(solid, &cutter)?.normalize_to_origin()?;
    mesh.validate("cell extraction")?;

    log::info!(
        "extracted {cell_x:.3} x {cell_y:.3} x {:.3} cell ({} triangles) from a {grid} grid",
        size.z,
        mesh.triangle_count()
    );

    Ok(CellResult {
        mesh,
        size_x: cell_x,
        size_y: cell_y,
        size_z: size.z,
    })
}

/// Re-cut `solid` by its own padded bounding box.
///
/// The result should match the input's bounds; it exercises the boolean
/// engine on the input before any real cut depends on it.
pub fn sanity_recut(solid: &Mesh, engine: &dyn BooleanEngine) -> Result<Mesh, GridError> {
    let bb = solid.bounding_box()?;
    let pad = Vector3::repeat(OVERLAP);
    let cutter = Mesh::cuboid(bb.mins - pad, bb.maxs + pad);

    let recut = engine.intersection(solid, &cutter)?;
    recut.validate("sanity recut")?;

    let drift = (recut.bounding_box()?.extents() - bb.extents()).amax();
    if drift > OVERLAP {
        log::warn!("sanity recut changed the input extent by {drift}");
    } else {
        log::debug!("sanity recut ok, extent drift {drift}");
    }
    Ok(recut)
}
