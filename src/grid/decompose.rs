//! Split a cell into its twelve regions.

use crate::errors::GridError;
use crate::float_types::{OUTER_PAD, OVERLAP, Real, parry3d::bounding_volume::Aabb};
use crate::grid::{CellResult, Subpart, SubpartSet, subpart::Band};
use crate::mesh::Mesh;
use crate::traits::BooleanEngine;
use nalgebra::{Point3, Vector3};

/// Cutter box for `part` over geometry bounded by `bb` with nominal cell `size`.
///
/// Band limits are measured from `bb.mins`. Limits inside the cell reach
/// [`OVERLAP`] into the neighbouring band; limits on the cell boundary are
/// pushed [`OUTER_PAD`] past the geometry so no cutter face lies on a model face.
pub fn cutter_bounds(part: Subpart, bb: &Aabb, size: &Vector3<Real>, radius: Real) -> Aabb {
    let mut mins = Point3::origin();
    let mut maxs = Point3::origin();

    for (axis, band) in part.region().into_iter().enumerate() {
        let (lo, hi) = band.span(size[axis], radius);
        let origin = bb.mins[axis];
        mins[axis] = match band {
            Band::Low => bb.mins[axis] - OUTER_PAD,
            Band::Middle | Band::High => origin + lo - OVERLAP,
        };
        maxs[axis] = match band {
            Band::High => bb.maxs[axis] + OUTER_PAD,
            Band::Low | Band::Middle => origin + hi + OVERLAP,
        };
    }

    Aabb::new(mins, maxs)
}

/// Cut `cell` into all twelve [`Subpart`]s.
///
/// Every region is intersected with the cell independently, normalised to
/// its own origin and validated. A region that comes back empty fails the
/// whole decomposition.
pub fn decompose(
    cell: &CellResult,
    corner_radius: Real,
    engine: &dyn BooleanEngine,
) -> Result<SubpartSet, GridError> {
    if !(corner_radius.is_finite() && corner_radius > 0.0) {
        return Err(GridError::InvalidParameter {
            name: "corner_radius",
            value: corner_radius as f64,
            reason: "must be positive",
        });
    }

    let bb = cell.mesh.bounding_box()?;
    let size = cell.size();

    let parts = Subpart::ALL
        .iter()
        .map(|&part| {
            let cutter = cutter_bounds(part, &bb, &size, corner_radius);
            let piece = engine
                .intersection(&cell.mesh, &Mesh::cuboid(cutter.mins, cutter.maxs))?
                .normalize_to_origin()?;
            piece.validate(part.name())?;

            log::debug!(
                "{}: {} triangles, extent {:?}",
                part.name(),
                piece.triangle_count(),
                piece.size()?.as_slice()
            );
            Ok((part, piece))
        })
        .collect::<Result<Vec<_>, GridError>>()?;

    SubpartSet::from_parts(parts)
}
