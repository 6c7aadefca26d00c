//! Lay the twelve cell regions out over a larger grid.
//!
//! [`plan`] is a pure function from the target grid to a list of
//! [`Placement`]s; [`reassemble`] applies them to copies of the cut
//! regions; [`merge`] stitches the result into one mesh.

use crate::errors::GridError;
use crate::float_types::{OVERLAP, Real};
use crate::grid::{GridSize, GridSpec, Subpart, SubpartSet};
use crate::mesh::{Axis, Mesh, repair::weld_vertices};
use crate::traits::BooleanEngine;
use nalgebra::Vector3;

/// Where a placed piece lands along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// The piece's minimum coordinate lands on the value.
    Min(Real),
    /// The piece's maximum coordinate lands on the value.
    Max(Real),
}

/// What a placement contributes to the container, used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Bottom corner, vertical edge and top corner at each outer corner.
    OuterCorner,
    /// Wall-bottom run along the middle of a cell on the outer boundary.
    BoundaryEdge,
    /// Pair of wall-bottom pieces either side of a seam on the outer boundary.
    BoundarySeam,
    Floor,
    /// Floor strip either side of a seam between cells.
    InteriorSeam,
    /// Floor piece around the meeting point of four cells.
    Junction,
    /// Stretched wall panels and top edges.
    Wall,
}

/// One piece of the output: which region, how it is transformed, where it goes.
///
/// Applied in the order mirror, rotate, scale, translate.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub part: Subpart,
    pub role: Role,
    pub mirror: Option<Axis>,
    /// Counter-clockwise quarter turns about +Z.
    pub quarter_turns: i32,
    pub scale: Vector3<Real>,
    pub anchor: [Anchor; 3],
}

impl Placement {
    pub fn new(part: Subpart, role: Role, anchor: [Anchor; 3]) -> Self {
        Placement {
            part,
            role,
            mirror: None,
            quarter_turns: 0,
            scale: Vector3::repeat(1.0),
            anchor,
        }
    }

    #[must_use]
    pub const fn mirrored(mut self, axis: Axis) -> Self {
        self.mirror = Some(axis);
        self
    }

    #[must_use]
    pub const fn turned(mut self, quarter_turns: i32) -> Self {
        self.quarter_turns = quarter_turns;
        self
    }

    #[must_use]
    pub fn stretched(mut self, axis: Axis, factor: Real) -> Self {
        self.scale[axis.index()] = factor;
        self
    }

    /// Transform `piece` (already at its own origin) into position.
    pub fn apply(&self, piece: Mesh) -> Result<Mesh, GridError> {
        let mut mesh = piece;
        if let Some(axis) = self.mirror {
            mesh = mesh.mirror(axis)?;
        }
        let mesh = mesh
            .quarter_turns(self.quarter_turns)?
            .scale(self.scale.x, self.scale.y, self.scale.z)?;

        let size = mesh.size()?;
        let offset = Vector3::from_fn(|axis, _| match self.anchor[axis] {
            Anchor::Min(v) => v,
            Anchor::Max(v) => v - size[axis],
        });
        Ok(mesh.translate_vector(offset))
    }
}

/// How many placements of each role a grid needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PieceCounts {
    pub outer_corners: usize,
    pub boundary_edges: usize,
    pub boundary_seams: usize,
    pub floors: usize,
    pub interior_seams: usize,
    pub junctions: usize,
    pub walls: usize,
}

impl PieceCounts {
    /// Expected counts for `grid`, all zero if either dimension is zero.
    pub const fn for_grid(grid: GridSize) -> Self {
        let (x, y) = (grid.x, grid.y);
        if x == 0 || y == 0 {
            return PieceCounts {
                outer_corners: 0,
                boundary_edges: 0,
                boundary_seams: 0,
                floors: 0,
                interior_seams: 0,
                junctions: 0,
                walls: 0,
            };
        }
        PieceCounts {
            outer_corners: 12,
            boundary_edges: 2 * x + 2 * y,
            boundary_seams: 4 * (x - 1) + 4 * (y - 1),
            floors: grid.cells(),
            interior_seams: 2 * (x - 1) * y + 2 * x * (y - 1),
            junctions: 4 * (x - 1) * (y - 1),
            walls: 8,
        }
    }

    /// Tally a plan by role.
    pub fn of_plan(plan: &[Placement]) -> Self {
        let mut counts = PieceCounts::default();
        for placement in plan {
            let slot = match placement.role {
                Role::OuterCorner => &mut counts.outer_corners,
                Role::BoundaryEdge => &mut counts.boundary_edges,
                Role::BoundarySeam => &mut counts.boundary_seams,
                Role::Floor => &mut counts.floors,
                Role::InteriorSeam => &mut counts.interior_seams,
                Role::Junction => &mut counts.junctions,
                Role::Wall => &mut counts.walls,
            };
            *slot += 1;
        }
        counts
    }

    pub const fn total(&self) -> usize {
        self.outer_corners
            + self.boundary_edges
            + self.boundary_seams
            + self.floors
            + self.interior_seams
            + self.junctions
            + self.walls
    }
}

/// Stretch factor taking a middle-band piece cut over `piece` to span `target`.
///
/// Middle cuts reach [`OVERLAP`] past both ends of their band, so the factor
/// maps the padded lengths onto each other and the placed piece still
/// overhangs its span by exactly [`OVERLAP`] at each end.
fn stretch(target: Real, piece: Real) -> Real {
    (target + 2.0 * OVERLAP) / (piece + 2.0 * OVERLAP)
}

/// Placement table for `spec`.
///
/// Middle and seam pieces, including the vertical corner edge, are anchored
/// at the position their cut started, [`OVERLAP`] before the nominal band, so
/// neighbours overlap instead of sharing a face.
///
/// The top inner corner is cut but never placed: the stretched top edges
/// run across every seam.
pub fn plan(spec: &GridSpec) -> Vec<Placement> {
    use Anchor::{Max, Min};
    use Role::*;
    use Subpart::*;

    let GridSize { x: nx, y: ny } = spec.grid;
    if nx == 0 || ny == 0 {
        return Vec::new();
    }

    let r = spec.corner_radius;
    let cell = spec.cell_size;
    let outer = spec.container_size();
    let mid = cell.map(|s| s - 2.0 * r);

    // Stretch factors. Wall pieces are cut from the near wall, so their
    // length is always the cell's middle X span.
    let wall_height = stretch(outer.z - 2.0 * r, mid.z);
    let wall_along_x = stretch(outer.x - 2.0 * r, mid.x);
    let wall_along_y = stretch(outer.y - 2.0 * r, mid.x);
    let row_edge = stretch(mid.y, mid.x);
    let seam_strip = stretch(mid.x, mid.y);

    let inset = r - OVERLAP;
    let mut out = Vec::with_capacity(PieceCounts::for_grid(spec.grid).total());

    // Outer corners: near-left, near-right, far-right, far-left.
    let corners = [
        (Min(0.0), Min(0.0)),
        (Max(outer.x), Min(0.0)),
        (Max(outer.x), Max(outer.y)),
        (Min(0.0), Max(outer.y)),
    ];
    for (turns, (ax, ay)) in (0..).zip(corners) {
        out.push(Placement::new(BottomOuterCorner, OuterCorner, [ax, ay, Min(0.0)]).turned(turns));
        out.push(
            Placement::new(CornerEdge, OuterCorner, [ax, ay, Min(inset)])
                .turned(turns)
                .stretched(Axis::Z, wall_height),
        );
        out.push(Placement::new(TopOuterCorner, OuterCorner, [ax, ay, Max(outer.z)]).turned(turns));
    }

    // Near (y = 0) and far (y = Y) boundaries, one column at a time.
    for col in 0..nx {
        let x0 = col as Real * cell.x;
        out.push(Placement::new(SideBottomEdge, BoundaryEdge, [Min(x0 + inset), Min(0.0), Min(0.0)]));
        out.push(
            Placement::new(SideBottomEdge, BoundaryEdge, [Min(x0 + inset), Max(outer.y), Min(0.0)])
                .turned(2),
        );
        if col > 0 {
            let left = Min(x0 - r - OVERLAP);
            let right = Min(x0 - OVERLAP);
            out.push(Placement::new(BottomInnerCornerRight, BoundarySeam, [left, Min(0.0), Min(0.0)]));
            out.push(
                Placement::new(BottomInnerCornerRight, BoundarySeam, [right, Min(0.0), Min(0.0)])
                    .mirrored(Axis::X),
            );
            out.push(
                Placement::new(BottomInnerCornerRight, BoundarySeam, [right, Max(outer.y), Min(0.0)])
                    .turned(2),
            );
            out.push(
                Placement::new(BottomInnerCornerRight, BoundarySeam, [left, Max(outer.y), Min(0.0)])
                    .mirrored(Axis::X)
                    .turned(2),
            );
        }
    }

    // Left (x = 0) and right (x = X) boundaries, one row at a time.
    for row in 0..ny {
        let y0 = row as Real * cell.y;
        out.push(
            Placement::new(SideBottomEdge, BoundaryEdge, [Min(0.0), Min(y0 + inset), Min(0.0)])
                .turned(-1)
                .stretched(Axis::Y, row_edge),
        );
        out.push(
            Placement::new(SideBottomEdge, BoundaryEdge, [Max(outer.x), Min(y0 + inset), Min(0.0)])
                .turned(1)
                .stretched(Axis::Y, row_edge),
        );
        if row > 0 {
            let below = Min(y0 - r - OVERLAP);
            let above = Min(y0 - OVERLAP);
            out.push(Placement::new(BottomInnerCornerLeft, BoundarySeam, [Min(0.0), below, Min(0.0)]));
            out.push(
                Placement::new(BottomInnerCornerLeft, BoundarySeam, [Min(0.0), above, Min(0.0)])
                    .mirrored(Axis::Y),
            );
            out.push(
                Placement::new(BottomInnerCornerLeft, BoundarySeam, [Max(outer.x), above, Min(0.0)])
                    .turned(2),
            );
            out.push(
                Placement::new(BottomInnerCornerLeft, BoundarySeam, [Max(outer.x), below, Min(0.0)])
                    .mirrored(Axis::Y)
                    .turned(2),
            );
        }
    }

    // Interior: floors, seam strips and four-cell junctions.
    for yi in 0..ny {
        for xi in 0..nx {
            let x0 = xi as Real * cell.x;
            let y0 = yi as Real * cell.y;
            out.push(Placement::new(FloorPanel, Floor, [Min(x0 + inset), Min(y0 + inset), Min(0.0)]));

            if yi > 0 {
                out.push(
                    Placement::new(BottomEdge, InteriorSeam, [Min(x0 + inset), Min(y0 - r - OVERLAP), Min(0.0)])
                        .turned(1)
                        .stretched(Axis::X, seam_strip),
                );
                out.push(
                    Placement::new(BottomEdge, InteriorSeam, [Min(x0 + inset), Min(y0 - OVERLAP), Min(0.0)])
                        .turned(-1)
                        .stretched(Axis::X, seam_strip),
                );
            }
            if xi > 0 {
                out.push(Placement::new(
                    BottomEdge,
                    InteriorSeam,
                    [Min(x0 - r - OVERLAP), Min(y0 + inset), Min(0.0)],
                ));
                out.push(
                    Placement::new(BottomEdge, InteriorSeam, [Min(x0 - OVERLAP), Min(y0 + inset), Min(0.0)])
                        .mirrored(Axis::X),
                );
            }
            if xi > 0 && yi > 0 {
                let (left, right) = (Min(x0 - r - OVERLAP), Min(x0 - OVERLAP));
                let (below, above) = (Min(y0 - r - OVERLAP), Min(y0 - OVERLAP));
                let quadrants = [(left, below), (right, below), (right, above), (left, above)];
                for (turns, (ax, ay)) in (0..).zip(quadrants) {
                    out.push(Placement::new(BottomCenterCorner, Junction, [ax, ay, Min(0.0)]).turned(turns));
                }
            }
        }
    }

    // Walls and top edges, stretched over the whole container side.
    let z_wall = Min(inset);
    let sides = [
        (0, Min(inset), Min(0.0), Axis::X, wall_along_x),
        (2, Min(inset), Max(outer.y), Axis::X, wall_along_x),
        (-1, Min(0.0), Min(inset), Axis::Y, wall_along_y),
        (1, Max(outer.x), Min(inset), Axis::Y, wall_along_y),
    ];
    for (turns, ax, ay, along, factor) in sides {
        out.push(
            Placement::new(SideWallPanel, Wall, [ax, ay, z_wall])
                .turned(turns)
                .stretched(along, factor)
                .stretched(Axis::Z, wall_height),
        );
        out.push(
            Placement::new(SideTopEdge, Wall, [ax, ay, Max(outer.z)])
                .turned(turns)
                .stretched(along, factor),
        );
    }

    out
}

/// Place transformed copies of the subparts according to [`plan`].
///
/// Returns the pieces unstitched and in plan order.
pub fn reassemble(subparts: &SubpartSet, spec: &GridSpec) -> Result<Vec<Mesh>, GridError> {
    let r = spec.corner_radius;
    let spans = [
        ("cell_size.x", spec.cell_size.x),
        ("cell_size.y", spec.cell_size.y),
        ("cell_size.z", spec.cell_size.z),
        ("height", spec.height),
    ];
    for (name, span) in spans {
        if !(span - 2.0 * r > 0.0) {
            return Err(GridError::InvalidParameter {
                name,
                value: span as f64,
                reason: "must exceed twice the corner radius",
            });
        }
    }

    let placements = plan(spec);
    if placements.is_empty() {
        return Err(GridError::EmptyAssembly(format!(
            "{} grid has no cells",
            spec.grid
        )));
    }

    log::info!(
        "placing {} pieces for a {} grid",
        placements.len(),
        spec.grid
    );
    placements
        .iter()
        .map(|p| p.apply(subparts.get(p.part).clone()))
        .collect()
}

/// Stitch placed pieces into one mesh.
///
/// By default the pieces are concatenated and coincident vertices welded.
/// With `union_all` they are folded through [`BooleanEngine::union`], which
/// removes internal faces at a much higher cost.
pub fn merge(
    pieces: Vec<Mesh>,
    union_all: bool,
    engine: &dyn BooleanEngine,
    weld_tolerance: Real,
) -> Result<Mesh, GridError> {
    let count = pieces.len();
    let mut pieces = pieces.into_iter();
    let Some(first) = pieces.next() else {
        return Err(GridError::EmptyAssembly("nothing to merge".into()));
    };

    let merged = if union_all {
        pieces.try_fold(first, |acc, piece| engine.union(&acc, &piece))?
    } else {
        let mut mesh = Mesh::concat(std::iter::once(first).chain(pieces));
        let welded = weld_vertices(&mut mesh, weld_tolerance);
        log::debug!("welded {welded} coincident vertices");
        mesh
    };

    merged.validate("merge")?;
    log::info!(
        "merged {count} pieces into {} vertices, {} triangles{}",
        merged.vertex_count(),
        merged.triangle_count(),
        if union_all { " by union" } else { "" }
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(x: usize, y: usize) -> GridSpec {
        GridSpec {
            grid: GridSize::new(x, y),
            cell_size: Vector3::new(42.0, 42.0, 20.0),
            height: 30.0,
            corner_radius: 4.0,
            divider_thickness: None,
            union_all: false,
        }
    }

    #[test]
    fn plan_matches_expected_counts() {
        for (x, y) in [(1, 1), (1, 4), (3, 1), (2, 6), (5, 5)] {
            let plan = plan(&spec(x, y));
            let expected = PieceCounts::for_grid(GridSize::new(x, y));
            assert_eq!(PieceCounts::of_plan(&plan), expected, "{x}x{y}");
            assert_eq!(plan.len(), expected.total());
        }
    }

    #[test]
    fn plan_for_2x6_grid() {
        let counts = PieceCounts::of_plan(&plan(&spec(2, 6)));
        assert_eq!(counts.outer_corners, 12);
        assert_eq!(counts.boundary_seams, 4 * (1 + 5));
        assert_eq!(counts.junctions, 4 * 5);
        assert_eq!(counts.floors, 12);
    }

    #[test]
    fn empty_grid_has_empty_plan() {
        assert!(plan(&spec(0, 3)).is_empty());
        assert_eq!(PieceCounts::for_grid(GridSize::new(3, 0)).total(), 0);
    }

    #[test]
    fn max_anchor_aligns_far_side() {
        let piece = Mesh::cuboid(nalgebra::Point3::origin(), nalgebra::Point3::new(2.0, 3.0, 4.0));
        let placed = Placement::new(
            Subpart::BottomOuterCorner,
            Role::OuterCorner,
            [Anchor::Max(10.0), Anchor::Min(1.0), Anchor::Max(4.0)],
        )
        .turned(1)
        .apply(piece)
        .unwrap();
        let bb = placed.bounding_box().unwrap();
        assert!((bb.maxs.x - 10.0).abs() < 1e-12);
        assert!((bb.mins.x - 7.0).abs() < 1e-12);
        assert!((bb.mins.y - 1.0).abs() < 1e-12);
        assert!((bb.maxs.y - 3.0).abs() < 1e-12);
        assert!(bb.mins.z.abs() < 1e-12);
    }

    fn span(mesh: &Mesh, axis: usize) -> (Real, Real) {
        let bb = mesh.bounding_box().unwrap();
        (bb.mins[axis], bb.maxs[axis])
    }

    #[test]
    fn stretched_walls_overhang_by_the_margin() {
        let spec = spec(1, 10);
        let outer = spec.container_size();
        let r = spec.corner_radius;
        let mid = spec.cell_size.map(|s| s - 2.0 * r);
        // Near-wall panel as cut: middle band along X and Z, low band across Y.
        let panel = Mesh::cuboid(
            nalgebra::Point3::origin(),
            nalgebra::Point3::new(mid.x + 2.0 * OVERLAP, r + OVERLAP, mid.z + 2.0 * OVERLAP),
        );

        let plan = plan(&spec);
        let walls: Vec<&Placement> = plan
            .iter()
            .filter(|p| p.part == Subpart::SideWallPanel)
            .collect();
        assert_eq!(walls.len(), 4);

        for wall in walls {
            let placed = wall.apply(panel.clone()).unwrap();
            let along = if wall.quarter_turns % 2 == 0 { 0 } else { 1 };
            let (lo, hi) = span(&placed, along);
            assert!((lo - (r - OVERLAP)).abs() < 1e-9, "{lo}");
            assert!((hi - (outer[along] - r + OVERLAP)).abs() < 1e-9, "{hi}");

            let (bottom, top) = span(&placed, 2);
            assert!((bottom - (r - OVERLAP)).abs() < 1e-9);
            assert!((top - (outer.z - r + OVERLAP)).abs() < 1e-9);
        }
    }

    #[test]
    fn corner_edge_overlaps_both_corners() {
        let spec = spec(2, 2);
        let outer = spec.container_size();
        let r = spec.corner_radius;
        let mid_z = spec.cell_size.z - 2.0 * r;
        let corner = Mesh::cuboid(
            nalgebra::Point3::origin(),
            nalgebra::Point3::new(r + OVERLAP, r + OVERLAP, r + OVERLAP),
        );
        let edge = Mesh::cuboid(
            nalgebra::Point3::origin(),
            nalgebra::Point3::new(r + OVERLAP, r + OVERLAP, mid_z + 2.0 * OVERLAP),
        );

        let plan = plan(&spec);
        let placed = |part: Subpart, piece: &Mesh| {
            let placement = plan.iter().find(|p| p.part == part).unwrap();
            span(&placement.apply(piece.clone()).unwrap(), 2)
        };
        let (_, bottom_top) = placed(Subpart::BottomOuterCorner, &corner);
        let (edge_bottom, edge_top) = placed(Subpart::CornerEdge, &edge);
        let (top_bottom, _) = placed(Subpart::TopOuterCorner, &corner);

        assert!((bottom_top - edge_bottom - 2.0 * OVERLAP).abs() < 1e-9);
        assert!((edge_top - top_bottom - 2.0 * OVERLAP).abs() < 1e-9);
    }
}
