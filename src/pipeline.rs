//! End-to-end driver: STL in, re-tiled STL out.

use crate::debug::{ArtifactSink, NullSink};
use crate::errors::GridError;
use crate::float_types::Real;
use crate::grid::{self, GridSize, GridSpec};
use crate::mesh::Mesh;
use crate::mesh::bsp::BspEngine;
use crate::mesh::repair::{RepairParams, repair};
use crate::traits::BooleanEngine;

/// Options for one re-tiling run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Cell layout of the input model, at least 2x2.
    pub input_grid: GridSize,
    pub corner_radius: Real,
    /// Height of the output container.
    pub height: Real,
    pub output_grid: GridSize,
    /// Uniformly rescale the cell (and corner radius) so its X size equals this.
    pub output_grid_size: Option<Real>,
    /// Accepted but has no geometric effect; dividers are not generated.
    pub divider_thickness: Option<Real>,
    pub union_all: bool,
    /// Hand intermediate meshes to the artifact sink.
    pub debug: bool,
    /// Re-cut the input by its own bounds before extracting.
    pub sanity_recut: bool,
    pub repair: RepairParams,
}

impl GenerateOptions {
    pub fn new(input_grid: GridSize, corner_radius: Real, height: Real, output_grid: GridSize) -> Self {
        GenerateOptions {
            input_grid,
            corner_radius,
            height,
            output_grid,
            output_grid_size: None,
            divider_thickness: None,
            union_all: false,
            debug: false,
            sanity_recut: false,
            repair: RepairParams::default(),
        }
    }

    #[must_use]
    pub const fn with_output_grid_size(mut self, size: Option<Real>) -> Self {
        self.output_grid_size = size;
        self
    }

    #[must_use]
    pub const fn with_divider_thickness(mut self, thickness: Option<Real>) -> Self {
        self.divider_thickness = thickness;
        self
    }

    #[must_use]
    pub const fn with_union_all(mut self, union_all: bool) -> Self {
        self.union_all = union_all;
        self
    }

    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn with_sanity_recut(mut self, sanity_recut: bool) -> Self {
        self.sanity_recut = sanity_recut;
        self
    }

    #[must_use]
    pub fn with_repair(mut self, repair: RepairParams) -> Self {
        self.repair = repair;
        self
    }

    /// Reject unusable options before any geometry is touched.
    pub fn validate(&self) -> Result<(), GridError> {
        let GridSize { x, y } = self.input_grid;
        if x < 2 || y < 2 {
            return Err(GridError::InvalidGridSize {
                x,
                y,
                reason: "the input must contain at least 2x2 cells",
            });
        }
        let GridSize { x, y } = self.output_grid;
        if x == 0 || y == 0 {
            return Err(GridError::InvalidGridSize {
                x,
                y,
                reason: "output grid dimensions must be at least 1",
            });
        }

        let positive = [
            ("corner_radius", Some(self.corner_radius)),
            ("height", Some(self.height)),
            ("output_grid_size", self.output_grid_size),
            ("divider_thickness", self.divider_thickness),
        ];
        for (name, value) in positive {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    return Err(GridError::InvalidParameter {
                        name,
                        value: value as f64,
                        reason: "must be positive",
                    });
                }
            }
        }
        Ok(())
    }
}

/// Re-tile STL `input` with the bundled [`BspEngine`]; returns binary STL bytes.
#[cfg(feature = "stl-io")]
pub fn generate(input: &[u8], options: &GenerateOptions) -> Result<Vec<u8>, GridError> {
    generate_with(input, options, &BspEngine::new(), &mut NullSink)
}

/// Re-tile STL `input` with a caller-chosen engine and artifact sink.
#[cfg(feature = "stl-io")]
pub fn generate_with(
    input: &[u8],
    options: &GenerateOptions,
    engine: &dyn BooleanEngine,
    sink: &mut dyn ArtifactSink,
) -> Result<Vec<u8>, GridError> {
    options.validate()?;
    let solid = Mesh::from_stl(input)?;
    let mesh = generate_mesh(&solid, options, engine, sink)?;
    Ok(mesh.to_stl_binary("bingrid")?)
}

/// Run the geometric pipeline on an in-memory solid.
///
/// Extract a cell, optionally rescale it, decompose, reassemble, merge,
/// repair, then log the non-manifold edge diagnostic.
pub fn generate_mesh(
    solid: &Mesh,
    options: &GenerateOptions,
    engine: &dyn BooleanEngine,
    sink: &mut dyn ArtifactSink,
) -> Result<Mesh, GridError> {
    options.validate()?;
    solid.validate("input")?;
    if options.debug {
        sink.emit("input", solid)?;
    }

    if options.sanity_recut {
        let recut = grid::sanity_recut(solid, engine)?;
        if options.debug {
            sink.emit("sanity-recut", &recut)?;
        }
    }

    let mut cell = grid::extract_cell(solid, options.input_grid, engine)?;
    let mut corner_radius = options.corner_radius;
    if let Some(target) = options.output_grid_size {
        let factor = target / cell.size_x;
        log::info!("rescaling cell by {factor:.4} to a {target} grid pitch");
        cell = cell.scaled(factor)?;
        corner_radius *= factor;
    }
    if options.debug {
        sink.emit("cell", &cell.mesh)?;
    }

    let subparts = grid::decompose(&cell, corner_radius, engine)?;
    if options.debug {
        for (part, mesh) in subparts.iter() {
            sink.emit(part.name(), mesh)?;
        }
    }

    let mut spec = GridSpec::new(options.output_grid, &cell, options.height, corner_radius);
    spec.divider_thickness = options.divider_thickness;
    spec.union_all = options.union_all;
    if let Some(thickness) = spec.divider_thickness {
        log::info!("divider thickness {thickness} ignored: dividers are not generated");
    }
    drop(cell);

    let pieces = grid::reassemble(&subparts, &spec)?;
    let merged = grid::merge(pieces, spec.union_all, engine, options.repair.weld_tolerance)?;
    if options.debug {
        sink.emit("assembled", &merged)?;
    }

    let (repaired, report) = repair(merged, &options.repair)?;
    repaired.validate("repair")?;
    log::info!(
        "repair: {} passes, {} welded, {} degenerate and {} duplicate triangles removed",
        report.iterations,
        report.vertices_welded,
        report.degenerates_removed,
        report.duplicates_removed
    );

    let edges = repaired.edge_report();
    if edges.non_manifold_edges > 0 {
        log::warn!(
            "{} of {} edges are shared by more than two triangles",
            edges.non_manifold_edges,
            edges.edge_count
        );
    } else {
        log::info!(
            "{} edges, none non-manifold ({} open)",
            edges.edge_count,
            edges.boundary_edges
        );
    }
    if options.debug {
        sink.emit("repaired", &repaired)?;
    }

    Ok(repaired)
}

/// Run [`generate`] on the blocking pool so an async host is not stalled.
#[cfg(all(feature = "async", feature = "stl-io"))]
pub async fn generate_async(input: Vec<u8>, options: GenerateOptions) -> Result<Vec<u8>, GridError> {
    tokio::task::spawn_blocking(move || generate(&input, &options))
        .await
        .map_err(|e| GridError::Join(e.to_string()))?
}
