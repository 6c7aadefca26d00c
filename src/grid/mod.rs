//! Grid-of-cells model: extraction, decomposition and reassembly

use crate::errors::GridError;
use crate::float_types::Real;
use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;

pub mod assemble;
pub mod decompose;
pub mod extract;
pub mod subpart;

pub use assemble::{Anchor, PieceCounts, Placement, Role, merge, plan, reassemble};
pub use decompose::{cutter_bounds, decompose};
pub use extract::{CellResult, extract_cell, sanity_recut};
pub use subpart::{Band, Subpart, SubpartSet};

/// Number of cells along X and along Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub x: usize,
    pub y: usize,
}

impl GridSize {
    pub const fn new(x: usize, y: usize) -> Self {
        GridSize { x, y }
    }

    pub const fn cells(&self) -> usize {
        self.x * self.y
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Parses `NxM` (N along X, M along Y), both at least 1.
impl FromStr for GridSize {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GridError::InvalidGridSize {
            x: 0,
            y: 0,
            reason: "expected NxM with positive integers, e.g. 4x2",
        };

        let (x, y) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(malformed)?;
        let x: usize = x.trim().parse().map_err(|_| malformed())?;
        let y: usize = y.trim().parse().map_err(|_| malformed())?;

        if x == 0 || y == 0 {
            return Err(GridError::InvalidGridSize {
                x,
                y,
                reason: "grid dimensions must be at least 1",
            });
        }
        Ok(GridSize { x, y })
    }
}

/// Everything the reassembler needs to lay out the target container.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    /// Target cell counts.
    pub grid: GridSize,
    /// Nominal size of one cell along X, Y and Z.
    pub cell_size: Vector3<Real>,
    /// Total height of the output container.
    pub height: Real,
    pub corner_radius: Real,
    /// Accepted for compatibility; dividers are not generated.
    pub divider_thickness: Option<Real>,
    /// Fuse pieces with boolean unions instead of concatenation plus welding.
    pub union_all: bool,
}

impl GridSpec {
    pub fn new(grid: GridSize, cell: &CellResult, height: Real, corner_radius: Real) -> Self {
        let spec = GridSpec {
            grid,
            cell_size: Vector3::new(cell.size_x, cell.size_y, cell.size_z),
            height,
            corner_radius,
            divider_thickness: None,
            union_all: false,
        };
        spec.warn_on_unsupported_radius();
        spec
    }

    /// Outer extent of the assembled container.
    pub fn container_size(&self) -> Vector3<Real> {
        Vector3::new(
            self.grid.x as Real * self.cell_size.x,
            self.grid.y as Real * self.cell_size.y,
            self.height,
        )
    }

    /// The radius must leave a non-empty middle band on every axis; this is
    /// the caller's responsibility and is only reported here.
    fn warn_on_unsupported_radius(&self) {
        let r = self.corner_radius;
        let limit = self
            .cell_size
            .x
            .min(self.cell_size.y)
            .min(self.cell_size.z)
            .min(self.height)
            / 2.0;
        if r >= limit {
            log::warn!(
                "corner radius {r} is not below half the smallest cell or height dimension ({limit}); pieces will overlap or invert"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grid_strings() {
        assert_eq!("4x2".parse::<GridSize>().unwrap(), GridSize::new(4, 2));
        assert_eq!(" 3X7 ".parse::<GridSize>().unwrap(), GridSize::new(3, 7));
        assert_eq!(GridSize::new(2, 6).to_string(), "2x6");
    }

    #[test]
    fn rejects_malformed_grid_strings() {
        for bad in ["", "4", "4x", "x2", "0x3", "2x0", "-1x2", "2*2", "axb"] {
            assert!(
                matches!(bad.parse::<GridSize>(), Err(GridError::InvalidGridSize { .. })),
                "{bad:?} should not parse"
            );
        }
    }
}
