//! The fixed taxonomy a cell is split into.

use crate::errors::GridError;
use crate::float_types::Real;
use crate::mesh::Mesh;

/// Position of a region along one axis of the cell.
///
/// With nominal size `s` and corner radius `r`: `Low` is `[0, r]`, `Middle`
/// is `[r, s - r]`, `High` is `[s - r, s]`. On X and Y `Low` is the outer wall
/// side and `High` the seam shared with the next cell; on Z `Low` is the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Low,
    Middle,
    High,
}

impl Band {
    /// Nominal interval of this band for an axis of length `size`.
    pub fn span(self, size: Real, radius: Real) -> (Real, Real) {
        match self {
            Band::Low => (0.0, radius),
            Band::Middle => (radius, size - radius),
            Band::High => (size - radius, size),
        }
    }
}

/// One of the twelve regions of a cell.
///
/// The near wall lies at `y = 0`, the left wall at `x = 0`, and the cell
/// shares seams with its neighbours at `x = size_x` and `y = size_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subpart {
    BottomOuterCorner,
    TopOuterCorner,
    BottomInnerCornerRight,
    BottomInnerCornerLeft,
    TopInnerCorner,
    BottomCenterCorner,
    SideTopEdge,
    SideBottomEdge,
    CornerEdge,
    SideWallPanel,
    FloorPanel,
    BottomEdge,
}

impl Subpart {
    pub const ALL: [Subpart; 12] = [
        Subpart::BottomOuterCorner,
        Subpart::TopOuterCorner,
        Subpart::BottomInnerCornerRight,
        Subpart::BottomInnerCornerLeft,
        Subpart::TopInnerCorner,
        Subpart::BottomCenterCorner,
        Subpart::SideTopEdge,
        Subpart::SideBottomEdge,
        Subpart::CornerEdge,
        Subpart::SideWallPanel,
        Subpart::FloorPanel,
        Subpart::BottomEdge,
    ];

    /// Stable kebab-case name, used for artifact file names and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Subpart::BottomOuterCorner => "bottom-outer-corner",
            Subpart::TopOuterCorner => "top-outer-corner",
            Subpart::BottomInnerCornerRight => "bottom-inner-corner-right",
            Subpart::BottomInnerCornerLeft => "bottom-inner-corner-left",
            Subpart::TopInnerCorner => "top-inner-corner",
            Subpart::BottomCenterCorner => "bottom-center-corner",
            Subpart::SideTopEdge => "side-top-edge",
            Subpart::SideBottomEdge => "side-bottom-edge",
            Subpart::CornerEdge => "side-edge-between-corners",
            Subpart::SideWallPanel => "side-wall-panel",
            Subpart::FloorPanel => "floor-panel",
            Subpart::BottomEdge => "bottom-edge",
        }
    }

    /// Band along X, Y and Z.
    pub const fn region(self) -> [Band; 3] {
        use Band::*;
        match self {
            Subpart::BottomOuterCorner => [Low, Low, Low],
            Subpart::TopOuterCorner => [Low, Low, High],
            Subpart::CornerEdge => [Low, Low, Middle],
            Subpart::BottomInnerCornerRight => [High, Low, Low],
            Subpart::BottomInnerCornerLeft => [Low, High, Low],
            Subpart::TopInnerCorner => [High, Low, High],
            Subpart::BottomCenterCorner => [High, High, Low],
            Subpart::SideTopEdge => [Middle, Low, High],
            Subpart::SideBottomEdge => [Middle, Low, Low],
            Subpart::SideWallPanel => [Middle, Low, Middle],
            Subpart::FloorPanel => [Middle, Middle, Low],
            Subpart::BottomEdge => [High, Middle, Low],
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// The twelve cut regions of a cell, each normalised to its own origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SubpartSet {
    parts: Vec<Mesh>,
}

impl SubpartSet {
    /// Collect exactly one mesh per [`Subpart`], in any order.
    pub fn from_parts(parts: impl IntoIterator<Item = (Subpart, Mesh)>) -> Result<Self, GridError> {
        let mut slots: Vec<Option<Mesh>> = vec![None; Subpart::ALL.len()];
        for (part, mesh) in parts {
            slots[part.slot()] = Some(mesh);
        }

        let parts = Subpart::ALL
            .iter()
            .zip(slots)
            .map(|(part, mesh)| {
                mesh.ok_or_else(|| {
                    GridError::validation("decomposition", format!("missing {}", part.name()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SubpartSet { parts })
    }

    pub fn get(&self, part: Subpart) -> &Mesh {
        &self.parts[part.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subpart, &Mesh)> {
        Subpart::ALL.iter().copied().zip(self.parts.iter())
    }
}
