//! Splitting-plane selection for BSP construction

use crate::float_types::Real;
use crate::mesh::bsp::plane::{BACK, COPLANAR, FRONT, Plane};
use crate::mesh::bsp::polygon::Polygon;

/// Trait for picking optimal splitting planes
pub trait SplittingPlaneStrategy {
    /// Pick the splitting plane for a non-empty set of polygons.
    ///
    /// The plane must be the plane of one of `polygons`, so every build
    /// step places at least one polygon on the node and terminates.
    fn pick_best_splitting_plane(&self, polygons: &[Polygon]) -> Plane;
}

/// Default splitting plane strategy using balanced heuristic
#[derive(Debug, Clone)]
pub struct BalancedSplittingStrategy {
    pub span_weight: Real,
    pub balance_weight: Real,
    /// How many leading polygons are tried as candidates.
    pub sample_size: usize,
}

impl Default for BalancedSplittingStrategy {
    fn default() -> Self {
        Self {
            span_weight: 8.0,
            balance_weight: 1.0,
            sample_size: 20,
        }
    }
}

impl SplittingPlaneStrategy for BalancedSplittingStrategy {
    fn pick_best_splitting_plane(&self, polygons: &[Polygon]) -> Plane {
        let mut best_plane = polygons[0].plane.clone();
        let mut best_score = Real::MAX;

        for candidate in polygons.iter().take(self.sample_size.max(1)) {
            let plane = &candidate.plane;
            let (num_front, num_back, num_spanning) = polygons
                .iter()
                .map(|poly| match plane.classify_polygon(poly) {
                    COPLANAR => (0i64, 0i64, 0i64),
                    FRONT => (1, 0, 0),
                    BACK => (0, 1, 0),
                    _ => (0, 0, 1),
                })
                .fold((0, 0, 0), |acc, x| (acc.0 + x.0, acc.1 + x.1, acc.2 + x.2));

            let score = self.span_weight * num_spanning as Real
                + self.balance_weight * ((num_front - num_back) as Real).abs();

            if score < best_score {
                best_score = score;
                best_plane = plane.clone();
            }
        }

        best_plane
    }
}
