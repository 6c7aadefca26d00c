//! Binary Space Partitioning (BSP) tree booleans
//!
//! Meshes are converted to convex polygons, fed through BSP trees and
//! fan-triangulated back into a triangle soup. Results are not welded; the
//! repair pass takes care of that once all pieces are assembled.

pub mod node;
pub mod plane;
pub mod polygon;
pub mod traits;

pub use node::Node;
pub use plane::Plane;
pub use polygon::Polygon;
pub use traits::{BalancedSplittingStrategy, SplittingPlaneStrategy};

use crate::errors::GridError;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::mesh::Mesh;
use crate::traits::BooleanEngine;

/// [`BooleanEngine`] backed by BSP-tree polygon clipping.
#[derive(Debug, Clone, Default)]
pub struct BspEngine {
    pub strategy: BalancedSplittingStrategy,
}

impl BspEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_strategy(strategy: BalancedSplittingStrategy) -> Self {
        Self { strategy }
    }
}

/// Convert mesh triangles to polygons, skipping zero-area triangles.
pub fn polygons_from_mesh(mesh: &Mesh) -> Vec<Polygon> {
    mesh.triangles().filter_map(Polygon::from_triangle).collect()
}

/// Fan-triangulate polygons into a triangle soup.
pub fn mesh_from_polygons(polygons: &[Polygon]) -> Mesh {
    Mesh::from_triangles(polygons.iter().flat_map(Polygon::triangulate))
}

fn bounds(polygons: &[Polygon]) -> Aabb {
    polygons
        .iter()
        .fold(Aabb::new_invalid(), |bb, p| bb.merged(&p.bounding_box()))
}

/// Split polygons into (may_touch, cannot_touch) using bounding box overlap
fn partition_polys(polys: &[Polygon], other_bb: &Aabb) -> (Vec<Polygon>, Vec<Polygon>) {
    let mut maybe = Vec::new();
    let mut never = Vec::new();
    for p in polys {
        if p.bounding_box().intersects(other_bb) {
            maybe.push(p.clone());
        } else {
            never.push(p.clone());
        }
    }
    (maybe, never)
}

fn non_empty(polygons: Vec<Polygon>, operation: &'static str) -> Result<Mesh, GridError> {
    let mesh = mesh_from_polygons(&polygons);
    if mesh.is_empty() {
        return Err(GridError::BooleanOperationFailure { operation });
    }
    Ok(mesh)
}

impl BooleanEngine for BspEngine {
    /// Return a new mesh representing the intersection of the two meshes.
    ///
    /// ```text
    /// let c = a.intersect(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersection(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, GridError> {
        let a_polys = polygons_from_mesh(a);
        let b_polys = polygons_from_mesh(b);
        if a_polys.is_empty() || b_polys.is_empty() {
            return Err(GridError::BooleanOperationFailure {
                operation: "intersection",
            });
        }

        let mut a = Node::from_polygons(&a_polys, &self.strategy);
        let mut b = Node::from_polygons(&b_polys, &self.strategy);

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(&b.all_polygons(), &self.strategy);
        a.invert();

        log::trace!(
            "intersection of {} and {} polygons",
            a_polys.len(),
            b_polys.len()
        );
        non_empty(a.all_polygons(), "intersection")
    }

    /// Return a new mesh representing the union of the two meshes.
    ///
    /// Polygons whose bounds miss the other operand pass through untouched.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, GridError> {
        let a_polys = polygons_from_mesh(a);
        let b_polys = polygons_from_mesh(b);
        if a_polys.is_empty() {
            return non_empty(b_polys, "union");
        }
        if b_polys.is_empty() {
            return non_empty(a_polys, "union");
        }

        let (a_clip, a_passthru) = partition_polys(&a_polys, &bounds(&b_polys));
        let (b_clip, b_passthru) = partition_polys(&b_polys, &bounds(&a_polys));

        let mut a = Node::from_polygons(&a_clip, &self.strategy);
        let mut b = Node::from_polygons(&b_clip, &self.strategy);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons(), &self.strategy);

        let mut final_polys = a.all_polygons();
        final_polys.extend(a_passthru);
        final_polys.extend(b_passthru);

        non_empty(final_polys, "union")
    }
}
