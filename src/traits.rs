use crate::errors::GridError;
use crate::mesh::Mesh;

/// Boolean operations on closed triangle meshes.
///
/// This is the only seam between the re-tiling pipeline and the solid
/// modelling kernel. [`BspEngine`](crate::mesh::bsp::BspEngine) is the
/// bundled implementation; anything that can intersect and union closed
/// meshes can stand in for it.
pub trait BooleanEngine {
    /// Region inside both `a` and `b`.
    ///
    /// An empty result is an error: every cut the pipeline makes expects geometry.
    fn intersection(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, GridError>;

    /// Region inside either `a` or `b`.
    fn union(&self, a: &Mesh, b: &Mesh) -> Result<Mesh, GridError>;
}
