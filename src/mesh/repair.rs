//! Merge-time mesh repair.
//!
//! Every step works on the indexed form; soups are indexed on first use.
//! [`repair`] runs the steps to a fixpoint so the result is stable under a
//! second pass.

use crate::errors::GridError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use crate::mesh::manifold::split_non_manifold_edges;
use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;

/// Configuration parameters for mesh repair operations.
///
/// All thresholds are in the same units as the mesh coordinates (millimetres for bin files).
///
/// ```
/// use bingrid::mesh::repair::RepairParams;
///
/// let params = RepairParams::default()
///     .with_weld_tolerance(1e-4)
///     .with_max_iterations(4);
/// assert_eq!(params.max_iterations, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RepairParams {
    /// Vertices closer than this are merged into one.
    /// Default: `1e-5`
    pub weld_tolerance: Real,

    /// Triangles with area below this are removed.
    /// Default: `1e-9`
    pub min_triangle_area: Real,

    /// Upper bound on fixpoint iterations.
    /// Default: `16`
    pub max_iterations: usize,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-5,
            min_triangle_area: 1e-9,
            max_iterations: 16,
        }
    }
}

impl RepairParams {
    #[must_use]
    pub const fn with_weld_tolerance(mut self, tolerance: Real) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_min_triangle_area(mut self, area: Real) -> Self {
        self.min_triangle_area = area;
        self
    }

    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }
}

/// What a [`repair`] run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub iterations: usize,
    /// False if `max_iterations` was hit before the mesh stopped changing.
    pub converged: bool,
    pub initial_vertices: usize,
    pub initial_triangles: usize,
    pub final_vertices: usize,
    pub final_triangles: usize,
    pub vertices_welded: usize,
    pub degenerates_removed: usize,
    pub duplicates_removed: usize,
    pub unreferenced_removed: usize,
    /// Vertices added to take non-manifold edges apart after the fixpoint.
    pub vertices_split: usize,
}

impl RepairReport {
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.vertices_welded > 0
            || self.degenerates_removed > 0
            || self.duplicates_removed > 0
            || self.unreferenced_removed > 0
            || self.vertices_split > 0
    }
}

/// Index buffer of `mesh`, converting a soup to indexed form first.
fn indexed(mesh: &mut Mesh) -> &mut Vec<[usize; 3]> {
    if mesh.indices.is_none() {
        *mesh = std::mem::take(mesh).into_indexed();
    }
    mesh.indices.get_or_insert_with(Vec::new)
}

/// Convert position to spatial hash cell.
fn pos_to_cell(pos: &Point3<Real>, cell_size: Real) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Merge vertices closer than `tolerance`, drop triangles that collapse, and
/// compact the vertex buffer.
///
/// The lowest-indexed vertex of each cluster is kept as the representative,
/// so surviving vertices are pairwise at least `tolerance` apart.
///
/// Returns the number of vertices merged away.
pub fn weld_vertices(mesh: &mut Mesh, tolerance: Real) -> usize {
    indexed(mesh);
    if mesh.positions.is_empty() || tolerance <= 0.0 {
        return 0;
    }

    let cell_size = tolerance * 2.0;
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (idx, p) in mesh.positions.iter().enumerate() {
        spatial_hash.entry(pos_to_cell(p, cell_size)).or_default().push(idx);
    }

    let mut remap: Vec<usize> = (0..mesh.positions.len()).collect();
    let mut merged = 0;

    for (idx, p) in mesh.positions.iter().enumerate() {
        if remap[idx] != idx {
            continue;
        }
        let (cx, cy, cz) = pos_to_cell(p, cell_size);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other] != other {
                            continue;
                        }
                        if (p - mesh.positions[other]).norm() < tolerance {
                            remap[other] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    let indices = indexed(mesh);
    for tri in indices.iter_mut() {
        *tri = tri.map(|i| remap[i]);
    }
    indices.retain(|&[a, b, c]| a != b && b != c && a != c);

    remove_unreferenced_vertices(mesh);
    merged
}

/// Remove triangles whose area is below `min_area`, then compact.
///
/// Returns the number of triangles removed.
pub fn remove_degenerate_triangles(mesh: &mut Mesh, min_area: Real) -> usize {
    let indices = std::mem::take(indexed(mesh));
    let before = indices.len();

    let kept: Vec<[usize; 3]> = indices
        .into_iter()
        .filter(|tri| {
            let [a, b, c] = tri.map(|i| mesh.positions[i]);
            0.5 * (b - a).cross(&(c - a)).norm() >= min_area
        })
        .collect();
    let removed = before - kept.len();
    mesh.indices = Some(kept);

    if removed > 0 {
        remove_unreferenced_vertices(mesh);
    }
    removed
}

/// Remove triangles that reference the same three vertices as an earlier
/// triangle, in any order or winding.
///
/// Returns the number of triangles removed.
pub fn remove_duplicate_triangles(mesh: &mut Mesh) -> usize {
    let indices = indexed(mesh);
    let before = indices.len();

    let mut seen: HashSet<[usize; 3]> = HashSet::with_capacity(before);
    indices.retain(|tri| {
        let mut key = *tri;
        key.sort_unstable();
        seen.insert(key)
    });

    before - indices.len()
}

/// Drop vertices no triangle references, keeping per-vertex attributes aligned.
///
/// Returns the number of vertices removed.
pub fn remove_unreferenced_vertices(mesh: &mut Mesh) -> usize {
    let original_count = mesh.positions.len();
    let indices = indexed(mesh);

    let mut referenced = vec![false; original_count];
    for &i in indices.iter().flatten() {
        referenced[i] = true;
    }

    let mut remap = vec![usize::MAX; original_count];
    let mut next = 0;
    for (old, &used) in referenced.iter().enumerate() {
        if used {
            remap[old] = next;
            next += 1;
        }
    }
    if next == original_count {
        return 0;
    }

    for tri in indices.iter_mut() {
        *tri = tri.map(|i| remap[i]);
    }

    fn compact<T>(values: &mut Vec<T>, keep: &[bool]) {
        let mut flags = keep.iter();
        values.retain(|_| flags.next().copied().unwrap_or(false));
    }
    compact(&mut mesh.positions, &referenced);
    if let Some(normals) = mesh.normals.as_mut() {
        compact(normals, &referenced);
    }
    if let Some(uvs) = mesh.uvs.as_mut() {
        compact(uvs, &referenced);
    }

    original_count - next
}

/// Repair `mesh` until a full pass leaves its vertex and triangle counts unchanged.
///
/// Each pass: drop normals, weld, remove degenerate triangles and compact,
/// remove duplicates, weld again, recompute vertex normals. Once the counts
/// settle, edges shared by more than two triangles are split apart with
/// [`split_non_manifold_edges`]. A second run welds those copies back and
/// splits them the same way, so its counts match the first.
pub fn repair(mut mesh: Mesh, params: &RepairParams) -> Result<(Mesh, RepairReport), GridError> {
    if mesh.is_empty() {
        return Err(GridError::DegenerateGeometry("cannot repair an empty mesh".into()));
    }

    mesh = mesh.into_indexed();
    let mut report = RepairReport {
        initial_vertices: mesh.vertex_count(),
        initial_triangles: mesh.triangle_count(),
        ..Default::default()
    };

    while report.iterations < params.max_iterations.max(1) {
        report.iterations += 1;
        let counts = (mesh.vertex_count(), mesh.triangle_count());

        mesh.normals = None;
        report.vertices_welded += weld_vertices(&mut mesh, params.weld_tolerance);

        let vertices_before = mesh.vertex_count();
        report.degenerates_removed +=
            remove_degenerate_triangles(&mut mesh, params.min_triangle_area);
        report.unreferenced_removed += vertices_before - mesh.vertex_count();

        report.duplicates_removed += remove_duplicate_triangles(&mut mesh);
        report.vertices_welded += weld_vertices(&mut mesh, params.weld_tolerance);
        mesh.compute_vertex_normals();

        log::debug!(
            "repair pass {}: {} vertices, {} triangles",
            report.iterations,
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        if counts == (mesh.vertex_count(), mesh.triangle_count()) {
            report.converged = true;
            break;
        }
    }

    if mesh.is_empty() {
        return Err(GridError::DegenerateGeometry(
            "repair removed every triangle".into(),
        ));
    }

    report.vertices_split = split_non_manifold_edges(&mut mesh);
    if report.vertices_split > 0 {
        mesh.compute_vertex_normals();
        log::info!(
            "split non-manifold edges with {} vertex copies",
            report.vertices_split
        );
    }

    report.final_vertices = mesh.vertex_count();
    report.final_triangles = mesh.triangle_count();
    if !report.converged {
        log::warn!(
            "repair stopped after {} passes without converging",
            report.iterations
        );
    }
    Ok((mesh, report))
}
