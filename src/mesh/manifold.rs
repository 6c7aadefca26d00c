use crate::mesh::Mesh;
use hashbrown::{HashMap, HashSet};

/// Unordered pair of vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(pub usize, pub usize);

impl Edge {
    /// Order the endpoints so `(a, b)` and `(b, a)` are the same key.
    pub const fn new(a: usize, b: usize) -> Self {
        if a < b { Edge(a, b) } else { Edge(b, a) }
    }
}

/// Triangle-per-edge census of an indexed mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeReport {
    /// Distinct undirected edges.
    pub edge_count: usize,
    /// Edges used by exactly one triangle (open boundary).
    pub boundary_edges: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edges: usize,
}

impl EdgeReport {
    /// Every edge is shared by exactly two triangles.
    pub const fn is_closed_manifold(&self) -> bool {
        self.edge_count > 0 && self.boundary_edges == 0 && self.non_manifold_edges == 0
    }
}

impl Mesh {
    /// Count triangles per undirected edge.
    ///
    /// Purely diagnostic: the pipeline logs the result and carries on. Edges
    /// are keyed by vertex index, so soups (which share no indices) report
    /// every edge as boundary; weld first.
    pub fn edge_report(&self) -> EdgeReport {
        let edge_counts = edge_counts(&self.triangle_indices());
        EdgeReport {
            edge_count: edge_counts.len(),
            boundary_edges: edge_counts.values().filter(|&&n| n == 1).count(),
            non_manifold_edges: edge_counts.values().filter(|&&n| n > 2).count(),
        }
    }

    /// Checks if the Mesh object is manifold
    ///
    /// ### Returns
    /// Returns `true` if every edge appears exactly 2 times
    pub fn is_manifold(&self) -> bool {
        self.edge_report().is_closed_manifold()
    }
}

fn edges_of([a, b, c]: [usize; 3]) -> [Edge; 3] {
    [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)]
}

fn edge_counts(triangles: &[[usize; 3]]) -> HashMap<Edge, u32> {
    let mut counts: HashMap<Edge, u32> = HashMap::new();
    for &tri in triangles {
        for edge in edges_of(tri) {
            *counts.entry(edge).or_insert(0) += 1;
        }
    }
    counts
}

/// Append a copy of vertex `v` (position and attributes), returning its index.
fn copy_vertex(mesh: &mut Mesh, v: usize) -> usize {
    let position = mesh.positions[v];
    mesh.positions.push(position);
    if let Some(normals) = mesh.normals.as_mut() {
        let n = normals[v];
        normals.push(n);
    }
    if let Some(uvs) = mesh.uvs.as_mut() {
        let uv = uvs[v];
        uvs.push(uv);
    }
    mesh.positions.len() - 1
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Group the `faces` around vertex `v` into umbrellas: two faces belong
/// together when they share an edge out of `v` that exactly two faces use.
///
/// Groups are ordered by their first face, so the split is deterministic.
fn umbrellas(
    v: usize,
    faces: &[usize],
    triangles: &[[usize; 3]],
    counts: &HashMap<Edge, u32>,
    original: impl Fn(usize) -> usize,
) -> Vec<Vec<usize>> {
    let mut by_neighbour: HashMap<usize, Vec<usize>> = HashMap::new();
    for (local, &face) in faces.iter().enumerate() {
        for x in triangles[face] {
            if x != v {
                by_neighbour.entry(x).or_default().push(local);
            }
        }
    }

    let mut parent: Vec<usize> = (0..faces.len()).collect();
    for (x, locals) in &by_neighbour {
        let edge = Edge::new(original(v), original(*x));
        if let [f, g] = locals[..] {
            if counts.get(&edge) == Some(&2) {
                let (rf, rg) = (find(&mut parent, f), find(&mut parent, g));
                parent[rf.max(rg)] = rf.min(rg);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    for (local, &face) in faces.iter().enumerate() {
        let root = find(&mut parent, local);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(face);
    }
    groups
}

/// Make every edge shared by at most two triangles.
///
/// At each endpoint of an edge used by more than two triangles, the incident
/// triangles are grouped into umbrellas and every umbrella after the first
/// gets its own copy of the vertex. Triangles that still crowd an edge after
/// that (only possible with overlapping coplanar sheets) are detached onto
/// fresh vertices. Positions never move; the copies are coincident, so a
/// later weld undoes the split and the same split follows.
///
/// Returns the number of vertices added.
pub fn split_non_manifold_edges(mesh: &mut Mesh) -> usize {
    let mut triangles = mesh.triangle_indices();
    let counts = edge_counts(&triangles);

    let mut pinched: Vec<usize> = counts
        .iter()
        .filter(|&(_, &n)| n > 2)
        .flat_map(|(edge, _)| [edge.0, edge.1])
        .collect::<HashSet<usize>>()
        .into_iter()
        .collect();
    if pinched.is_empty() {
        return 0;
    }
    pinched.sort_unstable();

    if !mesh.is_indexed() {
        *mesh = std::mem::take(mesh).into_indexed();
    }
    let before = mesh.positions.len();
    let mut origin: Vec<usize> = Vec::new();

    let mut faces_at: HashMap<usize, Vec<usize>> = HashMap::new();
    for (face, tri) in triangles.iter().enumerate() {
        for &v in tri {
            if pinched.binary_search(&v).is_ok() {
                faces_at.entry(v).or_default().push(face);
            }
        }
    }

    for &v in &pinched {
        let Some(faces) = faces_at.get(&v) else {
            continue;
        };
        let groups = umbrellas(v, faces, &triangles, &counts, |x| {
            if x < before { x } else { origin[x - before] }
        });
        for group in groups.iter().skip(1) {
            let copy = copy_vertex(mesh, v);
            origin.push(v);
            for &face in group {
                for corner in triangles[face].iter_mut().filter(|c| **c == v) {
                    *corner = copy;
                }
            }
        }
    }

    let crowded = edge_counts(&triangles);
    let mut kept: HashMap<Edge, u32> = HashMap::new();
    let mut detached = 0;
    for face in 0..triangles.len() {
        let edges = edges_of(triangles[face]);
        let is_crowded = |e: &Edge| crowded.get(e).is_some_and(|&n| n > 2);
        if !edges.iter().any(is_crowded) {
            continue;
        }
        if edges
            .iter()
            .filter(|e| is_crowded(*e))
            .all(|e| kept.get(e).is_none_or(|&n| n < 2))
        {
            for e in edges.iter().filter(|e| is_crowded(*e)) {
                *kept.entry(*e).or_insert(0) += 1;
            }
            continue;
        }
        triangles[face] = triangles[face].map(|v| copy_vertex(mesh, v));
        detached += 1;
    }

    if detached > 0 {
        log::debug!("detached {detached} triangles from crowded edges");
    }
    mesh.indices = Some(triangles);
    mesh.positions.len() - before
}
