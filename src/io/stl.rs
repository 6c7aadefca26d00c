use crate::float_types::Real;
use crate::io::IoError;
use crate::mesh::Mesh;
use std::io::Cursor;
use nalgebra::Point3;

impl Mesh {
    /// Parse STL data (ASCII or binary, detected by `stl_io`) into a triangle soup.
    ///
    /// Facet normals stored in the file are ignored; repair recomputes
    /// vertex normals from the geometry.
    pub fn from_stl(stl_data: &[u8]) -> Result<Mesh, IoError> {
        let mut cursor = Cursor::new(stl_data);
        let stl_reader = stl_io::create_stl_reader(&mut cursor)?;

        let mut triangles = Vec::new();
        for tri_result in stl_reader {
            let tri = tri_result?;
            let corner = |i: usize| {
                Point3::new(
                    tri.vertices[i][0] as Real,
                    tri.vertices[i][1] as Real,
                    tri.vertices[i][2] as Real,
                )
            };
            triangles.push([corner(0), corner(1), corner(2)]);
        }

        log::debug!("read {} STL facets", triangles.len());
        Ok(Mesh::from_triangles(triangles))
    }

    /// Export to BINARY STL (returns `Vec<u8>`)
    ///
    /// Facet normals are computed from each triangle's winding.
    ///
    /// ```rust
    /// # use bingrid::mesh::Mesh;
    /// # use nalgebra::Point3;
    /// let block = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
    /// let bytes = block.to_stl_binary("block").unwrap();
    /// assert_eq!(bytes.len(), 84 + 12 * 50);
    /// ```
    pub fn to_stl_binary(&self, _name: &str) -> Result<Vec<u8>, IoError> {
        use stl_io::{Normal, Triangle, Vertex, write_stl};

        let triangles: Vec<Triangle> = self
            .triangles()
            .map(|[a, b, c]| {
                let n = (b - a).cross(&(c - a));
                let n = n.try_normalize(Real::EPSILON).unwrap_or(n);
                #[allow(clippy::unnecessary_cast)]
                Triangle {
                    normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                    vertices: [a, b, c].map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
                }
            })
            .collect();

        let mut cursor = Cursor::new(Vec::new());
        write_stl(&mut cursor, triangles.iter())?;
        Ok(cursor.into_inner())
    }
}
