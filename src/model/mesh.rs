//! Mesh geometry: vertices, triangles and triangle-soup import

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use super::Transform;
use crate::error::{Error, Result};

/// Number of coordinates one triangle contributes to a flat point buffer
pub const POINTS_PER_TRIANGLE: usize = 9;

/// A 3D vertex with x, y, z coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The vertex as a nalgebra point
    pub fn to_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// The vertex moved by `transform`
    pub fn transformed(&self, transform: &Transform) -> Self {
        transform.transform_point(&self.to_point()).into()
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(p: Point3<f64>) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// A triangle defined by three vertex indices
///
/// Index order defines the winding and therefore the normal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: usize,
    /// Index of second vertex
    pub v2: usize,
    /// Index of third vertex
    pub v3: usize,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self { v1, v2, v3 }
    }

    /// The three indices in winding order
    pub fn indices(&self) -> [usize; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// A 3D mesh containing vertices and triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// List of vertices
    pub vertices: Vec<Vertex>,
    /// List of triangles
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mesh with pre-allocated capacity
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Build a mesh from a flat triangle-soup buffer
    ///
    /// Every 9 numbers describe one triangle (three `x y z` points). Each
    /// triangle gets three fresh vertices, so triangle `k` always refers to
    /// vertices `3k, 3k+1, 3k+2`. Coincident points are not merged.
    ///
    /// # Example
    ///
    /// ```
    /// use threemf::Mesh;
    ///
    /// let mesh = Mesh::from_points(&[
    ///     0.0, 0.0, 0.0,
    ///     1.0, 0.0, 0.0,
    ///     0.0, 1.0, 0.0,
    /// ]).unwrap();
    /// assert_eq!(mesh.vertices.len(), 3);
    /// assert_eq!(mesh.triangles.len(), 1);
    /// ```
    pub fn from_points(points: &[f64]) -> Result<Self> {
        if points.len() % POINTS_PER_TRIANGLE != 0 {
            return Err(Error::InvalidModel(format!(
                "Point buffer length {} is not a multiple of {}",
                points.len(),
                POINTS_PER_TRIANGLE
            )));
        }

        let mut mesh = Self::with_capacity(
            points.len() / 3,
            points.len() / POINTS_PER_TRIANGLE,
        );
        for chunk in points.chunks_exact(POINTS_PER_TRIANGLE) {
            mesh.push_soup_triangle([
                [chunk[0], chunk[1], chunk[2]],
                [chunk[3], chunk[4], chunk[5]],
                [chunk[6], chunk[7], chunk[8]],
            ]);
        }
        Ok(mesh)
    }

    /// Build a mesh from an STL stream (binary or ASCII)
    ///
    /// Triangles keep the order they have in the file and are converted the
    /// same way as [`Mesh::from_points`].
    pub fn from_stl_reader<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut mesh = Self::new();
        for triangle in stl_io::create_stl_reader(reader)? {
            let triangle = triangle?;
            let [a, b, c] = triangle.vertices;
            mesh.push_soup_triangle([
                [a.0[0] as f64, a.0[1] as f64, a.0[2] as f64],
                [b.0[0] as f64, b.0[1] as f64, b.0[2] as f64],
                [c.0[0] as f64, c.0[1] as f64, c.0[2] as f64],
            ]);
        }
        debug!(
            vertices = mesh.vertices.len(),
            triangles = mesh.triangles.len(),
            "loaded STL mesh"
        );
        Ok(mesh)
    }

    /// Build a mesh from an STL file on disk
    pub fn from_stl_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::from_stl_reader(&mut reader)
    }

    fn push_soup_triangle(&mut self, points: [[f64; 3]; 3]) {
        let base = self.vertices.len();
        for [x, y, z] in points {
            self.vertices.push(Vertex::new(x, y, z));
        }
        self.triangles
            .push(Triangle::new(base, base + 1, base + 2));
    }

    /// Check that every triangle index points at an existing vertex
    pub fn validate_indices(&self) -> Result<()> {
        let count = self.vertices.len();
        for (i, triangle) in self.triangles.iter().enumerate() {
            if let Some(bad) = triangle.indices().into_iter().find(|&v| v >= count) {
                return Err(Error::InvalidModel(format!(
                    "Triangle {} references vertex {} but the mesh has only {} vertices",
                    i, bad, count
                )));
            }
        }
        Ok(())
    }

    /// Move every vertex by `transform`
    pub fn apply_transform(&mut self, transform: &Transform) {
        for vertex in &mut self.vertices {
            *vertex = vertex.transformed(transform);
        }
    }
}
