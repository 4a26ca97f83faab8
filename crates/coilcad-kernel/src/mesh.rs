//! Flat triangle meshes for export and downstream meshers.

use crate::topology::Face;

/// Output triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Mesh of a single face, wound outward with respect to its solid.
    ///
    /// Normals are per-face-triangle, so every triangle gets its own three
    /// vertices.
    pub fn from_face(face: &Face) -> Self {
        let mut mesh = Self::new();
        for [a, b, c] in face.triangles() {
            let n = (b - a).cross(&(c - a));
            let n = if n.norm() > 0.0 { n.normalize() } else { n };
            let base = mesh.num_vertices() as u32;
            for p in [a, b, c] {
                mesh.vertices.extend([p.x as f32, p.y as f32, p.z as f32]);
                mesh.normals.extend([n.x as f32, n.y as f32, n.z as f32]);
            }
            mesh.indices.extend([base, base + 1, base + 2]);
        }
        mesh
    }

    /// Merge the meshes of several faces.
    pub fn from_faces<'a>(faces: impl IntoIterator<Item = &'a Face>) -> Self {
        let mut mesh = Self::new();
        for face in faces {
            mesh.merge(&Self::from_face(face));
        }
        mesh
    }

    /// Signed volume enclosed by the mesh (positive for outward winding).
    pub fn signed_volume(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| {
                    let i = i as usize * 3;
                    read_point(&self.vertices[i..i + 3])
                };
                let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
                dot(a, cross(b, c)) / 6.0
            })
            .sum()
    }
}

fn read_point(v: &[f32]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
