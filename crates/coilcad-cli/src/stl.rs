//! Binary STL writer.

use anyhow::{ensure, Result};
use coilcad::coilcad_kernel::TriangleMesh;

const HEADER_LEN: usize = 80;

/// Encode `mesh` as binary STL, with `label` in the header.
pub fn to_binary_stl(mesh: &TriangleMesh, label: &str) -> Result<Vec<u8>> {
    ensure!(
        mesh.indices.len() % 3 == 0,
        "index buffer of {} entries is not a triangle list",
        mesh.indices.len()
    );
    let vertex_count = mesh.num_vertices();
    ensure!(
        mesh.indices.iter().all(|&i| (i as usize) < vertex_count),
        "index out of range for {vertex_count} vertices"
    );

    let num_triangles = mesh.num_triangles();
    let mut data = Vec::with_capacity(HEADER_LEN + 4 + num_triangles * 50);

    let mut header = [b' '; HEADER_LEN];
    let text = format!("coilcad region {label}");
    let n = text.len().min(HEADER_LEN);
    header[..n].copy_from_slice(&text.as_bytes()[..n]);
    data.extend_from_slice(&header);
    data.extend_from_slice(&(num_triangles as u32).to_le_bytes());

    let vertex = |i: u32| {
        let i = i as usize * 3;
        [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
    };
    for tri in mesh.indices.chunks_exact(3) {
        let [v0, v1, v2] = [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])];

        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        // no length threshold: coil triangles have sub-millimetre edges
        let n = if len > 0.0 {
            n.map(|c| c / len)
        } else {
            [0.0, 0.0, 1.0]
        };

        for c in n.into_iter().chain(v0).chain(v1).chain(v2) {
            data.extend_from_slice(&c.to_le_bytes());
        }
        // attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_f32(data: &[u8], at: usize) -> f32 {
        f32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }

    #[test]
    fn test_single_triangle() {
        let mesh = TriangleMesh {
            vertices: vec![0.0, 0.0, 0.0, 0.001, 0.0, 0.0, 0.0, 0.001, 0.0],
            indices: vec![0, 1, 2],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        };
        let data = to_binary_stl(&mesh, "coil").unwrap();
        assert_eq!(data.len(), 84 + 50);
        assert!(data.starts_with(b"coilcad region coil "));
        assert_eq!(u32::from_le_bytes([data[80], data[81], data[82], data[83]]), 1);
        assert_eq!(read_f32(&data, 84 + 8), 1.0);
        assert_eq!(read_f32(&data, 84 + 24), 0.001);
    }

    #[test]
    fn test_rejects_bad_indices() {
        let mesh = TriangleMesh {
            vertices: vec![0.0; 9],
            indices: vec![0, 1, 3],
            normals: vec![0.0; 9],
        };
        assert!(to_binary_stl(&mesh, "air").is_err());
    }
}
