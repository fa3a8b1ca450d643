//! Subdivided icosahedron meshes for the sphere and backdrop.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::PI;

/// Vertex data for scene meshes (position + normal + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_corners() -> [Vec3; 12] {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Build an icosphere.
///
/// Every icosahedron face is split into `(detail + 1)^2` triangles and all
/// vertices are pushed out to `radius`. Faces keep their own vertices, so
/// edges are duplicated rather than shared.
pub fn icosahedron(radius: f32, detail: u32) -> Mesh {
    let corners = icosahedron_corners();
    let cols = detail as usize + 1;
    let mut mesh = Mesh::default();

    for face in ICOSAHEDRON_FACES {
        let (a, b, c) = (corners[face[0]], corners[face[1]], corners[face[2]]);
        let base = mesh.vertices.len() as u32;

        // Row i holds cols - i + 1 points between the a-c and b-c edges
        let mut row_start = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let f = i as f32 / cols as f32;
            let aj = a.lerp(c, f);
            let bj = b.lerp(c, f);
            let rows = cols - i;

            row_start.push(mesh.vertices.len() as u32 - base);
            for j in 0..=rows {
                let p = if rows == 0 {
                    aj
                } else {
                    aj.lerp(bj, j as f32 / rows as f32)
                };
                mesh.vertices.push(sphere_vertex(p, radius));
            }
        }

        let at = |i: usize, j: usize| base + row_start[i] + j as u32;
        for i in 0..cols {
            for j in 0..2 * (cols - i) - 1 {
                let k = j / 2;
                if j % 2 == 0 {
                    mesh.indices
                        .extend_from_slice(&[at(i, k + 1), at(i + 1, k), at(i, k)]);
                } else {
                    mesh.indices
                        .extend_from_slice(&[at(i, k + 1), at(i + 1, k + 1), at(i + 1, k)]);
                }
            }
        }
    }

    mesh
}

fn sphere_vertex(p: Vec3, radius: f32) -> Vertex {
    let dir = p.normalize();
    Vertex {
        position: (dir * radius).to_array(),
        normal: dir.to_array(),
        uv: [azimuth(dir) / (2.0 * PI) + 0.5, inclination(dir) / PI + 0.5],
    }
}

fn azimuth(v: Vec3) -> f32 {
    v.z.atan2(-v.x)
}

fn inclination(v: Vec3) -> f32 {
    (-v.y).atan2((v.x * v.x + v.z * v.z).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_icosahedron() {
        let mesh = icosahedron(1.0, 0);
        assert_eq!(mesh.triangle_count(), 20);
        assert_eq!(mesh.vertices.len(), 60);
    }

    #[test]
    fn test_subdivision_counts() {
        for detail in [1, 5, 10] {
            let mesh = icosahedron(1.0, detail);
            let cols = detail as usize + 1;
            assert_eq!(mesh.triangle_count(), 20 * cols * cols);
            assert_eq!(mesh.vertices.len(), 20 * (cols + 1) * (cols + 2) / 2);
        }
    }

    #[test]
    fn test_vertices_on_radius() {
        let mesh = icosahedron(10.0, 3);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 10.0).abs() < 1e-3, "vertex at radius {}", len);
        }
    }

    #[test]
    fn test_indices_in_bounds_and_uvs_normalized() {
        let mesh = icosahedron(1.0, 4);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_faces_wind_outward() {
        let mesh = icosahedron(1.0, 2);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
