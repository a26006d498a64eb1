use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Interleaved vertex shared by every mesh: position, texture coordinate, normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// CPU-side vertex and index streams, ready to upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Flat grid in the XZ plane spanning `0..resolution` world units on both
    /// axes, one unit per cell. Texture coordinates run 0..1 across the whole
    /// plane so that the height map covers it exactly once.
    pub fn plane(resolution: u32) -> Self {
        let resolution = resolution.max(1);
        let stride = resolution + 1;
        let step = 1.0 / resolution as f32;
        let mut vertices = Vec::with_capacity((stride * stride) as usize);
        for z in 0..stride {
            for x in 0..stride {
                vertices.push(Vertex::new(
                    [x as f32, 0.0, z as f32],
                    [x as f32 * step, z as f32 * step],
                    [0.0, 1.0, 0.0],
                ));
            }
        }

        let mut indices = Vec::with_capacity((resolution * resolution * 6) as usize);
        for z in 0..resolution {
            for x in 0..resolution {
                let bottom_left = z * stride + x;
                let bottom_right = bottom_left + 1;
                let top_left = bottom_left + stride;
                let top_right = top_left + 1;
                indices.extend_from_slice(&[
                    bottom_left,
                    top_left,
                    top_right,
                    bottom_left,
                    top_right,
                    bottom_right,
                ]);
            }
        }
        Self { vertices, indices }
    }

    /// Cube spanning -1..1 with per-face normals and texture coordinates.
    pub fn cube() -> Self {
        // (normal, u axis, v axis) for each face.
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ];
        const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u_axis, v_axis) in FACES {
            let base = vertices.len() as u32;
            for [u, v] in CORNERS {
                let (su, sv) = (u * 2.0 - 1.0, v * 2.0 - 1.0);
                let position = [
                    normal[0] + u_axis[0] * su + v_axis[0] * sv,
                    normal[1] + u_axis[1] * su + v_axis[1] * sv,
                    normal[2] + u_axis[2] * su + v_axis[2] * sv,
                ];
                vertices.push(Vertex::new(position, [u, v], normal));
            }
            // Counter-clockwise seen from outside the face.
            indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }
        Self { vertices, indices }
    }

    /// UV sphere of radius 1 with `resolution` rings and `2 * resolution` segments.
    pub fn sphere(resolution: u32) -> Self {
        let rings = resolution.max(2);
        let segments = rings * 2;
        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let theta = v * PI;
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let phi = u * TAU;
                let normal = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
                vertices.push(Vertex::new(normal, [u, v], normal));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        Self { vertices, indices }
    }

    /// Screen-sized quad centred on the origin at z = 0, texture origin top-left.
    pub fn ortho_quad(width: f32, height: f32) -> Self {
        let (half_w, half_h) = (width * 0.5, height * 0.5);
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-half_w, half_h, 0.0], [0.0, 0.0], normal),
            Vertex::new([half_w, half_h, 0.0], [1.0, 0.0], normal),
            Vertex::new([half_w, -half_h, 0.0], [1.0, 1.0], normal),
            Vertex::new([-half_w, -half_h, 0.0], [0.0, 1.0], normal),
        ];
        Self {
            vertices,
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn assert_valid(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&index| index < count));
        for vertex in &mesh.vertices {
            let normal = Vec3::from(vertex.normal);
            assert!((normal.length() - 1.0).abs() < 1e-4, "normal {normal:?}");
        }
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn plane_counts_and_extent() {
        let plane = MeshData::plane(100);
        assert_eq!(plane.vertices.len(), 101 * 101);
        assert_eq!(plane.index_count(), 100 * 100 * 6);
        assert_valid(&plane);
        let last = plane.vertices.last().unwrap();
        assert_eq!(last.position, [100.0, 0.0, 100.0]);
        assert_eq!(last.uv, [1.0, 1.0]);
    }

    #[test]
    fn cube_spans_unit_extent() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_valid(&cube);
        for vertex in &cube.vertices {
            assert!(vertex.position.iter().all(|c| (c.abs() - 1.0).abs() < 1e-6));
        }
    }

    #[test]
    fn cube_triangles_wind_outward() {
        let cube = MeshData::cube();
        let position = |index: u32| Vec3::from(cube.vertices[index as usize].position);
        for triangle in cube.indices.chunks(3) {
            let (a, b, c) = (position(triangle[0]), position(triangle[1]), position(triangle[2]));
            let winding = (b - a).cross(c - a);
            let normal = Vec3::from(cube.vertices[triangle[0] as usize].normal);
            assert!(winding.dot(normal) > 0.0, "triangle {triangle:?}");
            assert!(winding.dot((a + b + c) / 3.0) > 0.0, "triangle {triangle:?}");
        }
    }

    #[test]
    fn sphere_is_unit_radius() {
        let sphere = MeshData::sphere(20);
        assert_valid(&sphere);
        for vertex in &sphere.vertices {
            assert!((Vec3::from(vertex.position).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn ortho_quad_matches_size() {
        let quad = MeshData::ortho_quad(1600.0, 900.0);
        assert_eq!(quad.index_count(), 6);
        assert_eq!(quad.vertices[0].position, [-800.0, 450.0, 0.0]);
        assert_eq!(quad.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(quad.vertices[2].uv, [1.0, 1.0]);
    }
}
