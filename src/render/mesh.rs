use wgpu::util::DeviceExt;

use crate::mesh::{MeshData, Vertex};
use crate::scene::{MeshKind, SPHERE_RESOLUTION, TERRAIN_RESOLUTION};

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Uploaded vertex and index buffers for one mesh.
pub struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
    pub vertex_count: u32,
}

impl MeshBuffers {
    pub fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.index_count(),
            vertex_count: mesh.vertices.len() as u32,
        }
    }

    /// Binds the vertex and index streams to slot 0.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.bind(pass);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Every mesh the scene draws, created once at start-up.
pub struct SceneMeshes {
    pub terrain: MeshBuffers,
    pub model: MeshBuffers,
    pub cube: MeshBuffers,
    pub sphere: MeshBuffers,
    /// Screen-sized quad for the post-processing passes.
    pub screen_quad: MeshBuffers,
}

impl SceneMeshes {
    pub fn new(device: &wgpu::Device, model: &MeshData, screen_width: f32, screen_height: f32) -> Self {
        Self {
            terrain: MeshBuffers::from_mesh(device, &MeshData::plane(TERRAIN_RESOLUTION), "terrain"),
            model: MeshBuffers::from_mesh(device, model, "model"),
            cube: MeshBuffers::from_mesh(device, &MeshData::cube(), "cube"),
            sphere: MeshBuffers::from_mesh(device, &MeshData::sphere(SPHERE_RESOLUTION), "sphere"),
            screen_quad: MeshBuffers::from_mesh(
                device,
                &MeshData::ortho_quad(screen_width, screen_height),
                "screen-quad",
            ),
        }
    }

    pub fn get(&self, kind: MeshKind) -> &MeshBuffers {
        match kind {
            MeshKind::Terrain => &self.terrain,
            MeshKind::Model => &self.model,
            MeshKind::Cube => &self.cube,
            MeshKind::Sphere => &self.sphere,
        }
    }
}
