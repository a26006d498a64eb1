use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::{
    depth_state, linear_sampler, pipeline_layout, sampler_entry, shader_module, texture_entry,
    uniform_buffer, uniform_entry, MatrixBlock, Transforms,
};
use crate::frame::BillboardBlend;
use crate::mesh::Vertex;
use crate::render::mesh::MeshBuffers;

const BILLBOARD_WGSL: &str = include_str!("../shaders/billboard.wgsl");

/// Vertices emitted per billboard instance (two triangles).
pub const VERTICES_PER_QUAD: u32 = 6;

pub const GRASS_SIZE: Vec2 = Vec2::new(1.0, 1.2);
pub const GRASS_SWAY: f32 = 0.08;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BillboardParams {
    pub camera_position: [f32; 3],
    pub time: f32,
    pub size: [f32; 2],
    pub sway: f32,
    pub _pad: f32,
}

impl BillboardParams {
    pub fn new(camera_position: Vec3, time: f32) -> Self {
        Self {
            camera_position: camera_position.to_array(),
            time,
            size: GRASS_SIZE.to_array(),
            sway: GRASS_SWAY,
            _pad: 0.0,
        }
    }
}

/// Camera-facing grass quads, one instance per vertex of the anchor mesh.
pub struct BillboardPass {
    layout: wgpu::BindGroupLayout,
    blended: wgpu::RenderPipeline,
    opaque: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl BillboardPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("billboard-layout"),
            entries: &[
                uniform_entry::<MatrixBlock>(0, stages),
                uniform_entry::<BillboardParams>(1, stages),
                texture_entry(2, stages),
                sampler_entry(3, stages),
            ],
        });
        let pipeline_layout = pipeline_layout(device, "billboard-pipeline-layout", &[&layout]);
        let module = shader_module(device, "billboard-shader", BILLBOARD_WGSL.to_string());

        let build = |label, blend| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
        };
        let blended = build("billboard-blended-pipeline", wgpu::BlendState::ALPHA_BLENDING);
        let opaque = build("billboard-opaque-pipeline", wgpu::BlendState::REPLACE);

        Self {
            layout,
            blended,
            opaque,
            sampler: linear_sampler(device, "billboard-sampler", wgpu::AddressMode::ClampToEdge),
        }
    }

    /// Draws one quad per vertex of `anchors`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        blend: BillboardBlend,
        transforms: &Transforms,
        params: &BillboardParams,
        texture: &wgpu::TextureView,
        anchors: &MeshBuffers,
    ) {
        let matrices = uniform_buffer(device, "billboard-matrices", &MatrixBlock::from(transforms));
        let params = uniform_buffer(device, "billboard-params", params);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("billboard-bind-group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: matrices.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        pass.set_pipeline(match blend {
            BillboardBlend::AlphaBlended => &self.blended,
            BillboardBlend::Opaque => &self.opaque,
        });
        pass.set_bind_group(0, &group, &[]);
        pass.set_vertex_buffer(0, anchors.vertex.slice(..));
        pass.draw(0..VERTICES_PER_QUAD, 0..anchors.vertex_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_match_wgsl_layout() {
        let params = BillboardParams::new(Vec3::new(1.0, 2.0, 3.0), 4.0);
        assert_eq!(params.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(params.time, 4.0);
        assert_eq!(std::mem::size_of::<BillboardParams>(), 32);
    }
}
