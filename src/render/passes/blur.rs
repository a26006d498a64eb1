use bytemuck::{Pod, Zeroable};

use super::{
    linear_sampler, mesh_pipeline, pipeline_layout, sampler_entry, shader_module, texture_entry,
    uniform_buffer, uniform_entry, MatrixBlock, MeshPipelineDesc, Transforms, COMMON_WGSL,
};
use crate::frame::BlurAxis;
use crate::render::mesh::MeshBuffers;

const BLUR_WGSL: &str = include_str!("../shaders/blur.wgsl");

pub const KERNEL_MIN: f32 = -25.0;
pub const KERNEL_MAX: f32 = 25.0;
pub const KERNEL_SPREAD: f32 = 15.0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlurParams {
    pub screen_size: [f32; 2],
    pub kernel_min: f32,
    pub kernel_max: f32,
    pub spread: f32,
    pub _pad: [f32; 3],
}

impl BlurParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen_size: [width as f32, height as f32],
            kernel_min: KERNEL_MIN,
            kernel_max: KERNEL_MAX,
            spread: KERNEL_SPREAD,
            _pad: [0.0; 3],
        }
    }
}

/// Separable gaussian blur, one axis per draw.
pub struct BlurPass {
    layout: wgpu::BindGroupLayout,
    horizontal: wgpu::RenderPipeline,
    vertical: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl BlurPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blur-layout"),
            entries: &[
                uniform_entry::<MatrixBlock>(0, stages),
                uniform_entry::<BlurParams>(1, stages),
                texture_entry(2, stages),
                sampler_entry(3, stages),
            ],
        });
        let pipeline_layout = pipeline_layout(device, "blur-pipeline-layout", &[&layout]);
        let module = shader_module(device, "blur-shader", format!("{COMMON_WGSL}\n{BLUR_WGSL}"));
        let desc = |label, fragment_entry| MeshPipelineDesc {
            label,
            layout: &pipeline_layout,
            module: &module,
            fragment_entry,
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            depth: None,
            polygon_mode: wgpu::PolygonMode::Fill,
        };
        let horizontal = mesh_pipeline(device, &desc("blur-horizontal-pipeline", "fs_horizontal"));
        let vertical = mesh_pipeline(device, &desc("blur-vertical-pipeline", "fs_vertical"));

        Self {
            layout,
            horizontal,
            vertical,
            sampler: linear_sampler(device, "blur-sampler", wgpu::AddressMode::ClampToEdge),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        axis: BlurAxis,
        transforms: &Transforms,
        params: &BlurParams,
        source: &wgpu::TextureView,
        quad: &MeshBuffers,
    ) {
        let matrices = uniform_buffer(device, "blur-matrices", &MatrixBlock::from(transforms));
        let params = uniform_buffer(device, "blur-params", params);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blur-bind-group"),
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
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        pass.set_pipeline(match axis {
            BlurAxis::Horizontal => &self.horizontal,
            BlurAxis::Vertical => &self.vertical,
        });
        pass.set_bind_group(0, &group, &[]);
        quad.draw(pass);
    }
}
