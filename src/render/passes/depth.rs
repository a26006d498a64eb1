use bytemuck::{Pod, Zeroable};

use super::{
    linear_sampler, pipeline_layout, sampler_entry, shader_module, texture_entry, uniform_buffer,
    uniform_entry, MatrixBlock, Transforms,
};
use crate::light::Light;
use crate::mesh::Vertex;
use crate::render::mesh::MeshBuffers;
use crate::render::shadow_map::ShadowMap;
use crate::scene::GeometryType;

const DEPTH_WGSL: &str = include_str!("../shaders/depth.wgsl");

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DepthParams {
    pub near_plane: f32,
    pub far_plane: f32,
    pub amplitude: f32,
    pub geometry_type: f32,
}

impl DepthParams {
    pub fn new(light: &Light, amplitude: f32, geometry: GeometryType) -> Self {
        Self {
            near_plane: light.shadow().near_plane,
            far_plane: light.shadow().far_plane,
            amplitude,
            geometry_type: geometry.as_f32(),
        }
    }
}

/// Renders shadow casters into a light's depth map.
pub struct DepthPass {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl DepthPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let stages = wgpu::ShaderStages::VERTEX;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("depth-layout"),
            entries: &[
                uniform_entry::<MatrixBlock>(0, stages),
                uniform_entry::<DepthParams>(1, stages),
                texture_entry(2, stages),
                sampler_entry(3, stages),
            ],
        });
        let pipeline_layout = pipeline_layout(device, "depth-pipeline-layout", &[&layout]);
        let module = shader_module(device, "depth-shader", DEPTH_WGSL.to_string());
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("depth-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ShadowMap::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: None,
            multiview: None,
            cache: None,
        });

        Self {
            layout,
            pipeline,
            sampler: linear_sampler(device, "depth-sampler", wgpu::AddressMode::Repeat),
        }
    }

    pub fn draw(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        transforms: &Transforms,
        params: &DepthParams,
        height: &wgpu::TextureView,
        mesh: &MeshBuffers,
    ) {
        let matrices = uniform_buffer(device, "depth-matrices", &MatrixBlock::from(transforms));
        let params = uniform_buffer(device, "depth-params", params);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("depth-bind-group"),
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
                    resource: wgpu::BindingResource::TextureView(height),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &group, &[]);
        mesh.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;

    #[test]
    fn params_follow_light_planes() {
        let mut light = Light::new(LightKind::Spot);
        light.shadow_mut().near_plane = 2.0;
        light.shadow_mut().far_plane = 40.0;
        let params = DepthParams::new(&light, 12.0, GeometryType::Terrain);
        assert_eq!(
            params,
            DepthParams {
                near_plane: 2.0,
                far_plane: 40.0,
                amplitude: 12.0,
                geometry_type: 0.0,
            }
        );
    }
}
