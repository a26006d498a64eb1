use bytemuck::{Pod, Zeroable};

use super::{
    depth_state, linear_sampler, mesh_pipeline, pipeline_layout, sampler_entry, shader_module,
    texture_entry, uniform_buffer, uniform_entry, MatrixBlock, MeshPipelineDesc, Transforms, COMMON_WGSL,
};
use crate::render::mesh::MeshBuffers;

const UNLIT_WGSL: &str = include_str!("../shaders/unlit.wgsl");

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UnlitParams {
    pub colour: [f32; 4],
    pub textured: f32,
    pub _pad: [f32; 3],
}

impl UnlitParams {
    /// Samples the bound texture with a white tint.
    pub fn textured() -> Self {
        Self {
            colour: [1.0; 4],
            textured: 1.0,
            _pad: [0.0; 3],
        }
    }
}

/// Parameters and texture name for a light gizmo sphere.
pub fn gizmo_material() -> (UnlitParams, &'static str) {
    (UnlitParams::textured(), "check")
}

/// Which unlit pipeline to draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlitMode {
    /// Depth tested against the scene; used for light gizmos.
    DepthTested,
    /// No depth attachment; used for full-screen quads.
    Overlay,
}

pub struct UnlitPass {
    layout: wgpu::BindGroupLayout,
    depth_tested: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl UnlitPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("unlit-layout"),
            entries: &[
                uniform_entry::<MatrixBlock>(0, stages),
                uniform_entry::<UnlitParams>(1, stages),
                texture_entry(2, stages),
                sampler_entry(3, stages),
            ],
        });
        let pipeline_layout = pipeline_layout(device, "unlit-pipeline-layout", &[&layout]);
        let module = shader_module(device, "unlit-shader", format!("{COMMON_WGSL}\n{UNLIT_WGSL}"));
        let desc = |label, depth| MeshPipelineDesc {
            label,
            layout: &pipeline_layout,
            module: &module,
            fragment_entry: "fs_main",
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            depth,
            polygon_mode: wgpu::PolygonMode::Fill,
        };
        let depth_tested = mesh_pipeline(
            device,
            &desc("unlit-depth-pipeline", Some(depth_state(true, wgpu::CompareFunction::Less))),
        );
        let overlay = mesh_pipeline(device, &desc("unlit-overlay-pipeline", None));

        Self {
            layout,
            depth_tested,
            overlay,
            sampler: linear_sampler(device, "unlit-sampler", wgpu::AddressMode::ClampToEdge),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        mode: UnlitMode,
        transforms: &Transforms,
        params: &UnlitParams,
        texture: &wgpu::TextureView,
        mesh: &MeshBuffers,
    ) {
        let matrices = uniform_buffer(device, "unlit-matrices", &MatrixBlock::from(transforms));
        let params = uniform_buffer(device, "unlit-params", params);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("unlit-bind-group"),
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
        pass.set_pipeline(match mode {
            UnlitMode::DepthTested => &self.depth_tested,
            UnlitMode::Overlay => &self.overlay,
        });
        pass.set_bind_group(0, &group, &[]);
        mesh.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SCENE_TEXTURES;

    #[test]
    fn gizmos_sample_the_checker_unmodulated() {
        let (params, texture) = gizmo_material();
        assert_eq!(params.textured, 1.0);
        assert_eq!(params.colour, [1.0; 4]);
        assert_eq!(texture, "check");
        assert!(SCENE_TEXTURES.iter().any(|asset| asset.name == texture));
    }

    #[test]
    fn params_match_the_uniform_block() {
        assert_eq!(std::mem::size_of::<UnlitParams>(), 32);
        assert!(UNLIT_WGSL.contains("mix(unlit.colour, unlit.colour * texel, unlit.textured)"));
    }
}
