use bytemuck::{Pod, Zeroable};

use super::{
    linear_sampler, mesh_pipeline, pipeline_layout, sampler_entry, shader_module, texture_entry,
    uniform_buffer, uniform_entry, MatrixBlock, MeshPipelineDesc, Transforms, COMMON_WGSL,
};
use crate::render::mesh::MeshBuffers;
use crate::tuning::BloomSettings;

/// Parameter block, its binding and the saturation helper shared by both stages.
const BLOOM_COMMON_WGSL: &str = include_str!("../shaders/bloom_common.wgsl");
const EXTRACT_WGSL: &str = include_str!("../shaders/bloom_extract.wgsl");
const COMPOSITE_WGSL: &str = include_str!("../shaders/bloom_composite.wgsl");

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BloomParams {
    pub threshold: f32,
    pub intensity: f32,
    pub saturation: f32,
    pub scene_intensity: f32,
    pub scene_saturation: f32,
    pub _pad: [f32; 3],
}

impl From<BloomSettings> for BloomParams {
    fn from(settings: BloomSettings) -> Self {
        Self {
            threshold: settings.threshold,
            intensity: settings.intensity,
            saturation: settings.saturation,
            scene_intensity: settings.scene_intensity,
            scene_saturation: settings.scene_saturation,
            _pad: [0.0; 3],
        }
    }
}

fn extract_source() -> String {
    format!("{COMMON_WGSL}\n{BLOOM_COMMON_WGSL}\n{EXTRACT_WGSL}")
}

fn composite_source() -> String {
    format!("{COMMON_WGSL}\n{BLOOM_COMMON_WGSL}\n{COMPOSITE_WGSL}")
}

/// Bright-pass extraction and the final bloom/scene combine.
pub struct BloomPass {
    extract_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    extract: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
}

impl BloomPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let extract_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-extract-layout"),
            entries: &[
                uniform_entry::<MatrixBlock>(0, stages),
                uniform_entry::<BloomParams>(1, stages),
                texture_entry(2, stages),
                sampler_entry(3, stages),
            ],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-composite-layout"),
            entries: &[
                uniform_entry::<MatrixBlock>(0, stages),
                uniform_entry::<BloomParams>(1, stages),
                texture_entry(2, stages),
                texture_entry(3, stages),
                sampler_entry(4, stages),
            ],
        });

        let extract_pipeline_layout =
            pipeline_layout(device, "bloom-extract-pipeline-layout", &[&extract_layout]);
        let extract_module =
            shader_module(device, "bloom-extract-shader", extract_source());
        let extract = mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "bloom-extract-pipeline",
                layout: &extract_pipeline_layout,
                module: &extract_module,
                fragment_entry: "fs_main",
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                depth: None,
                polygon_mode: wgpu::PolygonMode::Fill,
            },
        );

        let composite_pipeline_layout =
            pipeline_layout(device, "bloom-composite-pipeline-layout", &[&composite_layout]);
        let composite_module = shader_module(
            device,
            "bloom-composite-shader",
            composite_source(),
        );
        let composite = mesh_pipeline(
            device,
            &MeshPipelineDesc {
                label: "bloom-composite-pipeline",
                layout: &composite_pipeline_layout,
                module: &composite_module,
                fragment_entry: "fs_main",
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                depth: None,
                polygon_mode: wgpu::PolygonMode::Fill,
            },
        );

        Self {
            extract_layout,
            composite_layout,
            extract,
            composite,
            sampler: linear_sampler(device, "bloom-sampler", wgpu::AddressMode::ClampToEdge),
        }
    }

    pub fn draw_extract(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        transforms: &Transforms,
        params: &BloomParams,
        scene: &wgpu::TextureView,
        quad: &MeshBuffers,
    ) {
        let matrices = uniform_buffer(device, "bloom-extract-matrices", &MatrixBlock::from(transforms));
        let params = uniform_buffer(device, "bloom-extract-params", params);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom-extract-bind-group"),
            layout: &self.extract_layout,
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
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        pass.set_pipeline(&self.extract);
        pass.set_bind_group(0, &group, &[]);
        quad.draw(pass);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_composite(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        transforms: &Transforms,
        params: &BloomParams,
        scene: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
        quad: &MeshBuffers,
    ) {
        let matrices = uniform_buffer(device, "bloom-composite-matrices", &MatrixBlock::from(transforms));
        let params = uniform_buffer(device, "bloom-composite-params", params);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom-composite-bind-group"),
            layout: &self.composite_layout,
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
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        pass.set_pipeline(&self.composite);
        pass.set_bind_group(0, &group, &[]);
        quad.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::SceneTunables;

    #[test]
    fn params_copy_all_five_settings() {
        let mut tunables = SceneTunables::default();
        tunables.set_bloom_threshold(0.25);
        tunables.set_scene_saturation(2.0);
        let params = BloomParams::from(tunables.bloom());
        assert_eq!(params.threshold, 0.25);
        assert_eq!(params.intensity, 1.25);
        assert_eq!(params.scene_saturation, 2.0);
        assert_eq!(std::mem::size_of::<BloomParams>(), 32);
    }

    #[test]
    fn extract_shapes_the_glow_with_every_bloom_setting() {
        let source = extract_source();
        for setting in ["bloom.threshold", "bloom.intensity", "bloom.saturation"] {
            assert!(source.contains(setting), "{setting}");
        }
        assert!(source.contains("adjust_saturation(bright, bloom.saturation) * bloom.intensity"));
    }

    #[test]
    fn stages_share_one_saturation_helper() {
        for source in [extract_source(), composite_source()] {
            assert_eq!(source.matches("fn adjust_saturation").count(), 1);
            assert_eq!(source.matches("struct BloomParams").count(), 1);
        }
        assert!(!EXTRACT_WGSL.contains("fn adjust_saturation"));
        assert!(!COMPOSITE_WGSL.contains("fn adjust_saturation"));
        assert!(composite_source().contains("adjust_saturation(base, bloom.scene_saturation)"));
    }
}
