use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::{
    depth_state, depth_texture_entry, linear_sampler, mesh_pipeline, pipeline_layout, sampler_entry,
    shader_module, texture_entry, uniform_buffer, uniform_entry, MeshPipelineDesc,
};
use crate::light::{Light, LIGHT_COUNT};
use crate::render::mesh::MeshBuffers;
use crate::render::shadow_map::ShadowMap;
use crate::scene::{Scene, SceneObject};

const LIT_WGSL: &str = include_str!("../shaders/lit.wgsl");

/// Photometric and shadow parameters for one light, laid out for WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightBlock {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub direction: [f32; 3],
    pub range: f32,
    pub position: [f32; 3],
    pub exponent: f32,
    pub attenuation: [f32; 3],
    pub specular_power: f32,
    pub kind: [f32; 4],
    pub shadow_bias: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub soften: f32,
    pub soften_radius: f32,
    pub projection: f32,
    pub shadows_enabled: f32,
    pub enabled: f32,
}

impl LightBlock {
    pub fn new(light: &Light, shadows_enabled: bool) -> Self {
        let shadow = light.shadow();
        Self {
            ambient: light.ambient().to_array(),
            diffuse: light.diffuse().to_array(),
            specular: light.specular().to_array(),
            direction: light.direction().to_array(),
            range: light.range(),
            position: light.position().to_array(),
            exponent: light.exponent(),
            attenuation: light.attenuation().to_array(),
            specular_power: light.specular_power(),
            kind: light.kind().one_hot(),
            shadow_bias: shadow.bias,
            near_plane: shadow.near_plane,
            far_plane: shadow.far_plane,
            soften: flag(shadow.soften),
            soften_radius: shadow.soften_radius as f32,
            projection: shadow.projection.as_f32(),
            shadows_enabled: flag(shadows_enabled),
            enabled: flag(light.is_enabled()),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LitMatrices {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_view: [[[f32; 4]; 4]; LIGHT_COUNT],
    pub light_projection: [[[f32; 4]; 4]; LIGHT_COUNT],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightArray {
    pub items: [LightBlock; LIGHT_COUNT],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraBlock {
    pub position: [f32; 3],
    pub time: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexParams {
    pub amplitude: f32,
    pub render_mode: f32,
    pub terrain_resolution: f32,
    pub geometry_type: f32,
}

/// Everything the lit shader reads for one object.
#[derive(Debug, Clone, Copy)]
pub struct LitUniforms {
    pub matrices: LitMatrices,
    pub lights: LightArray,
    pub camera: CameraBlock,
    pub params: VertexParams,
}

impl LitUniforms {
    pub fn for_object(scene: &Scene, object: &SceneObject, view: Mat4, projection: Mat4, time: f32) -> Self {
        let shadows = scene.tunables.shadows_enabled();
        let mut light_view = [Mat4::IDENTITY.to_cols_array_2d(); LIGHT_COUNT];
        let mut light_projection = light_view;
        let mut items = [LightBlock::zeroed(); LIGHT_COUNT];
        for (index, light) in scene.lights.iter().take(LIGHT_COUNT).enumerate() {
            light_view[index] = light.view_matrix().to_cols_array_2d();
            light_projection[index] = light.shadow_projection().to_cols_array_2d();
            items[index] = LightBlock::new(light, shadows);
        }

        Self {
            matrices: LitMatrices {
                world: object.transform.to_cols_array_2d(),
                view: view.to_cols_array_2d(),
                projection: projection.to_cols_array_2d(),
                light_view,
                light_projection,
            },
            lights: LightArray { items },
            camera: CameraBlock {
                position: scene.camera.position().to_array(),
                time,
            },
            params: VertexParams {
                amplitude: scene.tunables.amplitude(),
                render_mode: scene.tunables.render_mode().index() as f32,
                terrain_resolution: object.terrain_resolution,
                geometry_type: object.geometry.as_f32(),
            },
        }
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Prepends the light count and the generated shadow map bindings to the lit shader.
pub fn shader_source() -> String {
    let mut source = format!("const LIGHT_COUNT: u32 = {LIGHT_COUNT}u;\n\n");
    for index in 0..LIGHT_COUNT {
        source.push_str(&format!(
            "@group(2) @binding({index})\nvar shadow_map_{index}: texture_depth_2d;\n"
        ));
    }
    source.push_str("\nfn shadow_depth(index: u32, coord: vec2<i32>) -> f32 {\n    var depth = 1.0;\n    switch index {\n");
    for index in 0..LIGHT_COUNT {
        source.push_str(&format!(
            "        case {index}u: {{ depth = textureLoad(shadow_map_{index}, coord, 0); }}\n"
        ));
    }
    source.push_str("        default: {}\n    }\n    return depth;\n}\n\n");
    source.push_str(
        "fn shadow_map_size() -> vec2<i32> {\n    return vec2<i32>(textureDimensions(shadow_map_0));\n}\n\n",
    );
    source.push_str(LIT_WGSL);
    source
}

/// Textured, lit and shadowed geometry.
pub struct LitPass {
    uniform_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    shadow_layout: wgpu::BindGroupLayout,
    fill: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
    sampler: wgpu::Sampler,
}

impl LitPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, polygon_mode_line: bool) -> Self {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit-uniform-layout"),
            entries: &[
                uniform_entry::<LitMatrices>(0, stages),
                uniform_entry::<LightArray>(1, stages),
                uniform_entry::<CameraBlock>(2, stages),
                uniform_entry::<VertexParams>(3, stages),
            ],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit-material-layout"),
            entries: &[
                texture_entry(0, stages),
                texture_entry(1, stages),
                sampler_entry(2, stages),
            ],
        });
        let shadow_entries: Vec<_> = (0..LIGHT_COUNT as u32)
            .map(|binding| depth_texture_entry(binding, stages))
            .collect();
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit-shadow-layout"),
            entries: &shadow_entries,
        });

        let layout = pipeline_layout(
            device,
            "lit-pipeline-layout",
            &[&uniform_layout, &material_layout, &shadow_layout],
        );
        let module = shader_module(device, "lit-shader", shader_source());
        let desc = |label, polygon_mode| MeshPipelineDesc {
            label,
            layout: &layout,
            module: &module,
            fragment_entry: "fs_main",
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            depth: Some(depth_state(true, wgpu::CompareFunction::Less)),
            polygon_mode,
        };
        let fill = mesh_pipeline(device, &desc("lit-pipeline", wgpu::PolygonMode::Fill));
        let wireframe = polygon_mode_line
            .then(|| mesh_pipeline(device, &desc("lit-wireframe-pipeline", wgpu::PolygonMode::Line)));

        Self {
            uniform_layout,
            material_layout,
            shadow_layout,
            fill,
            wireframe,
            sampler: linear_sampler(device, "lit-sampler", wgpu::AddressMode::Repeat),
        }
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe.is_some()
    }

    /// Binds every light's shadow map; shared by all draws of a frame.
    pub fn shadow_bind_group(&self, device: &wgpu::Device, maps: &[ShadowMap]) -> wgpu::BindGroup {
        let entries: Vec<_> = maps
            .iter()
            .take(LIGHT_COUNT)
            .enumerate()
            .map(|(index, map)| wgpu::BindGroupEntry {
                binding: index as u32,
                resource: wgpu::BindingResource::TextureView(map.shader_view()),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lit-shadow-bind-group"),
            layout: &self.shadow_layout,
            entries: &entries,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'_>,
        uniforms: &LitUniforms,
        diffuse: &wgpu::TextureView,
        height: &wgpu::TextureView,
        shadows: &wgpu::BindGroup,
        mesh: &MeshBuffers,
        wireframe: bool,
    ) {
        let matrices = uniform_buffer(device, "lit-matrices", &uniforms.matrices);
        let lights = uniform_buffer(device, "lit-lights", &uniforms.lights);
        let camera = uniform_buffer(device, "lit-camera", &uniforms.camera);
        let params = uniform_buffer(device, "lit-params", &uniforms.params);
        let uniform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lit-uniform-bind-group"),
            layout: &self.uniform_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: matrices.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params.as_entire_binding(),
                },
            ],
        });
        let material_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lit-material-bind-group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(diffuse),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(height),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let pipeline = match (&self.wireframe, wireframe) {
            (Some(lines), true) => lines,
            _ => &self.fill,
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &uniform_group, &[]);
        pass.set_bind_group(1, &material_group, &[]);
        pass.set_bind_group(2, shadows, &[]);
        mesh.draw(pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::light::LightKind;

    #[test]
    fn blocks_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<LightBlock>(), 144);
        assert_eq!(std::mem::size_of::<LitMatrices>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightArray>(), 144 * LIGHT_COUNT);
        assert_eq!(std::mem::size_of::<CameraBlock>(), 16);
        assert_eq!(std::mem::size_of::<VertexParams>(), 16);
    }

    #[test]
    fn shadows_off_clears_every_light_flag() {
        let mut scene = Scene::demo(&AppConfig::default());
        scene.tunables.set_shadows_enabled(false);
        let (view, projection) = (scene.camera.view_matrix(), Mat4::IDENTITY);
        for object in &scene.objects {
            let uniforms = LitUniforms::for_object(&scene, object, view, projection, 0.0);
            assert!(uniforms.lights.items.iter().all(|light| light.shadows_enabled == 0.0));
        }

        scene.tunables.set_shadows_enabled(true);
        let uniforms = LitUniforms::for_object(&scene, &scene.objects[0], view, projection, 0.0);
        assert!(uniforms.lights.items.iter().all(|light| light.shadows_enabled == 1.0));
    }

    #[test]
    fn light_block_carries_kind_and_projection() {
        let scene = Scene::demo(&AppConfig::default());
        let spot = LightBlock::new(&scene.lights[2], true);
        assert_eq!(spot.kind, LightKind::Spot.one_hot());
        assert_eq!(spot.projection, scene.lights[2].shadow().projection.as_f32());
        assert_eq!(spot.position, [6.0, 14.0, 2.0]);

        let uniforms = LitUniforms::for_object(&scene, &scene.objects[2], Mat4::IDENTITY, Mat4::IDENTITY, 1.5);
        assert_eq!(
            uniforms.matrices.light_projection[2],
            scene.lights[2].shadow_projection().to_cols_array_2d()
        );
        assert_eq!(uniforms.params.geometry_type, 1.0);
        assert_eq!(uniforms.camera.time, 1.5);
    }

    #[test]
    fn terrain_object_is_flagged_for_displacement() {
        let scene = Scene::demo(&AppConfig::default());
        let uniforms = LitUniforms::for_object(&scene, &scene.objects[0], Mat4::IDENTITY, Mat4::IDENTITY, 0.0);
        assert_eq!(uniforms.params.geometry_type, 0.0);
        assert_eq!(uniforms.params.terrain_resolution, 100.0);
        assert_eq!(uniforms.params.amplitude, scene.tunables.amplitude());
    }

    #[test]
    fn generated_source_binds_one_map_per_light() {
        let source = shader_source();
        for index in 0..LIGHT_COUNT {
            assert!(source.contains(&format!("var shadow_map_{index}: texture_depth_2d;")));
            assert!(source.contains(&format!("case {index}u:")));
        }
        assert!(!source.contains(&format!("shadow_map_{LIGHT_COUNT}")));
        assert!(source.starts_with("const LIGHT_COUNT: u32 = 4u;"));
    }
}
