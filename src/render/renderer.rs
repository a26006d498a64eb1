use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Mat4;
use log::{debug, info, warn};
use winit::window::Window;

use super::gpu::{surface_error_action, GpuContext, SurfaceErrorAction};
use super::mesh::SceneMeshes;
use super::overlay::{OverlayFrame, OverlayPass};
use super::passes::billboard::{BillboardParams, BillboardPass};
use super::passes::bloom::{BloomParams, BloomPass};
use super::passes::blur::{BlurParams, BlurPass};
use super::passes::depth::{DepthParams, DepthPass};
use super::passes::lit::{LitPass, LitUniforms};
use super::passes::unlit::{gizmo_material, UnlitMode, UnlitParams, UnlitPass};
use super::passes::Transforms;
use super::shadow_map::ShadowMap;
use super::target::{colour_attachment, DepthBuffer, RenderTarget};
use super::texture::TextureManager;
use crate::assets::load_model;
use crate::camera::Camera;
use crate::config::AppConfig;
use crate::frame::{BillboardBlend, BlurAxis, FramePlan, PassPlan, Stage, Target, CLEAR_COLOUR};
use crate::light::LIGHT_COUNT;
use crate::scene::{gizmo_transform, Scene};
use crate::time::FrameTime;

pub const SCREEN_NEAR: f32 = 0.1;
pub const SCREEN_FAR: f32 = 200.0;
pub const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;

/// Offscreen colour targets of the bloom chain.
pub struct RenderTargets {
    pub scene: RenderTarget,
    pub bloom_extract: RenderTarget,
    pub horizontal_blur: RenderTarget,
    pub vertical_blur: RenderTarget,
    pub bloom_composite: RenderTarget,
}

impl RenderTargets {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let target = |label| RenderTarget::new(device, label, width, height, format, SCREEN_NEAR, SCREEN_FAR);
        Self {
            scene: target("scene-target"),
            bloom_extract: target("bloom-extract-target"),
            horizontal_blur: target("horizontal-blur-target"),
            vertical_blur: target("vertical-blur-target"),
            bloom_composite: target("bloom-composite-target"),
        }
    }

    pub fn get(&self, target: Target) -> Option<&RenderTarget> {
        match target {
            Target::Scene => Some(&self.scene),
            Target::BloomExtract => Some(&self.bloom_extract),
            Target::HorizontalBlur => Some(&self.horizontal_blur),
            Target::VerticalBlur => Some(&self.vertical_blur),
            Target::BloomComposite => Some(&self.bloom_composite),
            Target::BackBuffer | Target::ShadowMap(_) => None,
        }
    }
}

pub struct Passes {
    pub lit: LitPass,
    pub unlit: UnlitPass,
    pub depth: DepthPass,
    pub bloom: BloomPass,
    pub blur: BlurPass,
    pub billboard: BillboardPass,
}

/// Owns every GPU resource and executes a [`FramePlan`] each frame.
pub struct Renderer {
    window: Arc<Window>,
    gpu: GpuContext,
    depth: DepthBuffer,
    meshes: SceneMeshes,
    textures: TextureManager,
    targets: RenderTargets,
    shadow_maps: Vec<ShadowMap>,
    passes: Passes,
    overlay: OverlayPass,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self> {
        let gpu = GpuContext::new(window.clone(), config.vsync).await?;
        let (width, height) = (gpu.config.width, gpu.config.height);
        let format = gpu.format();
        let device = &gpu.device;

        let model_path = config.model_path();
        let model = load_model(&model_path)
            .with_context(|| format!("failed to load model {}", model_path.display()))?;
        let meshes = SceneMeshes::new(device, &model, width as f32, height as f32);
        let textures = TextureManager::load_scene_textures(device, &gpu.queue, &config.assets_dir)?;

        let shadow_maps = (0..LIGHT_COUNT)
            .map(|index| ShadowMap::new(device, index, config.shadow_map_size, config.shadow_map_size))
            .collect();
        info!(
            "created {} shadow maps at {}x{}",
            LIGHT_COUNT, config.shadow_map_size, config.shadow_map_size
        );

        let passes = Passes {
            lit: LitPass::new(device, format, gpu.polygon_mode_line),
            unlit: UnlitPass::new(device, format),
            depth: DepthPass::new(device),
            bloom: BloomPass::new(device, format),
            blur: BlurPass::new(device, format),
            billboard: BillboardPass::new(device, format),
        };
        let overlay = OverlayPass::new(device, format);
        if !passes.lit.supports_wireframe() {
            info!("adapter lacks line polygon mode; wireframe toggle disabled");
        }

        Ok(Self {
            window,
            depth: DepthBuffer::create(device, width, height, "back-buffer-depth"),
            targets: RenderTargets::new(device, width, height, format),
            meshes,
            textures,
            shadow_maps,
            passes,
            overlay,
            gpu,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn supports_wireframe(&self) -> bool {
        self.passes.lit.supports_wireframe()
    }

    /// Reconfigures the swap chain and its depth buffer. Offscreen targets keep
    /// their start-up size; the full-screen quads stretch them over the new surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.gpu.resize(width, height) {
            return;
        }
        self.depth = DepthBuffer::create(&self.gpu.device, width, height, "back-buffer-depth");
        debug!("resized swap chain to {width}x{height}");
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.gpu.config.width as f32 / self.gpu.config.height.max(1) as f32;
        Mat4::perspective_rh(FIELD_OF_VIEW, aspect, SCREEN_NEAR, SCREEN_FAR)
    }

    /// Applies the recovery action for a failed frame; only fatal errors propagate.
    pub fn handle_surface_error(&mut self, error: wgpu::SurfaceError) -> Result<()> {
        match surface_error_action(&error) {
            SurfaceErrorAction::Reconfigure => {
                warn!("surface {error:?}; reconfiguring");
                self.gpu.reconfigure();
                Ok(())
            }
            SurfaceErrorAction::SkipFrame => {
                warn!("surface {error:?}; skipping frame");
                Ok(())
            }
            SurfaceErrorAction::Fatal => Err(anyhow!("unrecoverable surface error: {error:?}")),
        }
    }

    /// Records and submits one frame, finishing with the UI overlay. Returns
    /// the plan that was executed.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        time: &FrameTime,
        overlay: &OverlayFrame,
    ) -> Result<FramePlan, wgpu::SurfaceError> {
        let plan = FramePlan::build(&scene.tunables, &scene.lights);
        let output = self.gpu.surface.get_current_texture()?;
        let back_buffer = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        let mut callbacks = Vec::new();

        for pass in &plan.passes {
            match &pass.stage {
                Stage::Scene {
                    billboards,
                    gizmos,
                    ..
                } => self.encode_scene(&mut encoder, &back_buffer, pass, scene, time, *billboards, gizmos),
                Stage::Shadow { light } => {
                    scene.refresh_light(*light);
                    self.encode_shadow(&mut encoder, scene, *light);
                }
                Stage::BloomExtract => self.encode_bloom_extract(&mut encoder, pass, scene),
                Stage::Blur(axis) => self.encode_blur(&mut encoder, pass, *axis),
                Stage::BloomComposite => self.encode_bloom_composite(&mut encoder, pass, scene),
                Stage::Final { composite } => self.encode_final(&mut encoder, &back_buffer, pass, *composite),
                Stage::Overlay => {
                    let screen = overlay.screen(self.gpu.config.width, self.gpu.config.height);
                    callbacks = self.overlay.encode(
                        &self.gpu.device,
                        &self.gpu.queue,
                        &mut encoder,
                        &back_buffer,
                        &screen,
                        overlay,
                    );
                }
            }
        }

        self.gpu
            .queue
            .submit(callbacks.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(plan)
    }

    fn clear_colour(clear: bool) -> Option<wgpu::Color> {
        clear.then_some(wgpu::Color {
            r: CLEAR_COLOUR[0],
            g: CLEAR_COLOUR[1],
            b: CLEAR_COLOUR[2],
            a: CLEAR_COLOUR[3],
        })
    }

    fn target(&self, target: Target) -> &RenderTarget {
        // Offscreen stages only ever name offscreen targets.
        self.targets.get(target).unwrap_or(&self.targets.scene)
    }

    fn input_view(&self, plan: &PassPlan, index: usize) -> &wgpu::TextureView {
        let target = plan.inputs.get(index).copied().unwrap_or(Target::Scene);
        self.target(target).shader_view()
    }

    fn quad_transforms(target: &RenderTarget) -> Transforms {
        Transforms::new(Mat4::IDENTITY, Camera::ortho_view_matrix(), target.ortho_matrix())
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_scene(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        back_buffer: &wgpu::TextureView,
        plan: &PassPlan,
        scene: &Scene,
        time: &FrameTime,
        billboards: Option<BillboardBlend>,
        gizmos: &[usize],
    ) {
        let device = &self.gpu.device;
        let view = scene.camera.view_matrix();
        let projection = self.projection_matrix();
        let shadow_group = self.passes.lit.shadow_bind_group(device, &self.shadow_maps);
        let clear = Self::clear_colour(plan.clear);
        let (colour, depth) = match plan.output {
            Target::BackBuffer => (colour_attachment(back_buffer, clear), self.depth.attachment()),
            other => {
                let target = self.target(other);
                (target.colour_attachment(clear), target.depth_attachment())
            }
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene-pass"),
            color_attachments: &[Some(colour)],
            depth_stencil_attachment: Some(depth),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let height = self.textures.view("height");
        let wireframe = scene.tunables.wireframe();
        for object in &scene.objects {
            let uniforms = LitUniforms::for_object(scene, object, view, projection, time.elapsed);
            self.passes.lit.draw(
                device,
                &mut pass,
                &uniforms,
                self.textures.view(object.texture),
                height,
                &shadow_group,
                self.meshes.get(object.mesh),
                wireframe,
            );
        }

        if let Some(blend) = billboards {
            self.passes.billboard.draw(
                device,
                &mut pass,
                blend,
                &Transforms::new(scene.grass_transform, view, projection),
                &BillboardParams::new(scene.camera.position(), time.elapsed),
                self.textures.view("grass"),
                &self.meshes.terrain,
            );
        }

        let (gizmo_params, gizmo_texture) = gizmo_material();
        for light in gizmos.iter().filter_map(|&index| scene.lights.get(index)) {
            self.passes.unlit.draw(
                device,
                &mut pass,
                UnlitMode::DepthTested,
                &Transforms::new(gizmo_transform(light), view, projection),
                &gizmo_params,
                self.textures.view(gizmo_texture),
                &self.meshes.sphere,
            );
        }
    }

    fn encode_shadow(&self, encoder: &mut wgpu::CommandEncoder, scene: &Scene, index: usize) {
        let (Some(light), Some(map)) = (scene.lights.get(index), self.shadow_maps.get(index)) else {
            return;
        };
        let device = &self.gpu.device;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow-pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(map.depth_attachment()),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let (view, projection) = (light.view_matrix(), light.shadow_projection());
        let height = self.textures.view("height");
        for object in &scene.objects {
            self.passes.depth.draw(
                device,
                &mut pass,
                &Transforms::new(object.shadow_transform, view, projection),
                &DepthParams::new(light, scene.tunables.amplitude(), object.geometry),
                height,
                self.meshes.get(object.mesh),
            );
        }
    }

    fn begin_quad_pass<'e>(
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        colour: wgpu::RenderPassColorAttachment<'_>,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(colour)],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    fn encode_bloom_extract(&self, encoder: &mut wgpu::CommandEncoder, plan: &PassPlan, scene: &Scene) {
        let output = self.target(plan.output);
        let mut pass = Self::begin_quad_pass(
            encoder,
            "bloom-extract-pass",
            output.colour_attachment(Self::clear_colour(plan.clear)),
        );
        self.passes.bloom.draw_extract(
            &self.gpu.device,
            &mut pass,
            &Self::quad_transforms(output),
            &BloomParams::from(scene.tunables.bloom()),
            self.input_view(plan, 0),
            &self.meshes.screen_quad,
        );
    }

    fn encode_blur(&self, encoder: &mut wgpu::CommandEncoder, plan: &PassPlan, axis: BlurAxis) {
        let output = self.target(plan.output);
        let (width, height) = output.dimensions();
        let mut pass = Self::begin_quad_pass(
            encoder,
            "blur-pass",
            output.colour_attachment(Self::clear_colour(plan.clear)),
        );
        self.passes.blur.draw(
            &self.gpu.device,
            &mut pass,
            axis,
            &Self::quad_transforms(output),
            &BlurParams::new(width, height),
            self.input_view(plan, 0),
            &self.meshes.screen_quad,
        );
    }

    fn encode_bloom_composite(&self, encoder: &mut wgpu::CommandEncoder, plan: &PassPlan, scene: &Scene) {
        let output = self.target(plan.output);
        let mut pass = Self::begin_quad_pass(
            encoder,
            "bloom-composite-pass",
            output.colour_attachment(Self::clear_colour(plan.clear)),
        );
        self.passes.bloom.draw_composite(
            &self.gpu.device,
            &mut pass,
            &Self::quad_transforms(output),
            &BloomParams::from(scene.tunables.bloom()),
            self.input_view(plan, 0),
            self.input_view(plan, 1),
            &self.meshes.screen_quad,
        );
    }

    fn encode_final(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        back_buffer: &wgpu::TextureView,
        plan: &PassPlan,
        composite: bool,
    ) {
        if !plan.clear && !composite {
            return;
        }
        let mut pass = Self::begin_quad_pass(
            encoder,
            "final-pass",
            colour_attachment(back_buffer, Self::clear_colour(plan.clear)),
        );
        if composite {
            self.passes.unlit.draw(
                &self.gpu.device,
                &mut pass,
                UnlitMode::Overlay,
                &Self::quad_transforms(&self.targets.bloom_composite),
                &UnlitParams::textured(),
                self.input_view(plan, 0),
                &self.meshes.screen_quad,
            );
        }
    }
}
