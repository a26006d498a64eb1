//! egui overlay, recorded as the last pass on the back buffer.
//!
//! Unlike the scene passes this one keeps state between frames: egui-wgpu
//! holds the font atlas and any other egui textures until egui frees them.

use super::target::colour_attachment;

/// Tessellated UI for one frame, ready to paint.
pub struct OverlayFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

impl OverlayFrame {
    /// Tessellates the shapes of a finished egui frame. The platform output is
    /// left for the caller to hand back to egui-winit.
    pub fn tessellate(ctx: &egui::Context, output: egui::FullOutput) -> (Self, egui::PlatformOutput) {
        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            pixels_per_point,
            ..
        } = output;
        let frame = Self {
            primitives: ctx.tessellate(shapes, pixels_per_point),
            textures_delta,
            pixels_per_point,
        };
        (frame, platform_output)
    }

    pub fn screen(&self, width: u32, height: u32) -> egui_wgpu::ScreenDescriptor {
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: self.pixels_per_point,
        }
    }
}

pub struct OverlayPass {
    painter: egui_wgpu::Renderer,
}

impl OverlayPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            painter: egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default()),
        }
    }

    /// Uploads texture and vertex data, then paints over `back_buffer`
    /// without clearing it. Returns command buffers egui callbacks asked for;
    /// they must be submitted ahead of `encoder`.
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        back_buffer: &wgpu::TextureView,
        screen: &egui_wgpu::ScreenDescriptor,
        frame: &OverlayFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, delta) in &frame.textures_delta.set {
            self.painter.update_texture(device, queue, *id, delta);
        }
        let callbacks = self
            .painter
            .update_buffers(device, queue, encoder, &frame.primitives, screen);

        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("overlay-pass"),
            color_attachments: &[Some(colour_attachment(back_buffer, None))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.painter
            .render(&mut pass.forget_lifetime(), &frame.primitives, screen);

        for id in &frame.textures_delta.free {
            self.painter.free_texture(id);
        }
        callbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::gui::TuningPanel;
    use crate::scene::Scene;

    #[test]
    fn fonts_upload_first_then_the_panel_paints() {
        let mut scene = Scene::demo(&AppConfig::default());
        let mut panel = TuningPanel::new();
        let ctx = egui::Context::default();
        let mut run = || {
            let output = ctx.run(egui::RawInput::default(), |ctx| {
                panel.show(ctx, &mut scene, 60.0);
            });
            OverlayFrame::tessellate(&ctx, output).0
        };
        let first = run();
        assert!(!first.textures_delta.set.is_empty());
        // The window is sized on the first frame and painted from the second.
        let frame = run();
        assert!(!frame.primitives.is_empty());

        let screen = frame.screen(1280, 720);
        assert_eq!(screen.size_in_pixels, [1280, 720]);
        assert_eq!(screen.pixels_per_point, frame.pixels_per_point);
    }
}
