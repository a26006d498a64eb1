use glam::Mat4;

/// Depth attachment sized to the swap chain.
pub struct DepthBuffer {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn create(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    pub fn attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }
}

/// Offscreen colour target with its own depth buffer and a matching
/// orthographic projection for drawing full-screen quads into it.
pub struct RenderTarget {
    width: u32,
    height: u32,
    _colour: wgpu::Texture,
    colour_view: wgpu::TextureView,
    depth: DepthBuffer,
    ortho: Mat4,
}

impl RenderTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        near: f32,
        far: f32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let colour = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let colour_view = colour.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthBuffer::create(device, width, height, &format!("{label}-depth"));
        Self {
            width,
            height,
            _colour: colour,
            colour_view,
            depth,
            ortho: ortho_projection(width, height, near, far),
        }
    }

    /// Colour attachment, cleared to `clear` when given, loaded otherwise.
    pub fn colour_attachment(&self, clear: Option<wgpu::Color>) -> wgpu::RenderPassColorAttachment<'_> {
        colour_attachment(&self.colour_view, clear)
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        self.depth.attachment()
    }

    pub fn shader_view(&self) -> &wgpu::TextureView {
        &self.colour_view
    }

    pub fn ortho_matrix(&self) -> Mat4 {
        self.ortho
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

pub fn colour_attachment(
    view: &wgpu::TextureView,
    clear: Option<wgpu::Color>,
) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view,
        depth_slice: None,
        resolve_target: None,
        ops: wgpu::Operations {
            load: match clear {
                Some(colour) => wgpu::LoadOp::Clear(colour),
                None => wgpu::LoadOp::Load,
            },
            store: wgpu::StoreOp::Store,
        },
    }
}

/// Pixel-space orthographic projection centred on the origin.
pub fn ortho_projection(width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let (half_w, half_h) = (width as f32 * 0.5, height as f32 * 0.5);
    Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, near, far)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn ortho_maps_quad_corners_to_clip_corners() {
        let ortho = ortho_projection(1600, 900, 0.1, 200.0);
        let corner = ortho.project_point3(Vec3::new(800.0, -450.0, -10.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y + 1.0).abs() < 1e-5);
        assert!(corner.z > 0.0 && corner.z < 1.0);
    }
}
