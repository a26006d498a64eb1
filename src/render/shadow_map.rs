/// Depth-only render target for one light.
///
/// Holds two views of the same texture: one bound as the depth attachment of
/// the shadow pass and one sampled by the lit pass.
pub struct ShadowMap {
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    shader_view: wgpu::TextureView,
}

impl ShadowMap {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, index: usize, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("shadow-map-{index}")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("shadow-map-{index}-depth")),
            ..Default::default()
        });
        let shader_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("shadow-map-{index}-shader")),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });
        Self {
            width,
            height,
            _texture: texture,
            depth_view,
            shader_view,
        }
    }

    /// Depth attachment for a pass with no colour target, cleared to the far plane.
    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    pub fn shader_view(&self) -> &wgpu::TextureView {
        &self.shader_view
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
