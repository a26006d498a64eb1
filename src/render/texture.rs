use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

use crate::assets::{load_texture, procedural_texture, ImageData, TextureKind, SCENE_TEXTURES};

/// A sampled 2D texture living on the GPU.
pub struct GpuTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        kind: TextureKind,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let format = match kind {
            TextureKind::Colour => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Data => wgpu::TextureFormat::Rgba8Unorm,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Textures addressed by name, with a fallback for unknown names.
pub struct TextureManager {
    textures: HashMap<String, GpuTexture>,
    missing: GpuTexture,
}

impl TextureManager {
    /// Loads every scene texture from `dir`.
    pub fn load_scene_textures(device: &wgpu::Device, queue: &wgpu::Queue, dir: &Path) -> Result<Self> {
        let missing = GpuTexture::from_image(
            device,
            queue,
            &procedural_texture("missing"),
            TextureKind::Colour,
            "missing-texture",
        );
        let mut manager = Self {
            textures: HashMap::new(),
            missing,
        };
        for asset in &SCENE_TEXTURES {
            let image = load_texture(dir, asset)
                .with_context(|| format!("failed to load texture {}", asset.name))?;
            manager.insert(
                asset.name,
                GpuTexture::from_image(device, queue, &image, asset.kind, asset.name),
            );
        }
        Ok(manager)
    }

    pub fn insert(&mut self, name: &str, texture: GpuTexture) {
        self.textures.insert(name.to_string(), texture);
    }

    pub fn view(&self, name: &str) -> &wgpu::TextureView {
        match self.textures.get(name) {
            Some(texture) => &texture.view,
            None => {
                warn!("unknown texture {name}");
                &self.missing.view
            }
        }
    }
}
