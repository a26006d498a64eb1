use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::AssetError;
use crate::mesh::MeshData;
use crate::obj::load_obj_from_str;

/// How a texture's bytes are interpreted on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// sRGB encoded colour.
    Colour,
    /// Linear data such as a height map.
    Data,
}

/// A named texture the scene expects in the asset directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAsset {
    pub name: &'static str,
    pub file: &'static str,
    pub kind: TextureKind,
}

pub const SCENE_TEXTURES: [TextureAsset; 6] = [
    TextureAsset {
        name: "brick",
        file: "brick1.png",
        kind: TextureKind::Colour,
    },
    TextureAsset {
        name: "height",
        file: "height.png",
        kind: TextureKind::Data,
    },
    TextureAsset {
        name: "wood",
        file: "wood.png",
        kind: TextureKind::Colour,
    },
    TextureAsset {
        name: "check",
        file: "checkerboard.png",
        kind: TextureKind::Colour,
    },
    TextureAsset {
        name: "grass",
        file: "grass.png",
        kind: TextureKind::Colour,
    },
    TextureAsset {
        name: "dirt",
        file: "dirt.jpg",
        kind: TextureKind::Colour,
    },
];

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes an image file. `Ok(None)` means the file does not exist; a file
/// that exists but cannot be decoded is an error.
pub fn load_image(path: &Path) -> Result<Option<ImageData>, AssetError> {
    if !path.exists() {
        return Ok(None);
    }
    let image = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.to_rgba8();
    Ok(Some(ImageData {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    }))
}

/// Loads a scene texture, substituting a generated one when the file is missing.
pub fn load_texture(dir: &Path, asset: &TextureAsset) -> Result<ImageData, AssetError> {
    let path = dir.join(asset.file);
    match load_image(&path)? {
        Some(image) => {
            info!(
                "loaded texture {} from {} ({}x{})",
                asset.name,
                path.display(),
                image.width,
                image.height
            );
            Ok(image)
        }
        None => {
            warn!(
                "texture {} not found at {}; using a generated substitute",
                asset.name,
                path.display()
            );
            Ok(procedural_texture(asset.name))
        }
    }
}

/// Loads the OBJ model, or the unit cube when the file does not exist.
pub fn load_model(path: &Path) -> Result<MeshData, AssetError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("model {} not found; using the cube mesh", path.display());
            return Ok(MeshData::cube());
        }
        Err(source) => {
            return Err(AssetError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let mesh = load_obj_from_str(&data).map_err(|err| AssetError::Model {
        path: PathBuf::from(path),
        message: format!("{err:#}"),
    })?;
    info!(
        "loaded model {} ({} vertices, {} indices)",
        path.display(),
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}

const PROCEDURAL_SIZE: u32 = 256;

/// Deterministic stand-in for a named texture.
pub fn procedural_texture(name: &str) -> ImageData {
    let size = PROCEDURAL_SIZE;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            rgba.extend_from_slice(&procedural_texel(name, x, y, size));
        }
    }
    ImageData {
        width: size,
        height: size,
        rgba,
    }
}

fn procedural_texel(name: &str, x: u32, y: u32, size: u32) -> [u8; 4] {
    let checker = ((x / 32) + (y / 32)) % 2 == 0;
    match name {
        "check" => {
            if checker {
                [255, 255, 255, 255]
            } else {
                [20, 20, 20, 255]
            }
        }
        "height" => {
            let (u, v) = (x as f32 / size as f32, y as f32 / size as f32);
            let wave = (u * std::f32::consts::TAU * 2.0).sin() * (v * std::f32::consts::TAU * 2.0).cos();
            let value = ((wave * 0.5 + 0.5) * 255.0) as u8;
            [value, value, value, 255]
        }
        "brick" => {
            let row = y / 16;
            let offset = if row % 2 == 0 { 0 } else { 16 };
            let mortar = y % 16 == 0 || (x + offset) % 32 == 0;
            if mortar {
                [200, 200, 190, 255]
            } else {
                [150, 60, 40, 255]
            }
        }
        "wood" => {
            let grain = ((x as f32 * 0.15).sin() * 0.5 + 0.5) * 40.0;
            [120 + grain as u8, 80 + grain as u8 / 2, 40, 255]
        }
        "grass" => {
            // Blades taper towards the top of the image; everything else is transparent.
            let column = x % 32;
            let half_width = 8 * (size - y) / size;
            let inside = column.abs_diff(16) <= half_width;
            if inside {
                [40, 140 + (y * 80 / size) as u8, 40, 255]
            } else {
                [0, 0, 0, 0]
            }
        }
        "dirt" => {
            let speckle = ((x * 7 + y * 13) % 17) as u8 * 3;
            [100 + speckle, 75 + speckle, 50, 255]
        }
        _ => {
            if checker {
                [255, 0, 255, 255]
            } else {
                [0, 0, 0, 255]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let image = load_texture(dir.path(), &SCENE_TEXTURES[3]).unwrap();
        assert_eq!((image.width, image.height), (PROCEDURAL_SIZE, PROCEDURAL_SIZE));
        assert_eq!(&image.rgba[..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn decodes_existing_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grass.png");
        image::RgbaImage::from_pixel(2, 3, image::Rgba([1, 2, 3, 4]))
            .save(&path)
            .unwrap();
        let image = load_texture(dir.path(), &SCENE_TEXTURES[4]).unwrap();
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(&image.rgba[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn corrupt_texture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wood.png"), b"definitely not a png").unwrap();
        let err = load_texture(dir.path(), &SCENE_TEXTURES[2]).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }

    #[test]
    fn grass_substitute_has_transparent_gaps() {
        let image = procedural_texture("grass");
        let alphas: Vec<u8> = image.rgba.chunks_exact(4).map(|px| px[3]).collect();
        assert!(alphas.contains(&0));
        assert!(alphas.contains(&255));
    }

    #[test]
    fn missing_model_uses_cube() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = load_model(&dir.path().join("teapot.obj")).unwrap();
        assert_eq!(mesh, MeshData::cube());
    }

    #[test]
    fn broken_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.obj");
        fs::write(&path, "v 0 0\n").unwrap();
        assert!(matches!(load_model(&path), Err(AssetError::Model { .. })));
    }
}
