pub mod gpu;
pub mod mesh;
pub mod overlay;
pub mod passes;
pub mod renderer;
pub mod shadow_map;
pub mod target;
pub mod texture;

pub use overlay::OverlayFrame;
pub use renderer::Renderer;
