//! Multi-light shadow mapping and bloom demo on wgpu.
//!
//! Everything up to the GPU boundary (lights, tunables, the per-frame pass
//! plan, mesh generation, asset loading and the tuning panel) is plain data
//! and is unit tested without a device. The `render` module turns a
//! [`FramePlan`] into wgpu passes.

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod gui;
pub mod input;
pub mod light;
pub mod logging;
pub mod mesh;
pub mod obj;
pub mod render;
pub mod scene;
pub mod time;
pub mod tuning;

pub use app::{print_summary, run_interactive};
pub use config::{AppConfig, CliOptions};
pub use error::{AssetError, WindowInitError};
pub use frame::{FramePlan, PassPlan, Stage, Target};
pub use input::{InputState, KeyCode, NamedKey};
pub use light::{Light, LightKind, ProjectionKind, LIGHT_COUNT};
pub use obj::load_obj_from_str;
pub use render::Renderer;
pub use scene::{Scene, SceneObject};
pub use tuning::{LightTuning, SceneTunables};
