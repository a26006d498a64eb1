use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading textures and models from the asset directory.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse model {}: {message}", .path.display())]
    Model { path: PathBuf, message: String },
}

/// Raised when no window can be opened; `main` falls back to the headless summary.
#[derive(Debug, Error)]
pub enum WindowInitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// Some platform backends panic instead of returning an error when no display is present.
    #[error("failed to initialize {stage}: {message}")]
    Panicked { stage: &'static str, message: String },
}
