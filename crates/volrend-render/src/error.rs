//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Surface configuration failed.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// A shader fragment could not be read from disk.
    #[error("failed to read shader fragment '{path}': {source}")]
    ShaderSourceUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A GPU validation error raised inside a tagged operation.
    #[error("GPU error in {tag}: {message}")]
    Gpu { tag: &'static str, message: String },

    /// The data manager holds no volume, or it was never uploaded.
    #[error("no volume data available to the renderer")]
    MissingVolumeData,

    /// The renderer was used before a successful init.
    #[error("renderer is not initialized")]
    NotInitialized,

    /// Reading back a texture failed.
    #[error("texture readback failed: {0}")]
    ReadbackFailed(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
