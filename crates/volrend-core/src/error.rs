//! Error types for volrend-rs.

use thiserror::Error;

/// The main error type for volrend-rs core operations.
#[derive(Error, Debug)]
pub enum VolrendError {
    /// No volume has been loaded into the data manager.
    #[error("no volume data loaded")]
    NoVolumeData,

    /// A volume was declared with a zero-sized axis.
    #[error("invalid volume dimensions {0}x{1}x{2}")]
    InvalidDimensions(u32, u32, u32),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A parameter name that the renderer does not expose.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// A parameter range that is not finite, is inverted, has a non-positive
    /// step, or holds too many samples.
    #[error("invalid range for parameter '{name}': [{min}, {max}] step {step}")]
    InvalidRange {
        name: String,
        min: f32,
        max: f32,
        step: f32,
    },

    /// A malformed command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Rendering error surfaced through the facade.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for volrend-rs core operations.
pub type Result<T> = std::result::Result<T, VolrendError>;
