//! Error types for rendering.

use thiserror::Error;

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid color ramp: {0}")]
    InvalidRamp(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Buffer size mismatch: expected {expected} values, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Style parse error: {0}")]
    Style(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn invalid_ramp(msg: impl Into<String>) -> Self {
        Self::InvalidRamp(msg.into())
    }
}

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;
