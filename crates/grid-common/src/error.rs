//! Error types for grid access and aggregation.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while reading or reducing a grid.
///
/// Out-of-range configuration and empty signal are not errors: the former
/// is clamped, the latter yields a blank output.
#[derive(Debug, Error)]
pub enum GridError {
    /// The dataset path or one of its required variables does not exist.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// The dataset exists but its shape or contents are inconsistent.
    #[error("malformed grid: {0}")]
    MalformedGrid(String),

    /// A time index past the end of the dataset was requested.
    #[error("time index {index} out of range (dataset has {len} steps)")]
    TimeOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Create a DataUnavailable error.
    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    /// Create a MalformedGrid error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedGrid(msg.into())
    }
}
