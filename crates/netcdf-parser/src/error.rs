//! Error types for NetCDF reading.

use grid_common::GridError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing file, variable or dimension
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<NetCdfError> for GridError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => GridError::Io(e),
            NetCdfError::MissingData(msg) => GridError::DataUnavailable(msg),
            NetCdfError::InvalidFormat(msg) => GridError::MalformedGrid(msg),
        }
    }
}
