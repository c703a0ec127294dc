//! Error types for raster granule decoding.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Error types for opening and decoding fire-detection granules.
#[derive(Debug, Error)]
pub enum RasterError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path is not a granule this reader handles.
    #[error("Unsupported granule file: {0}")]
    UnsupportedFile(String),

    /// File name does not carry a valid granule identity.
    #[error(transparent)]
    BadName(#[from] fdc_common::FdcError),

    /// Missing required variable, dimension, or attribute.
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Inconsistent or undecodable raster contents.
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Error from the NetCDF library.
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),
}
