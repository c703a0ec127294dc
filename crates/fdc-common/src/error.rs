//! Error types shared across the FDC pipeline crates.

use thiserror::Error;

/// Result type alias using FdcError.
pub type FdcResult<T> = Result<T, FdcError>;

/// Primary error type for shared FDC operations.
#[derive(Debug, Error)]
pub enum FdcError {
    /// File name does not follow the NOAA Big Data archive convention.
    #[error("Invalid granule file name: {0}")]
    InvalidFileName(String),

    /// A perimeter blob was shorter than its header claims.
    #[error("Perimeter blob too short: have {have} bytes, need {need}")]
    BlobTooShort { have: usize, need: usize },

    /// A perimeter blob carried bytes beyond the encoded pixel records.
    #[error("Perimeter blob has {extra} trailing bytes")]
    BlobTrailingBytes { extra: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
