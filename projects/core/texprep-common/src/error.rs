//! Error types for raster construction.

use thiserror::Error;

/// Result type for raster operations
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors that can occur when building or converting rasters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Source has a zero or otherwise unusable size
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Supplied pixel buffer does not match the declared dimensions
    #[error("Buffer size mismatch: expected {expected} samples, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}
