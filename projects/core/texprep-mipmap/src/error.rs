//! Error types for mip generation.

use texprep_common::RasterError;
use thiserror::Error;

/// Result type for mip generation
pub type MipResult<T> = Result<T, MipError>;

/// Errors that abort mip generation for a single texture.
///
/// Soft problems such as a companion normal map with the wrong size never surface here;
/// the affected correction is skipped and a warning is logged instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MipError {
    /// Source image has zero width or height
    #[error("Invalid source dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Raster construction failed
    #[error("Raster error: {0}")]
    Raster(RasterError),

    /// An empty chain was supplied where at least level 0 is required
    #[error("Mip chain is empty")]
    EmptyChain,
}

impl From<RasterError> for MipError {
    fn from(e: RasterError) -> Self {
        match e {
            RasterError::InvalidDimensions { width, height } => {
                MipError::InvalidDimensions { width, height }
            }
            other => MipError::Raster(other),
        }
    }
}
