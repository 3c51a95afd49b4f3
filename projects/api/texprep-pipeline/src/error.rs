//! Error types for the texture pipeline.

use std::path::PathBuf;
use texprep_common::RasterError;
use texprep_histogram::HistogramError;
use texprep_ktx2::Ktx2Error;
use texprep_metadata::MetadataError;
use texprep_mipmap::MipError;
use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort processing of a single texture.
///
/// In a batch, an error only affects the texture it was raised for.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Mip generation or a post-processor failed
    #[error("Mip generation failed: {0}")]
    Mip(#[from] MipError),

    /// Histogram analysis failed
    #[error("Histogram analysis failed: {0}")]
    Histogram(#[from] HistogramError),

    /// The metadata could not be encoded
    #[error("Metadata encoding failed: {0}")]
    Metadata(#[from] MetadataError),

    /// The compressed container could not be parsed or patched
    #[error("Container error: {0}")]
    Container(#[from] Ktx2Error),

    /// A decoded image could not be turned into a raster
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Decoding or encoding an image file failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A preset file could not be parsed
    #[error("Invalid preset: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external compressor exited unsuccessfully
    #[error("Compressor '{program}' failed with status {status:?}: {stderr}")]
    CompressorFailed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The external compressor succeeded but did not produce its output
    #[error("Compressor did not produce {0}")]
    CompressorOutputMissing(PathBuf),

    /// A compressor command line could not be parsed
    #[error("Invalid compressor command: {0}")]
    InvalidCommand(String),

    /// Processing was cancelled before the compressor started
    #[error("Cancelled")]
    Cancelled,

    /// The worker pool could not be created
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
