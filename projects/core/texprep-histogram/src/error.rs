use thiserror::Error;

/// Result type for histogram analysis
pub type AnalyzeResult<T> = Result<T, HistogramError>;

/// Errors returned by [`HistogramAnalyzer`](crate::HistogramAnalyzer).
///
/// A window too narrow to normalize is not an error; that group keeps identity coefficients.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistogramError {
    /// The chain has no level 0 to analyze
    #[error("Cannot analyze an empty mip chain")]
    EmptyChain,

    /// Every sample in a group was NaN
    #[error("No valid samples to analyze")]
    NoSamples,

    /// Percentile bounds are outside `[0, 100]` or not ordered
    #[error("Invalid percentile window: low {low}, high {high}")]
    InvalidPercentiles { low: f32, high: f32 },
}
