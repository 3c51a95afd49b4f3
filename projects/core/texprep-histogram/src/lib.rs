//! Percentile based dynamic range normalization.
//!
//! Low contrast textures waste most of the range a block compressor can represent. The
//! [`HistogramAnalyzer`] measures a robust `[low, high]` window from level 0 of a mip chain,
//! ignoring outliers, and remaps that window to `[0, 1]` on every level. The inverse
//! coefficients ([`HistogramResult::stored_coefficients`]) are what gets embedded in the
//! output container so a shader can restore the original values with a single multiply-add.

pub mod analyzer;
pub mod error;
pub mod percentile;
pub mod result;
pub mod settings;

pub use analyzer::{GroupDiagnostics, HistogramAnalysis, HistogramAnalyzer};
pub use error::{AnalyzeResult, HistogramError};
pub use result::{forward_coefficients, inverse_coefficients, soft_knee, HistogramResult};
pub use settings::{ChannelMode, HistogramMode, HistogramSettings};
