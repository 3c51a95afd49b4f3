//! The texture preparation pipeline.
//!
//! Each texture goes through these stages, in order:
//!
//! 1. Mip generation with the filter profile of its [`TextureType`](texprep_common::TextureType)
//! 2. Toksvig correction for roughness and gloss maps with a companion normal map
//! 3. Ambient occlusion correction for occlusion maps
//! 4. Histogram normalization of every level, when enabled
//! 5. Per-level PNG files handed to a [`TextureCompressor`]
//! 6. Recovery coefficients embedded in the compressed KTX2 container
//!
//! [`Orchestrator::process_batch`] runs independent textures on a bounded thread pool. A
//! failing texture never affects the rest of the batch.
//!
//! # Example
//!
//! ```no_run
//! use texprep_pipeline::{CommandCompressor, Orchestrator, PipelineConfig, TextureJob};
//!
//! let config = PipelineConfig::from_json_file("preset.json".as_ref())?;
//! let compressor = CommandCompressor::parse("toktx --t2 {output} {inputs}")?;
//! let orchestrator = Orchestrator::new(config, compressor);
//! let report = orchestrator.process(&TextureJob::new("rock_roughness.png", "rock_roughness.ktx2"))?;
//! println!("{} levels, metadata embedded: {}", report.levels, report.patch.is_some());
//! # Ok::<(), texprep_pipeline::PipelineError>(())
//! ```

pub mod cancel;
pub mod compressor;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod raster_io;

#[cfg(test)]
pub mod test_prelude;

pub use cancel::CancellationFlag;
pub use compressor::{CommandCompressor, CompressRequest, TextureCompressor};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{Orchestrator, PreparedTexture, TextureJob, TextureReport};
