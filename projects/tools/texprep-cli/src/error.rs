use std::path::PathBuf;
use texprep_pipeline::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("{0} does not contain a recovery coefficient block")]
    NoCoefficients(PathBuf),
    #[error("{failed} of {total} textures failed")]
    BatchFailed { failed: usize, total: usize },
}
