//! The hand-off to an external block compressor.

use crate::{PipelineError, PipelineResult};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use texprep_common::TextureType;

/// Placeholder replaced by the container path the compressor must write.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Placeholder replaced by the per-level image paths, level 0 first.
pub const INPUTS_PLACEHOLDER: &str = "{inputs}";

/// What a compressor is asked to produce.
#[derive(Debug, Clone, Copy)]
pub struct CompressRequest<'a> {
    pub texture_type: TextureType,
    /// One image per mip level, level 0 first.
    pub level_paths: &'a [PathBuf],
    /// Container file to write.
    pub output: &'a Path,
}

/// Turns per-level images into a compressed container file.
///
/// Implementations run synchronously and must have written [`CompressRequest::output`] when
/// they return `Ok`.
pub trait TextureCompressor: Send + Sync {
    fn compress(&self, request: &CompressRequest<'_>) -> PipelineResult<()>;
}

impl<T: TextureCompressor + ?Sized> TextureCompressor for &T {
    fn compress(&self, request: &CompressRequest<'_>) -> PipelineResult<()> {
        (**self).compress(request)
    }
}

/// Runs an external program.
///
/// An argument equal to `{inputs}` expands to one argument per level image. `{output}` is
/// replaced wherever it appears inside an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompressor {
    program: String,
    args: Vec<String>,
}

impl CommandCompressor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace. The first word is the program.
    pub fn parse(command_line: &str) -> PipelineResult<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| PipelineError::InvalidCommand(command_line.to_string()))?;
        Ok(Self::new(program, words.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments passed for `request`, placeholders expanded.
    pub fn expand_args(&self, request: &CompressRequest<'_>) -> Vec<OsString> {
        let output = request.output.to_string_lossy();
        let mut expanded = Vec::with_capacity(self.args.len() + request.level_paths.len());
        for arg in &self.args {
            if arg == INPUTS_PLACEHOLDER {
                expanded.extend(request.level_paths.iter().map(|p| p.as_os_str().to_owned()));
            } else {
                expanded.push(arg.replace(OUTPUT_PLACEHOLDER, &output).into());
            }
        }
        expanded
    }
}

impl TextureCompressor for CommandCompressor {
    fn compress(&self, request: &CompressRequest<'_>) -> PipelineResult<()> {
        let args = self.expand_args(request);
        debug!("Running {} {:?}", self.program, args);
        let output = Command::new(&self.program).args(&args).output()?;
        if !output.status.success() {
            return Err(PipelineError::CompressorFailed {
                program: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !request.output.is_file() {
            return Err(PipelineError::CompressorOutputMissing(
                request.output.to_path_buf(),
            ));
        }
        Ok(())
    }
}
