//! Common test imports and utilities for pipeline tests
#![allow(unused_imports)]

pub use rstest::rstest;

mod rasters;
pub use rasters::*;

use crate::compressor::{CompressRequest, TextureCompressor};
use crate::PipelineResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use texprep_histogram::{HistogramMode, HistogramSettings};

pub fn histogram_settings(mode: HistogramMode) -> HistogramSettings {
    HistogramSettings {
        mode,
        ..Default::default()
    }
}

/// Accepts every request without writing anything.
#[derive(Debug, Default)]
pub struct NoopCompressor;

impl TextureCompressor for NoopCompressor {
    fn compress(&self, _request: &CompressRequest<'_>) -> PipelineResult<()> {
        Ok(())
    }
}

/// Counts requests without writing anything.
#[derive(Debug, Default)]
pub struct CountingCompressor(AtomicUsize);

impl CountingCompressor {
    pub fn calls(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl TextureCompressor for CountingCompressor {
    fn compress(&self, _request: &CompressRequest<'_>) -> PipelineResult<()> {
        self.0.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
