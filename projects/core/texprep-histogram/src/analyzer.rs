//! Percentile analysis and application of the normalization.

use crate::percentile::{percentile_window, tail_fraction};
use crate::result::soft_knee;
use crate::{
    AnalyzeResult, ChannelMode, HistogramError, HistogramMode, HistogramResult, HistogramSettings,
};
use log::{debug, warn};
use texprep_common::{MipChain, Raster, CHANNELS};

/// Measurements taken for one channel group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupDiagnostics {
    pub group: usize,
    pub low: f32,
    pub high: f32,
    /// Fraction of samples outside `[low, high]`.
    pub tail_fraction: f32,
    /// `true` when the window was too narrow and the group keeps identity coefficients.
    pub skipped: bool,
}

impl GroupDiagnostics {
    pub fn span(&self) -> f32 {
        self.high - self.low
    }
}

/// Outcome of [`HistogramAnalyzer::analyze_with_diagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAnalysis {
    /// [`None`] when normalization is off or every group was skipped.
    pub result: Option<HistogramResult>,
    pub groups: Vec<GroupDiagnostics>,
}

/// Computes and applies percentile based normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistogramAnalyzer {
    settings: HistogramSettings,
}

impl HistogramAnalyzer {
    pub fn new(settings: HistogramSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HistogramSettings {
        &self.settings
    }

    /// Analyzes level 0 of `chain`.
    ///
    /// # Errors
    ///
    /// [`HistogramError::EmptyChain`] if `chain` has no levels.
    pub fn analyze(&self, chain: &MipChain) -> AnalyzeResult<Option<HistogramResult>> {
        Ok(self.analyze_with_diagnostics(chain)?.result)
    }

    /// Analyzes level 0 of `chain` and reports what was measured for every group.
    pub fn analyze_with_diagnostics(&self, chain: &MipChain) -> AnalyzeResult<HistogramAnalysis> {
        let base = chain.level(0).ok_or(HistogramError::EmptyChain)?;
        self.analyze_raster(&base.raster)
    }

    /// Analyzes a single raster.
    pub fn analyze_raster(&self, raster: &Raster) -> AnalyzeResult<HistogramAnalysis> {
        let settings = &self.settings;
        if settings.mode == HistogramMode::Off {
            return Ok(HistogramAnalysis {
                result: None,
                groups: Vec::new(),
            });
        }
        validate(settings)?;

        let channel_mode = settings.channel_mode;
        let mut windows = Vec::with_capacity(channel_mode.group_count());
        let mut groups = Vec::with_capacity(channel_mode.group_count());
        for group in 0..channel_mode.group_count() {
            let mut samples = group_samples(raster, channel_mode, group);
            let Some((low, high)) = percentile_window(
                &mut samples,
                settings.percentile_low,
                settings.percentile_high,
            ) else {
                return Err(HistogramError::NoSamples);
            };

            let tail = tail_fraction(&samples, low, high);
            if tail > settings.tail_threshold {
                warn!(
                    "Histogram group {group}: {:.1}% of samples outside [{low:.4}, {high:.4}], texture may be noisy",
                    tail * 100.0
                );
            }

            let skipped = high - low < settings.min_range_threshold;
            if skipped {
                warn!(
                    "Histogram group {group}: span {:.4} below {:.4}, leaving unnormalized",
                    high - low,
                    settings.min_range_threshold
                );
                windows.push(None);
            } else {
                windows.push(Some((low, high)));
            }

            groups.push(GroupDiagnostics {
                group,
                low,
                high,
                tail_fraction: tail,
                skipped,
            });
        }

        let result = if windows.iter().all(Option::is_none) {
            None
        } else {
            Some(HistogramResult::from_windows(channel_mode, &windows))
        };
        if let Some(result) = &result {
            debug!(
                "Histogram window [{:.4}, {:.4}] over {} groups",
                result.range_low(),
                result.range_high(),
                result.group_count()
            );
        }
        Ok(HistogramAnalysis { result, groups })
    }

    /// Returns `chain` with every level forward normalized by `result`.
    ///
    /// [`HistogramMode::Percentile`] clips outliers to `[0, 1]`. In
    /// [`HistogramMode::PercentileWithKnee`] out-of-window values are soft-clamped before the
    /// linear remap instead, so they land in `[-knee_width, 1 + knee_width]` and keep their order.
    pub fn apply(&self, result: &HistogramResult, chain: &MipChain) -> MipChain {
        chain
            .iter()
            .map(|level| self.apply_raster(result, &level.raster))
            .collect()
    }

    /// Forward normalizes one raster.
    pub fn apply_raster(&self, result: &HistogramResult, raster: &Raster) -> Raster {
        let knee = self.settings.mode == HistogramMode::PercentileWithKnee;
        let knee_width = self.settings.knee_width;
        let channel_mode = result.channel_mode();

        let mut out = raster.clone();
        for group in 0..result.group_count() {
            let (scale, offset) = (result.scale()[group], result.offset()[group]);
            if scale == 1.0 && offset == 0.0 {
                continue;
            }
            let low = -offset / scale;
            let high = low + 1.0 / scale;
            for &c in channel_mode.channels(group) {
                out.map_channel(c, |v| {
                    if knee {
                        soft_knee(v, low, high, knee_width) * scale + offset
                    } else {
                        (v * scale + offset).clamp(0.0, 1.0)
                    }
                });
            }
        }
        out
    }
}

fn validate(settings: &HistogramSettings) -> AnalyzeResult<()> {
    let range = 0.0..=100.0;
    if !range.contains(&settings.percentile_low)
        || !range.contains(&settings.percentile_high)
        || settings.percentile_low >= settings.percentile_high
    {
        return Err(HistogramError::InvalidPercentiles {
            low: settings.percentile_low,
            high: settings.percentile_high,
        });
    }
    Ok(())
}

/// The samples of one group, NaNs removed.
fn group_samples(raster: &Raster, channel_mode: ChannelMode, group: usize) -> Vec<f32> {
    let samples = raster.samples();
    match channel_mode {
        ChannelMode::AverageLuminance => samples
            .chunks_exact(CHANNELS)
            .map(|px| (px[0] + px[1] + px[2]) / 3.0)
            .filter(|v| !v.is_nan())
            .collect(),
        _ => raster.channel(group).filter(|v| !v.is_nan()).collect(),
    }
}
