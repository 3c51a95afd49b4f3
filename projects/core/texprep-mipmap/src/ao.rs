//! Ambient occlusion mip correction.
//!
//! Averaging an occlusion map drags crevices towards mid grey, so distant geometry loses its
//! contact shadows. Both modes push each coarser level back towards its own dark values.

use log::debug;
use serde::{Deserialize, Serialize};
use texprep_common::{lerp, MipChain, Raster};

/// Number of histogram bins used by [`AoMode::Percentile`].
const HISTOGRAM_BINS: usize = 256;

/// Fraction of the distance to the percentile threshold applied to darker pixels.
const PERCENTILE_PULL: f32 = 0.3;

/// How occlusion levels are corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AoMode {
    /// Blend every pixel towards a target between the level mean and minimum.
    /// `bias` is in `[0, 1]`; `0` leaves the level untouched.
    BiasedDarkening { bias: f32 },
    /// Pull pixels below the `percentile`-th (0 to 100) value 30% of the way towards it.
    Percentile { percentile: f32 },
}

impl Default for AoMode {
    fn default() -> Self {
        AoMode::BiasedDarkening { bias: 0.5 }
    }
}

/// Settings for [`AoProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AoSettings {
    pub mode: AoMode,
    /// Levels below this index are copied unchanged.
    pub start_level: u32,
}

impl Default for AoSettings {
    fn default() -> Self {
        Self {
            mode: AoMode::default(),
            start_level: 1,
        }
    }
}

/// Corrects ambient occlusion mip chains. Only RGB is modified.
#[derive(Debug, Clone, Default)]
pub struct AoProcessor {
    settings: AoSettings,
}

impl AoProcessor {
    pub fn new(settings: AoSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AoSettings {
        &self.settings
    }

    /// Returns a corrected copy of `input`.
    pub fn process(&self, input: &MipChain) -> MipChain {
        let mut out = MipChain::with_capacity(input.len());
        for level in input.iter() {
            let mut raster = level.raster.clone();
            if level.level >= self.settings.start_level {
                match self.settings.mode {
                    AoMode::BiasedDarkening { bias } => biased_darkening(&mut raster, bias),
                    AoMode::Percentile { percentile } => {
                        percentile_lift(&mut raster, percentile)
                    }
                }
            }
            out.push(raster);
        }
        debug!(
            "AO: {:?} from level {} over {} levels",
            self.settings.mode,
            self.settings.start_level,
            out.len()
        );
        out
    }
}

fn biased_darkening(raster: &mut Raster, bias: f32) {
    let bias = bias.clamp(0.0, 1.0);
    if bias == 0.0 {
        return;
    }
    let count = raster.pixel_count() as f32;
    for c in 0..3 {
        let (min, sum) = raster
            .channel(c)
            .fold((f32::INFINITY, 0.0f32), |(min, sum), v| (min.min(v), sum + v));
        let target = lerp(sum / count, min, bias);
        raster.map_channel(c, |v| lerp(v, target, bias * 0.5));
    }
}

fn percentile_lift(raster: &mut Raster, percentile: f32) {
    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * raster.pixel_count() as f32;
    for c in 0..3 {
        let mut bins = [0u32; HISTOGRAM_BINS];
        for v in raster.channel(c) {
            let bin = (v.clamp(0.0, 1.0) * (HISTOGRAM_BINS - 1) as f32).round() as usize;
            bins[bin] += 1;
        }

        let mut cumulative = 0u32;
        let mut threshold_bin = HISTOGRAM_BINS - 1;
        for (bin, &n) in bins.iter().enumerate() {
            cumulative += n;
            if cumulative as f32 >= rank {
                threshold_bin = bin;
                break;
            }
        }

        let threshold = threshold_bin as f32 / (HISTOGRAM_BINS - 1) as f32;
        raster.map_channel(c, |v| {
            if v < threshold {
                v + (threshold - v) * PERCENTILE_PULL
            } else {
                v
            }
        });
    }
}
