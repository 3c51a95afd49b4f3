//! Histogram normalization settings.

use derive_enum_all_values::AllValues;
use serde::{Deserialize, Serialize};

/// Whether and how a texture's dynamic range is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AllValues, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramMode {
    #[default]
    Off,
    /// Linear remap of the percentile window to `[0, 1]`. Outliers are clipped.
    Percentile,
    /// As [`HistogramMode::Percentile`], with outliers soft-clamped by a smoothstep knee instead
    /// of clipped.
    PercentileWithKnee,
}

impl HistogramMode {
    /// Wire value stored in the params metadata block.
    pub const fn to_u8(self) -> u8 {
        match self {
            HistogramMode::Off => 0,
            HistogramMode::Percentile => 1,
            HistogramMode::PercentileWithKnee => 2,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HistogramMode::Off),
            1 => Some(HistogramMode::Percentile),
            2 => Some(HistogramMode::PercentileWithKnee),
            _ => None,
        }
    }
}

/// How channels are grouped when computing the percentile window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AllValues, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// One window over the mean of RGB, applied to all three colour channels.
    #[default]
    AverageLuminance,
    /// One window per colour channel. Alpha is left alone.
    PerChannelRgb,
    /// One window per channel including alpha.
    PerChannelRgba,
}

impl ChannelMode {
    /// Number of (scale, offset) pairs produced.
    pub const fn group_count(self) -> usize {
        match self {
            ChannelMode::AverageLuminance => 1,
            ChannelMode::PerChannelRgb => 3,
            ChannelMode::PerChannelRgba => 4,
        }
    }

    /// Raster channels driven by `group`.
    pub fn channels(self, group: usize) -> &'static [usize] {
        match (self, group) {
            (ChannelMode::AverageLuminance, 0) => &[0, 1, 2],
            (_, 0) => &[0],
            (_, 1) => &[1],
            (_, 2) => &[2],
            (ChannelMode::PerChannelRgba, 3) => &[3],
            _ => &[],
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            ChannelMode::AverageLuminance => 0,
            ChannelMode::PerChannelRgb => 1,
            ChannelMode::PerChannelRgba => 2,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ChannelMode::AverageLuminance),
            1 => Some(ChannelMode::PerChannelRgb),
            2 => Some(ChannelMode::PerChannelRgba),
            _ => None,
        }
    }
}

/// Settings for [`HistogramAnalyzer`](crate::HistogramAnalyzer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramSettings {
    pub mode: HistogramMode,

    pub channel_mode: ChannelMode,

    /// Lower bound of the window, as a percentile in `[0, 100]`.
    pub percentile_low: f32,

    /// Upper bound of the window, as a percentile in `[0, 100]`.
    pub percentile_high: f32,

    /// Width of the soft knee as a fraction of the window span.
    pub knee_width: f32,

    /// Warn when more than this fraction of samples falls outside the window.
    pub tail_threshold: f32,

    /// Groups whose window is narrower than this are left unnormalized.
    pub min_range_threshold: f32,
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self {
            mode: HistogramMode::Off,
            channel_mode: ChannelMode::AverageLuminance,
            percentile_low: 0.5,
            percentile_high: 99.5,
            knee_width: 0.1,
            tail_threshold: 0.05,
            min_range_threshold: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_are_stable() {
        for mode in HistogramMode::all_values() {
            assert_eq!(HistogramMode::from_u8(mode.to_u8()), Some(*mode));
        }
        for mode in ChannelMode::all_values() {
            assert_eq!(ChannelMode::from_u8(mode.to_u8()), Some(*mode));
        }
        assert_eq!(ChannelMode::from_u8(9), None);
    }

    #[test]
    fn groups_cover_expected_channels() {
        assert_eq!(ChannelMode::AverageLuminance.channels(0), &[0, 1, 2]);
        assert_eq!(ChannelMode::PerChannelRgb.channels(3), &[] as &[usize]);
        assert_eq!(ChannelMode::PerChannelRgba.channels(3), &[3]);
    }
}
