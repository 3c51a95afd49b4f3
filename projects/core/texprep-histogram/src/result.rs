//! Normalization coefficients produced by analysis.

use crate::ChannelMode;
use serde::{Deserialize, Serialize};
use texprep_common::smoothstep;

/// Forward normalization for one texture: one `(scale, offset)` pair per channel group.
///
/// Forward: `normalized = v * scale + offset`.
/// The inverse written to metadata is `stored_scale = 1 / scale` and
/// `stored_offset = -offset / scale`, so a shader recovers the original value with one
/// multiply-add: `v = normalized * stored_scale + stored_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramResult {
    scale: Vec<f32>,
    offset: Vec<f32>,
    range_low: f32,
    range_high: f32,
    channel_mode: ChannelMode,
}

impl HistogramResult {
    /// Builds a result from per-group windows. A `None` window keeps that group at identity.
    ///
    /// `range_low` and `range_high` record the widest normalized window.
    pub(crate) fn from_windows(channel_mode: ChannelMode, windows: &[Option<(f32, f32)>]) -> Self {
        let mut scale = Vec::with_capacity(windows.len());
        let mut offset = Vec::with_capacity(windows.len());
        let mut range_low = f32::INFINITY;
        let mut range_high = f32::NEG_INFINITY;
        for window in windows {
            match *window {
                Some((lo, hi)) => {
                    let (s, o) = forward_coefficients(lo, hi);
                    scale.push(s);
                    offset.push(o);
                    range_low = range_low.min(lo);
                    range_high = range_high.max(hi);
                }
                None => {
                    scale.push(1.0);
                    offset.push(0.0);
                }
            }
        }
        if range_low > range_high {
            (range_low, range_high) = (0.0, 1.0);
        }
        Self {
            scale,
            offset,
            range_low,
            range_high,
            channel_mode,
        }
    }

    /// A single-group result for the window `[low, high]`.
    pub fn from_range(channel_mode: ChannelMode, low: f32, high: f32) -> Self {
        let windows = vec![Some((low, high)); channel_mode.group_count()];
        Self::from_windows(channel_mode, &windows)
    }

    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    pub fn offset(&self) -> &[f32] {
        &self.offset
    }

    pub fn range_low(&self) -> f32 {
        self.range_low
    }

    pub fn range_high(&self) -> f32 {
        self.range_high
    }

    pub fn channel_mode(&self) -> ChannelMode {
        self.channel_mode
    }

    pub fn group_count(&self) -> usize {
        self.scale.len()
    }

    /// GPU-ready `(stored_scale, stored_offset)` pairs, one per group.
    pub fn stored_coefficients(&self) -> Vec<(f32, f32)> {
        self.scale
            .iter()
            .zip(&self.offset)
            .map(|(&s, &o)| inverse_coefficients(s, o))
            .collect()
    }

    /// Applies the forward transform of `group` to `value`.
    #[inline]
    pub fn normalize(&self, group: usize, value: f32) -> f32 {
        value * self.scale[group] + self.offset[group]
    }

    /// Recovers an original value from a normalized one.
    #[inline]
    pub fn recover(&self, group: usize, normalized: f32) -> f32 {
        let (s, o) = inverse_coefficients(self.scale[group], self.offset[group]);
        normalized * s + o
    }
}

/// Forward `(scale, offset)` mapping `[low, high]` onto `[0, 1]`.
#[inline]
pub fn forward_coefficients(low: f32, high: f32) -> (f32, f32) {
    let scale = 1.0 / (high - low);
    (scale, -low * scale)
}

/// Inverse of a forward pair: `(1 / scale, -offset / scale)`.
#[inline]
pub fn inverse_coefficients(scale: f32, offset: f32) -> (f32, f32) {
    (1.0 / scale, -offset / scale)
}

/// Soft clamp of `value` into `[low - k, high + k]` with `k = knee_width * (high - low)`.
///
/// Values inside the window are returned unchanged.
pub fn soft_knee(value: f32, low: f32, high: f32, knee_width: f32) -> f32 {
    let k = knee_width * (high - low);
    if k <= 0.0 {
        return value.clamp(low, high);
    }
    if value < low {
        low - k * smoothstep((low - value) / k)
    } else if value > high {
        high + k * smoothstep((value - high) / k)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn reference_window_coefficients() {
        let result = HistogramResult::from_range(ChannelMode::AverageLuminance, 0.0234, 0.9843);
        assert!((result.scale()[0] - 1.0406).abs() < 1e-3);
        assert!((result.offset()[0] + 0.0243).abs() < 1e-3);

        let (stored_scale, stored_offset) = result.stored_coefficients()[0];
        assert!((stored_scale - 0.9610).abs() < 1e-3);
        assert!((stored_offset - 0.0234).abs() < 1e-4);
        assert!((0.5 * stored_scale + stored_offset - 0.5039).abs() < 1e-3);
    }

    #[rstest]
    #[case(0.0234)]
    #[case(0.3)]
    #[case(0.77)]
    #[case(0.9843)]
    fn normalize_then_recover_is_identity(#[case] value: f32) {
        let result = HistogramResult::from_range(ChannelMode::PerChannelRgb, 0.0234, 0.9843);
        for group in 0..result.group_count() {
            let back = result.recover(group, result.normalize(group, value));
            assert!((back - value).abs() < 1e-5);
        }
    }

    #[test]
    fn identity_groups_are_skipped_from_range() {
        let result = HistogramResult::from_windows(
            ChannelMode::PerChannelRgb,
            &[Some((0.2, 0.6)), None, Some((0.1, 0.5))],
        );
        assert_eq!(result.scale()[1], 1.0);
        assert_eq!(result.offset()[1], 0.0);
        assert_eq!(result.range_low(), 0.1);
        assert_eq!(result.range_high(), 0.6);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(0.05)]
    #[case(0.95)]
    #[case(3.0)]
    fn knee_stays_within_band(#[case] value: f32) {
        let (lo, hi, width) = (0.1, 0.9, 0.1);
        let k = width * (hi - lo);
        let out = soft_knee(value, lo, hi, width);
        assert!(out >= lo - k - 1e-6 && out <= hi + k + 1e-6);
    }

    #[test]
    fn knee_is_identity_inside_window() {
        assert_eq!(soft_knee(0.5, 0.1, 0.9, 0.1), 0.5);
    }

    #[test]
    fn knee_is_monotonic() {
        let mut previous = f32::NEG_INFINITY;
        for i in 0..200 {
            let v = -0.5 + i as f32 * 0.01;
            let out = soft_knee(v, 0.2, 0.8, 0.25);
            assert!(out >= previous - 1e-6, "not monotonic at {v}");
            previous = out;
        }
    }
}
