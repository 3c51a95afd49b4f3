//! Per-pixel normal variance estimation.

use super::{ToksvigMode, ToksvigSettings};
use texprep_common::Raster;

/// Bias subtracted from the raw variance estimate. Absorbs the length error of
/// 8-bit quantized normals, which never decode to exactly unit length.
pub const VARIANCE_BIAS: f32 = 1e-3;

/// Lower bound on the mean normal length; shorter vectors are treated as fully diverged.
pub const MIN_MEAN_LENGTH: f32 = 1e-4;

#[inline(always)]
fn decode(px: [f32; 4]) -> [f32; 3] {
    [px[0] * 2.0 - 1.0, px[1] * 2.0 - 1.0, px[2] * 2.0 - 1.0]
}

#[inline(always)]
fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Length of the mean normal around `(x, y)`.
fn mean_length(normals: &Raster, x: u32, y: u32, mode: ToksvigMode) -> f32 {
    let (x, y) = (x as i64, y as i64);
    let mut sum = [0.0f32; 3];
    let count = match mode {
        ToksvigMode::Classic => {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let n = decode(normals.pixel_clamped(x + dx, y + dy));
                    sum = [sum[0] + n[0], sum[1] + n[1], sum[2] + n[2]];
                }
            }
            9.0
        }
        ToksvigMode::Simplified => {
            for dy in 0..=1 {
                for dx in 0..=1 {
                    let n = decode(normals.pixel_clamped(x + dx, y + dy));
                    let len = length(n);
                    let n = if len > 1e-6 {
                        [n[0] / len, n[1] / len, n[2] / len]
                    } else {
                        [0.0, 0.0, 1.0]
                    };
                    sum = [sum[0] + n[0], sum[1] + n[1], sum[2] + n[2]];
                }
            }
            4.0
        }
    };
    length([sum[0] / count, sum[1] / count, sum[2] / count])
}

/// Variance implied by a mean normal of length `mean_length`.
#[inline]
pub fn variance_from_length(mean_length: f32) -> f32 {
    let l = mean_length.max(MIN_MEAN_LENGTH);
    ((1.0 - l) / l - VARIANCE_BIAS).max(0.0)
}

/// Computes the scaled variance of every pixel in `normals`.
pub fn variance_field(normals: &Raster, settings: &ToksvigSettings) -> Vec<f32> {
    let (w, h) = normals.dimensions();
    let power = settings.composite_power.max(0.0);
    let scale = match settings.calculation_mode {
        ToksvigMode::Classic => power.powf(1.5),
        ToksvigMode::Simplified => power,
    };

    let mut field = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            let raw = variance_from_length(mean_length(normals, x, y, settings.calculation_mode));
            let variance = match settings.calculation_mode {
                ToksvigMode::Simplified if raw < settings.variance_threshold => 0.0,
                _ => raw,
            };
            field.push(variance * scale);
        }
    }

    if settings.smooth_variance {
        smooth(&field, w, h)
    } else {
        field
    }
}

/// 3x3 box filter with clamped edges.
fn smooth(field: &[f32], width: u32, height: u32) -> Vec<f32> {
    let (w, h) = (width as i64, height as i64);
    let mut out = Vec::with_capacity(field.len());
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let sx = (x + dx).clamp(0, w - 1);
                    let sy = (y + dy).clamp(0, h - 1);
                    sum += field[(sy * w + sx) as usize];
                }
            }
            out.push(sum / 9.0);
        }
    }
    out
}
