//! Separable resampling, order statistic reduction and Gaussian blur.

use crate::FilterKernel;
use texprep_common::{Raster, RasterResult, CHANNELS};

/// Source taps contributing to one destination sample.
struct Contribution {
    first: usize,
    weights: Vec<f32>,
}

/// Builds the normalized tap list for every destination sample along one axis.
fn contributions(src_len: u32, dst_len: u32, kernel: FilterKernel) -> Vec<Contribution> {
    let ratio = src_len as f32 / dst_len as f32;
    let scale = ratio.max(1.0);
    let radius = kernel.support() * scale;
    let last = src_len as i64 - 1;

    (0..dst_len)
        .map(|x| {
            let center = (x as f32 + 0.5) * ratio;
            let lo = (center - radius).floor() as i64;
            let hi = (center + radius).ceil() as i64;

            // Taps outside the image are folded onto the edge sample.
            let first = lo.clamp(0, last) as usize;
            let end = hi.clamp(0, last) as usize;
            let mut weights = vec![0.0f32; end - first + 1];
            for i in lo..=hi {
                let t = (i as f32 + 0.5 - center) / scale;
                let w = kernel.weight(t);
                if w != 0.0 {
                    weights[i.clamp(0, last) as usize - first] += w;
                }
            }

            let sum: f32 = weights.iter().sum();
            if sum.abs() > 1e-8 {
                weights.iter_mut().for_each(|w| *w /= sum);
            } else {
                // Degenerate kernel response; fall back to the nearest sample.
                weights.iter_mut().for_each(|w| *w = 0.0);
                let nearest = (center.floor() as i64).clamp(0, last) as usize;
                weights[nearest - first] = 1.0;
            }
            Contribution { first, weights }
        })
        .collect()
}

/// Resamples `src` to `dst_width` x `dst_height` with an interpolating or order statistic kernel.
///
/// Interpolated results are clamped to `[0, 1]` to remove ringing from negative lobes.
pub fn resample(
    src: &Raster,
    dst_width: u32,
    dst_height: u32,
    kernel: FilterKernel,
) -> RasterResult<Raster> {
    let kernel = kernel.resolve();
    if kernel.is_order_statistic() {
        return reduce_footprint(src, dst_width, dst_height, kernel == FilterKernel::Max);
    }

    let (src_w, src_h) = src.dimensions();
    let horizontal = contributions(src_w, dst_width, kernel);
    let vertical = contributions(src_h, dst_height, kernel);

    // Horizontal pass: src_w x src_h -> dst_width x src_h
    let mut tmp = vec![0.0f32; dst_width as usize * src_h as usize * CHANNELS];
    let src_samples = src.samples();
    for y in 0..src_h as usize {
        let row = &src_samples[y * src_w as usize * CHANNELS..(y + 1) * src_w as usize * CHANNELS];
        for (x, contrib) in horizontal.iter().enumerate() {
            let mut acc = [0.0f32; CHANNELS];
            for (k, &w) in contrib.weights.iter().enumerate() {
                let s = (contrib.first + k) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += row[s + c] * w;
                }
            }
            let d = (y * dst_width as usize + x) * CHANNELS;
            tmp[d..d + CHANNELS].copy_from_slice(&acc);
        }
    }

    // Vertical pass: dst_width x src_h -> dst_width x dst_height
    let mut out = vec![0.0f32; dst_width as usize * dst_height as usize * CHANNELS];
    for (y, contrib) in vertical.iter().enumerate() {
        for x in 0..dst_width as usize {
            let mut acc = [0.0f32; CHANNELS];
            for (k, &w) in contrib.weights.iter().enumerate() {
                let s = ((contrib.first + k) * dst_width as usize + x) * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += tmp[s + c] * w;
                }
            }
            let d = (y * dst_width as usize + x) * CHANNELS;
            for c in 0..CHANNELS {
                out[d + c] = acc[c].clamp(0.0, 1.0);
            }
        }
    }

    Raster::from_samples(dst_width, dst_height, out)
}

/// Source index range `[start, end)` covered by destination sample `x`.
#[inline]
fn footprint(x: u32, src_len: u32, dst_len: u32) -> (u32, u32) {
    let start = (x as u64 * src_len as u64 / dst_len as u64) as u32;
    let end = ((x as u64 + 1) * src_len as u64).div_ceil(dst_len as u64) as u32;
    (start.min(src_len - 1), end.clamp(start + 1, src_len))
}

/// Per-channel minimum or maximum over each destination pixel's exact source footprint.
fn reduce_footprint(
    src: &Raster,
    dst_width: u32,
    dst_height: u32,
    take_max: bool,
) -> RasterResult<Raster> {
    let (src_w, src_h) = src.dimensions();
    let mut out = Raster::new(dst_width, dst_height)?;
    let init = if take_max {
        f32::NEG_INFINITY
    } else {
        f32::INFINITY
    };

    for y in 0..dst_height {
        let (y0, y1) = footprint(y, src_h, dst_height);
        for x in 0..dst_width {
            let (x0, x1) = footprint(x, src_w, dst_width);
            let mut acc = [init; CHANNELS];
            for sy in y0..y1 {
                for sx in x0..x1 {
                    let px = src.pixel(sx, sy);
                    for c in 0..CHANNELS {
                        acc[c] = if take_max {
                            acc[c].max(px[c])
                        } else {
                            acc[c].min(px[c])
                        };
                    }
                }
            }
            out.set_pixel(x, y, acc);
        }
    }
    Ok(out)
}

/// Separable Gaussian blur with sigma `radius / 2`. Edges are clamped.
pub fn gaussian_blur(src: &Raster, radius: f32) -> Raster {
    if radius <= 0.0 {
        return src.clone();
    }
    let taps = radius.ceil() as i64;
    let sigma = (radius * 0.5).max(0.5);
    let mut weights: Vec<f32> = (-taps..=taps)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= sum);

    let (w, h) = src.dimensions();
    let mut tmp = src.clone();
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; CHANNELS];
            for (k, weight) in weights.iter().enumerate() {
                let px = src.pixel_clamped(x as i64 + k as i64 - taps, y as i64);
                for c in 0..CHANNELS {
                    acc[c] += px[c] * weight;
                }
            }
            tmp.set_pixel(x, y, acc);
        }
    }

    let mut out = tmp.clone();
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; CHANNELS];
            for (k, weight) in weights.iter().enumerate() {
                let px = tmp.pixel_clamped(x as i64, y as i64 + k as i64 - taps);
                for c in 0..CHANNELS {
                    acc[c] += px[c] * weight;
                }
            }
            out.set_pixel(x, y, acc);
        }
    }
    out
}
