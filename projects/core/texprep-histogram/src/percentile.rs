//! Exact percentiles over a sample set.

/// The `p`-th percentile (`0` to `100`) of `samples`, linearly interpolated between the two
/// nearest order statistics. `samples` is reordered in place.
///
/// Returns [`None`] for an empty slice.
pub fn percentile(samples: &mut [f32], p: f32) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let position = (p.clamp(0.0, 100.0) as f64 / 100.0) * (samples.len() - 1) as f64;
    let index = position.floor() as usize;
    let fraction = (position - index as f64) as f32;

    let (_, &mut low, upper) = samples.select_nth_unstable_by(index, f32::total_cmp);
    if fraction == 0.0 || upper.is_empty() {
        return Some(low);
    }
    let high = upper.iter().copied().fold(f32::INFINITY, f32::min);
    Some(low + (high - low) * fraction)
}

/// Lower and upper percentiles of `samples`.
pub fn percentile_window(samples: &mut [f32], low: f32, high: f32) -> Option<(f32, f32)> {
    let lo = percentile(samples, low)?;
    let hi = percentile(samples, high)?;
    Some((lo.min(hi), lo.max(hi)))
}

/// Fraction of `samples` strictly outside `[low, high]`.
pub fn tail_fraction(samples: &[f32], low: f32, high: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let outside = samples.iter().filter(|&&v| v < low || v > high).count();
    outside as f32 / samples.len() as f32
}
