//! Toksvig correction settings.

use serde::{Deserialize, Serialize};

/// How normal-map variance is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToksvigMode {
    /// 3x3 window, raw (un-normalized) mean vector. Composite power scales as `k^1.5`.
    #[default]
    Classic,
    /// 2x2 window of unit vectors with a variance dead zone. Composite power scales linearly.
    Simplified,
}

/// Settings for the Toksvig roughness correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToksvigSettings {
    /// Master switch. When disabled the input chain is returned as a copy.
    pub enabled: bool,

    /// Strength multiplier applied to the measured variance.
    pub composite_power: f32,

    /// First level that receives correction. Level 0 is normally left as authored.
    pub min_corrected_level: u32,

    pub calculation_mode: ToksvigMode,

    /// Box-filter the per-pixel variance field (3x3) before applying it.
    pub smooth_variance: bool,

    /// Correct level 0 only, then rebuild coarser levels by averaging GGX alpha.
    pub energy_preserving: bool,

    /// Variance below this value is treated as zero. Only used by [`ToksvigMode::Simplified`].
    pub variance_threshold: f32,
}

impl Default for ToksvigSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            composite_power: 1.0,
            min_corrected_level: 1,
            calculation_mode: ToksvigMode::Classic,
            smooth_variance: false,
            energy_preserving: false,
            variance_threshold: 0.002,
        }
    }
}
