//! Toksvig specular anti-aliasing for roughness and gloss mip chains.
//!
//! Averaging a normal map shortens the mean normal wherever the surface detail diverges.
//! The shortened length is an estimate of the normal distribution variance lost at that
//! level, which is folded back into the GGX roughness so coarse mips do not render
//! sharper highlights than the detail they replace.
//!
//! # Correction
//!
//! For a pixel with roughness `r` and variance `v`:
//!
//! ```text
//! a2  = (r²)²
//! B   = 2·v·(a2 - 1)
//! a2' = clamp((B - a2) / (B - 1), ε², 1)
//! r'  = a2'^(1/4)
//! ```
//!
//! Gloss inputs are converted with `r = 1 - g` and converted back afterwards.

mod settings;
pub mod variance;

pub use settings::{ToksvigMode, ToksvigSettings};

use crate::generator::ValueDomain;
use crate::{FilterProfile, MipGenerator, MipResult};
use log::{debug, warn};
use texprep_common::{MipChain, Raster, TextureType, CHANNELS};
use variance::variance_field;

/// Guard for near-zero denominators and the lower clamp of the corrected `a2` (as `ε²`).
pub const TOKSVIG_EPSILON: f32 = 1e-4;

/// Applies the Toksvig correction to a single roughness value.
///
/// Returns `roughness` unchanged when `variance` is zero or the remap is degenerate.
pub fn toksvig_roughness(roughness: f32, variance: f32) -> f32 {
    if variance <= 0.0 {
        return roughness;
    }
    let r = roughness.clamp(0.0, 1.0);
    let alpha = r * r;
    let a2 = alpha * alpha;
    let b = 2.0 * variance * (a2 - 1.0);
    if (b - 1.0).abs() < TOKSVIG_EPSILON {
        return roughness;
    }
    let corrected = ((b - a2) / (b - 1.0)).clamp(TOKSVIG_EPSILON * TOKSVIG_EPSILON, 1.0);
    corrected.powf(0.25)
}

/// Corrects one stored value, which is roughness or gloss depending on `gloss`.
#[inline]
pub fn toksvig_value(value: f32, variance: f32, gloss: bool) -> f32 {
    if gloss {
        1.0 - toksvig_roughness(1.0 - value, variance)
    } else {
        toksvig_roughness(value, variance)
    }
}

/// Corrects a roughness or gloss chain using a companion normal-map chain.
#[derive(Debug, Clone)]
pub struct ToksvigProcessor {
    settings: ToksvigSettings,
    normals: MipChain,
    profile: FilterProfile,
}

impl ToksvigProcessor {
    /// Creates a processor. `normals` must be generated from the companion normal map with
    /// the same level dimensions as the chains this processor will correct.
    pub fn new(settings: ToksvigSettings, normals: MipChain) -> Self {
        Self {
            settings,
            normals,
            profile: FilterProfile::for_texture_type(TextureType::Roughness),
        }
    }

    /// Profile used to rebuild coarser levels in energy-preserving mode.
    pub fn with_profile(mut self, profile: FilterProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn settings(&self) -> &ToksvigSettings {
        &self.settings
    }

    /// Returns a corrected copy of `input`. `gloss` selects gloss instead of roughness input.
    pub fn process(&self, input: &MipChain, gloss: bool) -> MipResult<MipChain> {
        if !self.settings.enabled || input.is_empty() {
            return Ok(input.clone());
        }
        if self.settings.energy_preserving {
            return self.process_energy_preserving(input, gloss);
        }

        let mut out = MipChain::with_capacity(input.len());
        for level in input.iter() {
            if level.level < self.settings.min_corrected_level {
                out.push(level.raster.clone());
                continue;
            }
            out.push(self.correct_level(level.level, &level.raster, gloss));
        }
        Ok(out)
    }

    /// Corrects level 0 and rebuilds every coarser level from it in the GGX alpha domain,
    /// so measurement error does not compound across levels.
    fn process_energy_preserving(&self, input: &MipChain, gloss: bool) -> MipResult<MipChain> {
        let base = &input.levels()[0].raster;
        let corrected = self.correct_level(0, base, gloss);

        let dimensions: Vec<(u32, u32)> = input.iter().map(|l| l.dimensions()).collect();
        let generator = MipGenerator::new(
            if gloss {
                TextureType::Gloss
            } else {
                TextureType::Roughness
            },
            self.profile,
        );
        debug!(
            "Rebuilding {} levels from corrected base in alpha domain",
            dimensions.len()
        );
        generator.generate_levels_with_dimensions(
            &corrected,
            &dimensions,
            ValueDomain::RoughnessAlpha { gloss },
        )
    }

    /// Returns a corrected copy of one level, or an unmodified copy if the normal chain has
    /// no level of matching size.
    fn correct_level(&self, index: u32, raster: &Raster, gloss: bool) -> Raster {
        let Some(normal) = self.normals.level(index as usize) else {
            warn!("Toksvig: no normal map level {index}, passing level through unchanged");
            return raster.clone();
        };
        if normal.dimensions() != raster.dimensions() {
            let (nw, nh) = normal.dimensions();
            let (w, h) = raster.dimensions();
            warn!(
                "Toksvig: normal level {index} is {nw}x{nh} but roughness is {w}x{h}, skipping level"
            );
            return raster.clone();
        }

        let field = variance_field(&normal.raster, &self.settings);
        let mut out = raster.clone();
        for (px, &variance) in out
            .samples_mut()
            .chunks_exact_mut(CHANNELS)
            .zip(field.iter())
        {
            for value in px.iter_mut().take(3) {
                *value = toksvig_value(*value, variance, gloss);
            }
        }
        out
    }
}
