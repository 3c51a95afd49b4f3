//! Per-level corrections run after a chain has been resampled.

use crate::{AoProcessor, MipResult, ToksvigProcessor};
use texprep_common::{MipChain, TextureType};

/// A correction pass over a finished mip chain.
///
/// Processors are fixed when the [`MipGenerator`](crate::MipGenerator) is built and run in
/// insertion order. Each one only runs for the texture types it [applies to](Self::applies_to).
#[derive(Debug, Clone)]
pub enum PostProcessor {
    /// Roughness or gloss correction from a companion normal map.
    Toksvig(ToksvigProcessor),
    /// Occlusion contrast preservation.
    AmbientOcclusion(AoProcessor),
}

impl PostProcessor {
    pub fn applies_to(&self, texture_type: TextureType) -> bool {
        match self {
            PostProcessor::Toksvig(_) => texture_type.is_roughness_like(),
            PostProcessor::AmbientOcclusion(_) => texture_type == TextureType::AmbientOcclusion,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PostProcessor::Toksvig(_) => "toksvig",
            PostProcessor::AmbientOcclusion(_) => "ambient_occlusion",
        }
    }

    /// Returns a corrected copy of `chain`.
    pub fn apply(&self, chain: &MipChain, texture_type: TextureType) -> MipResult<MipChain> {
        match self {
            PostProcessor::Toksvig(processor) => processor.process(chain, texture_type.is_gloss()),
            PostProcessor::AmbientOcclusion(processor) => Ok(processor.process(chain)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AoMode, AoSettings, MipGenerator, ToksvigSettings};
    use texprep_common::Raster;

    fn checker(w: u32, h: u32) -> Raster {
        let mut r = Raster::new(w, h).unwrap();
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { 0.1 } else { 0.9 };
                r.set_pixel(x, y, [v, v, v, 1.0]);
            }
        }
        r
    }

    #[test]
    fn processors_only_run_for_matching_types() {
        let ao = PostProcessor::AmbientOcclusion(AoProcessor::default());
        let toksvig =
            PostProcessor::Toksvig(ToksvigProcessor::new(ToksvigSettings::default(), MipChain::new()));

        assert!(ao.applies_to(TextureType::AmbientOcclusion));
        assert!(!ao.applies_to(TextureType::Roughness));
        assert!(toksvig.applies_to(TextureType::Roughness));
        assert!(toksvig.applies_to(TextureType::Gloss));
        assert!(!toksvig.applies_to(TextureType::Color));
    }

    #[test]
    fn generator_skips_inapplicable_processors() {
        let source = checker(8, 8);
        let ao = PostProcessor::AmbientOcclusion(AoProcessor::new(AoSettings {
            mode: AoMode::BiasedDarkening { bias: 1.0 },
            start_level: 1,
        }));

        let plain = MipGenerator::for_texture_type(TextureType::Linear)
            .generate(&source)
            .unwrap();
        let with_ao = MipGenerator::for_texture_type(TextureType::Linear)
            .with_post_processor(ao.clone())
            .generate(&source)
            .unwrap();
        assert_eq!(plain, with_ao);

        let occlusion = MipGenerator::for_texture_type(TextureType::AmbientOcclusion)
            .with_post_processor(ao)
            .generate(&source)
            .unwrap();
        assert_eq!(occlusion.levels()[0].raster, source);
        assert_eq!(occlusion.len(), plain.len());
    }
}
