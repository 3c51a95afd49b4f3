//! Mip chain generation.

use crate::post_process::PostProcessor;
use crate::resample::{gaussian_blur, resample};
use crate::{FilterProfile, MipError, MipResult};
use log::debug;
use texprep_common::{mip_dimensions, MipChain, Raster, TextureType, CHANNELS};

/// Value space in which samples are averaged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueDomain {
    /// Samples are filtered as stored.
    Linear,
    /// RGB is decoded with `v^gamma` before filtering and re-encoded with `v^(1/gamma)`.
    ///
    /// `gamma` is the display exponent (2.2 for sRGB-like data), so stored values are darkened
    /// into linear light. Conventions that quote the encode exponent `1/gamma` describe the
    /// same pair of transforms from the other side.
    Gamma(f32),
    /// RGB holds roughness (or gloss when `gloss` is set) and is filtered as GGX alpha, `r²`.
    RoughnessAlpha { gloss: bool },
}

impl ValueDomain {
    fn decode(self, raster: &mut Raster) {
        for c in 0..3 {
            match self {
                ValueDomain::Linear => {}
                ValueDomain::Gamma(gamma) => raster.map_channel(c, |v| v.max(0.0).powf(gamma)),
                ValueDomain::RoughnessAlpha { gloss } => raster.map_channel(c, |v| {
                    let r = if gloss { 1.0 - v } else { v };
                    r * r
                }),
            }
        }
    }

    fn encode(self, raster: &mut Raster) {
        for c in 0..3 {
            match self {
                ValueDomain::Linear => {}
                ValueDomain::Gamma(gamma) => {
                    let inv = 1.0 / gamma;
                    raster.map_channel(c, |v| v.max(0.0).powf(inv))
                }
                ValueDomain::RoughnessAlpha { gloss } => raster.map_channel(c, |v| {
                    let r = v.max(0.0).sqrt();
                    if gloss {
                        1.0 - r
                    } else {
                        r
                    }
                }),
            }
        }
    }
}

/// Builds mip chains according to a [`FilterProfile`] and then runs an ordered list of
/// [`PostProcessor`]s over the result.
#[derive(Debug, Clone)]
pub struct MipGenerator {
    profile: FilterProfile,
    texture_type: TextureType,
    post_processors: Vec<PostProcessor>,
}

impl MipGenerator {
    pub fn new(texture_type: TextureType, profile: FilterProfile) -> Self {
        Self {
            profile,
            texture_type,
            post_processors: Vec::new(),
        }
    }

    /// Generator with the default profile for `texture_type`.
    pub fn for_texture_type(texture_type: TextureType) -> Self {
        Self::new(texture_type, FilterProfile::for_texture_type(texture_type))
    }

    /// Appends a post-processor. Processors run in insertion order.
    pub fn with_post_processor(mut self, processor: PostProcessor) -> Self {
        self.post_processors.push(processor);
        self
    }

    pub fn profile(&self) -> &FilterProfile {
        &self.profile
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn post_processors(&self) -> &[PostProcessor] {
        &self.post_processors
    }

    /// The domain implied by the profile.
    pub fn default_domain(&self) -> ValueDomain {
        if self.profile.apply_gamma_correction {
            ValueDomain::Gamma(self.profile.gamma)
        } else {
            ValueDomain::Linear
        }
    }

    /// Generates the chain and runs every applicable post-processor.
    ///
    /// # Errors
    ///
    /// [`MipError::InvalidDimensions`] if `source` is zero sized.
    pub fn generate(&self, source: &Raster) -> MipResult<MipChain> {
        let mut chain = self.generate_levels(source, self.default_domain())?;
        for processor in &self.post_processors {
            if processor.applies_to(self.texture_type) {
                debug!("Running {} over {} levels", processor.name(), chain.len());
                chain = processor.apply(&chain, self.texture_type)?;
            }
        }
        Ok(chain)
    }

    /// Generates the raw chain in an explicit [`ValueDomain`], without post-processing.
    pub fn generate_levels(&self, source: &Raster, domain: ValueDomain) -> MipResult<MipChain> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(MipError::InvalidDimensions { width, height });
        }
        let dimensions: Vec<(u32, u32)> = (0..self.level_count(width, height))
            .map(|level| mip_dimensions(width, height, level))
            .collect();
        self.generate_levels_with_dimensions(source, &dimensions, domain)
    }

    /// Builds one level per entry of `dimensions`, resampled from `source`.
    /// The first entry is always an unmodified copy of `source`.
    pub fn generate_levels_with_dimensions(
        &self,
        source: &Raster,
        dimensions: &[(u32, u32)],
        domain: ValueDomain,
    ) -> MipResult<MipChain> {
        let mut chain = MipChain::with_capacity(dimensions.len().max(1));
        chain.push(source.clone());
        if dimensions.len() <= 1 {
            return Ok(chain);
        }

        let mut base = source.clone();
        domain.decode(&mut base);
        if self.profile.blur_radius > 0.0 {
            base = gaussian_blur(&base, self.profile.blur_radius);
        }

        let renormalize =
            self.profile.normalize_normals && self.texture_type == TextureType::Normal;
        for &(w, h) in &dimensions[1..] {
            let mut raster = resample(&base, w, h, self.profile.kernel)?;
            domain.encode(&mut raster);
            if renormalize {
                normalize_normals(&mut raster);
            }
            chain.push(raster);
        }
        Ok(chain)
    }

    /// Number of levels (including level 0) the profile yields for a base size.
    pub fn level_count(&self, width: u32, height: u32) -> u32 {
        let mut count = 1;
        loop {
            let (w, h) = mip_dimensions(width, height, count);
            let (pw, ph) = mip_dimensions(width, height, count - 1);
            if (pw, ph) == (1, 1) {
                break;
            }
            if (w, h) == (1, 1) && !self.profile.include_last_level {
                break;
            }
            if w.max(h) < self.profile.min_mip_size {
                break;
            }
            count += 1;
        }
        count
    }
}

/// Decodes `rgb * 2 - 1`, normalizes and re-encodes. Zero length vectors become +Z.
pub fn normalize_normals(raster: &mut Raster) {
    for px in raster.samples_mut().chunks_exact_mut(CHANNELS) {
        let n = [px[0] * 2.0 - 1.0, px[1] * 2.0 - 1.0, px[2] * 2.0 - 1.0];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        let n = if len > 1e-6 {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0, 0.0, 1.0]
        };
        px[0] = n[0] * 0.5 + 0.5;
        px[1] = n[1] * 0.5 + 0.5;
        px[2] = n[2] * 0.5 + 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterKernel;
    use rstest::rstest;

    fn profile(min_mip_size: u32, include_last_level: bool) -> FilterProfile {
        FilterProfile {
            min_mip_size,
            include_last_level,
            ..FilterProfile::default()
        }
    }

    #[rstest]
    #[case(256, 256)]
    #[case(300, 17)]
    #[case(1, 64)]
    #[case(7, 5)]
    #[case(1, 1)]
    fn level_dimensions_follow_floor_law(#[case] width: u32, #[case] height: u32) {
        let generator = MipGenerator::new(TextureType::Linear, profile(1, true));
        let chain = generator
            .generate(&Raster::new(width, height).unwrap())
            .unwrap();
        for (k, level) in chain.iter().enumerate() {
            assert_eq!(level.dimensions(), mip_dimensions(width, height, k as u32));
            assert_eq!(level.level, k as u32);
        }
        assert_eq!(chain.levels().last().unwrap().dimensions(), (1, 1));
    }

    #[test]
    fn exclude_last_level_drops_1x1() {
        let generator = MipGenerator::new(TextureType::Linear, profile(1, false));
        let chain = generator.generate(&Raster::new(8, 8).unwrap()).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.levels().last().unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn min_mip_size_stops_chain() {
        let generator = MipGenerator::new(TextureType::Linear, profile(4, true));
        let chain = generator.generate(&Raster::new(32, 16).unwrap()).unwrap();
        let sizes: Vec<_> = chain.iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(32, 16), (16, 8), (8, 4), (4, 2)]);
    }

    #[test]
    fn level_zero_is_unmodified_copy() {
        let mut source = Raster::new(4, 4).unwrap();
        source.set_pixel(1, 2, [0.3, 0.6, 0.9, 0.5]);
        let generator = MipGenerator::for_texture_type(TextureType::Color);
        let chain = generator.generate(&source).unwrap();
        assert_eq!(chain.levels()[0].raster, source);
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        let generator = MipGenerator::for_texture_type(TextureType::Color);
        let source = Raster::from_samples(1, 1, vec![0.0; 4]).unwrap();
        assert!(generator.generate(&source).is_ok());
        assert_eq!(
            Raster::new(0, 3).map_err(MipError::from),
            Err(MipError::InvalidDimensions {
                width: 0,
                height: 3
            })
        );
    }

    #[test]
    fn gamma_domain_averages_in_linear_light() {
        let src = Raster::from_samples(
            2,
            1,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let generator = MipGenerator::new(
            TextureType::Color,
            FilterProfile {
                kernel: FilterKernel::Box,
                apply_gamma_correction: true,
                ..FilterProfile::default()
            },
        );
        let chain = generator.generate(&src).unwrap();
        let px = chain.levels()[1].raster.pixel(0, 0);
        let expected = 0.5f32.powf(1.0 / 2.2);
        assert!((px[0] - expected).abs() < 1e-5);
        // Alpha is never gamma decoded.
        assert!((px[3] - 1.0).abs() < 1e-6);
    }

    #[rstest]
    #[case(2.2, 0.5, 0.217_637_64)]
    #[case(2.2, 0.8, 0.612_065_6)]
    #[case(1.0, 0.5, 0.5)]
    fn gamma_decode_uses_display_exponent(
        #[case] gamma: f32,
        #[case] stored: f32,
        #[case] linear: f32,
    ) {
        let domain = ValueDomain::Gamma(gamma);
        let mut raster = Raster::from_samples(1, 1, vec![stored, stored, stored, stored]).unwrap();
        domain.decode(&mut raster);
        assert!((raster.pixel(0, 0)[0] - linear).abs() < 1e-5);
        assert_eq!(raster.pixel(0, 0)[3], stored);
        domain.encode(&mut raster);
        assert!((raster.pixel(0, 0)[0] - stored).abs() < 1e-5);
    }

    #[test]
    fn roughness_alpha_domain_averages_squared_roughness() {
        let src = Raster::from_samples(
            2,
            1,
            vec![0.2, 0.2, 0.2, 1.0, 0.6, 0.6, 0.6, 1.0],
        )
        .unwrap();
        let generator = MipGenerator::new(TextureType::Roughness, FilterProfile::default());
        let chain = generator
            .generate_levels(&src, ValueDomain::RoughnessAlpha { gloss: false })
            .unwrap();
        let expected = ((0.04f32 + 0.36) / 2.0).sqrt();
        assert!((chain.levels()[1].raster.pixel(0, 0)[0] - expected).abs() < 1e-5);
    }

    #[test]
    fn normal_levels_are_renormalized() {
        // Two opposing tilts average to a short vector; renormalization restores unit length.
        let a = [0.5 + 0.5 * 0.8, 0.5, 0.5 + 0.5 * 0.6, 1.0];
        let b = [0.5 - 0.5 * 0.8, 0.5, 0.5 + 0.5 * 0.6, 1.0];
        let src = Raster::from_samples(2, 1, [a, b].concat()).unwrap();
        let chain = MipGenerator::for_texture_type(TextureType::Normal)
            .generate(&src)
            .unwrap();
        let px = chain.levels()[1].raster.pixel(0, 0);
        let n = [px[0] * 2.0 - 1.0, px[1] * 2.0 - 1.0, px[2] * 2.0 - 1.0];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert!((n[2] - 1.0).abs() < 1e-5);
    }
}
