//! Per texture-type filter profiles.

use crate::FilterKernel;
use serde::{Deserialize, Serialize};
use texprep_common::TextureType;

/// Display gamma assumed for colour textures.
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Describes how a mip chain is built for one texture type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterProfile {
    /// Kernel used to resample every level from the base image.
    pub kernel: FilterKernel,

    /// Levels whose larger axis falls below this size are not generated.
    pub min_mip_size: u32,

    /// Whether the 1x1 level is emitted.
    pub include_last_level: bool,

    /// Resample RGB in linear light. Alpha is always treated as linear.
    pub apply_gamma_correction: bool,

    /// Display exponent; decode raises to `gamma`, encode raises to `1 / gamma`.
    pub gamma: f32,

    /// Radius of the Gaussian pre-blur in base level pixels. `0` disables it.
    pub blur_radius: f32,

    /// Re-normalize decoded normal vectors after averaging.
    /// Only honoured for [`TextureType::Normal`].
    pub normalize_normals: bool,
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self {
            kernel: FilterKernel::Box,
            min_mip_size: 1,
            include_last_level: true,
            apply_gamma_correction: false,
            gamma: DEFAULT_GAMMA,
            blur_radius: 0.0,
            normalize_normals: false,
        }
    }
}

impl FilterProfile {
    /// The default profile for a texture type.
    pub fn for_texture_type(texture_type: TextureType) -> Self {
        let base = Self::default();
        match texture_type {
            TextureType::Color => Self {
                kernel: FilterKernel::Kaiser,
                apply_gamma_correction: true,
                ..base
            },
            TextureType::Normal => Self {
                kernel: FilterKernel::Box,
                normalize_normals: true,
                ..base
            },
            TextureType::Roughness | TextureType::Gloss => Self {
                kernel: FilterKernel::Kaiser,
                ..base
            },
            // Darkest sample keeps metal/dielectric edges and highlights crisp.
            TextureType::Metallic => Self {
                kernel: FilterKernel::Min,
                ..base
            },
            TextureType::Height => Self {
                kernel: FilterKernel::Bilinear,
                ..base
            },
            TextureType::AmbientOcclusion | TextureType::Linear => base,
        }
    }
}
