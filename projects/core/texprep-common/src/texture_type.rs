//! Semantic texture types.

use derive_enum_all_values::AllValues;
use serde::{Deserialize, Serialize};

/// What a texture's channels represent. Selects the filter profile and which
/// corrections apply during mip generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureType {
    /// sRGB encoded colour (albedo, emissive).
    Color,
    /// Tangent space normal map, `rgb * 2 - 1`.
    Normal,
    /// Perceptual roughness.
    Roughness,
    /// Glossiness, `1 - roughness`.
    Gloss,
    Metallic,
    AmbientOcclusion,
    Height,
    /// Generic linear data.
    Linear,
}

impl TextureType {
    /// Whether the texture stores roughness or gloss and is eligible for Toksvig correction.
    pub fn is_roughness_like(self) -> bool {
        matches!(self, TextureType::Roughness | TextureType::Gloss)
    }

    pub fn is_gloss(self) -> bool {
        self == TextureType::Gloss
    }

    /// Parses the names accepted on the command line and in presets.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "color" | "colour" | "albedo" | "diffuse" | "basecolor" => Some(Self::Color),
            "normal" => Some(Self::Normal),
            "roughness" => Some(Self::Roughness),
            "gloss" | "glossiness" => Some(Self::Gloss),
            "metallic" | "metalness" => Some(Self::Metallic),
            "ao" | "ambient_occlusion" | "occlusion" => Some(Self::AmbientOcclusion),
            "height" | "displacement" => Some(Self::Height),
            "linear" => Some(Self::Linear),
            _ => None,
        }
    }

    /// Guesses the type from filename suffix conventions such as `rock_roughness.png`.
    pub fn guess_from_file_stem(stem: &str) -> Self {
        let lower = stem.to_ascii_lowercase();
        let token = lower.rsplit(['_', '-', '.']).next().unwrap_or("");
        match token {
            "n" | "nrm" | "normal" | "normalgl" | "normaldx" => Self::Normal,
            "r" | "rough" | "roughness" => Self::Roughness,
            "g" | "gloss" | "glossiness" => Self::Gloss,
            "m" | "metal" | "metallic" | "metalness" => Self::Metallic,
            "ao" | "occlusion" => Self::AmbientOcclusion,
            "h" | "height" | "disp" | "displacement" => Self::Height,
            _ => Self::Color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("brick_roughness", TextureType::Roughness)]
    #[case("Brick_Normal", TextureType::Normal)]
    #[case("brick-gloss", TextureType::Gloss)]
    #[case("brick_AO", TextureType::AmbientOcclusion)]
    #[case("brick_albedo", TextureType::Color)]
    #[case("brick", TextureType::Color)]
    fn guesses_type_from_suffix(#[case] stem: &str, #[case] expected: TextureType) {
        assert_eq!(TextureType::guess_from_file_stem(stem), expected);
    }

    #[test]
    fn from_name_accepts_aliases() {
        assert_eq!(TextureType::all_values().len(), 8);
        assert_eq!(TextureType::from_name("Glossiness"), Some(TextureType::Gloss));
        assert_eq!(TextureType::from_name("AO"), Some(TextureType::AmbientOcclusion));
        assert_eq!(TextureType::from_name("unknown"), None);
    }
}
