//! Pipeline settings and preset files.
//!
//! A preset is a JSON document with the same shape as [`PipelineConfig`]. Every field is
//! optional; missing fields take their documented defaults.
//!
//! ```json
//! {
//!   "toksvig": { "composite_power": 1.5, "calculation_mode": "simplified" },
//!   "ao": { "mode": { "type": "percentile", "percentile": 10.0 } },
//!   "histogram": { "mode": "percentile_with_knee", "channel_mode": "per_channel_rgb" },
//!   "profiles": { "roughness": { "kernel": "mitchell", "min_mip_size": 4 } }
//! }
//! ```

use crate::PipelineResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use texprep_common::TextureType;
use texprep_histogram::HistogramSettings;
use texprep_mipmap::{AoSettings, FilterProfile, ToksvigSettings};

/// Everything the pipeline needs to process a texture, apart from the compressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Forces every texture to this type instead of guessing from its file name.
    pub texture_type: Option<TextureType>,

    /// Filter profile overrides. Types without an entry use their built-in profile.
    pub profiles: HashMap<TextureType, FilterProfile>,

    pub toksvig: ToksvigSettings,

    pub ao: AoSettings,

    pub histogram: HistogramSettings,

    /// Only accept a companion normal map with the same pixel size as the roughness map.
    pub require_matching_normal_size: bool,

    /// Directory in which each texture gets its own folder of per-level PNG files. Defaults
    /// to the output file's directory.
    pub intermediate_dir: Option<PathBuf>,

    /// Keep the per-level PNG files after the compressor has run.
    pub keep_intermediate_files: bool,

    /// Worker threads for batch processing. `0` uses one per logical core.
    pub threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            texture_type: None,
            profiles: HashMap::new(),
            toksvig: ToksvigSettings::default(),
            ao: AoSettings::default(),
            histogram: HistogramSettings::default(),
            require_matching_normal_size: true,
            intermediate_dir: None,
            keep_intermediate_files: false,
            threads: 0,
        }
    }
}

impl PipelineConfig {
    /// Parses a preset from JSON.
    pub fn from_json_str(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a preset file.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the settings as pretty printed JSON, suitable as a preset file.
    pub fn to_json_string(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The filter profile used for `texture_type`.
    pub fn profile_for(&self, texture_type: TextureType) -> FilterProfile {
        self.profiles
            .get(&texture_type)
            .copied()
            .unwrap_or_else(|| FilterProfile::for_texture_type(texture_type))
    }

    /// The texture type for `path`: the forced type if set, otherwise a guess from the file stem.
    pub fn texture_type_for(&self, path: &Path) -> TextureType {
        self.texture_type.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map_or(TextureType::Color, TextureType::guess_from_file_stem)
        })
    }
}
