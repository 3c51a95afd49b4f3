//! Sequencing of the per-texture stages.

use crate::compressor::{CompressRequest, TextureCompressor};
use crate::raster_io::{load_raster, read_dimensions, write_level_images};
use crate::{CancellationFlag, PipelineConfig, PipelineError, PipelineResult};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use texprep_common::{mip_dimensions, MipChain, Raster, TextureType};
use texprep_histogram::{HistogramAnalyzer, HistogramResult};
use texprep_ktx2::{insert_metadata_file, PatchSummary};
use texprep_metadata::{encode_histogram, METADATA_KEY};
use texprep_mipmap::{
    AoProcessor, FilterProfile, MipGenerator, NormalMapMatcher, PostProcessor, ToksvigProcessor,
};

/// One texture to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureJob {
    pub source: PathBuf,
    /// Container file the compressor writes.
    pub output: PathBuf,
    /// Overrides both the configured and the guessed texture type.
    pub texture_type: Option<TextureType>,
    /// Leave the histogram untouched for this texture.
    pub skip_histogram: bool,
}

impl TextureJob {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            texture_type: None,
            skip_histogram: false,
        }
    }

    pub fn with_texture_type(mut self, texture_type: TextureType) -> Self {
        self.texture_type = Some(texture_type);
        self
    }

    pub fn with_skip_histogram(mut self, skip: bool) -> Self {
        self.skip_histogram = skip;
        self
    }
}

/// The in-memory result of every stage before the compressor.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTexture {
    pub texture_type: TextureType,
    /// Final levels, normalized when [`PreparedTexture::histogram`] is set.
    pub chain: MipChain,
    /// Set when normalization was applied to the chain.
    pub histogram: Option<HistogramResult>,
    pub toksvig_applied: bool,
}

/// Outcome of processing one texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub texture_type: TextureType,
    pub levels: usize,
    /// The companion normal map used for Toksvig correction.
    pub normal_map: Option<PathBuf>,
    pub histogram: Option<HistogramResult>,
    /// Set when metadata was embedded in the output.
    pub patch: Option<PatchSummary>,
    /// Directory holding this texture's level images, when they were kept.
    pub intermediate_dir: Option<PathBuf>,
    pub output_bytes: u64,
}

/// Runs textures through mip generation, corrections, normalization, the compressor and
/// metadata embedding.
#[derive(Debug)]
pub struct Orchestrator<C> {
    config: PipelineConfig,
    compressor: C,
    cancellation: CancellationFlag,
}

impl<C: TextureCompressor> Orchestrator<C> {
    pub fn new(config: PipelineConfig, compressor: C) -> Self {
        Self {
            config,
            compressor,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Uses an externally owned flag, so another thread can cancel pending textures.
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    /// Builds the final mip chain for an already decoded texture.
    ///
    /// `normal` is the companion normal map of a roughness or gloss texture. Without it, or
    /// when its size differs from `source`, no Toksvig correction happens. Normal maps are
    /// never normalized.
    pub fn prepare(
        &self,
        source: &Raster,
        texture_type: TextureType,
        normal: Option<&Raster>,
        skip_histogram: bool,
    ) -> PipelineResult<PreparedTexture> {
        let profile = self.config.profile_for(texture_type);
        let mut generator = MipGenerator::new(texture_type, profile);

        let mut toksvig_applied = false;
        if texture_type.is_roughness_like() && self.config.toksvig.enabled {
            match normal {
                Some(normal) if normal.dimensions() != source.dimensions() => warn!(
                    "Normal map is {:?} but the texture is {:?}, skipping Toksvig correction",
                    normal.dimensions(),
                    source.dimensions()
                ),
                Some(normal) => {
                    let normals = self.companion_normals(&generator, source, normal)?;
                    let processor =
                        ToksvigProcessor::new(self.config.toksvig, normals).with_profile(profile);
                    generator = generator.with_post_processor(PostProcessor::Toksvig(processor));
                    toksvig_applied = true;
                }
                None => debug!("No companion normal map, Toksvig correction disabled"),
            }
        }
        if texture_type == TextureType::AmbientOcclusion {
            let processor = AoProcessor::new(self.config.ao);
            generator = generator.with_post_processor(PostProcessor::AmbientOcclusion(processor));
        }

        let mut chain = generator.generate(source)?;
        debug!("Generated {} levels for {texture_type:?}", chain.len());

        let mut histogram = None;
        if skip_histogram || texture_type == TextureType::Normal {
            debug!("Histogram normalization skipped for {texture_type:?}");
        } else {
            let analyzer = HistogramAnalyzer::new(self.config.histogram);
            if let Some(result) = analyzer.analyze(&chain)? {
                chain = analyzer.apply(&result, &chain);
                histogram = Some(result);
            }
        }

        Ok(PreparedTexture {
            texture_type,
            chain,
            histogram,
            toksvig_applied,
        })
    }

    /// Normal map levels with the same dimensions as the chain `generator` builds from
    /// `source`. Vectors are left unnormalized; their shortening is what Toksvig measures.
    fn companion_normals(
        &self,
        generator: &MipGenerator,
        source: &Raster,
        normal: &Raster,
    ) -> PipelineResult<MipChain> {
        let (width, height) = source.dimensions();
        let dimensions: Vec<(u32, u32)> = (0..generator.level_count(width, height))
            .map(|level| mip_dimensions(width, height, level))
            .collect();
        let profile = FilterProfile {
            normalize_normals: false,
            ..self.config.profile_for(TextureType::Normal)
        };
        let normal_generator = MipGenerator::new(TextureType::Normal, profile);
        Ok(normal_generator.generate_levels_with_dimensions(
            normal,
            &dimensions,
            normal_generator.default_domain(),
        )?)
    }

    /// Looks for the companion normal map of a roughness or gloss texture.
    pub fn find_normal_map(&self, source: &Path, dimensions: (u32, u32)) -> Option<PathBuf> {
        let matcher = NormalMapMatcher::new();
        if self.config.require_matching_normal_size {
            matcher.find_with_dimensions(source, dimensions, read_dimensions)
        } else {
            matcher.find(source)
        }
    }

    /// Processes one texture file end to end.
    ///
    /// # Errors
    ///
    /// Any stage error. [`PipelineError::Cancelled`] if cancellation was requested before the
    /// compressor started. If the metadata cannot be embedded the compressed container is
    /// removed again.
    pub fn process(&self, job: &TextureJob) -> PipelineResult<TextureReport> {
        let texture_type = job
            .texture_type
            .unwrap_or_else(|| self.config.texture_type_for(&job.source));
        info!("Processing {} as {texture_type:?}", job.source.display());

        let source = load_raster(&job.source)?;
        let (normal_map, normal) = self.load_normal_map(&job.source, texture_type, &source);
        let prepared = self.prepare(&source, texture_type, normal.as_ref(), job.skip_histogram)?;

        let stem = job
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("texture");
        let parent = match &self.config.intermediate_dir {
            Some(dir) => dir.clone(),
            None => parent_or_current(&job.output).to_path_buf(),
        };
        fs::create_dir_all(&parent)?;
        // One directory per job, so textures sharing a stem never see each other's levels.
        let work_dir = tempfile::Builder::new()
            .prefix(&format!("{stem}."))
            .tempdir_in(&parent)?;
        let level_paths = write_level_images(&prepared.chain, work_dir.path(), stem)?;

        let patch = self.compress_and_embed(&prepared, &level_paths, &job.output);
        let intermediate_dir = if self.config.keep_intermediate_files {
            Some(work_dir.keep())
        } else {
            if let Err(e) = work_dir.close() {
                warn!("Failed to remove intermediate images: {e}");
            }
            None
        };
        let patch = patch?;

        Ok(TextureReport {
            source: job.source.clone(),
            output: job.output.clone(),
            texture_type,
            levels: prepared.chain.len(),
            normal_map,
            histogram: prepared.histogram,
            patch,
            intermediate_dir,
            output_bytes: fs::metadata(&job.output)?.len(),
        })
    }

    /// Finds and decodes the companion normal map. Problems only disable Toksvig.
    fn load_normal_map(
        &self,
        source_path: &Path,
        texture_type: TextureType,
        source: &Raster,
    ) -> (Option<PathBuf>, Option<Raster>) {
        if !texture_type.is_roughness_like() || !self.config.toksvig.enabled {
            return (None, None);
        }
        let Some(path) = self.find_normal_map(source_path, source.dimensions()) else {
            warn!(
                "No normal map found for {}, skipping Toksvig correction",
                source_path.display()
            );
            return (None, None);
        };
        match load_raster(&path) {
            Ok(raster) => {
                debug!("Using normal map {}", path.display());
                (Some(path), Some(raster))
            }
            Err(e) => {
                warn!(
                    "Failed to load normal map {}: {e}, skipping Toksvig correction",
                    path.display()
                );
                (None, None)
            }
        }
    }

    fn compress_and_embed(
        &self,
        prepared: &PreparedTexture,
        level_paths: &[PathBuf],
        output: &Path,
    ) -> PipelineResult<Option<PatchSummary>> {
        if self.cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        fs::create_dir_all(parent_or_current(output))?;
        self.compressor.compress(&CompressRequest {
            texture_type: prepared.texture_type,
            level_paths,
            output,
        })?;

        let Some(histogram) = &prepared.histogram else {
            return Ok(None);
        };
        let embedded = encode_histogram(histogram, self.config.histogram.mode)
            .map_err(PipelineError::from)
            .and_then(|metadata| Ok(insert_metadata_file(output, METADATA_KEY, &metadata)?));
        if embedded.is_err() {
            // Normalized levels without their recovery coefficients are unusable.
            if let Err(e) = fs::remove_file(output) {
                warn!("Failed to remove {}: {e}", output.display());
            }
        }
        embedded.map(Some)
    }

    /// Processes `jobs` in parallel on a pool of [`PipelineConfig::threads`] workers.
    ///
    /// Results are in job order. A failing texture does not affect the others.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ThreadPool`] if the worker pool cannot be created.
    pub fn process_batch(
        &self,
        jobs: &[TextureJob],
    ) -> PipelineResult<Vec<PipelineResult<TextureReport>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;
        Ok(pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let result = self.process(job);
                    if let Err(e) = &result {
                        error!("Failed to process {}: {e}", job.source.display());
                    }
                    result
                })
                .collect()
        }))
    }
}

fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
