//! Image files at the edges of the pipeline.

use crate::PipelineResult;
use image::{ColorType, ImageFormat};
use std::path::{Path, PathBuf};
use texprep_common::{MipChain, Raster};

/// Decodes an image file into a raster.
pub fn load_raster(path: &Path) -> PipelineResult<Raster> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(Raster::from_rgba8(width, height, image.as_raw())?)
}

/// Reads an image's pixel size without decoding it. [`None`] if the file is not readable.
pub fn read_dimensions(path: &Path) -> Option<(u32, u32)> {
    image::image_dimensions(path).ok()
}

/// Path of the intermediate image for `level`: `<dir>/<stem>_mip<level>.png`.
pub fn level_path(dir: &Path, stem: &str, level: u32) -> PathBuf {
    dir.join(format!("{stem}_mip{level}.png"))
}

/// Writes every level of `chain` as an RGBA8 PNG and returns the paths, level 0 first.
pub fn write_level_images(
    chain: &MipChain,
    dir: &Path,
    stem: &str,
) -> PipelineResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(chain.len());
    for level in chain {
        let path = level_path(dir, stem, level.level);
        let (width, height) = level.dimensions();
        image::save_buffer_with_format(
            &path,
            &level.raster.to_rgba8(),
            width,
            height,
            ColorType::Rgba8,
            ImageFormat::Png,
        )?;
        paths.push(path);
    }
    Ok(paths)
}
