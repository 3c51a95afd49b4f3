use std::fs;
use std::path::*;
use texprep_common::TextureType;
use texprep_histogram::HistogramMode;

/// Image extensions picked up by batch processing.
pub const IMAGE_EXTENSIONS: [&str; 1] = ["png"];

/// Recursively collects the source images under `dir`.
///
/// Unreadable directories and entries are skipped. Files with an unknown extension and
/// per-level intermediates (`<stem>_mip<k>.png`) are left out. The result is sorted so batch
/// order is stable.
pub fn find_all_files(dir: &Path, entries: &mut Vec<PathBuf>) -> std::io::Result<()> {
    collect_images(dir, entries)?;
    entries.sort();
    Ok(())
}

fn collect_images(dir: &Path, entries: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let dir_entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    for entry in dir_entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };

        let path = entry.path();
        if path.is_dir() {
            collect_images(&path, entries)?;
        } else if is_source_image(&path) {
            entries.push(path);
        }
    }
    Ok(())
}

/// Whether `path` is an image the pipeline should process.
pub fn is_source_image(path: &Path) -> bool {
    let has_image_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)));
    has_image_extension && !is_intermediate_image(path)
}

/// Whether `path` looks like a per-level image written by the pipeline.
pub fn is_intermediate_image(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    match stem.rsplit_once("_mip") {
        Some((_, level)) => !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Mirrors `source` from `input_dir` into `output_dir` with a `.ktx2` extension.
pub fn output_path_for(input_dir: &Path, output_dir: &Path, source: &Path) -> PathBuf {
    let relative = source.strip_prefix(input_dir).unwrap_or(source);
    output_dir.join(relative).with_extension("ktx2")
}

/// Canonicalizes a CLI path argument, creating the directory if it doesn't exist.
pub fn canonicalize_cli_path(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);

    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| format!("Failed to create directory: {e}"))?;
    }

    fs::canonicalize(path).map_err(|e| format!("Invalid path: {e}"))
}

/// Canonicalizes a CLI path argument that must already exist.
pub fn existing_cli_path(value: &str) -> Result<PathBuf, String> {
    fs::canonicalize(value).map_err(|e| format!("Invalid path {value}: {e}"))
}

pub fn parse_texture_type(value: &str) -> Result<TextureType, String> {
    TextureType::from_name(value).ok_or_else(|| {
        format!(
            "Unknown texture type: {value}. Valid types are: color, normal, roughness, gloss, \
             metallic, ao, height, linear"
        )
    })
}

pub fn parse_histogram_mode(value: &str) -> Result<HistogramMode, String> {
    match value.to_lowercase().as_str() {
        "off" => Ok(HistogramMode::Off),
        "percentile" => Ok(HistogramMode::Percentile),
        "knee" | "percentile_with_knee" => Ok(HistogramMode::PercentileWithKnee),
        _ => Err(format!(
            "Unknown histogram mode: {value}. Valid options: off, percentile, knee"
        )),
    }
}
