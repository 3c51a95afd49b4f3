//! Companion normal map lookup for roughness and gloss textures.

use log::debug;
use std::path::{Path, PathBuf};

/// Suffix tokens naming a roughness or gloss map, longest first.
const SOURCE_TOKENS: &[&str] = &[
    "roughness",
    "glossiness",
    "rough",
    "gloss",
    "rgh",
    "r",
    "g",
];

/// Tokens substituted for a matched source token, in order of preference.
const NORMAL_TOKENS: &[&str] = &["normal", "nrm", "n"];

/// Suffixes appended to the full stem when no token matches.
const APPENDED_SUFFIXES: &[&str] = &["_normal", "_nrm", "_n", "-normal"];

/// Extensions tried after the input's own.
const EXTENSIONS: &[&str] = &["png", "tga", "jpg", "jpeg", "tif", "tiff"];

const SEPARATORS: &[char] = &['_', '-', '.', ' '];

/// Finds the normal map that belongs to a roughness or gloss texture by filename conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalMapMatcher;

impl NormalMapMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Every candidate path for `source`, most likely first. Never contains `source` itself.
    pub fn candidates(&self, source: &Path) -> Vec<PathBuf> {
        let Some(stem) = source.file_stem().and_then(|s| s.to_str()) else {
            return Vec::new();
        };
        let parent = source.parent().unwrap_or(Path::new(""));
        let own_ext = source.extension().and_then(|e| e.to_str());

        let mut extensions: Vec<&str> = Vec::with_capacity(EXTENSIONS.len() + 1);
        if let Some(ext) = own_ext {
            extensions.push(ext);
        }
        for ext in EXTENSIONS {
            if !extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                extensions.push(ext);
            }
        }

        let mut out: Vec<PathBuf> = Vec::new();
        for candidate_stem in candidate_stems(stem) {
            for ext in &extensions {
                let path = parent.join(format!("{candidate_stem}.{ext}"));
                if path != source && !out.contains(&path) {
                    out.push(path);
                }
            }
        }
        out
    }

    /// The first candidate that exists on disk.
    pub fn find(&self, source: &Path) -> Option<PathBuf> {
        self.find_matching(source, |_| true)
    }

    /// The first existing candidate whose dimensions, as reported by `dimensions_of`, equal
    /// `dimensions`. Candidates `dimensions_of` cannot read are skipped.
    pub fn find_with_dimensions(
        &self,
        source: &Path,
        dimensions: (u32, u32),
        mut dimensions_of: impl FnMut(&Path) -> Option<(u32, u32)>,
    ) -> Option<PathBuf> {
        self.find_matching(source, |candidate| match dimensions_of(candidate) {
            Some(found) if found == dimensions => true,
            Some((w, h)) => {
                debug!(
                    "Skipping {}: {w}x{h} does not match {}x{}",
                    candidate.display(),
                    dimensions.0,
                    dimensions.1
                );
                false
            }
            None => false,
        })
    }

    fn find_matching(
        &self,
        source: &Path,
        mut accept: impl FnMut(&Path) -> bool,
    ) -> Option<PathBuf> {
        let source_canonical = source.canonicalize().ok();
        self.candidates(source).into_iter().find(|candidate| {
            if !candidate.is_file() {
                return false;
            }
            // Case-insensitive filesystems can resolve a candidate back to the input.
            if source_canonical.is_some() && candidate.canonicalize().ok() == source_canonical {
                return false;
            }
            accept(candidate)
        })
    }
}

/// Stems with one source token swapped for a normal token, followed by appended variants.
fn candidate_stems(stem: &str) -> Vec<String> {
    let mut stems = Vec::new();

    // Token boundaries, scanning from the end so suffixes win over prefixes.
    let bounds = token_bounds(stem);
    for &(start, end) in bounds.iter().rev() {
        let token = &stem[start..end];
        if !SOURCE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            continue;
        }
        for normal in NORMAL_TOKENS {
            let replaced = format!(
                "{}{}{}",
                &stem[..start],
                match_case(token, normal),
                &stem[end..]
            );
            if !stems.contains(&replaced) {
                stems.push(replaced);
            }
        }
    }

    for suffix in APPENDED_SUFFIXES {
        let appended = format!("{stem}{}", match_case(stem, suffix));
        if !stems.contains(&appended) {
            stems.push(appended);
        }
    }
    stems
}

fn token_bounds(stem: &str) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut start = 0;
    for (i, c) in stem.char_indices() {
        if SEPARATORS.contains(&c) {
            if i > start {
                bounds.push((start, i));
            }
            start = i + c.len_utf8();
        }
    }
    if stem.len() > start {
        bounds.push((start, stem.len()));
    }
    bounds
}

/// Applies the case style of `template` (upper, capitalized or lower) to `word`.
fn match_case(template: &str, word: &str) -> String {
    let mut letters = template.chars().filter(|c| c.is_alphabetic());
    match letters.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = letters.collect();
            if !rest.is_empty() && rest.iter().all(|c| c.is_uppercase()) {
                word.to_uppercase()
            } else {
                capitalize(word)
            }
        }
        _ => word.to_lowercase(),
    }
}

/// Uppercases the first letter of `word` and lowercases the rest.
fn capitalize(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut seen_letter = false;
    for c in word.chars() {
        if !seen_letter && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            seen_letter = true;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
