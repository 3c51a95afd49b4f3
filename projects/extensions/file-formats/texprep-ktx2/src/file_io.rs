//! File based wrappers around the in-memory operations.
//!
//! Inputs are memory mapped read-only. Patched output is written to a temporary file in the
//! same directory, which then replaces the original in a single rename; on any error the
//! original file is left as it was.

use crate::ktx2::layout::{parse_layout, Ktx2Layout};
use crate::ktx2::patch::{insert_metadata, read_metadata, PatchSummary};
use crate::Ktx2Result;
use lightweight_mmap::handles::*;
use lightweight_mmap::mmap::*;
use log::info;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Maps `path` read-only and passes its contents to `f`.
///
/// The mapping is released before this returns.
fn with_mapped_file<R>(path: &Path, f: impl FnOnce(&[u8]) -> Ktx2Result<R>) -> Ktx2Result<R> {
    let handle = ReadOnlyFileHandle::open(path)?;
    let size = handle.size()? as usize;
    if size == 0 {
        return f(&[]);
    }
    let mapping = ReadOnlyMmap::new(&handle, 0, size)?;
    f(mapping.as_slice())
}

/// Parses the layout of the KTX2 file at `path`.
pub fn read_layout_file(path: &Path) -> Ktx2Result<Ktx2Layout> {
    with_mapped_file(path, parse_layout)
}

/// Reads the value stored under `key` in the KTX2 file at `path`.
pub fn read_metadata_file(path: &Path, key: &str) -> Ktx2Result<Option<Vec<u8>>> {
    with_mapped_file(path, |data| {
        Ok(read_metadata(data, key)?.map(<[u8]>::to_vec))
    })
}

/// Inserts `value` under `key` into the KTX2 file at `path`, replacing it atomically.
///
/// # Errors
///
/// Any error from [`insert_metadata`], or an I/O error while writing the replacement. The
/// original file is unchanged in every error case.
pub fn insert_metadata_file(path: &Path, key: &str, value: &[u8]) -> Ktx2Result<PatchSummary> {
    let (patched, summary) = with_mapped_file(path, |data| insert_metadata(data, key, value))?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory)?;
    temp.write_all(&patched)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    info!(
        "Embedded {} bytes of metadata in {} ({} bytes inserted)",
        value.len(),
        path.display(),
        summary.inserted_length
    );
    Ok(summary)
}
