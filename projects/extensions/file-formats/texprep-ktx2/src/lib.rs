//! Reading and patching KTX2 containers.
//!
//! Block compressors write KTX2 files without any way to attach custom data. This crate
//! splices a key/value entry into such a file after the fact, moving the level data and
//! rewriting every affected offset, and reads the entry back.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use texprep_ktx2::{insert_metadata_file, read_metadata_file};
//!
//! let path = Path::new("albedo.ktx2");
//! insert_metadata_file(path, "texprep.histogram", &[0x02, 0x11, 0x04, 0x00])?;
//! let value = read_metadata_file(path, "texprep.histogram")?;
//! assert!(value.is_some());
//! # Ok::<(), texprep_ktx2::Ktx2Error>(())
//! ```

pub mod error;
pub mod file_io;
pub mod ktx2;

#[cfg(test)]
pub mod test_prelude;

pub use error::{Ktx2Error, Ktx2Result, LightweightMmapError};
pub use file_io::{insert_metadata_file, read_layout_file, read_metadata_file};
pub use ktx2::layout::{parse_layout, Ktx2Layout, LevelIndex, Region};
pub use ktx2::patch::{encode_entry, insert_metadata, read_metadata, PatchSummary};
