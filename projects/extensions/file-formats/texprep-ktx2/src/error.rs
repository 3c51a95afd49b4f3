//! Error types for KTX2 parsing and patching.

use thiserror::Error;

/// Result type for KTX2 operations
pub type Ktx2Result<T> = Result<T, Ktx2Error>;

/// Errors that can occur while reading or patching a KTX2 container.
///
/// Every error is raised before any output is produced; a failed patch never touches the
/// original file.
#[derive(Debug, Error)]
pub enum Ktx2Error {
    /// The data does not start with the KTX2 identifier
    #[error("Not a KTX2 file: identifier mismatch")]
    InvalidIdentifier,

    /// The header or level index extends past the end of the data
    #[error("Truncated KTX2 data: needed {needed} bytes, {available} available")]
    Truncated { needed: u64, available: u64 },

    /// More mip levels than any valid texture can have
    #[error("Level count {level_count} exceeds the maximum of 31")]
    TooManyLevels { level_count: u32 },

    /// The supercompression scheme is not one of the defined values
    #[error("Unknown supercompression scheme {scheme}")]
    UnsupportedSupercompression { scheme: u32 },

    /// A region described by the header lies outside the file
    #[error("{region} region at offset {offset} with length {length} exceeds file length {file_len}")]
    RegionOutOfBounds {
        region: &'static str,
        offset: u64,
        length: u64,
        file_len: u64,
    },

    /// A region straddles or precedes the metadata insertion point where it must not
    #[error("{region} region at offset {offset} conflicts with insertion point {insertion_point}")]
    RegionOverlapsInsertion {
        region: &'static str,
        offset: u64,
        insertion_point: u64,
    },

    /// The key is already present in the key/value data
    #[error("Key '{0}' already exists in the key/value data")]
    KeyExists(String),

    /// The key is empty or contains a NUL byte
    #[error("Invalid metadata key")]
    InvalidKey,

    /// The key/value data would no longer fit its 32-bit header fields
    #[error("Key/value data of {len} bytes does not fit a 32-bit field")]
    KvdTooLarge { len: u64 },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from lightweight-mmap backend
    #[error("lightweight-mmap error: {0}")]
    LightweightMmap(#[from] LightweightMmapError),
}

/// Errors from the memory mapping backend.
#[derive(Debug, Error)]
pub enum LightweightMmapError {
    /// Error opening file handle
    #[error("Failed to open file handle: {0}")]
    FileHandle(#[from] lightweight_mmap::handles::HandleOpenError),

    /// Error creating memory mapping
    #[error("Failed to create memory mapping: {0}")]
    MemoryMapping(#[from] lightweight_mmap::mmap::MmapError),
}

impl From<lightweight_mmap::handles::HandleOpenError> for Ktx2Error {
    fn from(e: lightweight_mmap::handles::HandleOpenError) -> Self {
        Self::LightweightMmap(LightweightMmapError::FileHandle(e))
    }
}

impl From<lightweight_mmap::mmap::MmapError> for Ktx2Error {
    fn from(e: lightweight_mmap::mmap::MmapError) -> Self {
        Self::LightweightMmap(LightweightMmapError::MemoryMapping(e))
    }
}
