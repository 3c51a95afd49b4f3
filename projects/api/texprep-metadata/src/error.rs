//! Error types for metadata encoding and decoding.

use thiserror::Error;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while framing or reading metadata blocks.
///
/// Unknown block types, unknown versions and malformed coefficient payloads are not errors;
/// such blocks are skipped by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A block header or payload extends past the end of the input
    #[error("Truncated metadata block at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The payload is too long for the 16-bit length field
    #[error("Metadata payload of {len} bytes exceeds 65535")]
    PayloadTooLarge { len: usize },

    /// The histogram result has a group count no block type can represent
    #[error("Cannot encode {groups} coefficient groups")]
    UnsupportedGroupCount { groups: usize },
}
