//! Compact binary encoding of histogram recovery coefficients.
//!
//! The block compressor that produces the final container has no way to carry custom data, so
//! the coefficients needed to undo histogram normalization are encoded here and spliced into
//! the container afterwards under the [`METADATA_KEY`] key.
//!
//! # The Block Format
//!
//! A metadata value is a sequence of type-length-value blocks:
//!
//! `u8`      - Type tag [`BlockType`]
//! `u8`      - Flags [`BlockFlags`]: version in the high nibble, [`Quantization`] in the low
//! `u16`     - Payload length in bytes, little endian
//! `[u8; n]` - Payload
//!
//! Each block is zero padded to a multiple of 4 bytes.
//!
//! Coefficient blocks hold `(scale, offset)` pairs as half floats. The pairs are the *inverse*
//! of the forward normalization, so a shader recovers the original value with
//! `original = normalized * scale + offset`.
//!
//! Readers skip blocks with unknown tags or versions and, if several coefficient blocks are
//! present, use the most specific one: RGBA quad, then RGB triple, then RGB scalar, then
//! full scalar.
//!
//! ## Legacy Coefficients
//!
//! Early files stored the forward transform instead. A forward scale is always above 1 for a
//! window narrower than `[0, 1]`, while a stored inverse never is, so any pair with a scale
//! above 1 is inverted when read.
//!
//! [`BlockFlags`]: tlv::BlockFlags
//! [`Quantization`]: tlv::Quantization

pub mod coefficients;
pub mod error;
pub mod params;
pub mod tlv;

pub use coefficients::{
    block_type_for, decode_metadata, encode_histogram, DecodedMetadata, RecoveryCoefficients,
};
pub use error::{MetadataError, MetadataResult};
pub use params::HistogramParams;
pub use tlv::{BlockType, MetadataBlock};

/// Key under which the encoded blocks are stored in the container's key/value data.
pub const METADATA_KEY: &str = "texprep.histogram";
