//! Block framing: header, payload and padding.

pub mod block_type;
pub mod flags;

pub use block_type::BlockType;
pub use flags::{BlockFlags, Quantization, BLOCK_VERSION};

use crate::{MetadataError, MetadataResult};
use half::f16;

/// Size of a block header: type, flags and a little endian `u16` payload length.
pub const BLOCK_HEADER_SIZE: usize = 4;

/// Blocks are padded with zeroes to a multiple of this.
pub const BLOCK_ALIGNMENT: usize = 4;

/// One self-contained type-length-value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    type_tag: u8,
    flags: BlockFlags,
    payload: Vec<u8>,
}

impl MetadataBlock {
    pub fn new(block_type: BlockType, quantization: Quantization, payload: Vec<u8>) -> Self {
        Self {
            type_tag: block_type.to_u8(),
            flags: BlockFlags::new(quantization),
            payload,
        }
    }

    /// A block with arbitrary header values, as found in the wild.
    pub fn from_raw(type_tag: u8, flags: u8, payload: Vec<u8>) -> Self {
        Self {
            type_tag,
            flags: BlockFlags(flags),
            payload,
        }
    }

    pub fn type_tag(&self) -> u8 {
        self.type_tag
    }

    /// The decoded type, or [`None`] for an unknown tag.
    pub fn block_type(&self) -> Option<BlockType> {
        BlockType::from_u8(self.type_tag)
    }

    pub fn flags(&self) -> BlockFlags {
        self.flags
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes this block occupies once written, padding included.
    pub fn encoded_len(&self) -> usize {
        (BLOCK_HEADER_SIZE + self.payload.len()).next_multiple_of(BLOCK_ALIGNMENT)
    }

    /// Appends the encoded block to `out`.
    ///
    /// # Errors
    ///
    /// [`MetadataError::PayloadTooLarge`] if the payload does not fit the `u16` length field.
    pub fn write_to(&self, out: &mut Vec<u8>) -> MetadataResult<()> {
        let len = u16::try_from(self.payload.len()).map_err(|_| MetadataError::PayloadTooLarge {
            len: self.payload.len(),
        })?;
        let start = out.len();
        out.push(self.type_tag);
        out.push(self.flags.0);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.payload);
        out.resize(start + self.encoded_len(), 0);
        Ok(())
    }
}

/// Encodes `blocks` back to back.
pub fn write_blocks(blocks: &[MetadataBlock]) -> MetadataResult<Vec<u8>> {
    let mut out = Vec::with_capacity(blocks.iter().map(MetadataBlock::encoded_len).sum());
    for block in blocks {
        block.write_to(&mut out)?;
    }
    Ok(out)
}

/// Splits `bytes` into blocks by their length fields.
///
/// The final block may omit its trailing padding.
///
/// # Errors
///
/// [`MetadataError::Truncated`] if a header or payload runs past the end of `bytes`.
pub fn read_blocks(bytes: &[u8]) -> MetadataResult<Vec<MetadataBlock>> {
    let mut blocks = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let remaining = bytes.len() - offset;
        if remaining < BLOCK_HEADER_SIZE {
            return Err(MetadataError::Truncated {
                offset,
                needed: BLOCK_HEADER_SIZE,
                available: remaining,
            });
        }
        let header = &bytes[offset..offset + BLOCK_HEADER_SIZE];
        let len = u16::from_le_bytes([header[2], header[3]]) as usize;
        let payload_start = offset + BLOCK_HEADER_SIZE;
        let Some(payload) = bytes.get(payload_start..payload_start + len) else {
            return Err(MetadataError::Truncated {
                offset,
                needed: BLOCK_HEADER_SIZE + len,
                available: remaining,
            });
        };
        let block = MetadataBlock::from_raw(header[0], header[1], payload.to_vec());
        offset = (offset + block.encoded_len()).min(bytes.len());
        blocks.push(block);
    }
    Ok(blocks)
}

/// Encodes `values` with the given quantization.
pub fn encode_values(values: &[f32], quantization: Quantization) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * quantization.value_size());
    for &value in values {
        match quantization {
            Quantization::F32 => out.extend_from_slice(&value.to_le_bytes()),
            Quantization::Half16 => {
                out.extend_from_slice(&f16::from_f32(value).to_bits().to_le_bytes())
            }
        }
    }
    out
}

/// Decodes a payload of packed values. Trailing bytes that do not form a whole value are ignored.
pub fn decode_values(payload: &[u8], quantization: Quantization) -> Vec<f32> {
    match quantization {
        Quantization::F32 => payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        Quantization::Half16 => payload
            .chunks_exact(2)
            .map(|b| f16::from_bits(u16::from_le_bytes([b[0], b[1]])).to_f32())
            .collect(),
    }
}
