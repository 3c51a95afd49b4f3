//! The analysis parameters block.

use crate::tlv::{decode_values, encode_values, BlockType, MetadataBlock, Quantization};
use texprep_histogram::{ChannelMode, HistogramMode};

/// Payload size of a params block: two `f32`, two mode bytes and two reserved bytes.
const PARAMS_PAYLOAD_SIZE: usize = 12;

/// How the stored coefficients were derived. Informational; recovery only needs the
/// coefficient block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramParams {
    pub range_low: f32,
    pub range_high: f32,
    pub channel_mode: ChannelMode,
    pub histogram_mode: HistogramMode,
}

impl HistogramParams {
    pub fn to_block(&self) -> MetadataBlock {
        let mut payload = encode_values(&[self.range_low, self.range_high], Quantization::F32);
        payload.push(self.channel_mode.to_u8());
        payload.push(self.histogram_mode.to_u8());
        payload.extend_from_slice(&[0, 0]);
        MetadataBlock::new(BlockType::Params, Quantization::F32, payload)
    }

    /// Decodes a params block. Returns [`None`] for a malformed payload or unknown mode values.
    pub fn from_block(block: &MetadataBlock) -> Option<Self> {
        let payload = block.payload();
        if block.block_type() != Some(BlockType::Params) || payload.len() < PARAMS_PAYLOAD_SIZE {
            return None;
        }
        let range = decode_values(&payload[..8], block.flags().quantization()?);
        let (&range_low, &range_high) = (range.first()?, range.get(1)?);
        Some(Self {
            range_low,
            range_high,
            channel_mode: ChannelMode::from_u8(payload[8])?,
            histogram_mode: HistogramMode::from_u8(payload[9])?,
        })
    }
}
