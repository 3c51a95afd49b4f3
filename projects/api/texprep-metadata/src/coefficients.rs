//! Encoding histogram results and decoding GPU-ready recovery coefficients.

use crate::params::HistogramParams;
use crate::tlv::{
    decode_values, encode_values, read_blocks, write_blocks, BlockType, MetadataBlock,
    Quantization, BLOCK_VERSION,
};
use crate::{MetadataError, MetadataResult};
use log::{debug, warn};
use texprep_histogram::{ChannelMode, HistogramMode, HistogramResult};

/// Identity `(scale, offset)` pair.
const IDENTITY: (f32, f32) = (1.0, 0.0);

/// Inverse (GPU-ready) pairs: `original = normalized * scale + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryCoefficients {
    block_type: BlockType,
    pairs: Vec<(f32, f32)>,
}

impl RecoveryCoefficients {
    /// The block these pairs came from.
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn pairs(&self) -> &[(f32, f32)] {
        &self.pairs
    }

    /// Pairs expanded to RGBA. Channels the block does not cover get identity.
    pub fn per_channel(&self) -> [(f32, f32); 4] {
        let first = self.pairs.first().copied().unwrap_or(IDENTITY);
        let pair = |i: usize| self.pairs.get(i).copied().unwrap_or(IDENTITY);
        match self.block_type {
            BlockType::FullScalar => [first; 4],
            BlockType::RgbScalar => [first, first, first, IDENTITY],
            BlockType::RgbTriple => [pair(0), pair(1), pair(2), IDENTITY],
            _ => [pair(0), pair(1), pair(2), pair(3)],
        }
    }

    /// Recovers the original value of `channel` (0 to 3) from a normalized sample.
    pub fn recover(&self, channel: usize, normalized: f32) -> f32 {
        let (scale, offset) = self.per_channel()[channel.min(3)];
        normalized * scale + offset
    }
}

/// Everything decoded from a metadata value.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMetadata {
    pub coefficients: RecoveryCoefficients,
    pub params: Option<HistogramParams>,
}

/// The coefficient block type that represents `channel_mode`.
pub fn block_type_for(channel_mode: ChannelMode) -> BlockType {
    match channel_mode {
        ChannelMode::AverageLuminance => BlockType::RgbScalar,
        ChannelMode::PerChannelRgb => BlockType::RgbTriple,
        ChannelMode::PerChannelRgba => BlockType::RgbaQuad,
    }
}

/// Encodes `result` as a coefficient block followed by a params block.
///
/// The coefficient block stores the inverted pairs from
/// [`HistogramResult::stored_coefficients`] as half floats.
pub fn encode_histogram(
    result: &HistogramResult,
    histogram_mode: HistogramMode,
) -> MetadataResult<Vec<u8>> {
    let block_type = block_type_for(result.channel_mode());
    let stored = result.stored_coefficients();
    if block_type.pair_count() != Some(stored.len()) {
        return Err(MetadataError::UnsupportedGroupCount {
            groups: stored.len(),
        });
    }

    let values: Vec<f32> = stored.iter().flat_map(|&(s, o)| [s, o]).collect();
    let coefficients = MetadataBlock::new(
        block_type,
        Quantization::Half16,
        encode_values(&values, Quantization::Half16),
    );
    let params = HistogramParams {
        range_low: result.range_low(),
        range_high: result.range_high(),
        channel_mode: result.channel_mode(),
        histogram_mode,
    };
    write_blocks(&[coefficients, params.to_block()])
}

/// Reads a metadata value and returns the preferred coefficient block.
///
/// Returns `Ok(None)` when no usable coefficient block is present.
///
/// # Errors
///
/// [`MetadataError::Truncated`] if the block framing itself is damaged.
pub fn decode_metadata(bytes: &[u8]) -> MetadataResult<Option<DecodedMetadata>> {
    let mut best: Option<RecoveryCoefficients> = None;
    let mut params = None;

    for block in read_blocks(bytes)? {
        let version = block.flags().version();
        if version != BLOCK_VERSION {
            debug!(
                "Skipping block 0x{:02X} with unsupported version {version}",
                block.type_tag()
            );
            continue;
        }
        let Some(block_type) = block.block_type() else {
            debug!("Skipping unknown block type 0x{:02X}", block.type_tag());
            continue;
        };

        if block_type == BlockType::Params {
            params = HistogramParams::from_block(&block);
            continue;
        }
        let Some(coefficients) = decode_coefficients(&block, block_type) else {
            warn!(
                "Skipping malformed {block_type:?} block ({} byte payload)",
                block.payload().len()
            );
            continue;
        };
        if best
            .as_ref()
            .map_or(true, |b| block_type.preference() > b.block_type.preference())
        {
            best = Some(coefficients);
        }
    }

    Ok(best.map(|coefficients| DecodedMetadata {
        coefficients,
        params,
    }))
}

fn decode_coefficients(
    block: &MetadataBlock,
    block_type: BlockType,
) -> Option<RecoveryCoefficients> {
    let pair_count = block_type.pair_count()?;
    let quantization = block.flags().quantization()?;
    if block.payload().len() < pair_count * 2 * quantization.value_size() {
        return None;
    }
    let values = decode_values(block.payload(), quantization);
    let pairs = values
        .chunks_exact(2)
        .take(pair_count)
        .map(|pair| gpu_ready_pair(pair[0], pair[1]))
        .collect();
    Some(RecoveryCoefficients { block_type, pairs })
}

/// Older writers stored the forward transform. A forward scale maps a sub-unit window onto
/// `[0, 1]` and is therefore above 1; those pairs are inverted here.
fn gpu_ready_pair(scale: f32, offset: f32) -> (f32, f32) {
    if scale > 1.0 {
        (1.0 / scale, -offset / scale)
    } else {
        (scale, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scalar_block(block_type: BlockType, scale: f32, offset: f32) -> MetadataBlock {
        MetadataBlock::new(
            block_type,
            Quantization::Half16,
            encode_values(&[scale, offset], Quantization::Half16),
        )
    }

    #[test]
    fn reference_result_round_trips() {
        let result = HistogramResult::from_range(ChannelMode::AverageLuminance, 0.0234, 0.9843);
        let bytes = encode_histogram(&result, HistogramMode::PercentileWithKnee).unwrap();
        assert_eq!(bytes.len() % 4, 0);

        let decoded = decode_metadata(&bytes).unwrap().unwrap();
        assert_eq!(decoded.coefficients.block_type(), BlockType::RgbScalar);
        let (scale, offset) = decoded.coefficients.pairs()[0];
        assert!((scale - 0.9610).abs() < 1e-3);
        assert!((offset - 0.0234).abs() < 1e-3);
        assert!((decoded.coefficients.recover(0, 0.5) - 0.5039).abs() < 1e-3);
        assert_eq!(decoded.coefficients.per_channel()[3], IDENTITY);

        let params = decoded.params.unwrap();
        assert_eq!(params.histogram_mode, HistogramMode::PercentileWithKnee);
        assert_eq!(params.channel_mode, ChannelMode::AverageLuminance);
    }

    #[rstest]
    #[case(ChannelMode::PerChannelRgb, BlockType::RgbTriple, 3)]
    #[case(ChannelMode::PerChannelRgba, BlockType::RgbaQuad, 4)]
    fn per_channel_results_use_matching_block(
        #[case] channel_mode: ChannelMode,
        #[case] expected: BlockType,
        #[case] pairs: usize,
    ) {
        let result = HistogramResult::from_range(channel_mode, 0.1, 0.6);
        let bytes = encode_histogram(&result, HistogramMode::Percentile).unwrap();
        let decoded = decode_metadata(&bytes).unwrap().unwrap();
        assert_eq!(decoded.coefficients.block_type(), expected);
        assert_eq!(decoded.coefficients.pairs().len(), pairs);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.5, 1.25)]
    #[case(1.0, 2.0)]
    #[case(0.731, 0.377)]
    fn stored_pairs_round_trip_within_tolerance(#[case] scale: f32, #[case] offset: f32) {
        let bytes = write_blocks(&[scalar_block(BlockType::FullScalar, scale, offset)]).unwrap();
        let decoded = decode_metadata(&bytes).unwrap().unwrap();
        let (s, o) = decoded.coefficients.pairs()[0];
        assert!((s - scale).abs() < 1e-3);
        assert!((o - offset).abs() < 1e-3);
    }

    #[test]
    fn legacy_forward_scale_is_inverted() {
        let bytes = write_blocks(&[scalar_block(BlockType::FullScalar, 2.0, 0.0)]).unwrap();
        let (scale, _) = decode_metadata(&bytes).unwrap().unwrap().coefficients.pairs()[0];
        assert_eq!(scale, 0.5);
    }

    #[test]
    fn gpu_ready_scale_is_used_as_is() {
        let bytes = write_blocks(&[scalar_block(BlockType::FullScalar, 0.5, 0.25)]).unwrap();
        let pairs = decode_metadata(&bytes).unwrap().unwrap().coefficients;
        assert_eq!(pairs.pairs()[0], (0.5, 0.25));
        assert_eq!(pairs.per_channel(), [(0.5, 0.25); 4]);
    }

    #[test]
    fn prefers_most_specific_block() {
        let quad = MetadataBlock::new(
            BlockType::RgbaQuad,
            Quantization::Half16,
            encode_values(&[0.5, 0.0, 0.25, 0.0, 0.125, 0.0, 1.0, 0.0], Quantization::Half16),
        );
        let bytes = write_blocks(&[
            scalar_block(BlockType::FullScalar, 0.9, 0.0),
            quad,
            scalar_block(BlockType::RgbScalar, 0.8, 0.0),
        ])
        .unwrap();
        let decoded = decode_metadata(&bytes).unwrap().unwrap();
        assert_eq!(decoded.coefficients.block_type(), BlockType::RgbaQuad);
        assert_eq!(decoded.coefficients.pairs()[2], (0.125, 0.0));
    }

    #[test]
    fn unknown_types_and_versions_are_skipped() {
        let quad = scalar_block(BlockType::RgbaQuad, 0.1, 0.1);
        let future = MetadataBlock::from_raw(quad.type_tag(), 0x21, quad.payload().to_vec());
        let bytes = write_blocks(&[
            MetadataBlock::from_raw(0x55, 0x11, vec![9; 6]),
            future,
            scalar_block(BlockType::RgbScalar, 0.75, 0.1),
        ])
        .unwrap();
        let decoded = decode_metadata(&bytes).unwrap().unwrap();
        assert_eq!(decoded.coefficients.block_type(), BlockType::RgbScalar);
        assert!(decoded.params.is_none());
    }

    #[test]
    fn no_coefficient_block_is_none() {
        let params = HistogramParams {
            range_low: 0.0,
            range_high: 1.0,
            channel_mode: ChannelMode::AverageLuminance,
            histogram_mode: HistogramMode::Percentile,
        };
        let bytes = write_blocks(&[params.to_block()]).unwrap();
        assert_eq!(decode_metadata(&bytes).unwrap(), None);
        assert_eq!(decode_metadata(&[]).unwrap(), None);
    }

    #[test]
    fn short_coefficient_payload_is_skipped() {
        let bytes = write_blocks(&[MetadataBlock::new(
            BlockType::RgbTriple,
            Quantization::Half16,
            vec![0; 4],
        )])
        .unwrap();
        assert_eq!(decode_metadata(&bytes).unwrap(), None);
    }
}
