//! Shared helpers for pipeline integration tests.
#![allow(dead_code)]

#[path = "../../src/test_prelude/rasters.rs"]
mod rasters;
pub use rasters::*;

use texprep_pipeline::{CompressRequest, PipelineError, PipelineResult, TextureCompressor};

/// VK_FORMAT_R8G8B8A8_UNORM
const VK_FORMAT_R8G8B8A8_UNORM: u32 = 37;

const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Stores every level image as raw RGBA8 in an uncompressed KTX2 file.
#[derive(Debug, Default)]
pub struct PackingCompressor;

impl TextureCompressor for PackingCompressor {
    fn compress(&self, request: &CompressRequest<'_>) -> PipelineResult<()> {
        let mut levels = Vec::with_capacity(request.level_paths.len());
        for path in request.level_paths {
            let image = image::open(path)?.to_rgba8();
            levels.push((image.width(), image.height(), image.into_raw()));
        }
        std::fs::write(request.output, build_ktx2(&levels))?;
        Ok(())
    }
}

/// Always fails, as a crashed compressor would.
#[derive(Debug, Default)]
pub struct FailingCompressor;

impl TextureCompressor for FailingCompressor {
    fn compress(&self, _request: &CompressRequest<'_>) -> PipelineResult<()> {
        Err(PipelineError::CompressorFailed {
            program: "failing".to_string(),
            status: Some(1),
            stderr: "simulated failure".to_string(),
        })
    }
}

fn build_ktx2(levels: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let index_end = 80 + levels.len() * 24;
    let mut out = vec![0u8; index_end];
    out[..12].copy_from_slice(&KTX2_IDENTIFIER);
    let (width, height) = levels.first().map_or((0, 0), |l| (l.0, l.1));
    put_u32(&mut out, 12, VK_FORMAT_R8G8B8A8_UNORM);
    put_u32(&mut out, 16, 1);
    put_u32(&mut out, 20, width);
    put_u32(&mut out, 24, height);
    put_u32(&mut out, 36, 1);
    put_u32(&mut out, 40, levels.len() as u32);

    // Basic data format descriptor with bytesPlane0 = 4 and no samples
    put_u32(&mut out, 48, index_end as u32);
    put_u32(&mut out, 52, 28);
    out.extend_from_slice(&28u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(2u32 | (24 << 16)).to_le_bytes());
    out.extend_from_slice(&[1, 1, 2, 0, 0, 0, 0, 0]);
    out.extend_from_slice(&[4, 0, 0, 0, 0, 0, 0, 0]);

    for (index, (_, _, data)) in levels.iter().enumerate().rev() {
        out.resize(out.len().next_multiple_of(4), 0);
        let offset = out.len() as u64;
        out.extend_from_slice(data);
        let at = 80 + index * 24;
        put_u64(&mut out, at, offset);
        put_u64(&mut out, at + 8, data.len() as u64);
        put_u64(&mut out, at + 16, data.len() as u64);
    }
    out
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
