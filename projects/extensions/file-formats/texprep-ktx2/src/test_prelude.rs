//! Common test imports and utilities for KTX2 tests
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

// External crates commonly used in tests
pub use rstest::rstest;

pub(crate) use crate::ktx2::constants::*;
pub use crate::ktx2::layout::{parse_layout, Ktx2Layout};

/// Size of the basic data format descriptor written by [`Ktx2Fixture`]: total size word,
/// 24 byte block header and one 16 byte sample.
const FIXTURE_DFD_SIZE: usize = 44;

/// VK_FORMAT_BC7_UNORM_BLOCK
const FIXTURE_VK_FORMAT: u32 = 145;

/// Builds small but structurally valid KTX2 files.
///
/// Level data is written smallest level first, as real writers do, with each level filled
/// by a pattern unique to its index.
#[derive(Debug, Clone)]
pub struct Ktx2Fixture {
    width: u32,
    height: u32,
    level_lengths: Vec<usize>,
    supercompression: u32,
    bytes_plane0: u8,
    sgd_length: usize,
    kvd_entries: Vec<(String, Vec<u8>)>,
}

impl Ktx2Fixture {
    pub fn new(width: u32, height: u32, level_lengths: &[usize]) -> Self {
        Self {
            width,
            height,
            level_lengths: level_lengths.to_vec(),
            supercompression: 0,
            bytes_plane0: 16,
            sgd_length: 0,
            kvd_entries: Vec::new(),
        }
    }

    /// Sets the scheme. Non-zero schemes zero `bytesPlane0`, as the format requires.
    pub fn with_supercompression(mut self, scheme: u32) -> Self {
        self.supercompression = scheme;
        if scheme != 0 {
            self.bytes_plane0 = 0;
        }
        self
    }

    pub fn with_bytes_plane0(mut self, bytes: u8) -> Self {
        self.bytes_plane0 = bytes;
        self
    }

    pub fn with_sgd(mut self, length: usize) -> Self {
        self.sgd_length = length;
        self
    }

    /// Adds an entry in the standard `keyAndValueByteLength, key, NUL, value` layout.
    pub fn with_kvd_entry(mut self, key: &str, value: &[u8]) -> Self {
        self.kvd_entries.push((key.to_string(), value.to_vec()));
        self
    }

    fn level_alignment(&self) -> usize {
        if self.supercompression != 0 || self.bytes_plane0 == 0 {
            return 8;
        }
        let plane = self.bytes_plane0 as usize;
        (1..=plane * 4)
            .map(|n| n * 4)
            .find(|n| n % plane == 0)
            .unwrap_or(4)
    }

    pub fn build(&self) -> Vec<u8> {
        let level_count = self.level_lengths.len();
        let mut out = vec![0u8; HEADER_SIZE + level_count.max(1) * LEVEL_INDEX_ENTRY_SIZE];
        out[..12].copy_from_slice(&KTX2_IDENTIFIER);
        put_u32(&mut out, VK_FORMAT_OFFSET, FIXTURE_VK_FORMAT);
        put_u32(&mut out, TYPE_SIZE_OFFSET, 1);
        put_u32(&mut out, PIXEL_WIDTH_OFFSET, self.width);
        put_u32(&mut out, PIXEL_HEIGHT_OFFSET, self.height);
        put_u32(&mut out, FACE_COUNT_OFFSET, 1);
        put_u32(&mut out, LEVEL_COUNT_OFFSET, level_count as u32);
        put_u32(&mut out, SUPERCOMPRESSION_OFFSET, self.supercompression);

        // Data format descriptor
        let dfd_offset = out.len();
        out.extend_from_slice(&(FIXTURE_DFD_SIZE as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(2u32 | ((FIXTURE_DFD_SIZE as u32 - 4) << 16)).to_le_bytes());
        out.extend_from_slice(&[128, 1, 2, 0]);
        out.extend_from_slice(&[3, 3, 0, 0]);
        out.extend_from_slice(&[self.bytes_plane0, 0, 0, 0, 0, 0, 0, 0]);
        out.extend_from_slice(&[0u8; 16]);
        put_u32(&mut out, DFD_OFFSET, dfd_offset as u32);
        put_u32(&mut out, DFD_LENGTH, FIXTURE_DFD_SIZE as u32);

        // Key/value data
        if !self.kvd_entries.is_empty() {
            let kvd_offset = out.len();
            for (key, value) in &self.kvd_entries {
                let length = (key.len() + 1 + value.len()) as u32;
                out.extend_from_slice(&length.to_le_bytes());
                out.extend_from_slice(key.as_bytes());
                out.push(0);
                out.extend_from_slice(value);
                out.resize(out.len().next_multiple_of(4), 0);
            }
            put_u32(&mut out, KVD_OFFSET, kvd_offset as u32);
            let kvd_length = (out.len() - kvd_offset) as u32;
            put_u32(&mut out, KVD_LENGTH, kvd_length);
        }

        // Supercompression global data
        if self.sgd_length > 0 {
            out.resize(out.len().next_multiple_of(8), 0);
            let sgd_offset = out.len();
            out.extend((0..self.sgd_length).map(|i| 0xC0 ^ i as u8));
            put_u64(&mut out, SGD_OFFSET, sgd_offset as u64);
            put_u64(&mut out, SGD_LENGTH, self.sgd_length as u64);
        }

        // Levels, smallest first
        let alignment = self.level_alignment();
        for (level, &length) in self.level_lengths.iter().enumerate().rev() {
            out.resize(out.len().next_multiple_of(alignment), 0);
            let offset = out.len();
            out.extend(level_pattern(level, length));
            let at = HEADER_SIZE + level * LEVEL_INDEX_ENTRY_SIZE;
            put_u64(&mut out, at, offset as u64);
            put_u64(&mut out, at + 8, length as u64);
            put_u64(&mut out, at + 16, length as u64);
        }
        out
    }
}

/// Payload bytes the fixture writes for `level`.
pub fn level_pattern(level: usize, length: usize) -> impl Iterator<Item = u8> {
    (0..length).map(move |i| (level as u8).wrapping_mul(37) ^ (i as u8))
}

/// Payload bytes of every level, in index order.
pub fn level_payloads(data: &[u8], layout: &Ktx2Layout) -> Vec<Vec<u8>> {
    layout
        .levels
        .iter()
        .map(|l| data[l.byte_offset as usize..(l.byte_offset + l.byte_length) as usize].to_vec())
        .collect()
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
