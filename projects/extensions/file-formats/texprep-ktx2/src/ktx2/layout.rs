use super::constants::*;
use crate::{Ktx2Error, Ktx2Result};

/// A byte range inside the file, as described by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub offset: u64,
    pub length: u64,
}

impl Region {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// A zero length region is absent; its offset carries no meaning.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// One record of the level index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelIndex {
    pub byte_offset: u64,
    pub byte_length: u64,
    pub uncompressed_byte_length: u64,
}

impl LevelIndex {
    pub fn region(&self) -> Region {
        Region {
            offset: self.byte_offset,
            length: self.byte_length,
        }
    }
}

/// The parsed header and level index of a KTX2 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ktx2Layout {
    pub vk_format: u32,
    pub type_size: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixel_depth: u32,
    pub layer_count: u32,
    pub face_count: u32,
    /// Value as stored. 0 means "generate mips at load time" and still has one index record.
    pub level_count: u32,
    pub supercompression_scheme: u32,
    pub dfd: Region,
    pub kvd: Region,
    pub sgd: Region,
    pub levels: Vec<LevelIndex>,
}

impl Ktx2Layout {
    /// First byte after the level index.
    pub fn level_index_end(&self) -> u64 {
        (HEADER_SIZE + self.levels.len() * LEVEL_INDEX_ENTRY_SIZE) as u64
    }

    /// Where new key/value entries go: the end of the existing key/value data, or the end of
    /// the descriptor (or level index) when the file has none.
    pub fn insertion_point(&self) -> u64 {
        if !self.kvd.is_empty() {
            return self.kvd.end();
        }
        if self.dfd.is_empty() {
            self.level_index_end()
        } else {
            self.dfd.end().max(self.level_index_end())
        }
    }

    /// Human readable name of the supercompression scheme.
    pub fn supercompression_name(&self) -> &'static str {
        match self.supercompression_scheme {
            0 => "none",
            1 => "BasisLZ",
            2 => "Zstandard",
            3 => "ZLIB",
            _ => "unknown",
        }
    }
}

#[inline]
pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
pub(crate) fn read_u64(data: &[u8], offset: usize) -> u64 {
    u64::from(read_u32(data, offset)) | (u64::from(read_u32(data, offset + 4)) << 32)
}

/// Parses and validates the header and level index of a KTX2 file.
///
/// # Errors
///
/// - [`Ktx2Error::InvalidIdentifier`] if the identifier does not match
/// - [`Ktx2Error::Truncated`] if the header or level index is cut short
/// - [`Ktx2Error::TooManyLevels`] for a level count above 31
/// - [`Ktx2Error::UnsupportedSupercompression`] for a scheme above 3
/// - [`Ktx2Error::RegionOutOfBounds`] if a region or level lies outside the file
pub fn parse_layout(data: &[u8]) -> Ktx2Result<Ktx2Layout> {
    if !data.starts_with(&KTX2_IDENTIFIER) {
        return Err(Ktx2Error::InvalidIdentifier);
    }
    let file_len = data.len() as u64;
    if data.len() < HEADER_SIZE {
        return Err(Ktx2Error::Truncated {
            needed: HEADER_SIZE as u64,
            available: file_len,
        });
    }

    let level_count = read_u32(data, LEVEL_COUNT_OFFSET);
    if level_count > MAX_LEVEL_COUNT {
        return Err(Ktx2Error::TooManyLevels { level_count });
    }
    let supercompression_scheme = read_u32(data, SUPERCOMPRESSION_OFFSET);
    if supercompression_scheme > MAX_SUPERCOMPRESSION_SCHEME {
        return Err(Ktx2Error::UnsupportedSupercompression {
            scheme: supercompression_scheme,
        });
    }

    let record_count = level_count.max(1) as usize;
    let index_end = HEADER_SIZE + record_count * LEVEL_INDEX_ENTRY_SIZE;
    if data.len() < index_end {
        return Err(Ktx2Error::Truncated {
            needed: index_end as u64,
            available: file_len,
        });
    }

    let levels = (0..record_count)
        .map(|i| {
            let at = HEADER_SIZE + i * LEVEL_INDEX_ENTRY_SIZE;
            LevelIndex {
                byte_offset: read_u64(data, at),
                byte_length: read_u64(data, at + 8),
                uncompressed_byte_length: read_u64(data, at + 16),
            }
        })
        .collect();

    let layout = Ktx2Layout {
        vk_format: read_u32(data, VK_FORMAT_OFFSET),
        type_size: read_u32(data, TYPE_SIZE_OFFSET),
        pixel_width: read_u32(data, PIXEL_WIDTH_OFFSET),
        pixel_height: read_u32(data, PIXEL_HEIGHT_OFFSET),
        pixel_depth: read_u32(data, PIXEL_DEPTH_OFFSET),
        layer_count: read_u32(data, LAYER_COUNT_OFFSET),
        face_count: read_u32(data, FACE_COUNT_OFFSET),
        level_count,
        supercompression_scheme,
        dfd: Region {
            offset: u64::from(read_u32(data, DFD_OFFSET)),
            length: u64::from(read_u32(data, DFD_LENGTH)),
        },
        kvd: Region {
            offset: u64::from(read_u32(data, KVD_OFFSET)),
            length: u64::from(read_u32(data, KVD_LENGTH)),
        },
        sgd: Region {
            offset: read_u64(data, SGD_OFFSET),
            length: read_u64(data, SGD_LENGTH),
        },
        levels,
    };

    check_in_bounds("dfd", layout.dfd, file_len)?;
    check_in_bounds("kvd", layout.kvd, file_len)?;
    check_in_bounds("sgd", layout.sgd, file_len)?;
    for level in &layout.levels {
        check_in_bounds("level", level.region(), file_len)?;
    }
    Ok(layout)
}

fn check_in_bounds(region: &'static str, range: Region, file_len: u64) -> Ktx2Result<()> {
    if range.is_empty() {
        return Ok(());
    }
    match range.offset.checked_add(range.length) {
        Some(end) if end <= file_len => Ok(()),
        _ => Err(Ktx2Error::RegionOutOfBounds {
            region,
            offset: range.offset,
            length: range.length,
            file_len,
        }),
    }
}
