//! KTX2 format constants and definitions

/// File identifier: `«KTX 20»\r\n\x1A\n`
pub(crate) const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

// Header field offsets. Every field up to `SGD_OFFSET` is a little endian u32.
pub(crate) const VK_FORMAT_OFFSET: usize = 12;
pub(crate) const TYPE_SIZE_OFFSET: usize = 16;
pub(crate) const PIXEL_WIDTH_OFFSET: usize = 20;
pub(crate) const PIXEL_HEIGHT_OFFSET: usize = 24;
pub(crate) const PIXEL_DEPTH_OFFSET: usize = 28;
pub(crate) const LAYER_COUNT_OFFSET: usize = 32;
pub(crate) const FACE_COUNT_OFFSET: usize = 36;
pub(crate) const LEVEL_COUNT_OFFSET: usize = 40;
pub(crate) const SUPERCOMPRESSION_OFFSET: usize = 44;
pub(crate) const DFD_OFFSET: usize = 48;
pub(crate) const DFD_LENGTH: usize = 52;
pub(crate) const KVD_OFFSET: usize = 56;
pub(crate) const KVD_LENGTH: usize = 60;
// u64 fields
pub(crate) const SGD_OFFSET: usize = 64;
pub(crate) const SGD_LENGTH: usize = 72;

/// Size of the fixed header; the level index follows directly.
pub(crate) const HEADER_SIZE: usize = 80;

/// `byteOffset`, `byteLength`, `uncompressedByteLength`, each u64.
pub(crate) const LEVEL_INDEX_ENTRY_SIZE: usize = 24;

/// A 2^31 texel texture has at most 31 levels.
pub(crate) const MAX_LEVEL_COUNT: u32 = 31;

/// Highest defined scheme: 0 none, 1 BasisLZ, 2 Zstandard, 3 ZLIB.
pub(crate) const MAX_SUPERCOMPRESSION_SCHEME: u32 = 3;

/// Offset of `bytesPlane0` inside the data format descriptor: total size, two descriptor
/// block header words, the model/primaries/transfer/flags word and the texel block
/// dimensions precede it.
pub(crate) const DFD_BYTES_PLANE0_OFFSET: usize = 20;

/// Mip level data of supercompressed files is aligned to this.
pub(crate) const SUPERCOMPRESSED_LEVEL_ALIGNMENT: u64 = 8;

/// Key/value entries are padded to this.
pub(crate) const KVD_ALIGNMENT: usize = 4;
