//! Known block type tags.

/// What a block's payload holds.
///
/// Unknown tags are not an error; readers skip them so newer writers stay readable.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// One `(scale, offset)` pair applied to RGBA.
    FullScalar = 0x01,
    /// One `(scale, offset)` pair applied to RGB.
    RgbScalar = 0x02,
    /// Three pairs, one per colour channel.
    RgbTriple = 0x03,
    /// Four pairs, one per channel.
    RgbaQuad = 0x04,
    /// Analysis parameters: range low/high, channel mode, histogram mode.
    Params = 0x10,
}

impl BlockType {
    /// Returns [`None`] for tags this reader does not understand.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::FullScalar),
            0x02 => Some(Self::RgbScalar),
            0x03 => Some(Self::RgbTriple),
            0x04 => Some(Self::RgbaQuad),
            0x10 => Some(Self::Params),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Number of coefficient pairs, or [`None`] for non-coefficient blocks.
    pub fn pair_count(self) -> Option<usize> {
        match self {
            BlockType::FullScalar | BlockType::RgbScalar => Some(1),
            BlockType::RgbTriple => Some(3),
            BlockType::RgbaQuad => Some(4),
            BlockType::Params => None,
        }
    }

    /// Reader preference among coefficient blocks; higher wins.
    pub(crate) fn preference(self) -> u8 {
        match self {
            BlockType::RgbaQuad => 4,
            BlockType::RgbTriple => 3,
            BlockType::RgbScalar => 2,
            BlockType::FullScalar => 1,
            BlockType::Params => 0,
        }
    }
}
