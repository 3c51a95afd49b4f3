//! The packed flags byte of a block header.

use bitfield::bitfield;

/// Current block format version.
pub const BLOCK_VERSION: u8 = 1;

/// How numeric payload values are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Quantization {
    /// IEEE-754 binary32, 4 bytes per value.
    F32 = 0,
    /// IEEE-754 binary16, 2 bytes per value.
    Half16 = 1,
}

impl Quantization {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::F32),
            1 => Some(Self::Half16),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Bytes used per stored value.
    pub fn value_size(self) -> usize {
        match self {
            Quantization::F32 => 4,
            Quantization::Half16 => 2,
        }
    }
}

bitfield! {
    /// Packed flags byte.
    ///
    /// Bit layout:
    /// - Bits 4-7: Block format version (4 bits)
    /// - Bits 0-3: Payload quantization (4 bits)
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockFlags(u8);
    impl Debug;
    u8;

    /// Block format version (4 bits)
    pub version, set_version: 7, 4;
    /// Payload quantization (4 bits)
    pub quantization_bits, set_quantization_bits: 3, 0;
}

impl BlockFlags {
    /// Flags for the current version with the given quantization.
    pub fn new(quantization: Quantization) -> Self {
        let mut flags = Self::default();
        flags.set_version(BLOCK_VERSION);
        flags.set_quantization_bits(quantization.to_u8());
        flags
    }

    /// The quantization, or [`None`] if the nibble holds an unknown value.
    pub fn quantization(&self) -> Option<Quantization> {
        Quantization::from_u8(self.quantization_bits())
    }
}
