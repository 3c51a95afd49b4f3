//! Mip levels and chains.

use crate::Raster;

/// Dimensions of mip level `level` for a `width` x `height` base.
///
/// Each axis is `floor(max(1, size / 2^level))`.
#[inline]
pub fn mip_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shift = level.min(31);
    ((width >> shift).max(1), (height >> shift).max(1))
}

/// A single level of a [`MipChain`].
#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub level: u32,
    pub raster: Raster,
}

impl MipLevel {
    pub fn new(level: u32, raster: Raster) -> Self {
        Self { level, raster }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }
}

/// Ordered mip levels; level 0 is an unmodified copy of the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MipChain {
    levels: Vec<MipLevel>,
}

impl MipChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            levels: Vec::with_capacity(capacity),
        }
    }

    /// Appends a raster as the next level.
    pub fn push(&mut self, raster: Raster) {
        let level = self.levels.len() as u32;
        self.levels.push(MipLevel::new(level, raster));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline]
    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    #[inline]
    pub fn levels_mut(&mut self) -> &mut [MipLevel] {
        &mut self.levels
    }

    pub fn level(&self, index: usize) -> Option<&MipLevel> {
        self.levels.get(index)
    }

    /// Dimensions of level 0, if any.
    pub fn base_dimensions(&self) -> Option<(u32, u32)> {
        self.levels.first().map(MipLevel::dimensions)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, MipLevel> {
        self.levels.iter()
    }

    pub fn into_levels(self) -> Vec<MipLevel> {
        self.levels
    }
}

impl FromIterator<Raster> for MipChain {
    fn from_iter<T: IntoIterator<Item = Raster>>(iter: T) -> Self {
        let mut chain = MipChain::new();
        for raster in iter {
            chain.push(raster);
        }
        chain
    }
}

impl<'a> IntoIterator for &'a MipChain {
    type Item = &'a MipLevel;
    type IntoIter = core::slice::Iter<'a, MipLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}
