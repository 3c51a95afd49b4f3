//! Owned RGBA raster buffer.

use crate::{RasterError, RasterResult};

/// Number of channels in every [`Raster`].
pub const CHANNELS: usize = 4;

/// An owned RGBA image with `f32` samples, nominally in `[0, 1]`.
///
/// The buffer is row-major, `width * height * 4` samples long.
/// Cloning a [`Raster`] always performs a deep copy of the samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Raster {
    /// Creates a zero-filled raster.
    ///
    /// # Errors
    ///
    /// [`RasterError::InvalidDimensions`] if either dimension is zero or the sample count
    /// does not fit in memory.
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        let samples = sample_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; samples],
        })
    }

    /// Takes ownership of an existing `f32` RGBA buffer.
    pub fn from_samples(width: u32, height: u32, data: Vec<f32>) -> RasterResult<Self> {
        let expected = sample_count(width, height)?;
        if data.len() != expected {
            return Err(RasterError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decodes an RGBA8 buffer into a new raster.
    pub fn from_rgba8(width: u32, height: u32, pixels: &[u8]) -> RasterResult<Self> {
        let expected = sample_count(width, height)?;
        if pixels.len() != expected {
            return Err(RasterError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let data = pixels.iter().map(|&p| p as f32 / 255.0).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Quantizes the raster to RGBA8, clamping out of range samples.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.data
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Returns the RGBA value at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Returns the RGBA value at `(x, y)` with coordinates clamped to the edges.
    #[inline]
    pub fn pixel_clamped(&self, x: i64, y: i64) -> [f32; 4] {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.pixel(x, y)
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: [f32; 4]) {
        let i = self.index(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&value);
    }

    /// Iterator over the samples of a single channel.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().skip(channel).step_by(CHANNELS).copied()
    }

    /// Applies `f` to every sample of `channel` in place.
    pub fn map_channel(&mut self, channel: usize, mut f: impl FnMut(f32) -> f32) {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            px[channel] = f(px[channel]);
        }
    }
}

/// `width * height * 4`, or an error for zero or overflowing sizes.
fn sample_count(width: u32, height: u32) -> RasterResult<usize> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .filter(|&samples| samples <= isize::MAX as usize / std::mem::size_of::<f32>())
        .ok_or(RasterError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert_eq!(
            Raster::new(0, 4),
            Err(RasterError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
        assert!(Raster::new(4, 0).is_err());
    }

    #[rstest]
    #[case(u32::MAX, u32::MAX)]
    #[case(u32::MAX, 1 << 31)]
    fn overflowing_dimensions_are_rejected(#[case] width: u32, #[case] height: u32) {
        let expected = Err(RasterError::InvalidDimensions { width, height });
        assert_eq!(Raster::new(width, height), expected);
        assert_eq!(Raster::from_samples(width, height, Vec::new()), expected);
        assert_eq!(Raster::from_rgba8(width, height, &[]), expected);
    }

    #[test]
    fn from_rgba8_rejects_short_buffer() {
        let result = Raster::from_rgba8(2, 2, &[0u8; 15]);
        assert_eq!(
            result,
            Err(RasterError::BufferSizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn rgba8_conversion_is_lossless() {
        let pixels: Vec<u8> = (0..=255u8).collect();
        let raster = Raster::from_rgba8(8, 8, &pixels).unwrap();
        assert_eq!(raster.to_rgba8(), pixels);
    }

    #[test]
    fn clone_does_not_share_storage() {
        let original = Raster::new(2, 2).unwrap();
        let mut copy = original.clone();
        copy.set_pixel(0, 0, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(original.pixel(0, 0), [0.0; 4]);
        assert_ne!(original.samples().as_ptr(), copy.samples().as_ptr());
    }

    #[test]
    fn pixel_clamped_saturates_at_edges() {
        let mut raster = Raster::new(2, 1).unwrap();
        raster.set_pixel(1, 0, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(raster.pixel_clamped(5, -3), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(raster.pixel_clamped(-1, 0), [0.0; 4]);
    }

    #[test]
    fn channel_iterates_one_component() {
        let raster =
            Raster::from_samples(2, 1, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]).unwrap();
        let green: Vec<f32> = raster.channel(1).collect();
        assert_eq!(green, vec![0.2, 0.6]);
    }
}
