//! Types shared between the texprep crates.
//!
//! Every stage of the texture pipeline consumes and produces owned buffers. A [`Raster`] owns
//! its sample storage, a [`MipLevel`] owns its [`Raster`] and a [`MipChain`] owns its levels,
//! so a level handed out by one stage can never alias the storage of another.
//!
//! Samples are stored as RGBA `f32` in the `[0, 1]` range. Conversion from and to RGBA8 only
//! happens at the edges of the pipeline.

pub mod error;
pub mod mip_chain;
pub mod raster;
pub mod texture_type;

pub use error::{RasterError, RasterResult};
pub use mip_chain::{mip_dimensions, MipChain, MipLevel};
pub use raster::{Raster, CHANNELS};
pub use texture_type::TextureType;

/// Linear interpolation between `a` and `b`.
#[inline(always)]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Hermite smoothstep, `3t² - 2t³`, with `t` clamped to `[0, 1]`.
#[inline(always)]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
