//! Resampling kernels used for mip generation.

use core::f32::consts::PI;
use derive_enum_all_values::AllValues;
use serde::{Deserialize, Serialize};

/// Filter used to derive each mip level from the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKernel {
    /// Unweighted average over the destination pixel's footprint.
    Box,
    /// Tent filter, support of 1.
    Bilinear,
    /// Catmull-Rom cubic (B = 0, C = 0.5).
    Bicubic,
    /// Lanczos windowed sinc with 3 lobes.
    Lanczos3,
    /// Mitchell-Netravali cubic (B = C = 1/3).
    Mitchell,
    /// Presets refer to this name; it resolves to [`FilterKernel::Lanczos3`].
    Kaiser,
    /// Darkest sample within the footprint.
    Min,
    /// Brightest sample within the footprint.
    Max,
}

impl FilterKernel {
    /// The kernel actually evaluated when resampling.
    pub fn resolve(self) -> Self {
        match self {
            FilterKernel::Kaiser => FilterKernel::Lanczos3,
            other => other,
        }
    }

    /// Order statistic kernels select a sample instead of interpolating.
    pub fn is_order_statistic(self) -> bool {
        matches!(self, FilterKernel::Min | FilterKernel::Max)
    }

    /// Half-width of the kernel in destination pixels.
    pub fn support(self) -> f32 {
        match self.resolve() {
            FilterKernel::Box => 0.5,
            FilterKernel::Bilinear => 1.0,
            FilterKernel::Bicubic | FilterKernel::Mitchell => 2.0,
            FilterKernel::Lanczos3 => 3.0,
            FilterKernel::Min | FilterKernel::Max | FilterKernel::Kaiser => 0.5,
        }
    }

    /// Evaluates the kernel at offset `t` (in destination pixels).
    pub fn weight(self, t: f32) -> f32 {
        match self.resolve() {
            FilterKernel::Box | FilterKernel::Min | FilterKernel::Max => {
                if (-0.5..0.5).contains(&t) {
                    1.0
                } else {
                    0.0
                }
            }
            FilterKernel::Bilinear => (1.0 - t.abs()).max(0.0),
            FilterKernel::Bicubic => cubic(t, 0.0, 0.5),
            FilterKernel::Mitchell => cubic(t, 1.0 / 3.0, 1.0 / 3.0),
            FilterKernel::Lanczos3 | FilterKernel::Kaiser => lanczos(t, 3.0),
        }
    }

    /// Parses the names accepted in presets and on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "box" => Some(Self::Box),
            "bilinear" | "triangle" | "tent" => Some(Self::Bilinear),
            "bicubic" | "catmull-rom" | "catmullrom" => Some(Self::Bicubic),
            "lanczos" | "lanczos3" => Some(Self::Lanczos3),
            "mitchell" => Some(Self::Mitchell),
            "kaiser" => Some(Self::Kaiser),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

#[inline]
fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

#[inline]
fn lanczos(t: f32, lobes: f32) -> f32 {
    if t.abs() >= lobes {
        0.0
    } else {
        sinc(t) * sinc(t / lobes)
    }
}

/// Mitchell-Netravali family of cubics.
#[inline]
fn cubic(t: f32, b: f32, c: f32) -> f32 {
    let x = t.abs();
    let x2 = x * x;
    let x3 = x2 * x;
    let v = if x < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) * x3 + (-18.0 + 12.0 * b + 6.0 * c) * x2 + (6.0 - 2.0 * b)
    } else if x < 2.0 {
        (-b - 6.0 * c) * x3
            + (6.0 * b + 30.0 * c) * x2
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c)
    } else {
        0.0
    };
    v / 6.0
}
