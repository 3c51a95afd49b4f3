//! Raster fixtures shared by unit and integration tests.
#![allow(dead_code)]

use std::path::Path;
use texprep_common::Raster;

/// A raster whose RGB rises linearly from `low` to `high` in scan order. Alpha is 1.
pub fn gradient_raster(width: u32, height: u32, low: f32, high: f32) -> Raster {
    let count = width as usize * height as usize;
    let mut raster = Raster::new(width, height).unwrap();
    for (i, px) in raster.samples_mut().chunks_exact_mut(4).enumerate() {
        let t = i as f32 / (count - 1).max(1) as f32;
        let v = low + (high - low) * t;
        px.copy_from_slice(&[v, v, v, 1.0]);
    }
    raster
}

pub fn constant_raster(width: u32, height: u32, value: f32) -> Raster {
    gradient_raster(width, height, value, value)
}

/// Every pixel points straight out of the surface.
pub fn flat_normal_raster(width: u32, height: u32) -> Raster {
    let mut raster = Raster::new(width, height).unwrap();
    for px in raster.samples_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&[0.5, 0.5, 1.0, 1.0]);
    }
    raster
}

/// Neighbouring pixels tilt in opposite directions, `(±0.6, 0, 0.8)`.
pub fn checker_normal_raster(width: u32, height: u32) -> Raster {
    let mut raster = Raster::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let nx = if (x + y) % 2 == 0 { 0.6 } else { -0.6 };
            raster.set_pixel(x, y, [nx * 0.5 + 0.5, 0.5, 0.9, 1.0]);
        }
    }
    raster
}

pub fn write_png(path: &Path, raster: &Raster) {
    let (width, height) = raster.dimensions();
    image::save_buffer(
        path,
        &raster.to_rgba8(),
        width,
        height,
        image::ColorType::Rgba8,
    )
    .unwrap();
}
