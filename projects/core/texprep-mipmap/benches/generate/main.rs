use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use texprep_common::{Raster, TextureType};
use texprep_mipmap::{FilterKernel, FilterProfile, MipGenerator};

fn noise_raster(size: u32) -> Raster {
    let mut raster = Raster::new(size, size).unwrap();
    let mut state = 0x1234_5678u32;
    for y in 0..size {
        for x in 0..size {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let v = (state & 0xFFFF) as f32 / 65535.0;
            raster.set_pixel(x, y, [v, 1.0 - v, v * 0.5, 1.0]);
        }
    }
    raster
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mip Chain Generation (512x512 RGBA)");
    let source = noise_raster(512);
    group.throughput(criterion::Throughput::Elements(512 * 512));

    for kernel in [
        FilterKernel::Box,
        FilterKernel::Bilinear,
        FilterKernel::Mitchell,
        FilterKernel::Lanczos3,
        FilterKernel::Min,
    ] {
        let profile = FilterProfile {
            kernel,
            ..Default::default()
        };
        let generator = MipGenerator::new(TextureType::Linear, profile);
        group.bench_with_input(
            BenchmarkId::new("generate", format!("{kernel:?}")),
            &source,
            |b, source| b.iter(|| generator.generate(black_box(source)).unwrap()),
        );
    }

    let generator = MipGenerator::new(
        TextureType::Color,
        FilterProfile::for_texture_type(TextureType::Color),
    );
    group.bench_function("generate_color_gamma", |b| {
        b.iter(|| generator.generate(black_box(&source)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
