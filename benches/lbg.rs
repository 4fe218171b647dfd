use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BatchSize, Bencher, BenchmarkId,
    Criterion, SamplingMode,
};
use lbgquant::{lbg, LbgOptions, PixelGrid};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A smooth gradient with some noise, which is closer to a photo than uniform noise.
fn noisy_gradient(width: u32, height: u32) -> PixelGrid {
    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(0);
    let colors = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let r = (x * 255 / width) as u8;
            let g = (y * 255 / height) as u8;
            let b = ((x + y) * 127 / (width + height)) as u8;
            let noise = rng.gen_range(0..16);
            Srgb::new(r.saturating_add(noise), g.saturating_add(noise), b.saturating_add(noise))
        })
        .collect();

    PixelGrid::from_colors(width, height, colors).unwrap()
}

fn grids() -> Vec<(String, PixelGrid)> {
    [(64, 64), (256, 256)]
        .into_iter()
        .map(|(w, h)| (format!("{w}x{h}"), noisy_gradient(w, h)))
        .collect()
}

fn bench(
    c: &mut Criterion,
    group: &str,
    grids: &[(String, PixelGrid)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(u8, &PixelGrid)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(10)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (bits, secs) in [(2u8, 2), (4, 3), (6, 5)] {
        group.measurement_time(Duration::from_secs(secs));
        for (name, grid) in grids {
            group.bench_with_input(BenchmarkId::new(bits.to_string(), name), &(bits, grid), &mut f);
        }
    }
}

fn lbg_quantize(c: &mut Criterion) {
    bench(c, "lbg_quantize", &grids(), |b, &(bits, grid)| {
        let options = LbgOptions::new()
            .codebook_bits(bits)
            .max_iterations(Some(200));

        b.iter_batched_ref(
            || grid.clone(),
            |grid| lbg::quantize_with(grid, &options),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, lbg_quantize);
criterion_main!(benches);
