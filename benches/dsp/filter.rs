//! Benchmarks for the low-pass biquad.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::BiquadLowPass;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed coefficients: the per-sample cost alone
        let mut filter = BiquadLowPass::new(SAMPLE_RATE, 1_000.0, 0.707);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // New cutoff every block, as under a filter envelope
        let mut filter = BiquadLowPass::new(SAMPLE_RATE, 1_000.0, 4.0);
        let mut buffer = input.clone();
        let mut cutoff = 200.0f32;
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 8_000.0 { 200.0 } else { cutoff * 1.05 };
                filter.set_cutoff(black_box(cutoff));
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
