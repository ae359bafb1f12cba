//! Benchmarks for the blended oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::oscillator::{Oscillator, OscillatorParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let increment = Oscillator::phase_increment(440.0, SAMPLE_RATE);

    let cases = [
        (
            "sine",
            OscillatorParams {
                shape: 0.0,
                ..OscillatorParams::default()
            },
        ),
        ("saw", OscillatorParams::default()),
        // Clip and fold both active on every sample
        (
            "driven",
            OscillatorParams {
                shape: 0.5,
                wave_fold: 1.8,
                clip: 4.0,
            },
        ),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, params) in &cases {
            let mut osc = Oscillator::new();
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), increment, black_box(params));
                })
            });
        }
    }

    group.finish();
}
