//! Benchmarks for the block-rate ADSR.
//!
//! One `advance` covers a whole block, so the interesting number is the cost
//! of a full gate cycle measured in blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::{
    dsp::{envelope::EnvelopeParams, EnvelopeGenerator},
    Gate,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const BLOCKS_PER_STAGE: usize = 64;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let params = EnvelopeParams {
        attack: 10.0,
        decay: 50.0,
        sustain: 0.7,
        release: 100.0,
    };

    for &size in BLOCK_SIZES {
        let mut env = EnvelopeGenerator::new("bench", SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("gate_cycle", size), &size, |b, &size| {
            b.iter(|| {
                env.set_gate(Gate::Attack);
                for _ in 0..BLOCKS_PER_STAGE {
                    black_box(env.advance(black_box(&params), size));
                }
                env.set_gate(Gate::Release);
                for _ in 0..BLOCKS_PER_STAGE {
                    black_box(env.advance(black_box(&params), size));
                }
            })
        });
    }

    group.finish();
}
