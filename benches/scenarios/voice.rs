//! Benchmarks for the full voice: oscillator → amp envelope → low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::{voice_channel, EngineConfig, ParamId, VoiceEngine};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    for &size in BLOCK_SIZES {
        let config = EngineConfig::new(SAMPLE_RATE, size).expect("valid bench config");
        let mut buffer = vec![0.0f32; size];

        // Held note with default parameters
        let mut voice = VoiceEngine::new(config);
        voice.set_frequency(110.0);
        voice.set_gate(monosynth::Gate::Attack);
        group.bench_with_input(BenchmarkId::new("held_note", size), &size, |b, _| {
            b.iter(|| {
                voice.render_block(black_box(&mut buffer));
            })
        });

        // Control thread moving the cutoff every block through the queue
        let (mut voice, mut handle) = voice_channel(config, 64);
        handle.note_on(110.0).expect("queue has room");
        let mut cutoff = 100.0f32;
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 1_900.0 { 100.0 } else { cutoff + 25.0 };
                let _ = handle.set_param_id(ParamId::FilterCutoff, cutoff);
                voice.render_block(black_box(&mut buffer));
            })
        });

        // Stereo host callback with a buffer that is not a block multiple
        let mut voice = VoiceEngine::new(config);
        voice.set_frequency(220.0);
        voice.set_gate(monosynth::Gate::Attack);
        let mut host = vec![0.0f32; (size + size / 3) * 2];
        group.bench_with_input(BenchmarkId::new("interleaved_stereo", size), &size, |b, _| {
            b.iter(|| {
                voice.render_interleaved(black_box(&mut host), 2);
            })
        });
    }

    group.finish();
}
