//! Benchmarks for SynthEngine::render with growing polyphony.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::{EngineConfig, SynthEngine};

use crate::BLOCK_SIZES;

fn engine_with_voices(voices: usize) -> SynthEngine {
    let config = EngineConfig::default().with_max_polyphony(voices.max(1));
    let engine = SynthEngine::new(config).expect("default config is valid");
    engine.start();
    for note in 0..voices {
        engine.play_note(48 + note as i32);
    }
    engine
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Empty pool: lock + clear only
        let idle = engine_with_voices(0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render(black_box(&mut buffer));
            })
        });

        // Typical chord and a full default-size pool; voices sit in sustain
        for voices in [1usize, 8, 20] {
            let engine = engine_with_voices(voices);
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.render(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
