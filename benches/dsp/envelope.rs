//! Benchmarks for ADSR envelope evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::{AdsrParams, EnvelopeStage};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let env = AdsrParams::adsr(0.01, 0.3, 0.6, 3.0);
    let dt = 1.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack/decay: linear ramps plus a stage transition check per sample
        group.bench_with_input(BenchmarkId::new("attack_decay", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let t = black_box(0.005 + i as f64 * dt);
                    let (stage, started) = env.settle(EnvelopeStage::Attack, 0.0, t, 0.0);
                    *sample = env.level(stage, t - started, 0.0);
                }
            })
        });

        // Release: exp() per sample
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let t = black_box(0.5 + i as f64 * dt);
                    let (stage, started) = env.settle(EnvelopeStage::Release, 0.0, t, 0.6);
                    *sample = env.level(stage, t - started, 0.6);
                }
            })
        });
    }

    group.finish();
}
