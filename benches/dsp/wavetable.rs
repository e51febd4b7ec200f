//! Benchmarks for wavetable oscillator lookup.

use std::f64::consts::TAU;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::Wavetable;

use crate::BLOCK_SIZES;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");
    let table = Wavetable::shared();
    let increment = TAU * 440.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut phase = 0.0f64;

        // Table lookup with phase wrap, the per-voice inner loop
        group.bench_with_input(BenchmarkId::new("lookup", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = table.lookup(black_box(phase));
                    phase += increment;
                    if phase >= TAU {
                        phase -= TAU;
                    }
                }
            })
        });

        // Direct harmonic sum for comparison (four sin() calls per sample)
        let mut phase = 0.0f64;
        group.bench_with_input(BenchmarkId::new("direct_sin", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    let p = black_box(phase);
                    *sample = ((p.sin() + 0.4 * (2.0 * p).sin() + 0.2 * (3.0 * p).sin()
                        + 0.1 * (4.0 * p).sin())
                        / 1.7) as f32;
                    phase += increment;
                    if phase >= TAU {
                        phase -= TAU;
                    }
                }
            })
        });
    }

    group.finish();
}
