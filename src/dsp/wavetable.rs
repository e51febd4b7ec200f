use std::f64::consts::TAU;
use std::sync::OnceLock;

/*
Harmonic Wavetable
==================

Every voice plays the same timbre: a fundamental plus three overtones with
falling weights, a rough piano-ish tone. Summing four `sin()` calls per voice
per sample is wasteful, so we render one period of the composite wave into a
table once and read it back with the voice's oscillator phase.

Vocabulary
----------

  phase       Oscillator angle in radians, kept in [0, 2π) by the voice.

  scale       TABLE_SIZE / 2π. Multiplying a phase by it gives a (fractional)
              table position.

  mask        TABLE_SIZE - 1. TABLE_SIZE is a power of two, so `index & mask`
              wraps any position back into the table without a branch or a
              modulo.


The Shape
---------

    sample(θ) = (1.0·sin θ + 0.4·sin 2θ + 0.2·sin 3θ + 0.1·sin 4θ) / 1.7

Dividing by the sum of the weights (1.7) guarantees |sample| ≤ 1.0, since no
sine can exceed 1.0 in magnitude. The peak actually lands a bit below 1.0
because the partials never all peak at the same angle.


Lookup
------

    index = (phase · scale) as usize & mask

Truncation, no interpolation. At 4096 entries the step error is far below the
noise floor of the envelope-scaled output, and the lookup stays O(1) with no
float division.
*/

/// Number of entries in one period. Must stay a power of two for the mask.
pub const TABLE_SIZE: usize = 4096;
const TABLE_MASK: usize = TABLE_SIZE - 1;

/// Relative amplitude of harmonics 1..=4 (fundamental first).
pub const HARMONIC_WEIGHTS: [f64; 4] = [1.0, 0.4, 0.2, 0.1];

static SHARED: OnceLock<Wavetable> = OnceLock::new();

pub struct Wavetable {
    samples: [f32; TABLE_SIZE],
    scale: f64,
}

impl Wavetable {
    /// Render one period of the harmonic series into a fresh table.
    pub fn build() -> Self {
        let norm: f64 = HARMONIC_WEIGHTS.iter().sum();
        let mut samples = [0.0f32; TABLE_SIZE];

        for (i, sample) in samples.iter_mut().enumerate() {
            let theta = TAU * i as f64 / TABLE_SIZE as f64;
            let sum: f64 = HARMONIC_WEIGHTS
                .iter()
                .enumerate()
                .map(|(h, weight)| weight * (theta * (h + 1) as f64).sin())
                .sum();
            *sample = (sum / norm) as f32;
        }

        Self {
            samples,
            scale: TABLE_SIZE as f64 / TAU,
        }
    }

    /// Process-wide table, built on first access and read-only afterwards.
    ///
    /// Call this from the control path (engine construction) so the one-time
    /// build never lands inside an audio callback.
    pub fn shared() -> &'static Wavetable {
        SHARED.get_or_init(Wavetable::build)
    }

    /// Sample the waveform at `phase` radians. Expects `phase` in [0, 2π).
    #[inline]
    pub fn lookup(&self, phase: f64) -> f32 {
        let index = (phase * self.scale) as usize & TABLE_MASK;
        self.samples[index]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
