//! Low-level DSP primitives used by the synth engine.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! so the render callback can call into them directly. They stay focused on
//! the signal math; voice bookkeeping lives in [`crate::synth`].

/// Attack/decay/sustain/release envelope evaluated as a pure function of time.
pub mod envelope;
/// Single-cycle harmonic waveform table shared by every voice.
pub mod wavetable;

pub use envelope::{AdsrParams, EnvelopeStage};
pub use wavetable::Wavetable;
