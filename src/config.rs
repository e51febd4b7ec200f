//! Engine configuration.
//!
//! Everything here is fixed for the lifetime of a [`SynthEngine`]: the sample
//! rate the device runs at, how many voices may sound at once, the envelope
//! shape and the master gain.
//!
//! [`SynthEngine`]: crate::SynthEngine

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::envelope::AdsrParams;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    SampleRate(f32),
    #[error("max polyphony must be at least 1")]
    NoVoices,
    #[error("{stage} time must be positive and finite, got {value}")]
    StageTime { stage: &'static str, value: f32 },
    #[error("sustain level must be in (0, 1], got {0}")]
    SustainLevel(f32),
    #[error("release curve must be positive and finite, got {0}")]
    ReleaseCurve(f32),
    #[error("master gain must be non-negative and finite, got {0}")]
    MasterGain(f32),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz. The device layer must run at this rate.
    pub sample_rate: f32,
    /// Upper bound on simultaneously registered voices.
    pub max_polyphony: usize,
    /// Envelope shape shared by every voice.
    pub envelope: AdsrParams,
    /// Gain of a lone voice; divided by sqrt(voice count) as voices stack.
    pub master_gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_polyphony: 20,
            envelope: AdsrParams::default(),
            master_gain: 0.25,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_polyphony(mut self, voices: usize) -> Self {
        self.max_polyphony = voices;
        self
    }

    pub fn with_envelope(mut self, envelope: AdsrParams) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_master_gain(mut self, gain: f32) -> Self {
        self.master_gain = gain;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.max_polyphony == 0 {
            return Err(ConfigError::NoVoices);
        }

        let env = &self.envelope;
        for (stage, value) in [
            ("attack", env.attack),
            ("decay", env.decay),
            ("release", env.release),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::StageTime { stage, value });
            }
        }
        if !(env.sustain > 0.0 && env.sustain <= 1.0) {
            return Err(ConfigError::SustainLevel(env.sustain));
        }
        if !(env.release_curve.is_finite() && env.release_curve > 0.0) {
            return Err(ConfigError::ReleaseCurve(env.release_curve));
        }

        if !(self.master_gain.is_finite() && self.master_gain >= 0.0) {
            return Err(ConfigError::MasterGain(self.master_gain));
        }

        Ok(())
    }
}
