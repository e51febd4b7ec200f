use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope as a Function of Time
===================================

This module shapes a voice's loudness over its lifetime. Unlike a
sample-stepped envelope that nudges a running `level` by an increment every
sample, this one is a PURE FUNCTION of (stage, time spent in that stage). The
voice only stores which stage it is in and when that stage began; the level is
recomputed from scratch whenever it is needed.

Why that matters here: the control thread can move a voice into Release at
any moment by writing two fields (stage + start time), and the render thread
can evaluate any sample of any buffer without carrying accumulated float
drift between callbacks.

Vocabulary
----------

  stage         Attack, Decay, Sustain, Release or Done.

  elapsed       Seconds since the current stage began (the "phase clock").

  release_from  Where the release tail starts: the level the voice had when
                release was requested, raised to the sustain level if it was
                still below it. A note released mid-decay fades without a
                jump, and one tapped during attack still gets a full tail.

  curve (k)     Shape constant of the exponential release tail.

  floor         Level below which output counts as silence (-80 dB).


The Shape
---------

  Level
    1.0 ┐   ╱╲
        │  ╱  ╲________
    S   │ ╱            ╲
        │╱              ╲_
    0.0 └──────────────────‾‾‾─→ Time
        A   D   Sustain   Release (exponential)

  Attack   0 → 1        linear over `attack`
  Decay    1 → S        linear over `decay`
  Sustain  S            until note_off (not time-driven)
  Release  r·e^(-k·p)   p = elapsed / release, r = release_from
  Done     0            terminal


Transitions
-----------

    ┌────────┐ elapsed≥A ┌───────┐ elapsed≥D ┌─────────┐
    │ Attack │ ────────→ │ Decay │ ────────→ │ Sustain │
    └────────┘           └───────┘           └─────────┘
         │ note_off          │ note_off           │ note_off
         └──────────────┐    │    ┌───────────────┘
                        ↓    ↓    ↓
                       ┌─────────┐ elapsed≥R or level<floor ┌──────┐
                       │ Release │ ───────────────────────→ │ Done │
                       └─────────┘                          └──────┘

Time-driven transitions reset the phase clock to the exact instant the
previous stage ran out (start + duration), not to "now", so a stage boundary
that falls mid-buffer does not stretch the envelope by up to a buffer length.

The exponential tail never reaches zero by itself: with k = 4 it is at
e^-4 ≈ 1.8% of `release_from` when `release` seconds have passed. At that
point we call it Done.
*/

/// Output below this level is treated as silence.
pub const SILENCE_FLOOR: f32 = 1.0e-4;

/// Default shape constant for the release tail.
pub const DEFAULT_RELEASE_CURVE: f32 = 4.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    Done,
}

impl EnvelopeStage {
    /// The stage a time-driven transition leads to, if any.
    fn next(self) -> Option<Self> {
        match self {
            Self::Attack => Some(Self::Decay),
            Self::Decay => Some(Self::Sustain),
            Self::Release => Some(Self::Done),
            Self::Sustain | Self::Done => None,
        }
    }
}

/// Fixed envelope shape, shared by every voice of an engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    /// Seconds to ramp 0 → 1.
    pub attack: f32,
    /// Seconds to ramp 1 → sustain.
    pub decay: f32,
    /// Level held while the key is down, in (0, 1].
    pub sustain: f32,
    /// Seconds until a released voice is considered finished.
    pub release: f32,
    /// Exponential shape constant `k` of the release tail.
    pub release_curve: f32,
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.6,
            release: 3.0,
            release_curve: DEFAULT_RELEASE_CURVE,
        }
    }
}

impl AdsrParams {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(MIN_TIME),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
            release_curve: DEFAULT_RELEASE_CURVE,
        }
    }

    pub fn with_release_curve(mut self, k: f32) -> Self {
        self.release_curve = k.max(0.0);
        self
    }

    fn duration(&self, stage: EnvelopeStage) -> Option<f64> {
        match stage {
            EnvelopeStage::Attack => Some(self.attack as f64),
            EnvelopeStage::Decay => Some(self.decay as f64),
            EnvelopeStage::Release => Some(self.release as f64),
            EnvelopeStage::Sustain | EnvelopeStage::Done => None,
        }
    }

    /// Envelope value `elapsed` seconds into `stage`.
    ///
    /// Pure and allocation-free; safe to call per sample from the render path.
    #[inline]
    pub fn level(&self, stage: EnvelopeStage, elapsed: f64, release_from: f32) -> f32 {
        let elapsed = elapsed.max(0.0);

        match stage {
            EnvelopeStage::Attack => {
                let progress = elapsed / self.attack as f64;
                progress.min(1.0) as f32
            }

            EnvelopeStage::Decay => {
                let progress = (elapsed / self.decay as f64).min(1.0) as f32;
                1.0 - (1.0 - self.sustain) * progress
            }

            EnvelopeStage::Sustain => self.sustain,

            EnvelopeStage::Release => {
                if elapsed >= self.release as f64 {
                    return 0.0;
                }
                let progress = (elapsed / self.release as f64) as f32;
                release_from * (-self.release_curve * progress).exp()
            }

            EnvelopeStage::Done => 0.0,
        }
    }

    /// Apply every time-driven transition that is due at `now`.
    ///
    /// Returns the stage the voice is in at `now` and the instant that stage
    /// began. Stages only ever move forward. A voice whose level has dropped
    /// below [`SILENCE_FLOOR`] without a key being held (a near-zero sustain,
    /// or a release that started from silence) resolves to `Done`.
    pub fn settle(
        &self,
        mut stage: EnvelopeStage,
        mut started_at: f64,
        now: f64,
        release_from: f32,
    ) -> (EnvelopeStage, f64) {
        while let (Some(duration), Some(next)) = (self.duration(stage), stage.next()) {
            if now - started_at < duration {
                break;
            }
            started_at += duration;
            stage = next;
        }

        let silent = match stage {
            EnvelopeStage::Sustain => self.sustain < SILENCE_FLOOR,
            EnvelopeStage::Release => {
                self.level(stage, now - started_at, release_from) < SILENCE_FLOOR
            }
            _ => false,
        };

        if silent {
            (EnvelopeStage::Done, now)
        } else {
            (stage, started_at)
        }
    }
}
