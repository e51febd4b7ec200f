use std::f64::consts::TAU;

use crate::{
    dsp::{
        envelope::{AdsrParams, EnvelopeStage},
        wavetable::Wavetable,
    },
    io::converter::midi_note_to_freq,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Slot available for allocation
    Sounding,  // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release
}

/// Point-in-time copy of one voice, for hosts and UIs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub note: u8,
    pub stage: EnvelopeStage,
    pub level: f32,
    pub releasing: bool,
    pub sequence: u64,
}

/// One slot of the voice arena.
///
/// Slots are allocated once with the registry and recycled in place, so
/// starting, retriggering and reaping a note never touches the heap.
#[derive(Debug, Clone)]
pub struct Voice {
    note: u8,
    frequency: f64,
    phase_increment: f64,
    phase: f64,
    state: VoiceState,
    stage: EnvelopeStage,
    stage_started: f64,
    release_from: f32,
    sequence: u64,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    pub fn new() -> Self {
        Self {
            note: 0,
            frequency: 0.0,
            phase_increment: 0.0,
            phase: 0.0,
            state: VoiceState::Free,
            stage: EnvelopeStage::Done,
            stage_started: 0.0,
            release_from: 0.0,
            sequence: 0,
        }
    }

    /// Claim this slot for `note`, starting a fresh attack at `now`.
    pub fn start(&mut self, note: u8, sequence: u64, now: f64, sample_rate: f32) {
        self.note = note;
        self.frequency = midi_note_to_freq(note);
        // Reduced so a single subtraction per sample keeps phase in [0, 2π).
        self.phase_increment = (TAU * self.frequency / sample_rate as f64).rem_euclid(TAU);
        self.phase = 0.0;
        self.state = VoiceState::Sounding;
        self.stage = EnvelopeStage::Attack;
        self.stage_started = now;
        self.release_from = 0.0;
        self.sequence = sequence;
    }

    /// Restart the envelope of an already-registered note.
    ///
    /// The oscillator keeps its phase so the waveform stays continuous.
    pub fn retrigger(&mut self, sequence: u64, now: f64) {
        self.state = VoiceState::Sounding;
        self.stage = EnvelopeStage::Attack;
        self.stage_started = now;
        self.release_from = 0.0;
        self.sequence = sequence;
    }

    /// Move a sounding voice into release.
    ///
    /// The fade starts from the current level, but never below sustain, so a
    /// note released during its attack still sounds its release tail.
    /// Returns false (and changes nothing) for free or already releasing voices.
    pub fn release(&mut self, now: f64, env: &AdsrParams) -> bool {
        if self.state != VoiceState::Sounding {
            return false;
        }

        self.release_from = self.level_at(now, env).max(env.sustain);
        self.stage = EnvelopeStage::Release;
        self.stage_started = now;
        self.state = VoiceState::Releasing;
        true
    }

    /// Envelope level at `now`, without mutating the voice.
    pub fn level_at(&self, now: f64, env: &AdsrParams) -> f32 {
        if self.is_free() {
            return 0.0;
        }
        let (stage, started) = env.settle(self.stage, self.stage_started, now, self.release_from);
        env.level(stage, now - started, self.release_from)
    }

    /// Accumulate this voice into `out`, the first sample being at `start_time`.
    ///
    /// Returns false once the envelope has finished; the slot is freed before
    /// returning in that case.
    pub fn render(
        &mut self,
        out: &mut [f32],
        start_time: f64,
        sample_rate: f32,
        env: &AdsrParams,
        table: &Wavetable,
        gain: f32,
    ) -> bool {
        let dt = 1.0 / sample_rate as f64;

        for (i, sample) in out.iter_mut().enumerate() {
            let t = start_time + i as f64 * dt;
            if !self.settle(t, env) {
                return false;
            }

            let level = env.level(self.stage, t - self.stage_started, self.release_from);
            *sample += table.lookup(self.phase) * level * gain;

            self.phase += self.phase_increment;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
        }

        // Reap now if the envelope runs out exactly at the end of this buffer.
        self.settle(start_time + out.len() as f64 * dt, env)
    }

    fn settle(&mut self, now: f64, env: &AdsrParams) -> bool {
        let (stage, started) = env.settle(self.stage, self.stage_started, now, self.release_from);
        self.stage = stage;
        self.stage_started = started;

        if stage == EnvelopeStage::Done {
            self.free();
            return false;
        }
        true
    }

    pub fn snapshot(&self, now: f64, env: &AdsrParams) -> VoiceSnapshot {
        let (stage, _) = env.settle(self.stage, self.stage_started, now, self.release_from);
        VoiceSnapshot {
            note: self.note,
            stage,
            level: self.level_at(now, env),
            releasing: self.is_releasing(),
            sequence: self.sequence,
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.stage = EnvelopeStage::Done;
        self.note = 0;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Sounding | VoiceState::Releasing)
    }

    pub fn is_releasing(&self) -> bool {
        self.state == VoiceState::Releasing
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn env() -> AdsrParams {
        AdsrParams::adsr(0.01, 0.05, 0.5, 0.1)
    }

    #[test]
    fn start_sets_pitch_and_attack() {
        let mut voice = Voice::new();
        voice.start(69, 7, 0.0, 48_000.0);

        assert!((voice.frequency() - 440.0).abs() < 1e-9);
        assert_eq!(voice.stage(), EnvelopeStage::Attack);
        assert_eq!(voice.state(), VoiceState::Sounding);
        assert_eq!(voice.sequence(), 7);
        assert_eq!(voice.phase(), 0.0);
    }

    #[test]
    fn release_only_from_sounding() {
        let env = env();
        let mut voice = Voice::new();
        assert!(!voice.release(0.0, &env));

        voice.start(60, 1, 0.0, SAMPLE_RATE);
        assert!(voice.release(0.5, &env));
        assert!(voice.is_releasing());
        assert_eq!(voice.stage(), EnvelopeStage::Release);

        // Second stop is a no-op and must not restart the release clock.
        assert!(!voice.release(0.55, &env));
    }

    #[test]
    fn retrigger_returns_to_attack() {
        let env = env();
        let mut voice = Voice::new();
        voice.start(60, 1, 0.0, SAMPLE_RATE);
        voice.release(0.5, &env);

        voice.retrigger(2, 0.6);
        assert_eq!(voice.stage(), EnvelopeStage::Attack);
        assert!(!voice.is_releasing());
        assert_eq!(voice.sequence(), 2);
        assert_eq!(voice.note(), 60);
    }

    #[test]
    fn phase_stays_wrapped() {
        let env = env();
        let table = Wavetable::build();
        let mut voice = Voice::new();
        voice.start(100, 1, 0.0, SAMPLE_RATE);

        let mut buffer = vec![0.0f32; 64];
        voice.render(&mut buffer, 0.0, SAMPLE_RATE, &env, &table, 1.0);

        assert!((0.0..TAU).contains(&voice.phase()));
    }

    #[test]
    fn phase_stays_wrapped_above_sample_rate() {
        // Note 127 is ~12.5 kHz, above the 8 kHz rate.
        let env = env();
        let table = Wavetable::build();
        let mut voice = Voice::new();
        voice.start(127, 1, 0.0, 8_000.0);

        let mut buffer = vec![0.0f32; 800];
        voice.render(&mut buffer, 0.0, 8_000.0, &env, &table, 1.0);

        assert!((0.0..TAU).contains(&voice.phase()));
    }

    #[test]
    fn release_at_start_instant_fades_from_sustain() {
        let env = env();
        let table = Wavetable::build();
        let mut voice = Voice::new();
        voice.start(69, 1, 0.0, SAMPLE_RATE);
        assert!(voice.release(0.0, &env));
        assert!((voice.level_at(0.0, &env) - 0.5).abs() < 1e-6);

        let mut buffer = vec![0.0f32; 50];
        assert!(voice.render(&mut buffer, 0.0, SAMPLE_RATE, &env, &table, 1.0));
        assert!(buffer.iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn release_during_decay_keeps_current_level() {
        let env = env();
        let mut voice = Voice::new();
        voice.start(60, 1, 0.0, SAMPLE_RATE);

        // Halfway through decay: 1.0 → 0.5 over 50ms, so 0.75.
        let before = voice.level_at(0.035, &env);
        voice.release(0.035, &env);
        assert!((voice.level_at(0.035, &env) - before).abs() < 1e-6);
        assert!(before > 0.5);
    }

    #[test]
    fn render_frees_voice_after_release() {
        let env = env();
        let table = Wavetable::build();
        let mut voice = Voice::new();
        voice.start(57, 1, 0.0, SAMPLE_RATE);

        let mut buffer = vec![0.0f32; 100];
        assert!(voice.render(&mut buffer, 0.0, SAMPLE_RATE, &env, &table, 1.0));
        assert!(buffer.iter().any(|s| s.abs() > 0.01));

        voice.release(0.1, &env);
        let mut buffer = vec![0.0f32; 120];
        // 0.1s release at 1kHz = 100 samples, well inside this buffer.
        assert!(!voice.render(&mut buffer, 0.1, SAMPLE_RATE, &env, &table, 1.0));
        assert!(buffer[110..].iter().all(|&s| s == 0.0));
        assert!(voice.is_free());
    }

    #[test]
    fn snapshot_reports_settled_stage() {
        let env = env();
        let mut voice = Voice::new();
        voice.start(60, 3, 0.0, SAMPLE_RATE);

        let snap = voice.snapshot(1.0, &env);
        assert_eq!(snap.stage, EnvelopeStage::Sustain);
        assert!((snap.level - 0.5).abs() < 1e-6);
        assert_eq!(snap.sequence, 3);
        assert!(!snap.releasing);
    }
}
