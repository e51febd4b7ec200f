use crate::{
    config::EngineConfig,
    dsp::wavetable::Wavetable,
    synth::voice::{Voice, VoiceSnapshot},
};

/// What a note-on did to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOnOutcome {
    /// A free slot was claimed.
    Started,
    /// The note was already registered; its envelope restarted.
    Retriggered,
    /// The pool was full; `evicted` was dropped to make room.
    Stole { evicted: u8, was_releasing: bool },
}

/// Bounded pool of voices keyed by MIDI note.
///
/// Holds at most `max_polyphony` active voices and at most one voice per note.
/// All slots are allocated up front; nothing here allocates after `new`.
pub struct NoteRegistry {
    voices: Vec<Voice>,
    next_sequence: u64,
    config: EngineConfig,
}

impl NoteRegistry {
    pub fn new(config: EngineConfig) -> Self {
        let voices = (0..config.max_polyphony).map(|_| Voice::new()).collect();

        Self {
            voices,
            next_sequence: 0,
            config,
        }
    }

    pub fn note_on(&mut self, note: u8, now: f64) -> NoteOnOutcome {
        let sequence = self.bump_sequence();

        if let Some(voice) = self.find_voice(note) {
            voice.retrigger(sequence, now);
            return NoteOnOutcome::Retriggered;
        }

        let (idx, outcome) = match self.voices.iter().position(|v| v.is_free()) {
            Some(idx) => (idx, NoteOnOutcome::Started),
            None => {
                let idx = self.steal_index();
                let victim = &self.voices[idx];
                let outcome = NoteOnOutcome::Stole {
                    evicted: victim.note(),
                    was_releasing: victim.is_releasing(),
                };
                (idx, outcome)
            }
        };

        self.voices[idx].start(note, sequence, now, self.config.sample_rate);
        outcome
    }

    /// Release `note` if it is sounding. Unknown or already releasing notes
    /// are left alone.
    pub fn note_off(&mut self, note: u8, now: f64) -> bool {
        let env = self.config.envelope;
        match self.find_voice(note) {
            Some(voice) => voice.release(now, &env),
            None => false,
        }
    }

    /// Move every sounding voice into release. Returns how many were released.
    pub fn release_all(&mut self, now: f64) -> usize {
        let env = self.config.envelope;
        self.voices
            .iter_mut()
            .filter(|v| v.is_active())
            .map(|v| v.release(now, &env))
            .filter(|released| *released)
            .count()
    }

    /// Drop every voice immediately, skipping release. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let mut cleared = 0;
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.free();
            cleared += 1;
        }
        cleared
    }

    /// Mix every active voice into `out` (which must already be zeroed or
    /// hold the signal to add to), the first sample being at `start_time`.
    ///
    /// Voices whose envelope finishes are reaped. Returns the number of voices
    /// that were mixed.
    pub fn render(&mut self, out: &mut [f32], start_time: f64, table: &Wavetable) -> usize {
        let active = self.len();
        if active == 0 {
            return 0;
        }

        let gain = self.config.master_gain / (active.max(1) as f32).sqrt();
        let sample_rate = self.config.sample_rate;
        let env = self.config.envelope;

        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render(out, start_time, sample_rate, &env, table, gain);
        }

        active
    }

    pub fn snapshots(&self, now: f64, out: &mut Vec<VoiceSnapshot>) {
        let env = self.config.envelope;
        out.extend(
            self.voices
                .iter()
                .filter(|v| v.is_active())
                .map(|v| v.snapshot(now, &env)),
        );
    }

    pub fn len(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.voices.iter().any(|v| v.is_active())
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    pub fn contains(&self, note: u8) -> bool {
        self.voice(note).is_some()
    }

    pub fn voice(&self, note: u8) -> Option<&Voice> {
        self.voices.iter().find(|v| v.is_active() && v.note() == note)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter().filter(|v| v.is_active())
    }

    fn find_voice(&mut self, note: u8) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.is_active() && v.note() == note)
    }

    /// Pick the slot to steal from a full pool: the oldest releasing voice if
    /// any, otherwise the oldest sounding one.
    fn steal_index(&self) -> usize {
        let oldest_releasing = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_releasing())
            .min_by_key(|(_, v)| v.sequence())
            .map(|(idx, _)| idx);

        oldest_releasing
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.sequence())
                    .map(|(idx, _)| idx)
            })
            .unwrap_or(0)
    }

    fn bump_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }
}
