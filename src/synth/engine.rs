use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::{ConfigError, EngineConfig},
    dsp::wavetable::Wavetable,
    io::converter::checked_note,
    synth::{
        registry::{NoteOnOutcome, NoteRegistry},
        voice::VoiceSnapshot,
    },
};

/*
Two Threads, One Registry
=========================

The engine is driven from two places that never coordinate:

  control   Any thread (UI, input dispatch, a sequencer). Calls play_note,
            stop_note, stop_all_notes. Rare, short, allowed to wait.

  render    The device callback. Runs on a hardware clock and must hand back
            a full buffer before the deadline, every time.

Both touch the note registry, so it lives behind one mutex. The two sides
take it differently:

  control   lock()      blocks until the registry is free. Critical sections
                        are a handful of field writes over a fixed-size slot
                        array, so the wait is bounded and tiny.

  render    try_lock()  never waits. If the control side holds the lock, the
                        callback writes silence for this buffer and returns.
                        The voices pick up again on the next callback.

A dropped buffer under contention is the price for never missing a deadline.


Timebase
--------

Engine time is the sample clock: an atomic frame counter that every render
call advances by its buffer length, whether or not it got the lock. Control
operations stamp their envelope changes with that clock, and sample `i` of a
buffer is evaluated at `buffer_start + i / sample_rate`. current_time()
exposes the same clock so a host can line up its own sequencing with it.
*/

/// Result of one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The registry was processed; `voices` were mixed into the buffer.
    Rendered { voices: usize },
    /// The control path held the registry; the buffer was filled with silence.
    Contended,
}

pub struct SynthEngine {
    registry: Mutex<NoteRegistry>,
    frames: AtomicU64,
    running: AtomicBool,
    config: EngineConfig,
    table: &'static Wavetable,
}

impl SynthEngine {
    /// Validate `config` and build the shared wavetable.
    ///
    /// Has no device side effects; the host opens its stream separately and
    /// calls [`start`](Self::start) once the stream exists.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let table = Wavetable::shared();
        info!(
            sample_rate = config.sample_rate,
            max_polyphony = config.max_polyphony,
            "synth engine initialized"
        );

        Ok(Self {
            registry: Mutex::new(NoteRegistry::new(config)),
            frames: AtomicU64::new(0),
            running: AtomicBool::new(false),
            config,
            table,
        })
    }

    /// Mark the output stream as running; note operations take effect from now on.
    pub fn start(&self) {
        if !self.running.swap(true, Ordering::AcqRel) {
            info!("output stream started");
        }
    }

    /// Mark the output stream as stopped and silence every voice.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            let cleared = self.registry.lock().clear();
            info!(cleared, "output stream stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start (or retrigger) `note`. Evicts a voice if the pool is full.
    pub fn play_note(&self, note: i32) {
        let Some(note) = self.accept_note("play_note", note) else {
            return;
        };

        let mut registry = self.registry.lock();
        let outcome = registry.note_on(note, self.current_time());
        drop(registry);

        match outcome {
            NoteOnOutcome::Started => debug!(note, "note on"),
            NoteOnOutcome::Retriggered => debug!(note, "note retriggered"),
            NoteOnOutcome::Stole {
                evicted,
                was_releasing,
            } => debug!(note, evicted, was_releasing, "note on, voice stolen"),
        }
    }

    /// Release `note` into its fade-out. Unknown notes are ignored.
    pub fn stop_note(&self, note: i32) {
        let Some(note) = self.accept_note("stop_note", note) else {
            return;
        };

        let released = self.registry.lock().note_off(note, self.current_time());
        if released {
            debug!(note, "note off");
        }
    }

    /// Hard stop: drop every voice immediately, skipping release.
    pub fn stop_all_notes(&self) {
        let cleared = self.registry.lock().clear();
        debug!(cleared, "all notes stopped");
    }

    /// Soft stop: every sounding voice fades out through its release.
    pub fn release_all_notes(&self) {
        if !self.is_running() {
            warn!("release_all_notes ignored: output stream not running");
            return;
        }

        let released = self.registry.lock().release_all(self.current_time());
        debug!(released, "all notes released");
    }

    /// Single-voice entry point kept for older hosts; same registry as `play_note`.
    pub fn play_note_legacy(&self, note: i32) {
        self.play_note(note);
    }

    /// Single-voice stop kept for older hosts. Has no note argument, so it
    /// stops everything.
    pub fn stop_note_legacy(&self) {
        self.stop_all_notes();
    }

    /// Seconds of audio rendered since the engine was created.
    pub fn current_time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.config.sample_rate as f64
    }

    /// Fill `out` with the mono mix of every active voice.
    ///
    /// Realtime-safe: never blocks, never allocates. If the control path holds
    /// the registry, `out` is silenced and [`RenderOutcome::Contended`] returned.
    pub fn render(&self, out: &mut [f32]) -> RenderOutcome {
        out.fill(0.0);

        let start_frame = self.frames.fetch_add(out.len() as u64, Ordering::AcqRel);

        let Some(mut registry) = self.registry.try_lock() else {
            return RenderOutcome::Contended;
        };

        let start_time = start_frame as f64 / self.config.sample_rate as f64;
        let voices = registry.render(out, start_time, self.table);
        RenderOutcome::Rendered { voices }
    }

    /// Copy out the state of every active voice. Control path only (blocks).
    pub fn voice_snapshots(&self) -> Vec<VoiceSnapshot> {
        let mut out = Vec::with_capacity(self.config.max_polyphony);
        self.collect_voice_snapshots(&mut out);
        out
    }

    /// Like [`voice_snapshots`](Self::voice_snapshots), reusing `out`'s allocation.
    pub fn collect_voice_snapshots(&self, out: &mut Vec<VoiceSnapshot>) {
        out.clear();
        let now = self.current_time();
        self.registry.lock().snapshots(now, out);
    }

    pub fn active_voice_count(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn accept_note(&self, op: &'static str, note: i32) -> Option<u8> {
        if !self.is_running() {
            warn!(op, note, "ignored: output stream not running");
            return None;
        }

        let checked = checked_note(note);
        if checked.is_none() {
            warn!(op, note, "ignored: note outside MIDI range");
        }
        checked
    }
}
