use polysynth::{
    dsp::{AdsrParams, EnvelopeStage},
    io::OutputAdapter,
    EngineConfig, RenderOutcome, SynthEngine,
};

const SAMPLE_RATE: f32 = 8_000.0;
const BLOCK: usize = 80; // 10ms

fn engine(voices: usize) -> SynthEngine {
    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_max_polyphony(voices)
        .with_envelope(AdsrParams::adsr(0.01, 0.1, 0.6, 0.5));
    let engine = SynthEngine::new(config).expect("valid config");
    engine.start();
    engine
}

/// Render `seconds` of audio in device-sized blocks, returning the peak.
fn run_for(engine: &SynthEngine, seconds: f32) -> f32 {
    let blocks = (seconds * SAMPLE_RATE / BLOCK as f32).round() as usize;
    let mut buffer = vec![0.0f32; BLOCK];
    let mut peak = 0.0f32;
    for _ in 0..blocks {
        engine.render(&mut buffer);
        peak = buffer.iter().fold(peak, |acc, &x| acc.max(x.abs()));
    }
    peak
}

fn stage_of(engine: &SynthEngine, note: u8) -> Option<EnvelopeStage> {
    engine
        .voice_snapshots()
        .into_iter()
        .find(|s| s.note == note)
        .map(|s| s.stage)
}

#[test]
fn renders_silence_with_no_notes() {
    let engine = engine(4);
    let mut buffer = vec![0.5f32; 256];
    assert_eq!(engine.render(&mut buffer), RenderOutcome::Rendered { voices: 0 });
    assert!(buffer.iter().all(|&s| s == 0.0));
}

#[test]
fn note_walks_through_every_stage() {
    let engine = engine(4);
    engine.play_note(60);
    assert_eq!(stage_of(&engine, 60), Some(EnvelopeStage::Attack));

    run_for(&engine, 0.05);
    assert_eq!(stage_of(&engine, 60), Some(EnvelopeStage::Decay));

    let sustain_peak = run_for(&engine, 0.2);
    assert_eq!(stage_of(&engine, 60), Some(EnvelopeStage::Sustain));
    assert!(sustain_peak > 0.0);

    engine.stop_note(60);
    assert_eq!(stage_of(&engine, 60), Some(EnvelopeStage::Release));

    run_for(&engine, 0.6);
    assert_eq!(stage_of(&engine, 60), None);
    assert_eq!(engine.active_voice_count(), 0);
    assert_eq!(run_for(&engine, 0.05), 0.0);
}

#[test]
fn stop_all_cuts_while_stop_note_fades() {
    let engine = engine(4);
    engine.play_note(60);
    engine.play_note(67);
    run_for(&engine, 0.2);

    engine.stop_note(60);
    assert_eq!(engine.active_voice_count(), 2, "single stop keeps the tail");

    engine.stop_all_notes();
    assert_eq!(engine.active_voice_count(), 0, "stop all skips release");
    assert_eq!(run_for(&engine, 0.02), 0.0);
}

#[test]
fn capacity_plus_one_evicts_oldest() {
    let engine = engine(4);
    for note in [60, 62, 64, 65] {
        engine.play_note(note);
    }
    engine.play_note(67);

    let notes: Vec<u8> = engine.voice_snapshots().iter().map(|s| s.note).collect();
    assert_eq!(notes.len(), 4);
    assert!(!notes.contains(&60));
    assert!(notes.contains(&67));
}

#[test]
fn capacity_plus_one_prefers_releasing_victim() {
    let engine = engine(4);
    for note in [60, 62, 64, 65] {
        engine.play_note(note);
    }
    run_for(&engine, 0.05);
    engine.stop_note(64);
    engine.stop_note(62);

    engine.play_note(67);

    let notes: Vec<u8> = engine.voice_snapshots().iter().map(|s| s.note).collect();
    assert_eq!(notes.len(), 4);
    assert!(!notes.contains(&62), "oldest releasing note is evicted");
    assert!(notes.contains(&60) && notes.contains(&64) && notes.contains(&67));
}

#[test]
fn replaying_a_note_does_not_duplicate_it() {
    let engine = engine(4);
    engine.play_note(60);
    run_for(&engine, 0.2);
    engine.play_note(60);

    let snaps = engine.voice_snapshots();
    assert_eq!(snaps.iter().filter(|s| s.note == 60).count(), 1);
    assert_eq!(stage_of(&engine, 60), Some(EnvelopeStage::Attack));
}

#[test]
fn current_time_tracks_rendered_audio() {
    let engine = engine(4);
    assert_eq!(engine.current_time(), 0.0);
    run_for(&engine, 1.0);
    assert!((engine.current_time() - 1.0).abs() < 1e-9);
}

#[test]
fn adapter_feeds_stereo_device() {
    let engine = engine(4);
    engine.play_note(69);

    let mut adapter = OutputAdapter::new(2);
    let mut data = vec![0.0f32; 2 * 4096];
    let stats = adapter.process(&engine, &mut data);

    assert_eq!(stats.contended_blocks, 0);
    assert!(stats.peak > 0.0 && stats.peak <= engine.config().master_gain);
    assert!(data.chunks_exact(2).all(|f| f[0] == f[1]));
}
