//! Device setup and the audio callback

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use polysynth::{
    io::{CallbackStats, OutputAdapter},
    EngineConfig, SynthEngine,
};
use rtrb::RingBuffer;
use tracing::{error, info};

use crate::ui::UiApp;

/// Capacity in callbacks for the audio → UI stats ring
const STATS_RING_LEN: usize = 64;

pub fn run(config: EngineConfig) -> EyreResult<()> {
    // --- Set up CPAL ---
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;
    info!(sample_rate, channels, "output device selected");

    // The engine runs at whatever rate the device gives us.
    let engine = Arc::new(
        SynthEngine::new(config.with_sample_rate(sample_rate))
            .wrap_err("invalid engine configuration")?,
    );

    // Non-blocking stats channel: the callback drops entries if the UI lags.
    let (mut stats_tx, stats_rx) = RingBuffer::<CallbackStats>::new(STATS_RING_LEN);

    let stream = device
        .build_output_stream(
            &stream_config.into(),
            {
                let engine = Arc::clone(&engine);
                let mut adapter = OutputAdapter::new(channels);
                move |data: &mut [f32], _| {
                    let stats = adapter.process(&engine, data);
                    let _ = stats_tx.push(stats);
                }
            },
            |err| error!(%err, "output stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;
    engine.start();

    let terminal = ratatui::init();
    let res = UiApp::new(Arc::clone(&engine), stats_rx).run(terminal);
    ratatui::restore();

    engine.stop();
    drop(stream);
    res
}
