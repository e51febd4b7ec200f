//! polysynth - play the engine from the terminal keyboard
//!
//! Run with: cargo run -- [--config synth.toml] [--voices 8] [--release 1.5]

mod app;
mod keymap;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use polysynth::EngineConfig;

const DEFAULT_LOG_FILE: &str = "polysynth.log";

#[derive(Parser, Debug)]
#[command(name = "polysynth", about = "Polyphonic ADSR wavetable synth")]
struct Args {
    /// TOML file with engine settings; missing keys fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file; defaults to polysynth.log in the temp dir since the UI owns
    /// the terminal
    #[arg(long)]
    log: Option<PathBuf>,

    /// Maximum simultaneous voices
    #[arg(long)]
    voices: Option<usize>,

    /// Attack time in seconds
    #[arg(long)]
    attack: Option<f32>,

    /// Decay time in seconds
    #[arg(long)]
    decay: Option<f32>,

    /// Sustain level (0, 1]
    #[arg(long)]
    sustain: Option<f32>,

    /// Release time in seconds
    #[arg(long)]
    release: Option<f32>,

    /// Gain of a single voice
    #[arg(long)]
    gain: Option<f32>,
}

impl Args {
    fn log_path(&self) -> PathBuf {
        self.log
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
    }

    fn engine_config(&self) -> EyreResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("failed to read {}", path.display()))?;
                toml::from_str(&text)
                    .wrap_err_with(|| format!("failed to parse {}", path.display()))?
            }
            None => EngineConfig::default(),
        };

        if let Some(voices) = self.voices {
            config.max_polyphony = voices;
        }
        if let Some(attack) = self.attack {
            config.envelope.attack = attack;
        }
        if let Some(decay) = self.decay {
            config.envelope.decay = decay;
        }
        if let Some(sustain) = self.sustain {
            config.envelope.sustain = sustain;
        }
        if let Some(release) = self.release {
            config.envelope.release = release;
        }
        if let Some(gain) = self.gain {
            config.master_gain = gain;
        }

        Ok(config)
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let log_path = args.log_path();
    let file = File::create(&log_path)
        .wrap_err_with(|| format!("failed to create log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    let config = args.engine_config()?;
    app::run(config)
}
