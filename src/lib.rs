pub mod config; // Engine parameters and validation
pub mod dsp;
pub mod io;
pub mod synth; // Voice pool, note registry and the render engine

pub use config::{ConfigError, EngineConfig};
pub use synth::engine::{RenderOutcome, SynthEngine};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
