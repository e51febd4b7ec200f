//! Full-engine scenario benchmarks.
//!
//! These model what the device callback actually pays: the registry lock,
//! every active voice's envelope and oscillator, and reaping.

mod render;

pub use render::bench_render;
