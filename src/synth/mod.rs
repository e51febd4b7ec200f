// Purpose: voice management, polyphony and the realtime render path
// This layer sits above the DSP primitives and owns all per-note state

pub mod engine;
pub mod registry;
pub mod voice;

pub use engine::{RenderOutcome, SynthEngine};
pub use registry::{NoteOnOutcome, NoteRegistry};
pub use voice::{Voice, VoiceSnapshot, VoiceState};
