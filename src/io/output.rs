use crate::{
    synth::engine::{RenderOutcome, SynthEngine},
    MAX_BLOCK_SIZE,
};

/// Per-callback figures a host may forward to a meter or log.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CallbackStats {
    /// Largest absolute sample written in this callback.
    pub peak: f32,
    /// Voices mixed in the last rendered block.
    pub voices: usize,
    /// Blocks that came back silent because the registry was busy.
    pub contended_blocks: u32,
}

/// Bridges a device callback buffer (interleaved, any channel count, any
/// length) to the engine's mono block renderer.
///
/// Owns a scratch block sized once at construction so the callback itself
/// never allocates.
pub struct OutputAdapter {
    channels: usize,
    scratch: Vec<f32>,
}

impl OutputAdapter {
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Fill interleaved `data`, duplicating the mono mix into every channel.
    ///
    /// Trailing samples that don't make up a whole frame are zeroed.
    pub fn process(&mut self, engine: &SynthEngine, data: &mut [f32]) -> CallbackStats {
        let channels = self.channels;
        let total_frames = data.len() / channels;
        let mut stats = CallbackStats::default();
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut self.scratch[..frames_to_render];

            match engine.render(block) {
                RenderOutcome::Rendered { voices } => stats.voices = voices,
                RenderOutcome::Contended => stats.contended_blocks += 1,
            }

            let out_off = frames_written * channels;
            let out = &mut data[out_off..out_off + frames_to_render * channels];
            for (frame, &s) in out.chunks_exact_mut(channels).zip(block.iter()) {
                frame.fill(s);
                stats.peak = stats.peak.max(s.abs());
            }

            frames_written += frames_to_render;
        }

        data[total_frames * channels..].fill(0.0);
        stats
    }
}
