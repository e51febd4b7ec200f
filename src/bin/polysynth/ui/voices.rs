//! Voice pool widget - one row per registered note

use polysynth::{dsp::EnvelopeStage, synth::VoiceSnapshot};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::keymap::note_name;

/// Width of the level bar in characters
const BAR_WIDTH: usize = 24;

fn stage_label(stage: EnvelopeStage) -> (&'static str, Color) {
    match stage {
        EnvelopeStage::Attack => ("ATK", Color::LightRed),
        EnvelopeStage::Decay => ("DEC", Color::LightYellow),
        EnvelopeStage::Sustain => ("SUS", Color::LightGreen),
        EnvelopeStage::Release => ("REL", Color::LightBlue),
        EnvelopeStage::Done => ("---", Color::DarkGray),
    }
}

fn level_bar(level: f32) -> String {
    let filled = ((level.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

/// Render the voice pool, oldest voice first
pub fn render_voices(frame: &mut Frame, area: Rect, snapshots: &[VoiceSnapshot], capacity: usize) {
    let block = Block::default()
        .title(format!(" Voices {}/{} ", snapshots.len(), capacity))
        .borders(Borders::ALL);

    let mut ordered: Vec<&VoiceSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.sequence);

    let lines: Vec<Line> = ordered
        .iter()
        .map(|snap| {
            let (label, color) = stage_label(snap.stage);
            Line::from(vec![
                Span::styled(
                    format!(" {:<4} ", note_name(snap.note)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(format!("{label} "), Style::default().fg(color)),
                Span::styled(level_bar(snap.level), Style::default().fg(color)),
                Span::styled(
                    format!(" {:.2}", snap.level),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bar_has_fixed_width() {
        for level in [0.0, 0.33, 1.0, 2.0, -1.0] {
            assert_eq!(level_bar(level).chars().count(), BAR_WIDTH);
        }
    }
}
