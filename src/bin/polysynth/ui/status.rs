//! Status bar widget - engine clock, pool usage and output level

use polysynth::{io::CallbackStats, SynthEngine};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::keymap::note_name;

/// Per-callback falloff of the held peak
const PEAK_FALLOFF: f32 = 0.97;

/// Output level as seen by the UI, folded from the callback stats stream
#[derive(Debug, Default)]
pub struct MeterState {
    pub peak: f32,
    pub contended_blocks: u64,
}

impl MeterState {
    pub fn push(&mut self, stats: &CallbackStats) {
        self.peak = (self.peak * PEAK_FALLOFF).max(stats.peak);
        self.contended_blocks += stats.contended_blocks as u64;
    }
}

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    engine: &SynthEngine,
    meter: &MeterState,
    base_note: i32,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(area);

    let config = engine.config();
    let octave = u8::try_from(base_note).map(note_name).unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}s  ", engine.current_time()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:.1}kHz  ", config.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Keys from {}  ", octave),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Dropped blocks: {}", meter.contended_blocks),
            Style::default().fg(if meter.contended_blocks > 0 {
                Color::Yellow
            } else {
                Color::DarkGray
            }),
        ),
    ]);

    let status = Paragraph::new(line).block(
        Block::default()
            .title(" polysynth ")
            .borders(Borders::ALL),
    );
    frame.render_widget(status, chunks[0]);

    let level = Gauge::default()
        .block(Block::default().title(" Peak ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(if meter.peak >= 0.99 {
            Color::Red
        } else {
            Color::Green
        }))
        .ratio(meter.peak.clamp(0.0, 1.0) as f64)
        .label(format!("{:.2}", meter.peak));
    frame.render_widget(level, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_holds_then_falls() {
        let mut meter = MeterState::default();
        meter.push(&CallbackStats {
            peak: 0.5,
            voices: 1,
            contended_blocks: 1,
        });
        assert_eq!(meter.peak, 0.5);

        meter.push(&CallbackStats::default());
        assert!(meter.peak < 0.5 && meter.peak > 0.4);
        assert_eq!(meter.contended_blocks, 1);
    }
}
