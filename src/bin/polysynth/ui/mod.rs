//! TUI module for polysynth
//!
//! Reads the keyboard, drives the engine's control path and shows what the
//! voice pool is doing.

mod status;
mod voices;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use polysynth::{io::CallbackStats, synth::VoiceSnapshot, SynthEngine};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use crate::keymap::Keymap;

use status::{render_status, MeterState};
use voices::render_voices;

/// Terminals only report key presses, so a note is released this long after
/// its key was last seen.
const NOTE_HOLD: Duration = Duration::from_millis(400);

pub struct UiApp {
    engine: Arc<SynthEngine>,
    stats_rx: Consumer<CallbackStats>,
    keymap: Keymap,
    /// Notes we started and when their key was last seen
    held: Vec<(i32, Instant)>,
    snapshots: Vec<VoiceSnapshot>,
    meter: MeterState,
    should_quit: bool,
}

impl UiApp {
    pub fn new(engine: Arc<SynthEngine>, stats_rx: Consumer<CallbackStats>) -> Self {
        let capacity = engine.config().max_polyphony;
        Self {
            engine,
            stats_rx,
            keymap: Keymap::new(),
            held: Vec::new(),
            snapshots: Vec::with_capacity(capacity),
            meter: MeterState::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(mut self, mut terminal: DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_stats();
            self.release_expired(Instant::now());
            self.engine.collect_voice_snapshots(&mut self.snapshots);

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Release {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_stats(&mut self) {
        while let Ok(stats) = self.stats_rx.pop() {
            self.meter.push(&stats);
        }
    }

    fn release_expired(&mut self, now: Instant) {
        let engine = &self.engine;
        self.held.retain(|&(note, seen)| {
            let expired = now.duration_since(seen) >= NOTE_HOLD;
            if expired {
                engine.stop_note(note);
            }
            !expired
        });
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.held.clear();
                self.engine.release_all_notes();
            }
            KeyCode::Backspace => {
                self.held.clear();
                self.engine.stop_all_notes();
            }
            KeyCode::Up => self.keymap.octave_up(),
            KeyCode::Down => self.keymap.octave_down(),
            KeyCode::Char(c) => {
                if let Some(note) = self.keymap.note_for(c) {
                    self.press(note);
                }
            }
            _ => {}
        }
    }

    /// Key auto-repeat arrives as more presses; only the first one plays.
    fn press(&mut self, note: i32) {
        let now = Instant::now();
        match self.held.iter_mut().find(|(n, _)| *n == note) {
            Some(entry) => entry.1 = now,
            None => {
                self.engine.play_note(note);
                self.held.push((note, now));
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(6),    // Voice pool
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(
            frame,
            chunks[0],
            &self.engine,
            &self.meter,
            self.keymap.base_note(),
        );
        render_voices(
            frame,
            chunks[1],
            &self.snapshots,
            self.engine.config().max_polyphony,
        );

        let help = Paragraph::new(
            " [a-k] Play  [↑/↓] Octave  [Space] Release all  [Backspace] Stop all  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
