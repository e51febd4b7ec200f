//! Computer keyboard → MIDI note mapping
//!
//! Two rows laid out like a piano octave:
//!
//! ```text
//!   w e   t y u
//!  a s d f g h j k
//!  C D E F G A B C
//! ```

const KEYS: [(char, i32); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const DEFAULT_BASE_NOTE: i32 = 60;
const MIN_BASE_NOTE: i32 = 12;
const MAX_BASE_NOTE: i32 = 108;

pub struct Keymap {
    base_note: i32,
}

impl Keymap {
    pub fn new() -> Self {
        Self {
            base_note: DEFAULT_BASE_NOTE,
        }
    }

    pub fn note_for(&self, key: char) -> Option<i32> {
        let key = key.to_ascii_lowercase();
        KEYS.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, offset)| self.base_note + offset)
    }

    pub fn octave_up(&mut self) {
        self.base_note = (self.base_note + 12).min(MAX_BASE_NOTE);
    }

    pub fn octave_down(&mut self) {
        self.base_note = (self.base_note - 12).max(MIN_BASE_NOTE);
    }

    pub fn base_note(&self) -> i32 {
        self.base_note
    }
}

/// Scientific pitch name, e.g. 60 → "C4".
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}
