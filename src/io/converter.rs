/// Highest valid MIDI note number.
pub const MAX_NOTE: i32 = 127;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// Narrow a host-supplied note number to the MIDI range, if it fits.
pub fn checked_note(note: i32) -> Option<u8> {
    if (0..=MAX_NOTE).contains(&note) {
        Some(note as u8)
    } else {
        None
    }
}
