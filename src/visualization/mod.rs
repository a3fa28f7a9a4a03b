//! Terminal Visualization Utilities
//!
//! Tracker-style text rendering of pattern data and live telemetry, for
//! pattern dumps and status lines in terminal front-ends.

use crate::module::{Cell, Module, Pattern};
use std::fmt::Write;

const NOTE_NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Octave-4 periods of the twelve notes, matched with a tolerance of 1
const BASE_PERIODS: [u16; 12] = [107, 101, 95, 90, 85, 80, 76, 71, 67, 64, 60, 57];

fn octave_of(period: u16) -> u32 {
    match period {
        0..=54 => 5,
        55..=109 => 4,
        110..=219 => 3,
        220..=439 => 2,
        440..=879 => 1,
        _ => 0,
    }
}

/// Note name with octave for an Amiga period, e.g. `C-2` for 428.
///
/// `...` for an empty period; `XX` replaces the note name when the period
/// is not close to a tempered note.
pub fn note_string(period: u16) -> String {
    if period == 0 {
        return "...".to_string();
    }
    let octave = octave_of(period);
    let reduced = if octave > 4 {
        period as u32 * 2
    } else {
        (period >> (4 - octave)) as u32
    };
    let name = NOTE_NAMES
        .iter()
        .zip(BASE_PERIODS.iter())
        .filter(|(_, &base)| reduced + 1 >= base as u32 && reduced <= base as u32 + 1)
        .map(|(name, _)| *name)
        .last()
        .unwrap_or("XX");
    format!("{}{}", name, octave)
}

/// Two-digit hex sample number, `..` for none
pub fn sample_string(sample: u8) -> String {
    if sample == 0 {
        "..".to_string()
    } else {
        format!("{:02x}", sample)
    }
}

fn effect_text(command: u8, param: u8) -> String {
    if command == 0 {
        format!(".{:02x}", param)
    } else {
        format!("{:x}{:02x}", command, param)
    }
}

/// Three-digit hex effect, with `.` in place of command 0
pub fn effect_string(effect: u16) -> String {
    effect_text(((effect >> 8) & 0x0F) as u8, (effect & 0xFF) as u8)
}

/// `note sample effect` for one cell, e.g. `C-2 01 c20`
pub fn cell_string(cell: &Cell) -> String {
    format!(
        "{} {} {}",
        note_string(cell.period),
        sample_string(cell.sample),
        effect_text(cell.command(), cell.param())
    )
}

/// One pattern row across all channels: `|12| C-2 01 c20 | ... .. .00 | `
pub fn format_row(pattern: &Pattern, row: usize) -> String {
    let mut line = String::with_capacity(6 + pattern.channel_count() * 14);
    write!(line, "|{:>2}| ", row).ok();
    for cell in pattern.row(row) {
        write!(line, "{} | ", cell_string(&cell)).ok();
    }
    line
}

/// Numbered list of the sample names, one per line
pub fn sample_list(module: &Module) -> String {
    let mut text = String::new();
    for sample in module.samples.iter().skip(1) {
        writeln!(text, "|{:>2}| {}", sample.number, sample.title).ok();
    }
    text
}

/// Create a Unicode block bar representing an amplitude value
///
/// Generates a fixed-width string with █ characters proportional to the amplitude level,
/// padded with spaces to maintain consistent width.
///
/// # Arguments
/// * `amplitude` - Amplitude value (0.0 to 1.0+, clamped internally)
/// * `max_length` - Maximum bar length in characters (also the fixed output width)
pub fn create_volume_bar(amplitude: f32, max_length: usize) -> String {
    let normalized = amplitude.clamp(0.0, 1.0);
    let block_count = ((normalized * max_length as f32) as usize).min(max_length);
    let blocks = "█".repeat(block_count);
    let spaces = " ".repeat(max_length - block_count);
    format!("{}{}", blocks, spaces)
}

/// Compact per-channel status: note, volume bar and latched effect
#[cfg(feature = "replayer")]
pub fn channel_status(channel: &crate::replayer::ChannelState, bar_width: usize) -> String {
    let period = channel.period().round().clamp(0.0, u16::MAX as f64) as u16;
    let level = channel.volume() as f32 / 64.0;
    format!(
        "{} {} {:?}",
        note_string(period),
        create_volume_bar(if period == 0 { 0.0 } else { level }, bar_width),
        channel.effect()
    )
}
