//! Module Data Model
//!
//! Passive, immutable representation of a parsed ProTracker module: the song
//! header, the pattern table, the pattern data and the 31 instrument samples.
//! Everything in here is read-only once the parser hands it over; playback
//! state lives in [`crate::replayer`].

pub mod pattern;
pub mod sample;

pub use pattern::{Cell, Pattern};
pub use sample::Sample;

use std::sync::Arc;

/// Number of rows in every pattern
pub const ROWS_PER_PATTERN: usize = 64;

/// Number of entries in the pattern (order) table
pub const PATTERN_TABLE_LEN: usize = 128;

/// Number of instrument slots in a 31-sample module (index 0 is unused)
pub const SAMPLE_SLOTS: usize = 31;

/// Four-character format tag found at offset 1080
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatTag(pub [u8; 4]);

impl FormatTag {
    /// Derive the channel count encoded by the tag.
    ///
    /// `M.K.`, `M!K!` and `FLT4` are 4-channel, `FLT8` is 8-channel, `<n>CHN`
    /// takes its single leading digit and `<nn>CH` its two leading digits.
    /// Anything else is unsupported and yields `None`.
    pub fn channel_count(&self) -> Option<usize> {
        let count = match &self.0 {
            b"M.K." | b"M!K!" | b"FLT4" => 4,
            b"FLT8" => 8,
            [d, b'C', b'H', b'N'] => digit(*d)?,
            [d1, d2, b'C', b'H'] => digit(*d1)? * 10 + digit(*d2)?,
            _ => return None,
        };

        if count == 0 {
            None
        } else {
            Some(count)
        }
    }

    /// Tag as printable text (non-ASCII bytes replaced)
    pub fn as_string(&self) -> String {
        self.0
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '?' })
            .collect()
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

fn digit(byte: u8) -> Option<usize> {
    if byte.is_ascii_digit() {
        Some((byte - b'0') as usize)
    } else {
        None
    }
}

/// A fully parsed MOD file
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Song title (up to 20 characters)
    pub title: String,
    /// Number of pattern table entries that are played (1..=128)
    pub song_length: usize,
    /// Pattern table; only the first `song_length` entries are played
    pub pattern_table: [u8; PATTERN_TABLE_LEN],
    /// Format tag
    pub format: FormatTag,
    /// Channel count derived from the format tag
    pub channel_count: usize,
    /// Pattern data, indexed by the values in the pattern table
    pub patterns: Vec<Pattern>,
    /// Samples indexed 0..=31; slot 0 is an empty, silent placeholder
    pub samples: Vec<Arc<Sample>>,
}

impl Module {
    /// Pattern referenced by the given pattern table position
    pub fn pattern_at(&self, position: usize) -> Option<&Pattern> {
        let index = *self.pattern_table.get(position)? as usize;
        self.patterns.get(index)
    }

    /// Pattern index stored at the given pattern table position
    pub fn pattern_index_at(&self, position: usize) -> Option<usize> {
        self.pattern_table.get(position).map(|&p| p as usize)
    }

    /// Sample for a 1-based sample number (0 and out-of-range give `None`)
    pub fn sample(&self, number: u8) -> Option<&Arc<Sample>> {
        if number == 0 {
            return None;
        }
        self.samples.get(number as usize)
    }

    /// Number of patterns stored in the module
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Pattern table entries that are actually played
    pub fn song_positions(&self) -> &[u8] {
        &self.pattern_table[..self.song_length.min(PATTERN_TABLE_LEN)]
    }

    /// Multi-line summary for CLI output
    pub fn format_info(&self) -> String {
        let used_samples = self.samples.iter().filter(|s| s.length > 0).count();
        format!(
            "Title: {}\nFormat: {} ({} channels)\nSong length: {} positions\nPatterns: {}\nSamples: {} used of {}",
            self.title,
            self.format,
            self.channel_count,
            self.song_length,
            self.pattern_count(),
            used_samples,
            SAMPLE_SLOTS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_count_standard_tags() {
        assert_eq!(FormatTag(*b"M.K.").channel_count(), Some(4));
        assert_eq!(FormatTag(*b"M!K!").channel_count(), Some(4));
        assert_eq!(FormatTag(*b"FLT4").channel_count(), Some(4));
        assert_eq!(FormatTag(*b"FLT8").channel_count(), Some(8));
    }

    #[test]
    fn test_channel_count_numeric_tags() {
        assert_eq!(FormatTag(*b"6CHN").channel_count(), Some(6));
        assert_eq!(FormatTag(*b"8CHN").channel_count(), Some(8));
        assert_eq!(FormatTag(*b"10CH").channel_count(), Some(10));
        assert_eq!(FormatTag(*b"32CH").channel_count(), Some(32));
    }

    #[test]
    fn test_channel_count_unsupported() {
        assert_eq!(FormatTag(*b"XYZZ").channel_count(), None);
        assert_eq!(FormatTag(*b"0CHN").channel_count(), None);
        assert_eq!(FormatTag(*b"XCHN").channel_count(), None);
        assert_eq!(FormatTag(*b"1XCH").channel_count(), None);
    }

    #[test]
    fn test_format_tag_display() {
        assert_eq!(FormatTag(*b"M.K.").to_string(), "M.K.");
        assert_eq!(FormatTag([b'A', 0, b'B', 0xFF]).to_string(), "A?B?");
    }
}
