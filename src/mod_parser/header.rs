//! Song header: title, song length, pattern table and format tag

use super::{read_string, FORMAT_TAG_OFFSET, HEADER_SIZE, PATTERN_TABLE_OFFSET, SONG_LENGTH_OFFSET};
use crate::module::{FormatTag, PATTERN_TABLE_LEN};
use crate::FormatError;

/// Length of the song title field
pub const TITLE_LEN: usize = 20;

/// Fixed header fields of a 31-sample module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModHeader {
    /// Song title
    pub title: String,
    /// Number of played pattern table entries
    pub song_length: usize,
    /// Raw pattern table
    pub pattern_table: [u8; PATTERN_TABLE_LEN],
    /// Format tag
    pub format: FormatTag,
    /// Channel count derived from the tag
    pub channel_count: usize,
}

impl ModHeader {
    /// Number of stored patterns: one more than the highest table entry
    pub fn pattern_count(&self) -> usize {
        self.pattern_table
            .iter()
            .copied()
            .max()
            .map(|m| m as usize + 1)
            .unwrap_or(1)
    }
}

/// Parse and validate the fixed header
pub fn parse_header(data: &[u8]) -> Result<ModHeader, FormatError> {
    if data.len() < HEADER_SIZE {
        return Err(FormatError::TooShort {
            len: data.len(),
            min: HEADER_SIZE,
        });
    }

    let title = read_string(&data[0..TITLE_LEN]);

    let song_length = data[SONG_LENGTH_OFFSET] as usize;
    if song_length == 0 || song_length > PATTERN_TABLE_LEN {
        return Err(FormatError::InvalidSongLength(song_length));
    }

    let mut pattern_table = [0u8; PATTERN_TABLE_LEN];
    pattern_table
        .copy_from_slice(&data[PATTERN_TABLE_OFFSET..PATTERN_TABLE_OFFSET + PATTERN_TABLE_LEN]);

    let format = FormatTag([
        data[FORMAT_TAG_OFFSET],
        data[FORMAT_TAG_OFFSET + 1],
        data[FORMAT_TAG_OFFSET + 2],
        data[FORMAT_TAG_OFFSET + 3],
    ]);
    let channel_count = format
        .channel_count()
        .ok_or_else(|| FormatError::UnsupportedFormatTag(format.as_string()))?;

    Ok(ModHeader {
        title,
        song_length,
        pattern_table,
        format,
        channel_count,
    })
}
