//! MOD Format Parsing
//!
//! Turns a raw byte stream into a [`Module`]. The layout is the classic
//! 31-sample ProTracker format:
//!
//! ```text
//! offset    size         content
//! 0         20           song title
//! 20        30 x 31      sample metadata
//! 950       1            song length
//! 951       1            restart byte (ignored)
//! 952       128          pattern table
//! 1080      4            format tag
//! 1084      256 x N x P  pattern data (N channels, P patterns)
//! ...                    sample payloads, in sample order
//! ```

pub mod header;
pub mod sample;

pub use header::{parse_header, ModHeader};
pub use sample::{load_sample_payloads, parse_sample_headers, SampleHeader};

use crate::module::{Module, Pattern, Sample, ROWS_PER_PATTERN, SAMPLE_SLOTS};
use crate::{FormatError, Result};
use std::sync::Arc;

/// Offset of the first sample metadata record
pub const SAMPLE_TABLE_OFFSET: usize = 20;
/// Offset of the song length byte
pub const SONG_LENGTH_OFFSET: usize = 950;
/// Offset of the pattern table
pub const PATTERN_TABLE_OFFSET: usize = 952;
/// Offset of the format tag
pub const FORMAT_TAG_OFFSET: usize = 1080;
/// Size of the fixed header (950 + 2 + 128 + 4)
pub const HEADER_SIZE: usize = 1084;
/// Bytes per channel per pattern (64 rows x 4 bytes)
pub const PATTERN_BYTES_PER_CHANNEL: usize = 256;

/// Common trait for module format parsers
pub trait FormatParser {
    /// Parse a complete module from raw bytes
    fn parse(&self, data: &[u8]) -> Result<Module>;

    /// Human-readable parser name
    fn name(&self) -> &str;
}

/// ProTracker 31-sample MOD parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ModParser;

impl ModParser {
    /// Create a new parser
    pub fn new() -> Self {
        ModParser
    }

    /// Parse the pattern block that starts right after the header.
    /// Returns the patterns and the offset of the first sample payload.
    fn parse_patterns(data: &[u8], header: &ModHeader) -> std::result::Result<(Vec<Pattern>, usize), FormatError> {
        let pattern_size = PATTERN_BYTES_PER_CHANNEL * header.channel_count;
        let count = header.pattern_count();
        let needed = pattern_size * count;
        let available = data.len() - HEADER_SIZE;
        if needed > available {
            return Err(FormatError::PatternDataTruncated { needed, available });
        }

        let patterns: Vec<Pattern> = data[HEADER_SIZE..HEADER_SIZE + needed]
            .chunks_exact(pattern_size)
            .map(|chunk| Pattern::from_bytes(chunk, header.channel_count))
            .collect();

        for (index, pattern) in patterns.iter().enumerate() {
            Self::check_sample_numbers(index, pattern)?;
        }

        Ok((patterns, HEADER_SIZE + needed))
    }

    fn check_sample_numbers(index: usize, pattern: &Pattern) -> std::result::Result<(), FormatError> {
        if pattern.max_sample_number() as usize <= SAMPLE_SLOTS {
            return Ok(());
        }
        for row in 0..ROWS_PER_PATTERN {
            for (channel, cell) in pattern.row(row).enumerate() {
                if cell.sample as usize > SAMPLE_SLOTS {
                    return Err(FormatError::InvalidSampleNumber {
                        pattern: index,
                        row,
                        channel,
                        sample: cell.sample,
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse with the narrow format error type
    pub fn parse_module(&self, data: &[u8]) -> std::result::Result<Module, FormatError> {
        let header = parse_header(data)?;
        let (patterns, payload_start) = Self::parse_patterns(data, &header)?;
        let sample_headers = parse_sample_headers(data);
        let loaded = load_sample_payloads(data, sample_headers, payload_start)?;

        let mut samples = Vec::with_capacity(SAMPLE_SLOTS + 1);
        samples.push(Arc::new(Sample::empty(0)));
        samples.extend(loaded.into_iter().map(Arc::new));

        let module = Module {
            title: header.title,
            song_length: header.song_length,
            pattern_table: header.pattern_table,
            format: header.format,
            channel_count: header.channel_count,
            patterns,
            samples,
        };

        tracing::debug!(
            title = %module.title,
            format = %module.format,
            channels = module.channel_count,
            patterns = module.pattern_count(),
            song_length = module.song_length,
            "parsed module"
        );

        Ok(module)
    }
}

impl FormatParser for ModParser {
    fn parse(&self, data: &[u8]) -> Result<Module> {
        Ok(self.parse_module(data)?)
    }

    fn name(&self) -> &str {
        "ProTracker MOD"
    }
}

/// Convenience function: parse a module with the default parser
pub fn parse_module(data: &[u8]) -> Result<Module> {
    ModParser.parse(data)
}

/// Read a fixed-width text field, dropping NUL bytes
pub fn read_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}
