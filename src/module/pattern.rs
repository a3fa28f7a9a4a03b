//! Pattern and cell layout

use super::ROWS_PER_PATTERN;

/// Size of one encoded cell in bytes
pub const CELL_SIZE: usize = 4;

/// One (sample, period, effect) triple for one channel on one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// Sample number (0 = keep current sample)
    pub sample: u8,
    /// Amiga period (0 = no new note), 12 bits
    pub period: u16,
    /// Effect word: command nibble followed by the parameter byte, 12 bits
    pub effect: u16,
}

impl Cell {
    /// Decode a 4-byte cell.
    ///
    /// ```text
    /// byte0: ssss pppp   (sample high nibble, period bits 11-8)
    /// byte1: pppp pppp   (period bits 7-0)
    /// byte2: ssss eeee   (sample low nibble, effect command)
    /// byte3: xxxx yyyy   (effect parameter)
    /// ```
    pub fn from_bytes(bytes: [u8; CELL_SIZE]) -> Self {
        let [b0, b1, b2, b3] = bytes;
        Cell {
            sample: (b0 & 0xF0) | (b2 >> 4),
            period: (((b0 & 0x0F) as u16) << 8) | b1 as u16,
            effect: (((b2 & 0x0F) as u16) << 8) | b3 as u16,
        }
    }

    /// Effect command nibble
    pub fn command(&self) -> u8 {
        ((self.effect >> 8) & 0x0F) as u8
    }

    /// Effect parameter byte
    pub fn param(&self) -> u8 {
        (self.effect & 0xFF) as u8
    }

    /// True when the cell carries nothing at all
    pub fn is_empty(&self) -> bool {
        self.sample == 0 && self.period == 0 && self.effect == 0
    }
}

/// 64 rows of cells for every channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Cells stored channel-major: `tracks[channel][row]`
    tracks: Vec<Vec<Cell>>,
}

impl Pattern {
    /// Build a pattern from raw pattern bytes (`256 * channels` bytes, row-major
    /// on disk: row 0 channel 0, row 0 channel 1, ...)
    pub fn from_bytes(data: &[u8], channels: usize) -> Self {
        let mut tracks = vec![Vec::with_capacity(ROWS_PER_PATTERN); channels];
        for row in 0..ROWS_PER_PATTERN {
            for (channel, track) in tracks.iter_mut().enumerate() {
                let pos = (row * channels + channel) * CELL_SIZE;
                let cell = data
                    .get(pos..pos + CELL_SIZE)
                    .map(|b| Cell::from_bytes([b[0], b[1], b[2], b[3]]))
                    .unwrap_or_default();
                track.push(cell);
            }
        }
        Pattern { tracks }
    }

    /// Empty pattern with the given channel count
    pub fn empty(channels: usize) -> Self {
        Pattern {
            tracks: vec![vec![Cell::default(); ROWS_PER_PATTERN]; channels],
        }
    }

    /// Number of channels in this pattern
    pub fn channel_count(&self) -> usize {
        self.tracks.len()
    }

    /// Cell at (channel, row); out-of-range positions read as empty cells
    pub fn cell(&self, channel: usize, row: usize) -> Cell {
        self.tracks
            .get(channel)
            .and_then(|t| t.get(row))
            .copied()
            .unwrap_or_default()
    }

    /// Mutable access to a cell, used when building modules in code
    pub fn cell_mut(&mut self, channel: usize, row: usize) -> Option<&mut Cell> {
        self.tracks.get_mut(channel).and_then(|t| t.get_mut(row))
    }

    /// All cells of one row, in channel order
    pub fn row(&self, row: usize) -> impl Iterator<Item = Cell> + '_ {
        self.tracks
            .iter()
            .map(move |t| t.get(row).copied().unwrap_or_default())
    }

    /// Highest sample number referenced anywhere in the pattern
    pub fn max_sample_number(&self) -> u8 {
        self.tracks
            .iter()
            .flatten()
            .map(|c| c.sample)
            .max()
            .unwrap_or(0)
    }
}
