//! Instrument sample data

/// One instrument sample with its metadata and normalized PCM data
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Sample slot number (1..=31, 0 for the silent placeholder)
    pub number: u8,
    /// Sample name (up to 22 characters)
    pub title: String,
    /// Length in bytes
    pub length: usize,
    /// Signed finetune in 1/8 semitone steps (-8..=7)
    pub finetune: i8,
    /// Default volume (0..=64)
    pub volume: u8,
    /// Loop start offset in bytes
    pub repeat_start: usize,
    /// Loop length in bytes
    pub repeat_length: usize,
    /// Signed 8-bit PCM scaled to -1.0..1.0
    pub audio: Vec<f32>,
}

impl Sample {
    /// Silent placeholder for an unused slot
    pub fn empty(number: u8) -> Self {
        Sample {
            number,
            title: String::new(),
            length: 0,
            finetune: 0,
            volume: 0,
            repeat_start: 0,
            repeat_length: 0,
            audio: Vec::new(),
        }
    }

    /// True when the sample has a loop (repeat length above 2 bytes)
    pub fn repeats(&self) -> bool {
        self.repeat_length > 2
    }

    /// Convert a raw signed byte to a float in -1.0..1.0
    pub fn byte_to_float(byte: u8) -> f32 {
        (byte as i8) as f32 / 128.0
    }
}

/// Interpret the low nibble as a signed 4-bit value
pub fn nibble_to_signed(nibble: u8) -> i8 {
    let n = (nibble & 0x0F) as i8;
    if n & 0x8 == 0 {
        n
    } else {
        n - 16
    }
}
