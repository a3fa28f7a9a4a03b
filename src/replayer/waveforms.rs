//! Vibrato / tremolo waveform tables
//!
//! ProTracker-compatible 64-entry tables. The waveform selector set by `E4x`
//! and `E7x` is taken mod 4; selectors 4 and above additionally stop the
//! position from being reset when a new note starts.

/// Number of entries per waveform table
pub const WAVEFORM_LEN: usize = 64;

/// Sine, ramp down, square and pseudo-random tables
pub const LOOKUP: [[i16; WAVEFORM_LEN]; 4] = [
    [
        0, 24, 49, 74, 97, 120, 141, 161, 180, 197, 212, 224, 235, 244, 250, 253, 255, 253, 250,
        244, 235, 224, 212, 197, 180, 161, 141, 120, 97, 74, 49, 24, 0, -24, -49, -74, -97, -120,
        -141, -161, -180, -197, -212, -224, -235, -244, -250, -253, -255, -253, -250, -244, -235,
        -224, -212, -197, -180, -161, -141, -120, -97, -74, -49, -24,
    ],
    [
        252, 244, 236, 228, 220, 212, 204, 196, 188, 180, 172, 164, 156, 148, 140, 132, 124, 116,
        108, 100, 92, 84, 76, 68, 60, 52, 44, 36, 28, 20, 12, 4, -4, -12, -20, -28, -36, -44, -52,
        -60, -68, -76, -84, -92, -100, -108, -116, -124, -132, -140, -148, -156, -164, -172, -180,
        -188, -196, -204, -212, -220, -228, -236, -244, -252,
    ],
    [
        255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255,
        255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, -255, -255, -255,
        -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255,
        -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255, -255,
    ],
    [
        -100, 253, 104, -186, -241, -176, -90, -87, -110, -117, 207, -132, -28, -225, 142, -166,
        147, -185, -82, -187, -246, 126, -64, 170, 241, -131, 199, 219, -108, -124, 50, 178, 58,
        -236, -95, -238, 110, 192, 163, 146, 246, -192, -117, 189, -49, -112, -226, -121, -162,
        -175, 211, -209, 64, -42, -81, 129, 181, -179, 35, -62, 216, 27, 33, 102,
    ],
];

/// Waveform shape selected by the low two bits of the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Sinusoid
    Sine,
    /// Falling saw
    RampDown,
    /// Square
    Square,
    /// Fixed pseudo-random sequence
    Random,
}

impl Waveform {
    /// Map a selector value to its table (selector mod 4)
    pub fn from_selector(selector: u8) -> Self {
        match selector % 4 {
            0 => Waveform::Sine,
            1 => Waveform::RampDown,
            2 => Waveform::Square,
            _ => Waveform::Random,
        }
    }

    /// Signed amplitude at a table position (position wraps at 64)
    pub fn value(self, position: usize) -> i16 {
        LOOKUP[self as usize][position % WAVEFORM_LEN]
    }
}

/// Selectors 4 and above keep their position across new notes
pub fn is_continuous(selector: u8) -> bool {
    selector >= 4
}
