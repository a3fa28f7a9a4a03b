//! ProTracker MOD Replayer
//!
//! Decodes ProTracker "MOD" modules and replays them as a continuous stereo
//! PCM stream by emulating, tick for tick, the Amiga sound-tracker playback
//! engine: pattern sequencing, per-channel effect automation and sample
//! resampling/mixing.
//!
//! # Features
//! - Bit-exact parsing of 31-sample modules (`M.K.`, `M!K!`, `FLT4`, `FLT8`, `xCHN`, `xxCH`)
//! - Row/tick sequencer with pattern jump, break, loop, delay and speed/tempo
//! - Per-channel effect engine covering the classic ProTracker command set
//! - Linear-interpolating resampler with Amiga LRRL panning and cross-mix
//! - Fixed-size chunk delivery for pull-based audio sinks
//!
//! # Crate feature flags
//! - `mod-format` (default): MOD data model, parser and loader (`module`, `mod_parser`, `mod_loader`)
//! - `replayer` (default): Sequencer, effect engine, mixer and playback session (`replayer`, `mixer`, `streaming`)
//! - `visualization` (default): Pattern/telemetry display helpers (`visualization`)
//! - `export-wav` (default): Offline WAV rendering (`export`, enables `hound`)
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Render audio without an output device
//! ```no_run
//! # #[cfg(feature = "replayer")]
//! # {
//! use protracker::replayer::{PlaybackController, PlayerConfig};
//! use protracker::load_song;
//! let data = std::fs::read("song.mod").unwrap();
//! let (mut player, summary) = load_song(&data, PlayerConfig::default()).unwrap();
//! println!("{}", summary.title);
//! player.play().unwrap();
//! let stereo = player.generate_interleaved(4096);
//! # }
//! ```
//!
//! ## Real-time streaming
//! ```no_run
//! # #[cfg(feature = "streaming")]
//! # {
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use protracker::replayer::{PlaybackController, PlayerConfig};
//! use protracker::{load_song, AudioDevice};
//! let data = std::fs::read("song.mod").unwrap();
//! let (mut player, _) = load_song(&data, PlayerConfig::default()).unwrap();
//! player.play().unwrap();
//! let player = Arc::new(Mutex::new(player));
//! let _device = AudioDevice::new(Arc::clone(&player)).unwrap();
//! # }
//! ```

#![warn(missing_docs)]

// Domain modules (feature-gated for modular use)
#[cfg(feature = "export-wav")]
pub mod export; // Offline Rendering
#[cfg(feature = "replayer")]
pub mod mixer; // Resampling Mixer
#[cfg(feature = "mod-format")]
pub mod mod_loader; // MOD File I/O
#[cfg(feature = "mod-format")]
pub mod mod_parser; // MOD Format Parsing
#[cfg(feature = "mod-format")]
pub mod module; // Data Model
#[cfg(feature = "replayer")]
pub mod replayer; // Playback Engine
#[cfg(feature = "replayer")]
pub mod streaming; // Chunked Delivery & Audio Output
#[cfg(feature = "visualization")]
pub mod visualization; // Pattern/Telemetry Helpers

/// Fatal problems found while decoding a module byte stream
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Input is shorter than the fixed header
    #[error("file too short: {len} bytes, need at least {min}")]
    TooShort {
        /// Input length
        len: usize,
        /// Minimum header length
        min: usize,
    },

    /// Format tag does not identify a supported channel layout
    #[error("unsupported format tag '{0}'")]
    UnsupportedFormatTag(String),

    /// Song length outside 1..=128
    #[error("invalid song length {0} (expected 1..=128)")]
    InvalidSongLength(usize),

    /// Pattern block runs past the end of the input
    #[error("pattern data truncated: need {needed} bytes, {available} available")]
    PatternDataTruncated {
        /// Bytes required for all patterns
        needed: usize,
        /// Bytes left after the header
        available: usize,
    },

    /// A sample payload runs past the end of the input
    #[error("sample {sample} data truncated: need {needed} bytes, {available} available")]
    SampleDataTruncated {
        /// Sample number (1..=31)
        sample: u8,
        /// Bytes required by this sample
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// A pattern cell references a sample slot that does not exist
    #[error("pattern {pattern} row {row} channel {channel} references sample {sample}")]
    InvalidSampleNumber {
        /// Pattern index
        pattern: usize,
        /// Row index
        row: usize,
        /// Channel index
        channel: usize,
        /// Offending sample number
        sample: u8,
    },
}

/// Error types for MOD replayer operations
#[derive(thiserror::Error, Debug)]
pub enum ProtrackerError {
    /// Malformed or unsupported module data
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Error while parsing other inputs (configuration files, arguments)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ProtrackerError {
    /// Converts a String into `ProtrackerError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `AudioFileError`, ...) where
    /// the caller knows what went wrong.
    fn from(msg: String) -> Self {
        ProtrackerError::Other(msg)
    }
}

impl From<&str> for ProtrackerError {
    /// Converts a string slice into `ProtrackerError::Other`.
    fn from(msg: &str) -> Self {
        ProtrackerError::Other(msg.to_string())
    }
}

/// Result type for replayer operations
pub type Result<T> = std::result::Result<T, ProtrackerError>;

// Public API exports
#[cfg(feature = "mod-format")]
pub use mod_loader::ModFileLoader;
#[cfg(feature = "mod-format")]
pub use mod_parser::{parse_module, FormatParser, ModParser};
#[cfg(feature = "mod-format")]
pub use module::{Cell, FormatTag, Module, Pattern, Sample};
#[cfg(feature = "replayer")]
pub use replayer::{
    load_song, LoadSummary, ModPlayer, PlaybackController, PlaybackSnapshot, PlaybackState,
    PlayerConfig, PlayerEvent,
};
#[cfg(feature = "streaming")]
pub use streaming::AudioDevice;
#[cfg(feature = "replayer")]
pub use streaming::{ChunkBuffer, StreamConfig};
#[cfg(feature = "visualization")]
pub use visualization::create_volume_bar;
