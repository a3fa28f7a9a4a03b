//! Player configuration
//!
//! Loadable from JSON so that hosts can keep render settings next to their
//! own configuration. Every field has a default, so partial documents work.

use crate::streaming::StreamConfig;
use crate::{ProtrackerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// PAL Amiga master clock in Hz
pub const PAL_CLOCK: f64 = 7_093_789.2;
/// NTSC Amiga master clock in Hz
pub const NTSC_CLOCK: f64 = 7_159_090.5;
/// Default stereo cross-mix factor
pub const DEFAULT_CROSSMIX: f32 = 0.35;

/// Lowest tempo reachable with `Fxx`; gives the longest tick
const MIN_BPM: f64 = 33.0;

/// Amiga video standard, which sets the Paula clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmigaClock {
    /// 7093789.2 Hz
    #[default]
    Pal,
    /// 7159090.5 Hz
    Ntsc,
}

impl AmigaClock {
    /// Clock frequency in Hz
    pub fn hz(self) -> f64 {
        match self {
            AmigaClock::Pal => PAL_CLOCK,
            AmigaClock::Ntsc => NTSC_CLOCK,
        }
    }
}

/// Render settings for a [`ModPlayer`](super::ModPlayer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Amount of each side bled into the other (0.0 = hard Amiga stereo)
    pub crossmix: f32,
    /// Paula clock
    pub clock: AmigaClock,
    /// Output rate and chunking
    #[serde(flatten)]
    pub stream: StreamConfig,
}

impl PlayerConfig {
    /// Default settings at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        PlayerConfig {
            crossmix: DEFAULT_CROSSMIX,
            clock: AmigaClock::Pal,
            stream: StreamConfig::stable(sample_rate),
        }
    }

    /// Builder: set the cross-mix factor
    pub fn with_crossmix(mut self, crossmix: f32) -> Self {
        self.crossmix = crossmix;
        self
    }

    /// Builder: set the Amiga clock
    pub fn with_clock(mut self, clock: AmigaClock) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: replace the stream settings
    pub fn with_stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.stream.sample_rate
    }

    /// Frames in the longest possible tick at this sample rate
    pub fn max_burst_frames(&self) -> usize {
        (2500.0 / MIN_BPM * self.stream.sample_rate as f64 / 1000.0).ceil() as usize
    }

    /// Check that the settings can drive a player
    pub fn validate(&self) -> Result<()> {
        if self.stream.sample_rate == 0 {
            return Err(ProtrackerError::ConfigError(
                "sample rate must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossmix) {
            return Err(ProtrackerError::ConfigError(format!(
                "crossmix {} outside 0.0..=1.0",
                self.crossmix
            )));
        }
        if self.stream.chunk_size == 0 {
            return Err(ProtrackerError::ConfigError(
                "chunk size must be positive".to_string(),
            ));
        }
        // one chunk short of full plus the longest burst must still fit
        let needed = self.stream.chunk_size + self.max_burst_frames();
        if self.stream.capacity() <= needed {
            return Err(ProtrackerError::ConfigError(format!(
                "buffer of {} frames too small, need more than {}",
                self.stream.capacity(),
                needed
            )));
        }
        Ok(())
    }

    /// Parse from a JSON document and validate
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)
            .map_err(|e| ProtrackerError::ParseError(format!("invalid player config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file and validate
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading player config");
        Self::from_json_str(&text)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new(crate::streaming::DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.sample_rate(), 44100);
        assert_eq!(config.crossmix, 0.35);
        assert_eq!(config.clock, AmigaClock::Pal);
        assert_eq!(config.stream.chunk_size, 2048);
        assert_eq!(config.stream.buffer_chunks, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clock_frequencies() {
        assert_eq!(AmigaClock::Pal.hz(), 7_093_789.2);
        assert_eq!(AmigaClock::Ntsc.hz(), 7_159_090.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PlayerConfig::from_json_str(r#"{"clock": "ntsc", "sample_rate": 48000}"#)
            .unwrap();
        assert_eq!(config.clock, AmigaClock::Ntsc);
        assert_eq!(config.sample_rate(), 48000);
        assert_eq!(config.stream.chunk_size, 2048);
        assert_eq!(config.crossmix, 0.35);
    }

    #[test]
    fn test_invalid_crossmix_rejected() {
        let result = PlayerConfig::from_json_str(r#"{"crossmix": 1.5}"#);
        assert!(matches!(result, Err(ProtrackerError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = PlayerConfig::from_json_str("{crossmix: }");
        assert!(matches!(result, Err(ProtrackerError::ParseError(_))));
    }

    #[test]
    fn test_undersized_buffer_rejected() {
        let config = PlayerConfig::new(48000).with_stream(StreamConfig {
            sample_rate: 48000,
            chunk_size: 256,
            buffer_chunks: 4,
        });
        assert!(config.validate().is_err());
        assert!(PlayerConfig::new(48000)
            .with_stream(StreamConfig::low_latency(48000))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_max_burst_frames() {
        // 2500 / 33 ms at 44.1 kHz
        assert_eq!(PlayerConfig::default().max_burst_frames(), 3341);
    }
}
