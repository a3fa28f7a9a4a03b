//! Chunked Delivery & Audio Output
//!
//! The sequencer produces bursts whose length depends on the tempo; audio
//! sinks want fixed-size blocks. [`ChunkBuffer`] sits in between, and the
//! optional rodio-backed [`AudioDevice`] pulls those blocks from a shared
//! player.

pub mod chunk_buffer;

#[cfg(feature = "streaming")]
pub mod audio_device;

#[cfg(feature = "streaming")]
pub use audio_device::AudioDevice;
pub use chunk_buffer::ChunkBuffer;

use serde::{Deserialize, Serialize};

/// Default output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
/// Default chunk size in frames
pub const DEFAULT_CHUNK_SIZE: usize = 2048;
/// Default queue capacity in chunks
pub const DEFAULT_BUFFER_CHUNKS: usize = 32;

/// Chunking configuration for pull-based output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Frames per delivered chunk
    /// Larger chunks = more latency but fewer lock round-trips
    pub chunk_size: usize,

    /// Queue capacity in chunks
    pub buffer_chunks: usize,
}

impl StreamConfig {
    /// Create a streaming configuration optimized for low latency
    /// Chunk = 512 frames ≈ 12ms @ 44.1kHz
    pub fn low_latency(sample_rate: u32) -> Self {
        StreamConfig {
            sample_rate,
            chunk_size: 512,
            buffer_chunks: DEFAULT_BUFFER_CHUNKS,
        }
    }

    /// Create a streaming configuration optimized for stability
    /// Chunk = 2048 frames ≈ 46ms @ 44.1kHz
    pub fn stable(sample_rate: u32) -> Self {
        StreamConfig {
            sample_rate,
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_chunks: DEFAULT_BUFFER_CHUNKS,
        }
    }

    /// Queue capacity in frames
    pub fn capacity(&self) -> usize {
        self.chunk_size * self.buffer_chunks
    }

    /// Get latency of one chunk in milliseconds
    pub fn latency_ms(&self) -> f32 {
        ((self.chunk_size as f32) / (self.sample_rate as f32)) * 1000.0
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::stable(DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_latency() {
        let config = StreamConfig::low_latency(44100);
        let latency = config.latency_ms();
        assert!(latency > 11.0 && latency < 12.0);

        let config = StreamConfig::stable(44100);
        assert!(config.latency_ms() > 46.0 && config.latency_ms() < 47.0);
    }

    #[test]
    fn test_default_capacity() {
        let config = StreamConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.capacity(), 2048 * 32);
    }
}
