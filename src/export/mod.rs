//! Offline rendering of MOD playback
//!
//! Plays a session from the top of the song until it finishes and writes
//! the result as 16-bit stereo PCM.
//!
//! # Examples
//!
//! ```no_run
//! use protracker::export::export_to_wav;
//! use protracker::replayer::{load_song, PlayerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("song.mod")?;
//! let (mut player, _) = load_song(&data, PlayerConfig::default())?;
//!
//! let frames = export_to_wav(&mut player, "output.wav")?;
//! println!("wrote {} frames", frames);
//! # Ok(())
//! # }
//! ```

mod wav;
pub use wav::*;

use crate::replayer::{ModPlayer, PlaybackController, PlaybackState};
use crate::Result;

/// Export configuration options
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Stop rendering after this many seconds; songs that jump backwards never end on their own
    pub max_duration_secs: f32,
    /// Whether to normalize audio to prevent clipping
    pub normalize: bool,
    /// Fade out duration in seconds (0 = no fade)
    pub fade_out_duration: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 20.0 * 60.0,
            normalize: false,
            fade_out_duration: 0.0,
        }
    }
}

impl ExportConfig {
    /// Limit the rendered length
    pub fn max_duration(mut self, seconds: f32) -> Self {
        self.max_duration_secs = seconds;
        self
    }

    /// Enable normalization to prevent clipping
    pub fn normalize(mut self, enable: bool) -> Self {
        self.normalize = enable;
        self
    }

    /// Add fade out at the end
    pub fn fade_out(mut self, duration_seconds: f32) -> Self {
        self.fade_out_duration = duration_seconds;
        self
    }

    fn needs_post_processing(&self) -> bool {
        self.normalize || self.fade_out_duration > 0.0
    }
}

/// Rewind and play `player` to the end (or `max_frames`), handing each
/// block of rendered frames to `sink`. Returns the number of frames rendered.
pub(crate) fn render_song<F>(player: &mut ModPlayer, max_frames: usize, mut sink: F) -> Result<usize>
where
    F: FnMut(&[f32], &[f32]) -> Result<()>,
{
    player.rewind();
    player.play()?;

    let block = player.config().stream.chunk_size;
    let mut left = vec![0.0f32; block];
    let mut right = vec![0.0f32; block];
    let mut total = 0;

    while player.state() == PlaybackState::Playing && total < max_frames {
        let want = block.min(max_frames - total);
        let n = player.pull(&mut left[..want], &mut right[..want]);
        sink(&left[..n], &right[..n])?;
        total += n;
    }

    if player.state() == PlaybackState::Playing {
        tracing::warn!(frames = total, "export stopped at the duration limit");
        player.pause()?;
    }
    Ok(total)
}

/// Apply normalization to audio samples
fn normalize_samples(samples: &mut [f32]) {
    if samples.is_empty() {
        return;
    }

    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

    // Normalize if peak > 0.95 (leave some headroom)
    if peak > 0.95 {
        let scale = 0.95 / peak;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Fade the last `fade_duration` seconds of interleaved stereo to silence
fn apply_fade_out(samples: &mut [f32], fade_duration: f32, sample_rate: u32) {
    if fade_duration <= 0.0 || samples.is_empty() {
        return;
    }

    let frames = samples.len() / 2;
    let fade_frames = ((fade_duration * sample_rate as f32) as usize).min(frames);
    if fade_frames == 0 {
        return;
    }
    let start_fade = frames - fade_frames;

    for (i, frame) in samples.chunks_exact_mut(2).enumerate().skip(start_fade) {
        let progress = (i - start_fade) as f32 / fade_frames as f32;
        let fade_factor = 1.0 - progress;
        frame[0] *= fade_factor;
        frame[1] *= fade_factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_samples() {
        let mut samples = vec![0.5, 1.5, -1.2, 0.8];
        normalize_samples(&mut samples);

        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(peak <= 0.96);
    }

    #[test]
    fn test_fade_out_keeps_channels_paired() {
        let mut samples = vec![1.0; 2000];
        apply_fade_out(&mut samples, 0.01, 44100);

        assert_eq!(samples[0], 1.0);
        assert_eq!(samples[1998], samples[1999]);
        assert!(samples[1999].abs() < 0.01);
    }

    #[test]
    fn test_export_config_builder() {
        let config = ExportConfig::default()
            .max_duration(30.0)
            .normalize(true)
            .fade_out(2.0);

        assert_eq!(config.max_duration_secs, 30.0);
        assert!(config.normalize);
        assert_eq!(config.fade_out_duration, 2.0);
        assert!(config.needs_post_processing());
        assert!(!ExportConfig::default().needs_post_processing());
    }
}
