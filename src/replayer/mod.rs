//! MOD Playback Engine
//!
//! Handles playback of MOD modules: row/tick sequencing, the per-channel
//! effect engine and the playback session that feeds audio sinks.

pub mod channel;
pub mod config;
pub mod effects;
mod player;
pub mod sequencer;
pub mod waveforms;

pub use channel::ChannelState;
pub use config::{AmigaClock, PlayerConfig, DEFAULT_CROSSMIX, NTSC_CLOCK, PAL_CLOCK};
pub use effects::{Effect, UnsupportedEffect, VolumeSlide};
pub use player::{ModPlayer, PlaybackSnapshot, PlayerEvent};
pub use sequencer::{RowInfo, Sequencer, TickOutcome};

use crate::module::FormatTag;
use crate::Result;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Stopped at the top of the song
    Stopped,
    /// Currently playing
    Playing,
    /// Paused mid-song
    Paused,
    /// Ran past the last song position
    Finished,
}

/// Simple playback controller trait
pub trait PlaybackController {
    /// Start or resume playback; restarts a finished song
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Stop playback and rewind
    fn stop(&mut self) -> Result<()>;

    /// Get current playback state
    fn state(&self) -> PlaybackState;
}

/// Summary information returned after loading module data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Song title
    pub title: String,
    /// Format tag
    pub format: FormatTag,
    /// Number of channels
    pub channel_count: usize,
    /// Number of played pattern table entries
    pub song_length: usize,
    /// Number of stored patterns
    pub pattern_count: usize,
    /// Output sample rate
    pub sample_rate: u32,
}

/// Parse `data` and build a stopped player plus a summary of what was loaded
pub fn load_song(data: &[u8], config: PlayerConfig) -> Result<(ModPlayer, LoadSummary)> {
    let player = ModPlayer::from_bytes(data, config)?;
    let module = player.module();
    let summary = LoadSummary {
        title: module.title.clone(),
        format: module.format,
        channel_count: module.channel_count,
        song_length: module.song_length,
        pattern_count: module.pattern_count(),
        sample_rate: config.sample_rate(),
    };
    Ok((player, summary))
}
