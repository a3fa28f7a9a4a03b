//! Playback session
//!
//! [`ModPlayer`] ties a parsed module to a sequencer, a mixer and a pair of
//! chunk buffers, and exposes the pull contract used by audio sinks: every
//! call fills the caller's left/right slices completely, with silence when
//! nothing is playing.

use super::sequencer::{RowInfo, Sequencer, TickOutcome};
use super::{PlaybackController, PlaybackState, PlayerConfig};
use crate::mixer::Mixer;
use crate::module::Module;
use crate::mod_parser::parse_module;
use crate::streaming::ChunkBuffer;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Notification sent to the session observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The sequencer started a new row
    RowChanged {
        /// Pattern table position
        position: usize,
        /// Pattern index
        pattern: usize,
        /// Row within the pattern
        row: usize,
    },
    /// The song ran past its last position and the queued tail was delivered
    SongFinished,
}

impl From<RowInfo> for PlayerEvent {
    fn from(info: RowInfo) -> Self {
        PlayerEvent::RowChanged {
            position: info.position,
            pattern: info.pattern,
            row: info.row,
        }
    }
}

/// Point-in-time view of the session for UIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    /// Playback state
    pub state: PlaybackState,
    /// Pattern table position of the last row processed
    pub position: usize,
    /// Pattern index of the last row processed
    pub pattern: usize,
    /// Last row processed
    pub row: usize,
    /// Ticks per row
    pub speed: u32,
    /// Tempo
    pub bpm: u32,
    /// Number of played pattern table entries
    pub song_length: usize,
}

type Observer = Box<dyn FnMut(&PlayerEvent) + Send>;

/// A module loaded for playback
pub struct ModPlayer {
    module: Arc<Module>,
    config: PlayerConfig,
    sequencer: Sequencer,
    mixer: Mixer,
    left: ChunkBuffer,
    right: ChunkBuffer,
    /// Frames of the current output chunk already handed out
    chunk_pos: usize,
    state: PlaybackState,
    observer: Option<Observer>,
}

impl fmt::Debug for ModPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModPlayer")
            .field("title", &self.module.title)
            .field("state", &self.state)
            .field("sequencer", &self.sequencer)
            .finish_non_exhaustive()
    }
}

impl ModPlayer {
    /// Create a stopped session for `module`
    pub fn new(module: Arc<Module>, config: PlayerConfig) -> Result<Self> {
        config.validate()?;
        let stream = config.stream;
        let chunk_size = stream.chunk_size;
        Ok(ModPlayer {
            sequencer: Sequencer::new(stream.sample_rate, config.crossmix),
            mixer: Mixer::new(module.channel_count, config.clock.hz()),
            left: ChunkBuffer::new(chunk_size, stream.buffer_chunks),
            right: ChunkBuffer::new(chunk_size, stream.buffer_chunks),
            chunk_pos: chunk_size,
            state: PlaybackState::Stopped,
            observer: None,
            module,
            config,
        })
    }

    /// Parse `data` and create a stopped session
    pub fn from_bytes(data: &[u8], config: PlayerConfig) -> Result<Self> {
        let module = parse_module(data)?;
        Self::new(Arc::new(module), config)
    }

    /// Replace the module with one parsed from `data`.
    ///
    /// On a parse error the current module stays loaded and untouched.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let module = parse_module(data)?;
        self.replace_module(Arc::new(module));
        Ok(())
    }

    /// Replace the module and return to the stopped initial state
    pub fn replace_module(&mut self, module: Arc<Module>) {
        let mutes: Vec<bool> = (0..self.mixer.channel_count())
            .map(|i| self.mixer.is_channel_muted(i))
            .collect();
        self.mixer = Mixer::new(module.channel_count, self.config.clock.hz());
        for (index, mute) in mutes.into_iter().enumerate() {
            self.mixer.set_channel_mute(index, mute);
        }
        self.module = module;
        self.rewind();
        tracing::info!(title = %self.module.title, channels = self.module.channel_count, "module loaded");
    }

    /// Loaded module
    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    /// Active configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Sequencer state
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Mixer and channel states
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Register a callback for row changes and song end, replacing any
    /// previous one. Called from whichever thread drives [`ModPlayer::pull`].
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the observer
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Return to the top of the song with fresh channel state.
    ///
    /// Leaves the session stopped; call [`PlaybackController::play`] to start.
    pub fn rewind(&mut self) {
        self.sequencer.reset();
        self.mixer.reset();
        self.left.reset();
        self.right.reset();
        self.chunk_pos = self.left.chunk_size();
        self.state = PlaybackState::Stopped;
    }

    /// Mute or unmute a channel; muted channels keep running silently
    pub fn set_channel_mute(&mut self, channel: usize, mute: bool) {
        self.mixer.set_channel_mute(channel, mute);
    }

    /// Check whether a channel is muted
    pub fn is_channel_muted(&self, channel: usize) -> bool {
        self.mixer.is_channel_muted(channel)
    }

    /// Current position and timing
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let row = self.sequencer.current_row();
        PlaybackSnapshot {
            state: self.state,
            position: row.map_or(0, |r| r.position),
            pattern: row.map_or(0, |r| r.pattern),
            row: row.map_or(0, |r| r.row),
            speed: self.sequencer.speed(),
            bpm: self.sequencer.bpm(),
            song_length: self.module.song_length,
        }
    }

    /// Fill `left` and `right` with the next frames.
    ///
    /// Both slices are always filled up to the shorter length; frames past
    /// the end of the song, or requested while not playing, are silent.
    /// Returns the number of frames that carry song audio.
    pub fn pull(&mut self, left: &mut [f32], right: &mut [f32]) -> usize {
        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);

        if self.state != PlaybackState::Playing {
            left.fill(0.0);
            right.fill(0.0);
            return 0;
        }

        let chunk_size = self.left.chunk_size();
        let mut written = 0;
        while written < frames {
            if self.chunk_pos >= chunk_size && !self.next_chunk() {
                let tail = self.left.drain_into(&mut left[written..]);
                self.right.drain_into(&mut right[written..written + tail]);
                written += tail;
                if self.left.queued() > 0 {
                    // tail longer than the request; the rest goes out next call
                    return written;
                }
                left[written..].fill(0.0);
                right[written..].fill(0.0);
                self.finish();
                return written;
            }

            let n = (frames - written).min(chunk_size - self.chunk_pos);
            let range = self.chunk_pos..self.chunk_pos + n;
            left[written..written + n].copy_from_slice(&self.left.chunk()[range.clone()]);
            right[written..written + n].copy_from_slice(&self.right.chunk()[range]);
            self.chunk_pos += n;
            written += n;
        }
        written
    }

    /// Render `frames` frames as interleaved L/R samples
    pub fn generate_interleaved(&mut self, frames: usize) -> Vec<f32> {
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        self.pull(&mut left, &mut right);
        left.iter()
            .zip(right.iter())
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }

    /// Sequence ticks until a full chunk is queued, then make it current.
    /// Returns false once the song has ended.
    fn next_chunk(&mut self) -> bool {
        while !self.left.has_full_chunk() {
            match self.sequencer.advance(&self.module, &mut self.mixer) {
                TickOutcome::Finished => return false,
                TickOutcome::Rendered { frames, row } => {
                    self.left.push(&self.mixer.left()[..frames]);
                    self.right.push(&self.mixer.right()[..frames]);
                    if let Some(info) = row {
                        self.notify(PlayerEvent::from(info));
                    }
                }
            }
        }

        let chunk_size = self.left.chunk_size();
        self.left.take_chunk(chunk_size);
        self.right.take_chunk(chunk_size);
        self.chunk_pos = 0;
        true
    }

    fn finish(&mut self) {
        self.state = PlaybackState::Finished;
        tracing::info!(title = %self.module.title, "playback finished");
        self.notify(PlayerEvent::SongFinished);
    }

    fn notify(&mut self, event: PlayerEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }
}

impl PlaybackController for ModPlayer {
    fn play(&mut self) -> Result<()> {
        if self.state == PlaybackState::Finished {
            self.rewind();
        }
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.rewind();
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Cell, FormatTag, Pattern, Sample, PATTERN_TABLE_LEN};
    use crate::streaming::StreamConfig;
    use parking_lot::Mutex;

    fn test_module(song_length: usize) -> Module {
        let mut pattern = Pattern::empty(4);
        if let Some(cell) = pattern.cell_mut(0, 0) {
            *cell = Cell {
                sample: 1,
                period: 428,
                effect: 0,
            };
        }
        let mut samples: Vec<Arc<Sample>> = (0..32u8).map(|n| Arc::new(Sample::empty(n))).collect();
        let mut lead = Sample::empty(1);
        lead.volume = 64;
        lead.length = 32;
        lead.repeat_start = 0;
        lead.repeat_length = 32;
        lead.audio = (0..32).map(|i| if i < 16 { 0.5 } else { -0.5 }).collect();
        samples[1] = Arc::new(lead);

        Module {
            title: "player".to_string(),
            song_length,
            pattern_table: [0u8; PATTERN_TABLE_LEN],
            format: FormatTag(*b"M.K."),
            channel_count: 4,
            patterns: vec![pattern],
            samples,
        }
    }

    fn small_config() -> PlayerConfig {
        PlayerConfig::new(44100).with_stream(StreamConfig {
            sample_rate: 44100,
            chunk_size: 512,
            buffer_chunks: 16,
        })
    }

    fn player() -> ModPlayer {
        ModPlayer::new(Arc::new(test_module(1)), small_config()).unwrap()
    }

    #[test]
    fn test_new_player_is_stopped() {
        let p = player();
        assert_eq!(p.state(), PlaybackState::Stopped);
        assert_eq!(p.snapshot().speed, 6);
        assert_eq!(p.snapshot().bpm, 125);
    }

    #[test]
    fn test_pull_while_stopped_is_silent() {
        let mut p = player();
        let mut l = vec![1.0; 300];
        let mut r = vec![1.0; 300];
        assert_eq!(p.pull(&mut l, &mut r), 0);
        assert!(l.iter().chain(r.iter()).all(|&s| s == 0.0));
    }

    #[test]
    fn test_pull_fills_request_exactly() {
        let mut p = player();
        p.play().unwrap();
        for len in [1usize, 100, 511, 512, 513, 2000] {
            let mut l = vec![0.0; len];
            let mut r = vec![0.0; len];
            assert_eq!(p.pull(&mut l, &mut r), len);
        }
        assert!(p.generate_interleaved(64).len() == 128);
    }

    #[test]
    fn test_song_plays_to_the_last_frame() {
        let mut p = player();
        p.play().unwrap();
        let mut total = 0;
        let mut l = vec![0.0; 1000];
        let mut r = vec![0.0; 1000];
        while p.state() == PlaybackState::Playing {
            total += p.pull(&mut l, &mut r);
        }
        assert_eq!(total, 64 * 6 * 882);
        assert_eq!(p.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_play_after_finish_restarts() {
        let mut p = player();
        p.play().unwrap();
        let mut l = vec![0.0; 4096];
        let mut r = vec![0.0; 4096];
        while p.state() == PlaybackState::Playing {
            p.pull(&mut l, &mut r);
        }
        p.play().unwrap();
        assert_eq!(p.state(), PlaybackState::Playing);
        assert_eq!(p.pull(&mut l, &mut r), 4096);
        assert_eq!(p.snapshot().position, 0);
    }

    #[test]
    fn test_pause_holds_position() {
        let mut p = player();
        p.play().unwrap();
        let mut l = vec![0.0; 5000];
        let mut r = vec![0.0; 5000];
        p.pull(&mut l, &mut r);
        let before = p.snapshot();
        p.pause().unwrap();
        assert_eq!(p.pull(&mut l, &mut r), 0);
        let after = p.snapshot();
        assert_eq!(after.row, before.row);
        assert_eq!(after.state, PlaybackState::Paused);
    }

    #[test]
    fn test_observer_sees_rows_and_end() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut p = player();
        p.set_observer(move |e| sink.lock().push(*e));
        p.play().unwrap();
        let mut l = vec![0.0; 4096];
        let mut r = vec![0.0; 4096];
        while p.state() == PlaybackState::Playing {
            p.pull(&mut l, &mut r);
        }
        let events = events.lock();
        let rows = events
            .iter()
            .filter(|e| matches!(e, PlayerEvent::RowChanged { .. }))
            .count();
        assert_eq!(rows, 64);
        assert_eq!(
            events.first(),
            Some(&PlayerEvent::RowChanged {
                position: 0,
                pattern: 0,
                row: 0
            })
        );
        assert_eq!(events.last(), Some(&PlayerEvent::SongFinished));
    }

    #[test]
    fn test_stop_rewinds() {
        let mut p = player();
        p.play().unwrap();
        p.generate_interleaved(10_000);
        p.stop().unwrap();
        assert_eq!(p.state(), PlaybackState::Stopped);
        assert_eq!(p.sequencer(), &Sequencer::new(44100, 0.35));
    }

    #[test]
    fn test_rewind_twice_matches_fresh_state() {
        let fresh = player();
        let mut p = player();
        p.play().unwrap();
        p.generate_interleaved(20_000);
        p.rewind();
        p.rewind();
        assert_eq!(p.sequencer(), fresh.sequencer());
        assert_eq!(p.mixer().channels(), fresh.mixer().channels());
    }

    #[test]
    fn test_load_failure_keeps_module() {
        let mut p = player();
        assert!(p.load(&[0u8; 10]).is_err());
        assert_eq!(p.module().title, "player");
    }

    #[test]
    fn test_mute_is_silent_but_keeps_time() {
        let mut p = player();
        p.set_channel_mute(0, true);
        assert!(p.is_channel_muted(0));
        p.play().unwrap();
        let out = p.generate_interleaved(3000);
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(p.mixer().channel(0).map_or(0.0, |c| c.position()) > 0.0);
    }

    #[test]
    fn test_audio_is_produced() {
        let mut p = player();
        p.play().unwrap();
        let out = p.generate_interleaved(3000);
        assert!(out.iter().any(|&s| s != 0.0));
        assert!(out.iter().all(|&s| s.abs() <= 1.0));
    }
}
