//! Audio device integration using rodio
//!
//! Plays a shared [`ModPlayer`] on the system audio device. The rodio mixer
//! thread pulls one chunk at a time, so the player lock is only held while a
//! chunk is rendered.

use crate::replayer::{ModPlayer, PlaybackController, PlaybackState};
use crate::Result;
use parking_lot::Mutex;
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Interleaved stereo source that renders from the player on demand
struct PlayerSource {
    player: Arc<Mutex<ModPlayer>>,
    sample_rate: u32,
    finished: Arc<AtomicBool>,
    left: Vec<f32>,
    right: Vec<f32>,
    /// Interleaved L/R frames of the current chunk
    buffer: Vec<f32>,
    buffer_pos: usize,
}

impl PlayerSource {
    fn new(player: Arc<Mutex<ModPlayer>>, finished: Arc<AtomicBool>) -> Self {
        let (sample_rate, chunk_size) = {
            let guard = player.lock();
            (guard.config().stream.sample_rate, guard.config().stream.chunk_size)
        };
        PlayerSource {
            player,
            sample_rate,
            finished,
            left: vec![0.0; chunk_size],
            right: vec![0.0; chunk_size],
            buffer: vec![0.0; chunk_size * 2],
            buffer_pos: chunk_size * 2, // Start by rendering a new chunk
        }
    }

    /// Render the next chunk and note whether the song has ended
    fn refill(&mut self) {
        let state = {
            let mut player = self.player.lock();
            player.pull(&mut self.left, &mut self.right);
            player.state()
        };

        for (frame, (&l, &r)) in self
            .buffer
            .chunks_exact_mut(2)
            .zip(self.left.iter().zip(self.right.iter()))
        {
            frame[0] = l;
            frame[1] = r;
        }
        self.buffer_pos = 0;

        if state == PlaybackState::Finished {
            self.finished.store(true, Ordering::Relaxed);
        }
    }
}

impl Source for PlayerSource {
    fn current_frame_len(&self) -> Option<usize> {
        let remaining = self.buffer.len().saturating_sub(self.buffer_pos);
        Some(if remaining > 0 {
            remaining
        } else {
            self.buffer.len()
        })
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for PlayerSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.buffer_pos >= self.buffer.len() {
            if self.finished.load(Ordering::Relaxed) {
                return None;
            }
            self.refill();
        }

        let sample = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        Some(sample)
    }
}

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start pulling from `player`.
    ///
    /// The player's own [`PlaybackState`] still decides whether audio or
    /// silence is produced.
    pub fn new(player: Arc<Mutex<ModPlayer>>) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            crate::ProtrackerError::AudioDeviceError(format!("Failed to create audio stream: {}", e))
        })?;

        let sink = Sink::try_new(&stream_handle).map_err(|e| {
            crate::ProtrackerError::AudioDeviceError(format!("Failed to create audio sink: {}", e))
        })?;

        let finished = Arc::new(AtomicBool::new(false));
        sink.append(PlayerSource::new(player, Arc::clone(&finished)));

        tracing::debug!("audio device opened");

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause the output stream
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume the output stream
    pub fn play(&self) {
        self.sink.play();
    }

    /// True once the song has ended and its tail was handed to the device
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Block until the sink has played everything
    pub fn wait_for_finish(&self) {
        self.sink.sleep_until_end();
    }

    /// Stop pulling from the player after the current chunk
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.sink.pause();
    }
}
