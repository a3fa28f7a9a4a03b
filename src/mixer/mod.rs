//! Resampling Mixer
//!
//! Owns the channel states and turns one tick of all channels into a stereo
//! burst.
//!
//! Features:
//! - Amiga LRRL panning: channels with `i % 4` in {0, 3} go left, the rest right
//! - Each side is the average of its channels, so the mix never clips
//! - Symmetric cross-mix to soften the hard Amiga stereo split
//! - Per-channel mute that still advances the muted channel

pub mod resampler;

pub use resampler::{frame_count, render_channel, tuned_period};

use crate::replayer::channel::ChannelState;

/// True when channel `index` is panned to the left output
pub fn is_left_channel(index: usize) -> bool {
    matches!(index % 4, 0 | 3)
}

/// Stereo mixer for a fixed number of channels
#[derive(Debug, Clone)]
pub struct Mixer {
    channels: Vec<ChannelState>,
    muted: Vec<bool>,
    left_group: Vec<usize>,
    right_group: Vec<usize>,
    clock: f64,
    left: Vec<f32>,
    right: Vec<f32>,
    scratch: Vec<f32>,
    size: usize,
}

impl Mixer {
    /// Create a mixer for `channel_count` channels driven by `clock` Hz
    pub fn new(channel_count: usize, clock: f64) -> Self {
        let (left_group, right_group): (Vec<usize>, Vec<usize>) =
            (0..channel_count).partition(|&i| is_left_channel(i));
        Mixer {
            channels: vec![ChannelState::new(); channel_count],
            muted: vec![false; channel_count],
            left_group,
            right_group,
            clock,
            left: Vec::new(),
            right: Vec::new(),
            scratch: Vec::new(),
            size: 0,
        }
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channel state (read-only)
    pub fn channel(&self, index: usize) -> Option<&ChannelState> {
        self.channels.get(index)
    }

    /// Channel state for row updates
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut ChannelState> {
        self.channels.get_mut(index)
    }

    /// All channel states
    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    /// Mute or unmute a channel
    pub fn set_channel_mute(&mut self, index: usize, mute: bool) {
        if let Some(m) = self.muted.get_mut(index) {
            *m = mute;
        }
    }

    /// Check whether a channel is muted
    pub fn is_channel_muted(&self, index: usize) -> bool {
        self.muted.get(index).copied().unwrap_or(false)
    }

    /// Reset all channels to their power-on state and drop the last burst.
    /// Mute flags are host settings and survive.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.left.clear();
        self.right.clear();
        self.size = 0;
    }

    /// Left half of the last burst
    pub fn left(&self) -> &[f32] {
        &self.left[..self.size]
    }

    /// Right half of the last burst
    pub fn right(&self) -> &[f32] {
        &self.right[..self.size]
    }

    /// Render one tick of all channels.
    ///
    /// Returns the number of frames written to [`Mixer::left`] and [`Mixer::right`].
    pub fn render_stereo(&mut self, ms: f64, crossmix: f32, sample_rate: u32) -> usize {
        let frames = frame_count(ms, sample_rate);
        self.left.clear();
        self.left.resize(frames, 0.0);
        self.right.clear();
        self.right.resize(frames, 0.0);

        let clock = self.clock;
        mix_group(
            &mut self.channels,
            &self.left_group,
            &self.muted,
            &mut self.left,
            &mut self.scratch,
            ms,
            sample_rate,
            clock,
        );
        mix_group(
            &mut self.channels,
            &self.right_group,
            &self.muted,
            &mut self.right,
            &mut self.scratch,
            ms,
            sample_rate,
            clock,
        );

        let keep = 1.0 - crossmix;
        for (l, r) in self.left.iter_mut().zip(self.right.iter_mut()) {
            let (dry_l, dry_r) = (*l, *r);
            *l = dry_l * keep + dry_r * crossmix;
            *r = dry_r * keep + dry_l * crossmix;
        }

        self.size = frames;
        frames
    }
}

/// Average the channels of one side into `out`
#[allow(clippy::too_many_arguments)]
fn mix_group(
    channels: &mut [ChannelState],
    group: &[usize],
    muted: &[bool],
    out: &mut [f32],
    scratch: &mut Vec<f32>,
    ms: f64,
    sample_rate: u32,
    clock: f64,
) {
    if group.is_empty() {
        return;
    }
    let weight = 1.0 / group.len() as f32;

    for &index in group {
        render_channel(&mut channels[index], ms, sample_rate, clock, scratch);
        if muted[index] {
            continue;
        }
        for (dest, &src) in out.iter_mut().zip(scratch.iter()) {
            *dest += src * weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Sample;
    use crate::replayer::effects::Effect;
    use crate::replayer::PAL_CLOCK;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn dc_sample(level: f32) -> Arc<Sample> {
        let mut s = Sample::empty(1);
        s.volume = 64;
        s.repeat_start = 0;
        s.repeat_length = 4;
        s.audio = vec![level; 4];
        s.length = 4;
        Arc::new(s)
    }

    fn start_note(mixer: &mut Mixer, channel: usize, level: f32) {
        if let Some(ch) = mixer.channel_mut(channel) {
            ch.set_tone(428, Some(dc_sample(level)), Effect::default());
        }
    }

    #[test]
    fn test_lrrl_grouping() {
        let mixer = Mixer::new(8, PAL_CLOCK);
        assert_eq!(mixer.left_group, vec![0, 3, 4, 7]);
        assert_eq!(mixer.right_group, vec![1, 2, 5, 6]);
        assert!(is_left_channel(0));
        assert!(!is_left_channel(1));
        assert!(!is_left_channel(2));
        assert!(is_left_channel(3));
    }

    #[test]
    fn test_silent_mix_is_zero() {
        let mut mixer = Mixer::new(4, PAL_CLOCK);
        assert_eq!(mixer.render_stereo(20.0, 0.35, 44100), 882);
        assert!(mixer.left().iter().all(|&s| s == 0.0));
        assert!(mixer.right().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_group_average_without_crossmix() {
        let mut mixer = Mixer::new(4, PAL_CLOCK);
        start_note(&mut mixer, 0, 0.5);
        mixer.render_stereo(20.0, 0.0, 44100);
        // one of two left channels playing
        assert_relative_eq!(mixer.left()[10], 0.25);
        assert_eq!(mixer.right()[10], 0.0);
    }

    #[test]
    fn test_crossmix_is_symmetric() {
        let mut mixer = Mixer::new(4, PAL_CLOCK);
        start_note(&mut mixer, 0, 0.5);
        start_note(&mut mixer, 3, 0.5);
        mixer.render_stereo(20.0, 0.25, 44100);
        assert_relative_eq!(mixer.left()[10], 0.375);
        assert_relative_eq!(mixer.right()[10], 0.125);
    }

    #[test]
    fn test_single_channel_has_silent_right_group() {
        let mut mixer = Mixer::new(1, PAL_CLOCK);
        start_note(&mut mixer, 0, 0.5);
        mixer.render_stereo(20.0, 0.0, 44100);
        assert_relative_eq!(mixer.left()[10], 0.5);
        assert_eq!(mixer.right()[10], 0.0);
    }

    #[test]
    fn test_muted_channel_still_advances() {
        let mut mixer = Mixer::new(4, PAL_CLOCK);
        start_note(&mut mixer, 1, 0.5);
        mixer.set_channel_mute(1, true);
        assert!(mixer.is_channel_muted(1));
        mixer.render_stereo(20.0, 0.0, 44100);
        assert!(mixer.right().iter().all(|&s| s == 0.0));
        assert!(mixer.channel(1).map_or(0.0, |c| c.position()) > 0.0);
    }

    #[test]
    fn test_reset_keeps_mute() {
        let mut mixer = Mixer::new(4, PAL_CLOCK);
        start_note(&mut mixer, 2, 0.5);
        mixer.set_channel_mute(2, true);
        mixer.render_stereo(20.0, 0.0, 44100);
        mixer.reset();
        assert!(mixer.left().is_empty());
        assert!(mixer.is_channel_muted(2));
        assert_eq!(mixer.channel(2), Some(&ChannelState::new()));
    }
}
