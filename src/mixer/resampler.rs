//! Single-channel resampler
//!
//! Renders one tick of one channel by stepping a fractional cursor through
//! the sample at the Amiga playback rate and linearly interpolating between
//! neighbouring frames.

use crate::module::Sample;
use crate::replayer::channel::ChannelState;

/// Number of output frames in a burst of `ms` milliseconds
pub fn frame_count(ms: f64, sample_rate: u32) -> usize {
    (ms * sample_rate as f64 / 1000.0).floor() as usize
}

/// Period after applying finetune (1/8 semitones) and arpeggio (semitones)
pub fn tuned_period(period: f64, finetune: i8, arpeggio: u8) -> f64 {
    period * 2f64.powf(-(finetune as f64 + 8.0 * arpeggio as f64) / 96.0)
}

/// Fetch one source frame, folding loop overruns back into the loop body
fn source_frame(sample: &Sample, index: i64) -> f64 {
    let len = sample.audio.len() as i64;
    let index = if sample.repeats() && index >= len {
        let start = sample.repeat_start as i64;
        let length = sample.repeat_length as i64;
        (index - start) % length + start
    } else {
        index
    };

    usize::try_from(index)
        .ok()
        .and_then(|i| sample.audio.get(i))
        .map_or(0.0, |&v| v as f64)
}

/// Render one tick of `channel` into `out`.
///
/// Runs the channel's per-tick effect update first. The output is always
/// `frame_count(ms, sample_rate)` frames long; a channel without a sample or
/// with a non-positive period yields silence and keeps its cursor.
pub fn render_channel(
    channel: &mut ChannelState,
    ms: f64,
    sample_rate: u32,
    clock: f64,
    out: &mut Vec<f32>,
) -> usize {
    channel.update_effects();

    let frames = frame_count(ms, sample_rate);
    out.clear();
    out.resize(frames, 0.0);

    let sample = match channel.sample.clone() {
        Some(sample) => sample,
        None => return frames,
    };
    if channel.period <= 0.0 || frames == 0 {
        return frames;
    }

    let period = tuned_period(channel.period, channel.finetune, channel.arpeggio);
    let source_frames = (ms / 1000.0) * (clock / (period * 2.0)) - channel.vibrato;
    let volume = ((channel.volume as f64 + channel.tremolo).clamp(0.0, 64.0) / 64.0) as f32;
    let step = source_frames / frames as f64;

    for (i, dest) in out.iter_mut().enumerate() {
        let pos = i as f64 * step + channel.index;
        let base = pos.floor();
        let frac = pos - base;
        let this = source_frame(&sample, base as i64);
        let next = source_frame(&sample, base as i64 + 1);
        *dest = ((1.0 - frac) * this + frac * next) as f32 * volume;
    }

    channel.index += source_frames;
    frames
}
