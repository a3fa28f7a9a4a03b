//! WAV export using hound

use super::{apply_fade_out, normalize_samples, render_song, ExportConfig};
use crate::replayer::ModPlayer;
use crate::{ProtrackerError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

type Writer = hound::WavWriter<BufWriter<File>>;

/// Render the whole song to a 16-bit stereo WAV file
///
/// Rewinds the player first. Returns the number of stereo frames written.
pub fn export_to_wav<P: AsRef<Path>>(player: &mut ModPlayer, output_path: P) -> Result<usize> {
    export_to_wav_with_config(player, output_path, ExportConfig::default())
}

/// Render the whole song to a WAV file with custom configuration
///
/// # Examples
///
/// ```no_run
/// use protracker::export::{export_to_wav_with_config, ExportConfig};
/// use protracker::replayer::{load_song, PlayerConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("song.mod")?;
/// let (mut player, _) = load_song(&data, PlayerConfig::default())?;
///
/// let config = ExportConfig::default().normalize(true).fade_out(2.0);
/// export_to_wav_with_config(&mut player, "output.wav", config)?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav_with_config<P: AsRef<Path>>(
    player: &mut ModPlayer,
    output_path: P,
    config: ExportConfig,
) -> Result<usize> {
    let path = output_path.as_ref();
    let sample_rate = player.config().sample_rate();
    let max_frames = (config.max_duration_secs.max(0.0) as f64 * sample_rate as f64) as usize;

    tracing::info!(path = %path.display(), sample_rate, "rendering to WAV");

    let mut writer = create_writer(path, sample_rate)?;

    let frames = if config.needs_post_processing() {
        let mut samples = Vec::new();
        let frames = render_song(player, max_frames, |left, right| {
            samples.extend(left.iter().zip(right.iter()).flat_map(|(&l, &r)| [l, r]));
            Ok(())
        })?;
        if config.normalize {
            normalize_samples(&mut samples);
        }
        apply_fade_out(&mut samples, config.fade_out_duration, sample_rate);
        for &sample in &samples {
            write_sample(&mut writer, sample)?;
        }
        frames
    } else {
        render_song(player, max_frames, |left, right| {
            for (&l, &r) in left.iter().zip(right.iter()) {
                write_sample(&mut writer, l)?;
                write_sample(&mut writer, r)?;
            }
            Ok(())
        })?
    };

    writer
        .finalize()
        .map_err(|e| ProtrackerError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;

    tracing::info!(frames, "WAV export complete");
    Ok(frames)
}

fn create_writer(path: &Path, sample_rate: u32) -> Result<Writer> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    hound::WavWriter::create(path, spec)
        .map_err(|e| ProtrackerError::AudioFileError(format!("Failed to create WAV file: {}", e)))
}

fn write_sample(writer: &mut Writer, sample: f32) -> Result<()> {
    let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
    writer
        .write_sample(sample_i16)
        .map_err(|e| ProtrackerError::AudioFileError(format!("Failed to write sample: {}", e)))
}
