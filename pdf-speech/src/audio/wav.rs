//! WAV file output using hound.
//!
//! Files are mono 16-bit signed PCM.

use super::AudioSegment;
use anyhow::{Context, Result};
use std::path::Path;

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write samples to a WAV file, creating or truncating it.
pub fn write_wav(path: &Path, audio: &AudioSegment, sample_rate: u32) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, wav_spec(sample_rate))
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for &sample in &audio.samples {
        // f32 [-1, 1] → i16
        let s = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer.write_sample(s)?;
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
/// Read a WAV file back as samples, returning them with the file's sample rate.
pub fn read_wav(path: &Path) -> Result<(AudioSegment, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let sample_rate = reader.spec().sample_rate;

    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / 32767.0))
        .collect::<Result<Vec<f32>, _>>()?;

    Ok((AudioSegment::new(samples), sample_rate))
}

#[cfg(test)]
/// Number of samples in a WAV file, without decoding it.
pub fn wav_sample_count(path: &Path) -> Result<u32> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(reader.duration())
}
