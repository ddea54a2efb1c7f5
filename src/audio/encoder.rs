use crate::types::Recording;
use anyhow::{ensure, Context, Result};
use std::path::Path;

/// Write a recording as a 16-bit PCM WAV file, keeping its channel layout
pub fn encode_recording<P: AsRef<Path>>(recording: &Recording, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure!(
        recording.channel_count > 0 && recording.frame_rate > 0,
        "Cannot encode a recording without channels or frame rate"
    );

    // 16-bit PCM, same layout as the recording
    let spec = hound::WavSpec {
        channels: recording.channel_count,
        sample_rate: recording.frame_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    // Create the WAV writer
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    // Write samples as i16
    for &sample in &recording.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * 32767.0) as i16)
            .context("Failed to write audio sample")?;
    }

    // Finalize the WAV file
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
