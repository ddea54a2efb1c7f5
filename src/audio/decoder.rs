use crate::types::Recording;
use anyhow::{bail, Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Decode an audio file to interleaved f32 frames, keeping every channel
pub fn decode_recording<P: AsRef<Path>>(path: P) -> Result<Recording> {
    let path = path.as_ref();

    // Open the file
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint the probe with the file extension
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    // Probe the media source
    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;
    let mut format = probe_result.format;

    // First track with a real codec
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;
    let track_id = track.id;
    let frame_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate not specified in audio file")?;
    let mut channel_count = track
        .codec_params
        .channels
        .map(|channels| channels.count() as u16);

    // Create a decoder for the track
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();
    let mut sample_buffer: Option<SampleBuffer<f32>> = None;

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                // End of stream
                break;
            }
            Err(err) => return Err(err).context("Failed to read packet"),
        };
        // Skip packets from other tracks
        if packet.track_id() != track_id {
            continue;
        }

        // Decode the packet
        let decoded = decoder
            .decode(&packet)
            .context("Failed to decode audio packet")?;
        let spec = *decoded.spec();
        channel_count.get_or_insert(spec.channels.count() as u16);

        // Copy out interleaved, channels intact
        let buffer = sample_buffer
            .get_or_insert_with(|| SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    let channel_count = channel_count.unwrap_or(1);
    if channel_count == 0 {
        bail!("Audio file {} reports zero channels", path.display());
    }
    debug!(
        path = %path.display(),
        frame_rate,
        channel_count,
        frames = samples.len() / channel_count as usize,
        "decoded recording"
    );

    Ok(Recording::new(samples, frame_rate, channel_count))
}
