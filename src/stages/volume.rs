//! Volume-change slicing
//!
//! The decibel envelope is cut into fixed chunks and each chunk gets a bounded-drift peak. Runs
//! of chunks whose peak rises above the low threshold become candidates.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{ClipLimits, StageContext, StageError};
use crate::arguments::{duration_argument, parse_common_arguments, to_decibels};
use crate::config::{ms_to_samples, SlicerConfig};
use crate::diagnostics::Diagnostics;
use crate::types::{NormalizedArguments, Recording, SampleClippingInterval};

/// Envelope tracking parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSettings {
    pub chunk_samples: usize,
    pub low_threshold_db: f64,
    pub drift_db: f64,
}

impl VolumeSettings {
    pub fn from_arguments(
        arguments: &Map<String, Value>,
        recording: &Recording,
        config: &SlicerConfig,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let detection_window_ms = duration_argument(
            arguments,
            "detection_window",
            recording.length_ms(),
            config.detection_window_ms,
            diagnostics,
        );
        let mut chunk_samples = ms_to_samples(detection_window_ms, recording.frame_rate);
        if chunk_samples == 0 {
            diagnostics.warn(format!(
                "argument 'detection_window' {} ms is shorter than one frame [fixup: using 1 frame]",
                detection_window_ms
            ));
            chunk_samples = 1;
        }

        let low_threshold_db = arguments
            .get("low_threshold")
            .map_or(config.low_threshold_db, |value| to_decibels(value, diagnostics));
        let mut drift_db = arguments
            .get("drift")
            .map_or(config.drift_db, |value| to_decibels(value, diagnostics));
        if drift_db < 0.0 {
            diagnostics.warn(format!(
                "argument 'drift' {} dB is negative [fixup: using {} dB]",
                drift_db, -drift_db
            ));
            drift_db = -drift_db;
        }

        Self {
            chunk_samples,
            low_threshold_db,
            drift_db,
        }
    }
}

pub fn run(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);
    let settings = VolumeSettings::from_arguments(arguments, recording, context.config, diagnostics);
    let envelope = context
        .analyzers
        .envelope
        .amplitude_envelope(&args.segment.to_recording())?;
    let limits = ClipLimits::new(context.config, recording.frame_rate);
    let intervals = slice_on_volume(&envelope, &settings, &args, &limits);
    info!(stage, intervals = intervals.len(), "volume slicer");
    Ok(intervals)
}

/// Bounded-drift peak of each chunk of `envelope`. The last chunk may be short.
pub fn chunk_peaks(envelope: &[f32], settings: &VolumeSettings) -> Vec<f64> {
    envelope
        .chunks(settings.chunk_samples.max(1))
        .map(|chunk| {
            let mut peak = settings.low_threshold_db;
            for &sample in chunk {
                let sample = sample as f64;
                if sample > peak {
                    if sample - peak > settings.drift_db {
                        peak += settings.drift_db;
                    } else {
                        peak = sample;
                    }
                }
            }
            peak
        })
        .collect()
}

/// Candidates from runs of loud chunks. `envelope` is segment-relative.
pub fn slice_on_volume(
    envelope: &[f32],
    settings: &VolumeSettings,
    args: &NormalizedArguments<'_>,
    limits: &ClipLimits,
) -> Vec<SampleClippingInterval> {
    let total_samples = envelope.len();
    let peaks = chunk_peaks(envelope, settings);
    let window = args.clip_size_samples.max(limits.minimum_clip_samples).max(1);

    let mut runs = Vec::new();
    let mut run_start = None;
    for (index, &peak) in peaks.iter().enumerate() {
        let loud = peak > settings.low_threshold_db;
        match (loud, run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(start)) => {
                runs.push((start, index));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        runs.push((start, peaks.len()));
    }
    debug!(chunks = peaks.len(), runs = runs.len(), "volume runs");

    let mut intervals = Vec::new();
    let mut rejected = 0usize;
    'runs: for (first_chunk, last_chunk) in runs {
        let begin = first_chunk * settings.chunk_samples;
        let end = (last_chunk * settings.chunk_samples).min(total_samples);
        if end - begin < limits.minimum_clip_samples {
            rejected += 1;
            debug!(begin, end, "loud run shorter than minimum clip size");
            continue;
        }

        let mut position = begin;
        while position < end {
            if intervals.len() >= args.clip_count {
                break 'runs;
            }
            let piece_end = if end - begin <= limits.maximum_clip_samples {
                end
            } else {
                (position + window).min(end)
            };
            if piece_end - position < limits.minimum_clip_samples {
                rejected += 1;
                debug!(begin = position, end = piece_end, "loud run tail too short");
                break;
            }
            intervals.push(limits.interval(
                args.segment_offset + position,
                args.segment_offset + piece_end,
            ));
            position = piece_end;
        }
    }
    debug!(accepted = intervals.len(), rejected, "volume candidates");
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzers;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn settings(chunk_samples: usize) -> VolumeSettings {
        VolumeSettings {
            chunk_samples,
            low_threshold_db: -20.0,
            drift_db: 0.1,
        }
    }

    fn parsed<'a>(recording: &'a Recording, arguments: Value) -> NormalizedArguments<'a> {
        let arguments = arguments.as_object().cloned().unwrap_or_default();
        let mut diagnostics = Diagnostics::new();
        parse_common_arguments(&arguments, recording, &SlicerConfig::default(), &mut diagnostics)
    }

    fn envelope(length: usize, loud: &[(usize, usize)]) -> Vec<f32> {
        let mut envelope = vec![-60.0; length];
        for &(begin, end) in loud {
            envelope[begin..end].iter_mut().for_each(|value| *value = -6.0);
        }
        envelope
    }

    #[test]
    fn peak_rises_by_drift_then_snaps() {
        let settings = VolumeSettings {
            chunk_samples: 3,
            low_threshold_db: -20.0,
            drift_db: 1.0,
        };
        let peaks = chunk_peaks(&[-10.0, -19.5, -30.0, -19.5, -19.0, -30.0], &settings);
        assert_eq!(peaks, vec![-19.0, -19.0]);
    }

    #[test]
    fn quiet_envelope_yields_nothing() {
        let recording = Recording::silence(5_000, 1_000);
        let args = parsed(&recording, json!({}));
        let limits = ClipLimits::new(&SlicerConfig::default(), 1_000);
        let intervals = slice_on_volume(&envelope(5_000, &[]), &settings(10), &args, &limits);
        assert!(intervals.is_empty());
    }

    #[test]
    fn loud_runs_become_candidates() {
        let recording = Recording::silence(10_000, 1_000);
        let args = parsed(&recording, json!({}));
        let limits = ClipLimits::new(&SlicerConfig::default(), 1_000);
        // the middle run is shorter than the 250 frame minimum
        let envelope = envelope(10_000, &[(1_000, 3_000), (4_000, 4_100), (6_000, 9_000)]);
        let intervals = slice_on_volume(&envelope, &settings(10), &args, &limits);

        let bounds: Vec<_> = intervals.iter().map(|i| (i.begin(), i.end())).collect();
        assert_eq!(bounds, vec![(1_000, 3_000), (6_000, 9_000)]);
    }

    #[test]
    fn long_runs_are_cut_into_clip_sized_pieces() {
        let recording = Recording::silence(60_000, 1_000);
        let args = parsed(&recording, json!({"clip_size": "10s"}));
        let limits = ClipLimits::new(&SlicerConfig::default(), 1_000);
        let envelope = envelope(60_000, &[(0, 30_100)]);
        let intervals = slice_on_volume(&envelope, &settings(10), &args, &limits);

        let bounds: Vec<_> = intervals.iter().map(|i| (i.begin(), i.end())).collect();
        assert_eq!(bounds, vec![(0, 10_000), (10_000, 20_000), (20_000, 30_000)]);
    }

    #[test]
    fn stage_reads_decibel_arguments() {
        let mut samples = vec![0.001_f32; 4_000];
        samples[1_000..2_000].iter_mut().for_each(|s| *s = 0.5);
        let recording = Recording::new(samples, 1_000, 1);
        let config = SlicerConfig::default();
        let analyzers = Analyzers::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut context = StageContext {
            config: &config,
            analyzers: &analyzers,
            rng: &mut rng,
        };
        let mut diagnostics = Diagnostics::new();
        let arguments = json!({"low_threshold": "-30db", "drift": "-2 dB", "detection_window": "20ms"});
        let arguments = arguments.as_object().cloned().unwrap_or_default();
        let intervals = run(0, &arguments, &recording, &mut context, &mut diagnostics).unwrap();

        assert_eq!(diagnostics.len(), 1);
        let bounds: Vec<_> = intervals.iter().map(|i| (i.begin(), i.end())).collect();
        assert_eq!(bounds, vec![(1_000, 2_000)]);
    }
}
