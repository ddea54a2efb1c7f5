//! Argument normalization shared by every slicing stage

pub mod units;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ms_to_samples, SlicerConfig};
use crate::diagnostics::Diagnostics;
use crate::types::{NormalizedArguments, Recording};

pub use units::{to_decibels, to_hertz, to_milliseconds};

/// Argument names from older logic files that are not honoured.
const LEGACY_COUNT_ARGUMENTS: [&str; 2] = ["max_clips", "clip_count"];

/// Extract `begin`, `end`, `clip_size` and `clips` and resolve the segment they select.
///
/// `weight` is resolved once per stage by the pipeline, see [`weight_argument`].
///
/// `begin`/`end` are clamped into the recording and swapped when reversed; each correction is a
/// warning, never an error.
pub fn parse_common_arguments<'a>(
    arguments: &Map<String, Value>,
    recording: &'a Recording,
    config: &SlicerConfig,
    diagnostics: &mut Diagnostics,
) -> NormalizedArguments<'a> {
    let recording_ms = recording.length_ms();

    let mut begin = arguments
        .get("begin")
        .map_or(0, |value| to_milliseconds(value, recording_ms, diagnostics));
    let mut end = arguments
        .get("end")
        .map_or(recording_ms, |value| to_milliseconds(value, recording_ms, diagnostics));

    if begin < 0 {
        diagnostics.warn(format!(
            "argument 'begin' {} must be between 0 and {} ms [fixup: using 0 ms]",
            begin, recording_ms
        ));
        begin = 0;
    }
    if begin > recording_ms {
        diagnostics.warn(format!(
            "argument 'begin' {} must be between 0 and {} ms [fixup: using {} ms]",
            begin, recording_ms, recording_ms
        ));
        begin = recording_ms;
    }
    if end < 0 {
        diagnostics.warn(format!(
            "argument 'end' {} must be between 0 and {} ms [fixup: using 0 ms]",
            end, recording_ms
        ));
        end = 0;
    }
    if end > recording_ms {
        diagnostics.warn(format!(
            "argument 'end' {} must be between 0 and {} ms [fixup: using {} ms]",
            end, recording_ms, recording_ms
        ));
        end = recording_ms;
    }
    if begin > end {
        diagnostics.warn(format!(
            "arguments 'begin' {} and 'end' {} were reversed [fixup: using {}, {}]",
            begin, end, end, begin
        ));
        std::mem::swap(&mut begin, &mut end);
    }

    let clip_size_ms = arguments.get("clip_size").map_or(config.clip_size_ms, |value| {
        to_milliseconds(value, recording_ms, diagnostics)
    });
    let clip_size_samples = ms_to_samples(
        clip_size_ms.min(config.maximum_clip_ms),
        recording.frame_rate,
    );
    let clip_count = count_argument(arguments, "clips", config.clips_per_stage, diagnostics);

    for legacy in LEGACY_COUNT_ARGUMENTS {
        if arguments.contains_key(legacy) {
            diagnostics.warn(format!("argument '{}' is not recognized, use 'clips'", legacy));
        }
    }

    let segment = recording.segment(begin, end);
    debug!(
        begin_ms = begin,
        end_ms = end,
        clip_size_ms,
        clip_count,
        segment_frames = segment.frame_count(),
        "normalized common arguments"
    );

    NormalizedArguments {
        segment_offset: segment.begin_frame,
        segment,
        begin_ms: begin,
        end_ms: end,
        clip_size_ms,
        clip_size_samples,
        clip_count,
    }
}

/// Read a non-negative integer argument, falling back to `default` with a warning.
pub fn count_argument(
    arguments: &Map<String, Value>,
    key: &str,
    default: usize,
    diagnostics: &mut Diagnostics,
) -> usize {
    match arguments.get(key) {
        None => default,
        Some(value) => match value.as_u64() {
            Some(count) => count as usize,
            None => {
                diagnostics.warn(format!(
                    "argument '{}' must be a non-negative integer, got {} [fixup: using {}]",
                    key, value, default
                ));
                default
            }
        },
    }
}

/// Read a duration argument in milliseconds relative to `length_ms`, or `default`.
pub fn duration_argument(
    arguments: &Map<String, Value>,
    key: &str,
    length_ms: i64,
    default: i64,
    diagnostics: &mut Diagnostics,
) -> i64 {
    arguments
        .get(key)
        .map_or(default, |value| to_milliseconds(value, length_ms, diagnostics))
}

/// Resolve a stage's weight: a `weight` argument overrides `default`, negatives count as zero.
pub fn weight_argument(
    arguments: &Map<String, Value>,
    default: i64,
    diagnostics: &mut Diagnostics,
) -> usize {
    let weight = match arguments.get("weight") {
        None => default,
        Some(value) => match value.as_i64().or_else(|| value.as_f64().map(|w| w as i64)) {
            Some(weight) => weight,
            None => {
                diagnostics.warn(format!(
                    "argument 'weight' must be an integer, got {} [fixup: using {}]",
                    value, default
                ));
                default
            }
        },
    };
    weight.max(0) as usize
}
