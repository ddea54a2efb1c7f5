//! Evenly spaced interval slicing
//!
//! `clips` windows of `clip_size` are laid across the segment with the leftover frames split
//! evenly between them.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{ClipLimits, StageContext};
use crate::arguments::parse_common_arguments;
use crate::diagnostics::Diagnostics;
use crate::types::{NormalizedArguments, Recording, SampleClippingInterval};

pub fn run(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<SampleClippingInterval> {
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);
    info!(stage, clips = args.clip_count, "interval slicer");
    let limits = ClipLimits::new(context.config, recording.frame_rate);
    slice_intervals(&args, &limits, diagnostics)
}

pub fn slice_intervals(
    args: &NormalizedArguments<'_>,
    limits: &ClipLimits,
    diagnostics: &mut Diagnostics,
) -> Vec<SampleClippingInterval> {
    let clips = args.clip_count;
    let samples_per_clip = args.clip_size_samples;
    if clips == 0 {
        return Vec::new();
    }
    if samples_per_clip == 0 {
        diagnostics.warn(format!(
            "clip size {} ms resolves to zero samples, no intervals produced",
            args.clip_size_ms
        ));
        return Vec::new();
    }

    let total_samples = args.segment.frame_count();
    let samples_to_skip = total_samples.saturating_sub(clips.saturating_mul(samples_per_clip));
    let skips = clips - 1;
    let samples_per_skip = if skips == 0 { 0 } else { samples_to_skip / skips };
    let samples_per_iteration = samples_per_clip + samples_per_skip;

    debug!(
        total_samples,
        samples_per_clip,
        samples_per_skip,
        max_possible_clips = total_samples / samples_per_clip,
        "interval layout"
    );

    let mut intervals = Vec::with_capacity(clips);
    let mut position = 0;
    for clip_index in 0..clips {
        let end = position + samples_per_clip;
        if end > total_samples {
            diagnostics.warn(format!(
                "interval {} ending at frame {} would pass the end of the segment at {} frames",
                clip_index, end, total_samples
            ));
            break;
        }
        let interval = limits.interval(args.segment_offset + position, args.segment_offset + end);
        debug!(clip_index, begin = interval.begin(), end = interval.end(), "interval");
        intervals.push(interval);
        position += samples_per_iteration;
    }
    intervals
}
