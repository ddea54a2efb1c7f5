//! Event-driven slicing shared by the beat, onset, tempo and pitch stages
//!
//! Each candidate spans a run of consecutive events padded by attack before the first and decay
//! after the last. Candidates that would start before the segment, end after it, or exceed the
//! maximum clip size are dropped.

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{ClipLimits, StageContext, StageError};
use crate::arguments::{count_argument, duration_argument, parse_common_arguments, to_hertz};
use crate::config::{ms_to_samples, SlicerConfig};
use crate::diagnostics::Diagnostics;
use crate::types::{NormalizedArguments, Recording, SampleClippingInterval};

/// How consecutive events are grouped into a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub events_per_clip: usize,
    pub attack_samples: usize,
    pub decay_samples: usize,
}

impl EventWindow {
    /// Read `attack` and `decay` from the stage arguments with configured fallbacks.
    pub fn from_arguments(
        arguments: &Map<String, Value>,
        events_per_clip: usize,
        recording: &Recording,
        config: &SlicerConfig,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let recording_ms = recording.length_ms();
        let attack_ms =
            duration_argument(arguments, "attack", recording_ms, config.attack_ms, diagnostics);
        let decay_ms =
            duration_argument(arguments, "decay", recording_ms, config.decay_ms, diagnostics);
        Self {
            events_per_clip,
            attack_samples: ms_to_samples(attack_ms, recording.frame_rate),
            decay_samples: ms_to_samples(decay_ms, recording.frame_rate),
        }
    }
}

/// Turn ascending segment-relative `events` into at most `clip_count` intervals. Groups that are
/// out of order are rejected.
pub fn intervals_from_events(
    events: &[usize],
    window: &EventWindow,
    args: &NormalizedArguments<'_>,
    limits: &ClipLimits,
) -> Vec<SampleClippingInterval> {
    let total_samples = args.segment.frame_count();
    let span = window.events_per_clip.max(1);
    let mut intervals = Vec::new();
    let mut rejected = 0usize;

    for group in events.windows(span) {
        if intervals.len() >= args.clip_count {
            break;
        }
        let (first, last) = (group[0], group[span - 1]);
        if last < first {
            rejected += 1;
            debug!(first, last, "events out of order");
            continue;
        }

        let Some(begin) = first.checked_sub(window.attack_samples) else {
            rejected += 1;
            debug!(first, attack = window.attack_samples, "candidate starts before segment");
            continue;
        };
        let Some(end) = last.checked_add(window.decay_samples) else {
            rejected += 1;
            debug!(last, decay = window.decay_samples, "candidate end overflows");
            continue;
        };
        if end - begin > limits.maximum_clip_samples {
            rejected += 1;
            debug!(begin, end, "candidate longer than maximum clip size");
            continue;
        }
        if end > total_samples {
            rejected += 1;
            debug!(end, total_samples, "candidate runs past segment end");
            continue;
        }

        intervals.push(limits.interval(
            args.segment_offset + begin,
            args.segment_offset + end,
        ));
    }

    debug!(
        events = events.len(),
        accepted = intervals.len(),
        rejected,
        "event candidates"
    );
    intervals
}

#[allow(clippy::too_many_arguments)]
fn slice_on_events(
    label: &str,
    events: Vec<usize>,
    events_per_clip: usize,
    arguments: &Map<String, Value>,
    args: &NormalizedArguments<'_>,
    recording: &Recording,
    context: &StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Vec<SampleClippingInterval> {
    let window = EventWindow::from_arguments(
        arguments,
        events_per_clip,
        recording,
        context.config,
        diagnostics,
    );
    let limits = ClipLimits::new(context.config, recording.frame_rate);
    let intervals = intervals_from_events(&events, &window, args, &limits);
    info!(
        events = events.len(),
        intervals = intervals.len(),
        "{} slicer",
        label
    );
    intervals
}

fn events_per_clip(
    arguments: &Map<String, Value>,
    config: &SlicerConfig,
    diagnostics: &mut Diagnostics,
) -> usize {
    let count = count_argument(arguments, "events", config.events_per_clip, diagnostics);
    if count == 0 {
        diagnostics.warn("argument 'events' must be at least 1 [fixup: using 1]");
        return 1;
    }
    count
}

pub fn run_onset(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    let detector = context
        .analyzers
        .onsets
        .as_deref()
        .ok_or(StageError::MissingAnalyzer("onset detector"))?;
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);
    let per_clip = events_per_clip(arguments, context.config, diagnostics);
    debug!(stage, "detecting onsets");
    let events = detector.detect_onsets(&args.segment.to_recording())?;
    Ok(slice_on_events(
        "onset", events, per_clip, arguments, &args, recording, context, diagnostics,
    ))
}

pub fn run_tempo(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    let detector = context
        .analyzers
        .tempo
        .as_deref()
        .ok_or(StageError::MissingAnalyzer("tempo-change detector"))?;
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);
    let per_clip = events_per_clip(arguments, context.config, diagnostics);
    debug!(stage, "detecting tempo changes");
    let events = detector.detect_tempo_changes(&args.segment.to_recording())?;
    Ok(slice_on_events(
        "tempo", events, per_clip, arguments, &args, recording, context, diagnostics,
    ))
}

pub fn run_pitch(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    let detector = context
        .analyzers
        .pitch
        .as_deref()
        .ok_or(StageError::MissingAnalyzer("pitch-change detector"))?;
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);
    let per_clip = events_per_clip(arguments, context.config, diagnostics);

    let mut min_hz = arguments
        .get("min_frequency")
        .map_or(context.config.min_frequency_hz, |value| to_hertz(value, diagnostics));
    let mut max_hz = arguments
        .get("max_frequency")
        .map_or(context.config.max_frequency_hz, |value| to_hertz(value, diagnostics));
    if min_hz > max_hz {
        diagnostics.warn(format!(
            "arguments 'min_frequency' {} and 'max_frequency' {} were reversed [fixup: swapping]",
            min_hz, max_hz
        ));
        std::mem::swap(&mut min_hz, &mut max_hz);
    }

    debug!(stage, min_hz, max_hz, "detecting pitch changes");
    let events = detector.detect_pitch_changes(&args.segment.to_recording(), min_hz, max_hz)?;
    Ok(slice_on_events(
        "pitch", events, per_clip, arguments, &args, recording, context, diagnostics,
    ))
}
