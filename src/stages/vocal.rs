//! Vocal-change slicing: isolate the vocal track, then slice on its volume

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::volume::{slice_on_volume, VolumeSettings};
use super::{ClipLimits, StageContext, StageError};
use crate::analysis::VocalSeparator;
use crate::arguments::{count_argument, parse_common_arguments};
use crate::diagnostics::Diagnostics;
use crate::error::AnalysisError;
use crate::types::{Recording, SampleClippingInterval};

pub fn run(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    let separator = context
        .analyzers
        .separator
        .as_deref()
        .ok_or(StageError::MissingAnalyzer("vocal separator"))?;
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);

    let mut passes = count_argument(arguments, "passes", context.config.vocal_passes, diagnostics);
    if passes < 1 {
        diagnostics.warn(format!(
            "argument 'passes' {} must be at least 1 [fixup: using 1]",
            passes
        ));
        passes = 1;
    }
    let model = model_argument(arguments);
    let settings = VolumeSettings::from_arguments(arguments, recording, context.config, diagnostics);

    let vocals = isolate(separator, args.segment.to_recording(), passes, model.as_deref())?;
    let envelope = context.analyzers.envelope.amplitude_envelope(&vocals)?;
    let limits = ClipLimits::new(context.config, recording.frame_rate);
    let intervals = slice_on_volume(&envelope, &settings, &args, &limits);
    info!(stage, passes, intervals = intervals.len(), "vocal slicer");
    Ok(intervals)
}

/// Run `passes` separations in order, each refining the previous output.
///
/// Each pass must keep the frame rate, channel count and frame count of its input.
pub fn isolate(
    separator: &dyn VocalSeparator,
    mut waveform: Recording,
    passes: usize,
    model: Option<&str>,
) -> Result<Recording, AnalysisError> {
    for pass in 0..passes {
        debug!(pass, model, "separating vocals");
        let isolated = separator.separate(&waveform, model)?;
        if isolated.frame_rate != waveform.frame_rate {
            return Err(AnalysisError::InvalidInput(format!(
                "separator changed frame rate from {} to {}",
                waveform.frame_rate, isolated.frame_rate
            )));
        }
        if isolated.channel_count != waveform.channel_count
            || isolated.frame_count() != waveform.frame_count()
        {
            return Err(AnalysisError::InvalidInput(format!(
                "separator returned {} frames of {} channels for {} frames of {}",
                isolated.frame_count(),
                isolated.channel_count,
                waveform.frame_count(),
                waveform.channel_count
            )));
        }
        waveform = isolated;
    }
    Ok(waveform)
}

fn model_argument(arguments: &Map<String, Value>) -> Option<String> {
    match arguments.get("model")? {
        Value::String(model) => Some(model.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
