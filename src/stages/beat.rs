//! Beat slicing: clips span `beats` consecutive detected beats

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::events::{intervals_from_events, EventWindow};
use super::{ClipLimits, StageContext, StageError};
use crate::arguments::{count_argument, parse_common_arguments};
use crate::diagnostics::Diagnostics;
use crate::types::{Recording, SampleClippingInterval};

pub fn run(
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    let detector = context
        .analyzers
        .beats
        .as_deref()
        .ok_or(StageError::MissingAnalyzer("beat detector"))?;
    let args = parse_common_arguments(arguments, recording, context.config, diagnostics);

    let mut beats_per_clip =
        count_argument(arguments, "beats", context.config.beat_count, diagnostics);
    if beats_per_clip == 0 {
        diagnostics.warn("argument 'beats' must be at least 1 [fixup: using 1]");
        beats_per_clip = 1;
    }
    let window =
        EventWindow::from_arguments(arguments, beats_per_clip, recording, context.config, diagnostics);
    debug!(
        stage,
        beats_per_clip,
        attack_samples = window.attack_samples,
        decay_samples = window.decay_samples,
        "detecting beats"
    );

    let beats = detector.detect_beats(&args.segment.to_recording())?;
    let limits = ClipLimits::new(context.config, recording.frame_rate);
    let intervals = intervals_from_events(&beats, &window, &args, &limits);
    info!(stage, beats = beats.len(), intervals = intervals.len(), "beat slicer");
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, Analyzers, BeatDetector, PrecomputedEvents};
    use crate::config::SlicerConfig;
    use crate::error::AnalysisError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn run_with(
        analyzers: &Analyzers,
        recording: &Recording,
        arguments: Value,
    ) -> (Result<Vec<SampleClippingInterval>, StageError>, Diagnostics) {
        let config = SlicerConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut context = StageContext {
            config: &config,
            analyzers,
            rng: &mut rng,
        };
        let mut diagnostics = Diagnostics::new();
        let arguments = arguments.as_object().cloned().unwrap_or_default();
        let result = run(0, &arguments, recording, &mut context, &mut diagnostics);
        (result, diagnostics)
    }

    #[test]
    fn groups_consecutive_beats_with_padding() {
        // one beat per second
        let beats = (1..10).map(|second| second * 1_000).collect();
        let analyzers = Analyzers::default().with_beats(PrecomputedEvents::new(beats));
        let recording = Recording::silence(10_000, 1_000);
        let (result, diagnostics) = run_with(
            &analyzers,
            &recording,
            json!({"beats": 4, "attack": "100ms", "decay": "200ms", "clips": 3}),
        );

        let bounds: Vec<_> = result
            .unwrap()
            .iter()
            .map(|interval| (interval.begin(), interval.end()))
            .collect();
        assert_eq!(bounds, vec![(900, 4_200), (1_900, 5_200), (2_900, 6_200)]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn zero_beats_per_clip_is_fixed_up() {
        let analyzers =
            Analyzers::default().with_beats(PrecomputedEvents::new(vec![1_000, 2_000]));
        let recording = Recording::silence(5_000, 1_000);
        let (result, diagnostics) = run_with(&analyzers, &recording, json!({"beats": 0}));

        assert_eq!(result.unwrap().len(), 2);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn beats_are_relative_to_segment() {
        let analyzers =
            Analyzers::default().with_beats(PrecomputedEvents::new(vec![500, 1_500]));
        let recording = Recording::silence(10_000, 1_000);
        let (result, _) = run_with(
            &analyzers,
            &recording,
            json!({"begin": "2s", "beats": 2, "attack": 0, "decay": 0}),
        );
        let intervals = result.unwrap();
        assert_eq!((intervals[0].begin(), intervals[0].end()), (2_500, 3_500));
    }

    struct BrokenTracker;

    impl BeatDetector for BrokenTracker {
        fn detect_beats(&self, _recording: &Recording) -> AnalysisResult<Vec<usize>> {
            Err(AnalysisError::Failed("tracker crashed".into()))
        }
    }

    #[test]
    fn detector_failure_is_reported() {
        let analyzers = Analyzers::default().with_beats(BrokenTracker);
        let recording = Recording::silence(5_000, 1_000);
        let (result, _) = run_with(&analyzers, &recording, json!({}));
        assert!(matches!(result, Err(StageError::Analysis(AnalysisError::Failed(_)))));
    }

    #[test]
    fn missing_detector_is_reported() {
        let recording = Recording::silence(5_000, 1_000);
        let (result, _) = run_with(&Analyzers::default(), &recording, json!({}));
        assert_eq!(result, Err(StageError::MissingAnalyzer("beat detector")));
    }
}
