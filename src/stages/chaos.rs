//! Random interval slicing

use rand::Rng;
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
    info!(stage, clips = args.clip_count, "chaos slicer");
    let limits = ClipLimits::new(context.config, recording.frame_rate);
    slice_randomly(&args, &limits, context.rng, diagnostics)
}

/// Draw `clip_count` intervals: one end uniform over the segment, the other uniform within a
/// clip-sized window on either side of it (never equal to the first).
pub fn slice_randomly<R: Rng>(
    args: &NormalizedArguments<'_>,
    limits: &ClipLimits,
    rng: &mut R,
    diagnostics: &mut Diagnostics,
) -> Vec<SampleClippingInterval> {
    let total_samples = args.segment.frame_count();
    let sample_window = args.clip_size_samples.min(limits.maximum_clip_samples);
    debug!(total_samples, sample_window, "chaos layout");

    if args.clip_count == 0 {
        return Vec::new();
    }
    if total_samples == 0 || sample_window == 0 {
        diagnostics.warn(format!(
            "chaos slicer has no room to draw from ({} segment frames, {} frame window)",
            total_samples, sample_window
        ));
        return Vec::new();
    }

    (0..args.clip_count)
        .map(|clip_index| {
            let anchor = rng.gen_range(0..=total_samples);
            let left = sample_window.min(anchor);
            let right = sample_window.min(total_samples - anchor);
            let pick = rng.gen_range(0..left + right);
            let partner = if pick < left {
                anchor - left + pick
            } else {
                anchor + 1 + (pick - left)
            };
            let interval = limits.interval(
                args.segment_offset + anchor,
                args.segment_offset + partner,
            );
            debug!(clip_index, begin = interval.begin(), end = interval.end(), "interval");
            interval
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlicerConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn draw(recording: &Recording, arguments: Value, seed: u64) -> Vec<SampleClippingInterval> {
        let config = SlicerConfig::default();
        let mut diagnostics = Diagnostics::new();
        let arguments = arguments.as_object().cloned().unwrap_or_default();
        let args = parse_common_arguments(&arguments, recording, &config, &mut diagnostics);
        let limits = ClipLimits::new(&config, recording.frame_rate);
        let mut rng = StdRng::seed_from_u64(seed);
        slice_randomly(&args, &limits, &mut rng, &mut diagnostics)
    }

    #[test]
    fn intervals_are_nonempty_and_inside_segment() {
        let recording = Recording::silence(30_000, 1_000);
        for seed in 0..20 {
            let intervals = draw(&recording, json!({"clips": 25, "clip_size": "3s"}), seed);
            assert_eq!(intervals.len(), 25);
            for interval in intervals {
                assert!(interval.begin() < interval.end());
                assert!(interval.end() <= 30_000);
                assert!(interval.len() <= 3_000);
            }
        }
    }

    #[test]
    fn offset_segment_stays_inside_bounds() {
        let recording = Recording::silence(30_000, 1_000);
        let intervals = draw(&recording, json!({"begin": "10s", "end": "12s", "clips": 50}), 3);
        for interval in intervals {
            assert!(interval.begin() >= 10_000);
            assert!(interval.end() <= 12_000);
            assert!(interval.begin() < interval.end());
        }
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let recording = Recording::silence(10_000, 1_000);
        let first = draw(&recording, json!({"clips": 8}), 42);
        let second = draw(&recording, json!({"clips": 8}), 42);
        assert_eq!(first, second);
    }
}
