use crate::types::{Clip, ClipPoint, Recording, SampleClippingInterval};

/// Cut one interval out of the recording
pub fn materialize(recording: &Recording, interval: &SampleClippingInterval) -> Clip {
    let frame_rate = recording.frame_rate.max(1) as f64;
    let point = |index: usize| ClipPoint {
        index,
        time: index as f64 / frame_rate,
    };

    // Frames past the recording end are dropped
    let samples = recording.frames(interval.begin(), interval.end()).to_vec();

    Clip {
        begin: point(interval.begin()),
        end: point(interval.end()),
        samples: Recording::new(samples, recording.frame_rate, recording.channel_count),
    }
}

/// Materialize every interval in order
pub fn materialize_all(recording: &Recording, intervals: &[SampleClippingInterval]) -> Vec<Clip> {
    intervals
        .iter()
        .map(|interval| materialize(recording, interval))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_slicing() {
        let recording = Recording::silence(1_000, 44_100);
        let intervals = vec![
            SampleClippingInterval::new(0, 22_050),
            SampleClippingInterval::new(22_050, 44_100),
        ];

        let clips = materialize_all(&recording, &intervals);

        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].samples.frame_count(), 22_050);
        assert_relative_eq!(clips[1].begin.time, 0.5);
        assert_relative_eq!(clips[1].end.time, 1.0);
        assert_relative_eq!(clips[1].duration(), 0.5);
    }

    #[test]
    fn test_stereo_frames_stay_interleaved() {
        let recording = Recording::new((0..20).map(|i| i as f32).collect(), 10, 2);
        let clip = materialize(&recording, &SampleClippingInterval::new(2, 4));

        assert_eq!(clip.samples.channel_count, 2);
        assert_eq!(clip.samples.samples, vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!((clip.begin.index, clip.end.index), (2, 4));
    }

    #[test]
    fn test_boundary_clamping() {
        let recording = Recording::silence(1_000, 1_000);
        let clip = materialize(&recording, &SampleClippingInterval::new(500, 2_000));

        // metadata keeps the requested end, samples stop at the recording
        assert_eq!(clip.end.index, 2_000);
        assert_eq!(clip.samples.frame_count(), 500);
    }
}
