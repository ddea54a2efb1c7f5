//! Interfaces to the signal-analysis collaborators the stages consume
//!
//! Detection itself (beat tracking, onsets, pitch, source separation) lives outside this
//! crate. Stages only see ordered frame indexes, decibel envelopes and derived waveforms.

pub mod envelope;

use crate::error::AnalysisError;
use crate::types::Recording;

pub use envelope::DecibelEnvelope;

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// Ordered, ascending beat positions (frame indexes into `recording`).
pub trait BeatDetector {
    fn detect_beats(&self, recording: &Recording) -> AnalysisResult<Vec<usize>>;
}

pub trait OnsetDetector {
    fn detect_onsets(&self, recording: &Recording) -> AnalysisResult<Vec<usize>>;
}

pub trait TempoChangeDetector {
    fn detect_tempo_changes(&self, recording: &Recording) -> AnalysisResult<Vec<usize>>;
}

pub trait PitchChangeDetector {
    fn detect_pitch_changes(
        &self,
        recording: &Recording,
        min_hz: f64,
        max_hz: f64,
    ) -> AnalysisResult<Vec<usize>>;
}

/// Isolates the vocal track. The output keeps the input frame rate and channel layout.
pub trait VocalSeparator {
    fn separate(&self, waveform: &Recording, model: Option<&str>) -> AnalysisResult<Recording>;
}

/// Per-frame decibel values for `recording`.
pub trait EnvelopeSource {
    fn amplitude_envelope(&self, recording: &Recording) -> AnalysisResult<Vec<f32>>;
}

/// The analyzers available to a pipeline run. Missing ones cause their stages to be skipped.
pub struct Analyzers {
    pub beats: Option<Box<dyn BeatDetector>>,
    pub onsets: Option<Box<dyn OnsetDetector>>,
    pub tempo: Option<Box<dyn TempoChangeDetector>>,
    pub pitch: Option<Box<dyn PitchChangeDetector>>,
    pub separator: Option<Box<dyn VocalSeparator>>,
    pub envelope: Box<dyn EnvelopeSource>,
}

impl Default for Analyzers {
    fn default() -> Self {
        Self {
            beats: None,
            onsets: None,
            tempo: None,
            pitch: None,
            separator: None,
            envelope: Box::new(DecibelEnvelope::default()),
        }
    }
}

impl Analyzers {
    pub fn with_beats(mut self, detector: impl BeatDetector + 'static) -> Self {
        self.beats = Some(Box::new(detector));
        self
    }

    pub fn with_onsets(mut self, detector: impl OnsetDetector + 'static) -> Self {
        self.onsets = Some(Box::new(detector));
        self
    }

    pub fn with_tempo(mut self, detector: impl TempoChangeDetector + 'static) -> Self {
        self.tempo = Some(Box::new(detector));
        self
    }

    pub fn with_pitch(mut self, detector: impl PitchChangeDetector + 'static) -> Self {
        self.pitch = Some(Box::new(detector));
        self
    }

    pub fn with_separator(mut self, separator: impl VocalSeparator + 'static) -> Self {
        self.separator = Some(Box::new(separator));
        self
    }

    pub fn with_envelope(mut self, source: impl EnvelopeSource + 'static) -> Self {
        self.envelope = Box::new(source);
        self
    }
}

/// Event positions computed ahead of time, replayed for any recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecomputedEvents {
    indexes: Vec<usize>,
}

impl PrecomputedEvents {
    pub fn new(mut indexes: Vec<usize>) -> Self {
        indexes.sort_unstable();
        Self { indexes }
    }

    fn within(&self, recording: &Recording) -> Vec<usize> {
        let frames = recording.frame_count();
        self.indexes
            .iter()
            .copied()
            .take_while(|&index| index <= frames)
            .collect()
    }
}

impl BeatDetector for PrecomputedEvents {
    fn detect_beats(&self, recording: &Recording) -> AnalysisResult<Vec<usize>> {
        Ok(self.within(recording))
    }
}

impl OnsetDetector for PrecomputedEvents {
    fn detect_onsets(&self, recording: &Recording) -> AnalysisResult<Vec<usize>> {
        Ok(self.within(recording))
    }
}

impl TempoChangeDetector for PrecomputedEvents {
    fn detect_tempo_changes(&self, recording: &Recording) -> AnalysisResult<Vec<usize>> {
        Ok(self.within(recording))
    }
}

impl PitchChangeDetector for PrecomputedEvents {
    fn detect_pitch_changes(
        &self,
        recording: &Recording,
        _min_hz: f64,
        _max_hz: f64,
    ) -> AnalysisResult<Vec<usize>> {
        Ok(self.within(recording))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precomputed_events_are_sorted_and_bounded() {
        let events = PrecomputedEvents::new(vec![900, 100, 5_000, 400]);
        let recording = Recording::silence(1_000, 1_000);
        assert_eq!(events.detect_beats(&recording).unwrap(), vec![100, 400, 900]);
    }

    #[test]
    fn default_analyzers_only_carry_an_envelope() {
        let analyzers = Analyzers::default();
        assert!(analyzers.beats.is_none());
        assert!(analyzers.separator.is_none());
        let envelope = analyzers
            .envelope
            .amplitude_envelope(&Recording::silence(10, 1_000))
            .unwrap();
        assert_eq!(envelope.len(), 10);
    }
}
