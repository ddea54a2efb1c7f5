use super::{AnalysisResult, EnvelopeSource};
use crate::types::Recording;

/// Per-frame loudness in decibels of the mono mix-down.
///
/// Amplitudes below `amin` are raised to it before conversion; with `top_db` set, values are
/// floored at that many decibels below the loudest frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecibelEnvelope {
    pub amin: f32,
    pub top_db: Option<f32>,
}

impl Default for DecibelEnvelope {
    fn default() -> Self {
        Self {
            amin: 1e-5,
            top_db: Some(80.0),
        }
    }
}

impl DecibelEnvelope {
    pub fn amplitude_to_db(&self, samples: &[f32]) -> Vec<f32> {
        let mut decibels: Vec<f32> = samples
            .iter()
            .map(|sample| 20.0 * sample.abs().max(self.amin).log10())
            .collect();

        if let Some(top_db) = self.top_db {
            let loudest = decibels.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let floor = loudest - top_db;
            for value in &mut decibels {
                *value = value.max(floor);
            }
        }
        decibels
    }
}

impl EnvelopeSource for DecibelEnvelope {
    fn amplitude_envelope(&self, recording: &Recording) -> AnalysisResult<Vec<f32>> {
        Ok(self.amplitude_to_db(&recording.mono()))
    }
}
