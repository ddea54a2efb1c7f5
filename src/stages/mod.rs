//! Stage runners: one slicing strategy per [`StageKind`]
//!
//! Every runner is a function of `(stage index, raw arguments, recording, context)` that returns
//! candidate intervals. Runners never touch the shared recording; stages needing a transformed
//! waveform work on their own copy.

pub mod beat;
pub mod chaos;
pub mod events;
pub mod interval;
pub mod vocal;
pub mod volume;

use rand::rngs::StdRng;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::Analyzers;
use crate::config::{ms_to_samples, SlicerConfig};
use crate::diagnostics::Diagnostics;
use crate::error::AnalysisError;
use crate::types::{Recording, SampleClippingInterval};

/// The closed set of slicing methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Interval,
    Chaos,
    Beat,
    Volume,
    Vocal,
    Onset,
    Tempo,
    Pitch,
}

impl StageKind {
    pub const ALL: [StageKind; 8] = [
        StageKind::Interval,
        StageKind::Chaos,
        StageKind::Beat,
        StageKind::Volume,
        StageKind::Vocal,
        StageKind::Onset,
        StageKind::Tempo,
        StageKind::Pitch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::Interval => "interval",
            StageKind::Chaos => "chaos",
            StageKind::Beat => "beat",
            StageKind::Volume => "volume",
            StageKind::Vocal => "vocal",
            StageKind::Onset => "onset",
            StageKind::Tempo => "tempo",
            StageKind::Pitch => "pitch",
        }
    }

    /// Resolve a method name (case-insensitive); unknown names yield `None`.
    pub fn from_name(method: &str) -> Option<Self> {
        let method = method.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.name() == method)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("no {0} is configured")]
    MissingAnalyzer(&'static str),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Shared, read-only inputs plus the random source handed to each runner
pub struct StageContext<'a> {
    pub config: &'a SlicerConfig,
    pub analyzers: &'a Analyzers,
    pub rng: &'a mut StdRng,
}

/// Frame limits every candidate must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipLimits {
    pub minimum_clip_samples: usize,
    pub maximum_clip_samples: usize,
    pub maximum_samples: usize,
}

impl ClipLimits {
    pub fn new(config: &SlicerConfig, frame_rate: u32) -> Self {
        Self {
            minimum_clip_samples: ms_to_samples(config.minimum_clip_ms, frame_rate),
            maximum_clip_samples: ms_to_samples(config.maximum_clip_ms, frame_rate),
            maximum_samples: config.maximum_samples(),
        }
    }

    pub fn interval(&self, begin: usize, end: usize) -> SampleClippingInterval {
        SampleClippingInterval::with_ceiling(begin as i64, end as i64, self.maximum_samples)
    }
}

/// Dispatch one stage to its runner.
pub fn run_stage(
    kind: StageKind,
    stage: usize,
    arguments: &Map<String, Value>,
    recording: &Recording,
    context: &mut StageContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SampleClippingInterval>, StageError> {
    match kind {
        StageKind::Interval => Ok(interval::run(stage, arguments, recording, context, diagnostics)),
        StageKind::Chaos => Ok(chaos::run(stage, arguments, recording, context, diagnostics)),
        StageKind::Beat => beat::run(stage, arguments, recording, context, diagnostics),
        StageKind::Volume => volume::run(stage, arguments, recording, context, diagnostics),
        StageKind::Vocal => vocal::run(stage, arguments, recording, context, diagnostics),
        StageKind::Onset => events::run_onset(stage, arguments, recording, context, diagnostics),
        StageKind::Tempo => events::run_tempo(stage, arguments, recording, context, diagnostics),
        StageKind::Pitch => events::run_pitch(stage, arguments, recording, context, diagnostics),
    }
}
