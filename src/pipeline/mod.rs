//! Pipeline orchestration
//!
//! A single pass over the configured stages: validate the recording, dispatch each active stage,
//! accumulate its intervals (duplicated by weight), and report what happened to every stage.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::analysis::Analyzers;
use crate::arguments::weight_argument;
use crate::audio::materialize_all;
use crate::config::SlicerConfig;
use crate::consensus::{consensus, ConsensusSettings};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::SliceError;
use crate::stages::{run_stage, StageContext, StageError, StageKind};
use crate::types::{Clip, Recording, SampleClippingInterval, StageDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Inactive,
    ZeroWeight,
    UnknownMethod,
    MissingAnalyzer(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Skipped(SkipReason),
    /// Number of intervals the stage produced, before weighting
    Dispatched { intervals: usize },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub index: usize,
    pub method: String,
    pub outcome: StageOutcome,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone)]
pub struct SliceOutcome {
    pub intervals: Vec<SampleClippingInterval>,
    pub reports: Vec<StageReport>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Slicer {
    config: SlicerConfig,
    analyzers: Analyzers,
    rng: StdRng,
}

impl Slicer {
    /// Randomness is seeded from `config.seed` when set, from entropy otherwise.
    pub fn new(config: SlicerConfig, analyzers: Analyzers) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            analyzers,
            rng,
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &SlicerConfig {
        &self.config
    }

    fn validate(&self, recording: &Recording, stages: &[StageDescriptor]) -> Result<(), SliceError> {
        if recording.is_empty() {
            return Err(SliceError::EmptyRecording);
        }
        let length_ms = recording.length_ms();
        if length_ms < self.config.minimum_recording_ms {
            return Err(SliceError::RecordingTooShort {
                length_ms,
                minimum_ms: self.config.minimum_recording_ms,
            });
        }
        if stages.is_empty() {
            return Err(SliceError::NoStages);
        }
        Ok(())
    }

    /// Run every stage and collect the weighted interval pool.
    pub fn run(
        &mut self,
        recording: &Recording,
        stages: &[StageDescriptor],
    ) -> Result<SliceOutcome, SliceError> {
        self.validate(recording, stages)?;
        info!(
            stages = stages.len(),
            length_ms = recording.length_ms(),
            frame_rate = recording.frame_rate,
            channels = recording.channel_count,
            "slicing recording"
        );

        let mut diagnostics = Diagnostics::new();
        let mut intervals = Vec::new();
        let mut reports = Vec::with_capacity(stages.len());

        for (index, stage) in stages.iter().enumerate() {
            diagnostics.enter_stage(index);
            let outcome = self.run_one(index, stage, recording, &mut intervals, &mut diagnostics);
            diagnostics.leave_stage();
            reports.push(StageReport {
                index,
                method: stage.method.clone(),
                outcome,
            });
        }

        info!(
            intervals = intervals.len(),
            warnings = diagnostics.len(),
            "pipeline finished"
        );
        Ok(SliceOutcome {
            intervals,
            reports,
            diagnostics: diagnostics.into_entries(),
        })
    }

    fn run_one(
        &mut self,
        index: usize,
        stage: &StageDescriptor,
        recording: &Recording,
        intervals: &mut Vec<SampleClippingInterval>,
        diagnostics: &mut Diagnostics,
    ) -> StageOutcome {
        if !stage.active {
            diagnostics.warn(format!("stage '{}' is inactive [skipping]", stage.method));
            return StageOutcome::Skipped(SkipReason::Inactive);
        }
        let weight = weight_argument(&stage.arguments, stage.weight, diagnostics);
        if weight == 0 {
            diagnostics.warn(format!("stage '{}' has zero weight [skipping]", stage.method));
            return StageOutcome::Skipped(SkipReason::ZeroWeight);
        }
        let Some(kind) = StageKind::from_name(&stage.method) else {
            diagnostics.warn(format!(
                "slicing method '{}' is not recognized [skipping]",
                stage.method
            ));
            return StageOutcome::Skipped(SkipReason::UnknownMethod);
        };

        let mut context = StageContext {
            config: &self.config,
            analyzers: &self.analyzers,
            rng: &mut self.rng,
        };
        match run_stage(kind, index, &stage.arguments, recording, &mut context, diagnostics) {
            Ok(produced) => {
                let count = produced.len();
                for interval in produced {
                    intervals.extend(std::iter::repeat(interval).take(weight));
                }
                info!(stage = index, method = kind.name(), count, weight, "stage dispatched");
                StageOutcome::Dispatched { intervals: count }
            }
            Err(StageError::MissingAnalyzer(analyzer)) => {
                diagnostics.warn(format!(
                    "stage '{}' needs a {} [skipping]",
                    kind.name(),
                    analyzer
                ));
                StageOutcome::Skipped(SkipReason::MissingAnalyzer(analyzer))
            }
            Err(err) => {
                diagnostics.warn(format!("stage '{}' failed: {}", kind.name(), err));
                StageOutcome::Failed(err.to_string())
            }
        }
    }

    /// Run the pipeline, refine by consensus when enabled, and cut the clips.
    pub fn slice(
        &mut self,
        recording: &Recording,
        stages: &[StageDescriptor],
    ) -> Result<Vec<Clip>, SliceError> {
        let outcome = self.run(recording, stages)?;
        let intervals = self.refine(recording, outcome.intervals);
        Ok(materialize_all(recording, &intervals))
    }

    /// Reduce a weighted pool to the final intervals: consensus when enabled, the pool otherwise.
    pub fn refine(
        &self,
        recording: &Recording,
        pool: Vec<SampleClippingInterval>,
    ) -> Vec<SampleClippingInterval> {
        let intervals = if self.config.consensus {
            let settings = ConsensusSettings::from_config(&self.config, recording.frame_rate);
            consensus(&pool, &settings)
        } else {
            pool
        };
        if intervals.is_empty() {
            warn!("no intervals survived slicing");
        }
        intervals
    }
}

/// One-shot convenience over [`Slicer::slice`].
pub fn slice(
    recording: &Recording,
    stages: &[StageDescriptor],
    config: &SlicerConfig,
    analyzers: Analyzers,
) -> Result<Vec<Clip>, SliceError> {
    Slicer::new(config.clone(), analyzers).slice(recording, stages)
}
