use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::stages::StageKind;
use crate::types::StageDescriptor;

/// Defaults and limits threaded through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    /// Nominal frame rate; only used to derive the interval ceiling
    pub frame_rate: u32,
    pub clips_per_stage: usize,
    pub clip_size_ms: i64,
    pub minimum_recording_ms: i64,
    pub minimum_clip_ms: i64,
    pub maximum_clip_ms: i64,
    /// Proximity window for consensus clustering
    pub cluster_window_ms: i64,
    /// Chunk length for the volume envelope
    pub detection_window_ms: i64,
    pub low_threshold_db: f64,
    /// Largest per-sample rise of the tracked volume peak
    pub drift_db: f64,
    pub beat_count: usize,
    pub attack_ms: i64,
    pub decay_ms: i64,
    pub events_per_clip: usize,
    pub min_frequency_hz: f64,
    pub max_frequency_hz: f64,
    pub vocal_passes: usize,
    pub consensus: bool,
    pub consensus_start: usize,
    pub consensus_length: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            frame_rate: 44_100,
            clips_per_stage: 10,
            clip_size_ms: 9_000,
            minimum_recording_ms: 1_000,
            minimum_clip_ms: 250,
            maximum_clip_ms: 27_000,
            cluster_window_ms: 75,
            detection_window_ms: 10,
            low_threshold_db: -20.0,
            drift_db: 0.1,
            beat_count: 4,
            attack_ms: 50,
            decay_ms: 50,
            events_per_clip: 2,
            min_frequency_hz: 65.0,
            max_frequency_hz: 2_093.0,
            vocal_passes: 1,
            consensus: false,
            consensus_start: 0,
            consensus_length: None,
            seed: None,
        }
    }
}

impl SlicerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.frame_rate > 0, "frame_rate must be positive");
        ensure!(
            self.minimum_recording_ms >= 0,
            "minimum_recording_ms must not be negative"
        );
        ensure!(
            0 < self.minimum_clip_ms && self.minimum_clip_ms <= self.maximum_clip_ms,
            "minimum_clip_ms ({}) must be positive and no larger than maximum_clip_ms ({})",
            self.minimum_clip_ms,
            self.maximum_clip_ms
        );
        ensure!(self.clip_size_ms > 0, "clip_size_ms must be positive");
        ensure!(
            self.detection_window_ms > 0,
            "detection_window_ms must be positive"
        );
        ensure!(self.drift_db >= 0.0, "drift_db must not be negative");
        ensure!(
            self.cluster_window_ms >= 0,
            "cluster_window_ms must not be negative"
        );
        ensure!(
            self.min_frequency_hz < self.max_frequency_hz,
            "min_frequency_hz must be below max_frequency_hz"
        );
        Ok(())
    }

    /// Largest frame index any interval may reference: 24 hours at `frame_rate`.
    pub fn maximum_samples(&self) -> usize {
        24 * 60 * 60 * self.frame_rate as usize
    }

    pub fn maximum_clip_samples(&self, frame_rate: u32) -> usize {
        ms_to_samples(self.maximum_clip_ms, frame_rate)
    }

    pub fn minimum_clip_samples(&self, frame_rate: u32) -> usize {
        ms_to_samples(self.minimum_clip_ms, frame_rate)
    }

    pub fn consensus_length(&self) -> usize {
        self.consensus_length.unwrap_or(self.clips_per_stage)
    }
}

/// Convert a millisecond duration to frames; negative durations are zero frames.
pub fn ms_to_samples(ms: i64, frame_rate: u32) -> usize {
    (ms.max(0) as u64 * frame_rate as u64 / 1000) as usize
}

/// On-disk configuration and slicing logic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationFile {
    #[serde(default)]
    pub configuration: SlicerConfig,
    #[serde(default)]
    pub logic: Vec<StageDescriptor>,
}

impl ConfigurationFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        Self::from_json(&data).with_context(|| format!("Invalid configuration file {:?}", path))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(raw).context("Failed to parse configuration JSON")?;
        file.configuration.validate()?;
        Ok(file)
    }

    /// Default configuration with every registered method listed as an inactive stage.
    pub fn template() -> Self {
        Self {
            configuration: SlicerConfig::default(),
            logic: StageKind::ALL
                .iter()
                .map(|kind| StageDescriptor::new(kind.name()).inactive())
                .collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize template")?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_configuration_keeps_defaults() {
        let file = ConfigurationFile::from_json(
            r#"{
                "configuration": {"clips_per_stage": 4, "seed": 7},
                "logic": [{"method": "interval", "arguments": {"clips": 3}}]
            }"#,
        )
        .unwrap();
        assert_eq!(file.configuration.clips_per_stage, 4);
        assert_eq!(file.configuration.seed, Some(7));
        assert_eq!(file.configuration.clip_size_ms, 9_000);
        assert_eq!(file.configuration.consensus_length(), 4);
        assert_eq!(file.logic.len(), 1);
    }

    #[test]
    fn rejects_inverted_clip_limits() {
        let result = ConfigurationFile::from_json(
            r#"{"configuration": {"minimum_clip_ms": 5000, "maximum_clip_ms": 100}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn template_lists_every_method_inactive() {
        let template = ConfigurationFile::template();
        assert_eq!(template.logic.len(), StageKind::ALL.len());
        assert!(template.logic.iter().all(|stage| !stage.active));
    }

    #[test]
    fn derived_limits_follow_frame_rate() {
        let config = SlicerConfig::default();
        assert_eq!(config.maximum_samples(), 24 * 60 * 60 * 44_100);
        assert_eq!(config.maximum_clip_samples(1_000), 27_000);
        assert_eq!(ms_to_samples(-5, 44_100), 0);
    }
}
