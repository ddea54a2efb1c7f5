use thiserror::Error;

/// Fatal pipeline errors; everything else is reported through [`crate::diagnostics::Diagnostics`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// The recording has no frames, no frame rate or no channels
    #[error("recording is empty or missing")]
    EmptyRecording,

    #[error("recording is {length_ms} ms long, shorter than the {minimum_ms} ms minimum")]
    RecordingTooShort { length_ms: i64, minimum_ms: i64 },

    #[error("no slicing stages were provided")]
    NoStages,
}

/// Failure reported by an external analyzer (beat tracker, separator, ...)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("analyzer rejected the recording: {0}")]
    InvalidInput(String),

    #[error("analysis failed: {0}")]
    Failed(String),
}
