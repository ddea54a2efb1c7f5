//! Clip slicing engine
//!
//! A configurable sequence of slicing stages turns a recording into candidate
//! [`SampleClippingInterval`]s. Consensus clustering can optionally refine them, and each
//! surviving interval is cut into a [`Clip`].

pub mod analysis;
pub mod arguments;
pub mod audio;
pub mod config;
pub mod consensus;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use analysis::Analyzers;
pub use config::{ConfigurationFile, SlicerConfig};
pub use error::{AnalysisError, SliceError};
pub use pipeline::{slice, SliceOutcome, Slicer, StageOutcome, StageReport};
pub use stages::StageKind;
pub use types::{Clip, ClipPoint, Recording, SampleClippingInterval, StageDescriptor};
