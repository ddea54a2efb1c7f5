//! Core types for the clipslicer slicing pipeline

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ceiling used when no explicit one is supplied: 24 hours of CD-rate frames.
pub const DEFAULT_MAXIMUM_SAMPLES: usize = 24 * 60 * 60 * 44_100;

/// Raw audio recording (interleaved f32 frames)
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Interleaved samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Frames per second (e.g., 44100)
    pub frame_rate: u32,
    /// Samples per frame
    pub channel_count: u16,
}

impl Recording {
    pub fn new(samples: Vec<f32>, frame_rate: u32, channel_count: u16) -> Self {
        Self {
            samples,
            frame_rate,
            channel_count,
        }
    }

    /// A silent mono recording of `length_ms` milliseconds.
    pub fn silence(length_ms: u64, frame_rate: u32) -> Self {
        let frames = (length_ms * frame_rate as u64 / 1000) as usize;
        Self::new(vec![0.0; frames], frame_rate, 1)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_rate == 0 || self.channel_count == 0 || self.samples.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        if self.channel_count == 0 {
            return 0;
        }
        self.samples.len() / self.channel_count as usize
    }

    pub fn length_ms(&self) -> i64 {
        if self.frame_rate == 0 {
            return 0;
        }
        (self.frame_count() as u64 * 1000 / self.frame_rate as u64) as i64
    }

    pub fn samples_per_ms(&self) -> f64 {
        self.frame_rate as f64 / 1000.0
    }

    /// Frame index for a millisecond offset, clamped to the recording.
    pub fn ms_to_frame(&self, ms: i64) -> usize {
        let frame = ms.max(0) as u64 * self.frame_rate as u64 / 1000;
        (frame as usize).min(self.frame_count())
    }

    /// Borrow the frames between two millisecond offsets.
    pub fn segment(&self, begin_ms: i64, end_ms: i64) -> Segment<'_> {
        let begin_frame = self.ms_to_frame(begin_ms);
        let end_frame = self.ms_to_frame(end_ms).max(begin_frame);
        Segment {
            recording: self,
            begin_frame,
            end_frame,
        }
    }

    /// Interleaved samples of frames `[begin, end)`, clamped to the recording.
    pub fn frames(&self, begin: usize, end: usize) -> &[f32] {
        let channels = self.channel_count as usize;
        let end = end.min(self.frame_count());
        let begin = begin.min(end);
        &self.samples[begin * channels..end * channels]
    }

    /// Average all channels into one.
    pub fn mono(&self) -> Vec<f32> {
        let channels = self.channel_count as usize;
        if channels <= 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

/// Read-only view of a frame range within a [`Recording`]
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub recording: &'a Recording,
    pub begin_frame: usize,
    pub end_frame: usize,
}

impl<'a> Segment<'a> {
    pub fn frame_count(&self) -> usize {
        self.end_frame - self.begin_frame
    }

    pub fn frame_rate(&self) -> u32 {
        self.recording.frame_rate
    }

    pub fn samples(&self) -> &'a [f32] {
        self.recording.frames(self.begin_frame, self.end_frame)
    }

    /// Copy the view into a standalone recording for analyzers that need one.
    pub fn to_recording(&self) -> Recording {
        Recording::new(
            self.samples().to_vec(),
            self.recording.frame_rate,
            self.recording.channel_count,
        )
    }
}

/// A `[begin, end)` frame range within a source recording from which a clip can be produced
///
/// Always satisfies `0 <= begin <= end <= ceiling`; reversed input is swapped, out of range
/// input is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SampleClippingInterval {
    begin: usize,
    end: usize,
}

impl SampleClippingInterval {
    pub fn new(begin: i64, end: i64) -> Self {
        Self::with_ceiling(begin, end, DEFAULT_MAXIMUM_SAMPLES)
    }

    pub fn with_ceiling(begin: i64, end: i64, maximum_samples: usize) -> Self {
        let (begin, end) = if begin > end { (end, begin) } else { (begin, end) };
        let ceiling = maximum_samples as i64;
        Self {
            begin: begin.clamp(0, ceiling) as usize,
            end: end.clamp(0, ceiling) as usize,
        }
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// One endpoint of a clip, as a frame index and a time in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipPoint {
    pub index: usize,
    pub time: f64,
}

/// An extracted clip with its position in the source recording
#[derive(Debug, Clone)]
pub struct Clip {
    pub begin: ClipPoint,
    pub end: ClipPoint,
    pub samples: Recording,
}

impl Clip {
    pub fn duration(&self) -> f64 {
        self.end.time - self.begin.time
    }
}

/// One configured invocation of a slicing method
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StageDescriptor {
    pub method: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_weight")]
    pub weight: i64,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

fn default_weight() -> i64 {
    1
}

impl StageDescriptor {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            active: true,
            weight: 1,
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.to_string(), value.into());
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Per-stage arguments after unit normalization and clamping
#[derive(Debug, Clone, Copy)]
pub struct NormalizedArguments<'a> {
    pub segment: Segment<'a>,
    /// Frame index of the segment start within the full recording
    pub segment_offset: usize,
    pub begin_ms: i64,
    pub end_ms: i64,
    pub clip_size_ms: i64,
    /// `clip_size_ms` in frames, capped at the maximum clip size
    pub clip_size_samples: usize,
    pub clip_count: usize,
}
