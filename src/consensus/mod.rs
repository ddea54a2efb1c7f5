//! Consensus refinement of the accumulated interval pool
//!
//! Begin and end indexes are clustered separately, weakly supported clusters are dropped, and
//! the survivors are paired into final intervals.

mod clusters;
mod histogram;
mod pairing;

use tracing::{debug, info};

use crate::config::{ms_to_samples, SlicerConfig};
use crate::types::SampleClippingInterval;

pub use clusters::{cluster_indexes, filter_clusters, Cluster};
pub use histogram::ClusterHistogram;
pub use pairing::{pair_boundaries, PageWindow};

/// Which endpoint of each interval to cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusSettings {
    pub proximity_samples: usize,
    pub maximum_clip_samples: usize,
    pub maximum_samples: usize,
    pub window: PageWindow,
}

impl ConsensusSettings {
    pub fn from_config(config: &SlicerConfig, frame_rate: u32) -> Self {
        Self {
            proximity_samples: ms_to_samples(config.cluster_window_ms, frame_rate),
            maximum_clip_samples: config.maximum_clip_samples(frame_rate),
            maximum_samples: config.maximum_samples(),
            window: PageWindow {
                start: config.consensus_start,
                length: config.consensus_length(),
            },
        }
    }
}

/// Cluster one side of `intervals` and keep the clusters of at least average size.
pub fn clip_boundaries(
    intervals: &[SampleClippingInterval],
    side: Side,
    proximity_samples: usize,
) -> Vec<Cluster> {
    let indexes: Vec<usize> = intervals
        .iter()
        .map(|interval| match side {
            Side::Begin => interval.begin(),
            Side::End => interval.end(),
        })
        .collect();
    let clusters = cluster_indexes(&indexes, proximity_samples);
    let histogram = ClusterHistogram::from_clusters(&clusters);
    debug!(
        ?side,
        clusters = clusters.len(),
        low = histogram.low(),
        high = histogram.high(),
        average = histogram.average_size(),
        "cluster sizes"
    );
    filter_clusters(clusters, Some(histogram.average_size()))
}

/// Reduce a noisy interval pool to the boundaries several stages agree on.
pub fn consensus(
    intervals: &[SampleClippingInterval],
    settings: &ConsensusSettings,
) -> Vec<SampleClippingInterval> {
    let begins = clip_boundaries(intervals, Side::Begin, settings.proximity_samples);
    let ends = clip_boundaries(intervals, Side::End, settings.proximity_samples);
    let refined = pair_boundaries(
        &begins,
        &ends,
        settings.maximum_clip_samples,
        settings.maximum_samples,
        settings.window,
    );
    info!(
        candidates = intervals.len(),
        begin_clusters = begins.len(),
        end_clusters = ends.len(),
        refined = refined.len(),
        "consensus"
    );
    refined
}

#[cfg(test)]
mod tests;
