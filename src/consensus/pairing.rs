use std::collections::BTreeSet;

use tracing::debug;

use super::clusters::Cluster;
use crate::types::SampleClippingInterval;

/// `(start, length)` slice of the candidate pairs to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub length: usize,
}

/// Pair every begin-cluster minimum with every end-cluster maximum that lies after it and
/// within `maximum_clip_samples`, in ascending (begin, end) order.
pub fn pair_boundaries(
    begins: &[Cluster],
    ends: &[Cluster],
    maximum_clip_samples: usize,
    maximum_samples: usize,
    window: PageWindow,
) -> Vec<SampleClippingInterval> {
    let begin_points: BTreeSet<usize> = begins.iter().map(|cluster| cluster.min).collect();
    let end_points: BTreeSet<usize> = ends.iter().map(|cluster| cluster.max).collect();

    let pairs: Vec<_> = begin_points
        .iter()
        .flat_map(|&begin| {
            end_points
                .range(begin + 1..)
                .take_while(move |&&end| end - begin <= maximum_clip_samples)
                .map(move |&end| (begin, end))
        })
        .skip(window.start)
        .take(window.length)
        .map(|(begin, end)| {
            SampleClippingInterval::with_ceiling(begin as i64, end as i64, maximum_samples)
        })
        .collect();

    debug!(
        begins = begin_points.len(),
        ends = end_points.len(),
        emitted = pairs.len(),
        "paired boundaries"
    );
    pairs
}
