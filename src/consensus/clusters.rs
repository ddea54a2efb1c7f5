use super::histogram::ClusterHistogram;

/// A group of nearby boundary indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Ascending member indexes
    pub members: Vec<usize>,
    pub min: usize,
    pub max: usize,
}

impl Cluster {
    pub(super) fn from_sorted(members: Vec<usize>) -> Option<Self> {
        let min = *members.first()?;
        let max = *members.last()?;
        Some(Self { members, min, max })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Group indexes that lie within `proximity` of each other.
///
/// The sweep runs from the largest index down. A cluster grows while the next index is within
/// `proximity` of both the current trailing member and the cluster's leading member. When the
/// cluster was cut short by its own span rather than by a gap, the next sweep restarts a
/// quarter proximity above the trailing member, so neighbouring clusters may share members.
/// Clusters are returned in ascending order.
pub fn cluster_indexes(indexes: &[usize], proximity: usize) -> Vec<Vec<usize>> {
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    if sorted.is_empty() {
        return Vec::new();
    }

    let mut clusters = Vec::new();
    let mut lead = sorted.len() - 1;
    loop {
        let leading = sorted[lead];
        let mut trail = lead;
        while trail > 0 {
            let candidate = sorted[trail - 1];
            if sorted[trail] - candidate > proximity || leading - candidate > proximity {
                break;
            }
            trail -= 1;
        }
        clusters.push(sorted[trail..=lead].to_vec());
        if trail == 0 {
            break;
        }

        let trailing = sorted[trail];
        let chained = trailing - sorted[trail - 1] <= proximity;
        lead = if chained {
            // sorted[trail] itself is within the ceiling, so this stays in trail..lead
            let ceiling = trailing + proximity / 4;
            sorted[..lead].partition_point(|&value| value <= ceiling) - 1
        } else {
            trail - 1
        };
    }

    clusters.reverse();
    clusters
}

/// Keep clusters with at least `threshold` members; the default threshold is the average
/// cluster size.
pub fn filter_clusters(clusters: Vec<Vec<usize>>, threshold: Option<f64>) -> Vec<Cluster> {
    let threshold =
        threshold.unwrap_or_else(|| ClusterHistogram::from_clusters(&clusters).average_size());
    clusters
        .into_iter()
        .filter(|members| members.len() as f64 >= threshold)
        .filter_map(Cluster::from_sorted)
        .collect()
}
