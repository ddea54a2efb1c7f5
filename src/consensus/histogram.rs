use std::collections::BTreeMap;

/// Cluster size → number of clusters of that size
///
/// [`low`](Self::low), [`high`](Self::high) and [`average_size`](Self::average_size) summarize
/// cluster sizes, the keys of `frequencies`. [`frequency_range`](Self::frequency_range)
/// summarizes the values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterHistogram {
    pub frequencies: BTreeMap<usize, usize>,
}

impl ClusterHistogram {
    pub fn from_clusters(clusters: &[Vec<usize>]) -> Self {
        let mut frequencies = BTreeMap::new();
        for cluster in clusters {
            *frequencies.entry(cluster.len()).or_insert(0) += 1;
        }
        Self { frequencies }
    }

    pub fn cluster_count(&self) -> usize {
        self.frequencies.values().sum()
    }

    /// Smallest cluster size present. This is a size, not a frequency.
    pub fn low(&self) -> Option<usize> {
        self.frequencies.keys().next().copied()
    }

    /// Largest cluster size present. This is a size, not a frequency.
    pub fn high(&self) -> Option<usize> {
        self.frequencies.keys().next_back().copied()
    }

    /// Fewest and most clusters sharing one size
    pub fn frequency_range(&self) -> Option<(usize, usize)> {
        let low = self.frequencies.values().min()?;
        let high = self.frequencies.values().max()?;
        Some((*low, *high))
    }

    /// Mean cluster size, 0 without clusters. This is the default filter threshold.
    pub fn average_size(&self) -> f64 {
        let count = self.cluster_count();
        if count == 0 {
            return 0.0;
        }
        let members: usize = self
            .frequencies
            .iter()
            .map(|(size, frequency)| size * frequency)
            .sum();
        members as f64 / count as f64
    }
}
