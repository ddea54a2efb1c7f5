use super::*;
use approx::assert_relative_eq;

fn interval(begin: i64, end: i64) -> SampleClippingInterval {
    SampleClippingInterval::new(begin, end)
}

fn settings(length: usize) -> ConsensusSettings {
    ConsensusSettings {
        proximity_samples: 10,
        maximum_clip_samples: 27_000,
        maximum_samples: 1_000_000,
        window: PageWindow { start: 0, length },
    }
}

#[test]
fn test_separated_groups_form_two_clusters() {
    let clusters = cluster_indexes(&[100, 1, 102, 0, 2, 101], 5);
    assert_eq!(clusters, vec![vec![0, 1, 2], vec![100, 101, 102]]);
}

#[test]
fn test_chained_indexes_produce_overlapping_clusters() {
    let clusters = cluster_indexes(&[0, 3, 6, 9], 5);
    assert_eq!(clusters, vec![vec![0, 3], vec![3, 6], vec![6, 9]]);
}

#[test]
fn test_duplicates_share_a_cluster() {
    let clusters = cluster_indexes(&[40, 40, 40, 7], 0);
    assert_eq!(clusters, vec![vec![7], vec![40, 40, 40]]);
}

#[test]
fn test_empty_input_has_no_clusters() {
    assert!(cluster_indexes(&[], 5).is_empty());
    assert!(consensus(&[], &settings(10)).is_empty());
}

#[test]
fn test_histogram_summary() {
    let clusters = vec![vec![0, 1, 2], vec![10], vec![20, 21, 22]];
    let histogram = ClusterHistogram::from_clusters(&clusters);

    assert_eq!(histogram.frequencies.get(&3), Some(&2));
    assert_eq!(histogram.frequencies.get(&1), Some(&1));
    assert_eq!(histogram.low(), Some(1));
    assert_eq!(histogram.high(), Some(3));
    assert_eq!(histogram.frequency_range(), Some((1, 2)));
    assert_relative_eq!(histogram.average_size(), 7.0 / 3.0);
}

#[test]
fn test_empty_histogram_has_no_summary() {
    let histogram = ClusterHistogram::from_clusters(&[]);

    assert_eq!(histogram.cluster_count(), 0);
    assert_eq!(histogram.low(), None);
    assert_eq!(histogram.frequency_range(), None);
    assert_relative_eq!(histogram.average_size(), 0.0);
}

#[test]
fn test_filter_drops_below_average_clusters() {
    let clusters = vec![vec![0, 1, 2], vec![10], vec![20, 21, 22]];
    let kept = filter_clusters(clusters, None);

    assert_eq!(kept.len(), 2);
    assert_eq!((kept[0].min, kept[0].max), (0, 2));
    assert_eq!((kept[1].min, kept[1].max), (20, 22));
}

#[test]
fn test_pairing_respects_order_and_maximum_length() {
    let begins = filter_clusters(vec![vec![0], vec![100]], Some(0.0));
    let ends = filter_clusters(vec![vec![50], vec![150], vec![5_000]], Some(0.0));
    let window = PageWindow {
        start: 0,
        length: 10,
    };
    let pairs = pair_boundaries(&begins, &ends, 200, 1_000_000, window);

    let bounds: Vec<_> = pairs.iter().map(|i| (i.begin(), i.end())).collect();
    assert_eq!(bounds, vec![(0, 50), (0, 150), (100, 150)]);
    for pair in &pairs {
        assert!(pair.begin() < pair.end());
        assert!(pair.len() <= 200);
    }
}

#[test]
fn test_pairing_honours_page_window() {
    let begins = filter_clusters(vec![vec![0], vec![100]], Some(0.0));
    let ends = filter_clusters(vec![vec![50], vec![150]], Some(0.0));
    let window = PageWindow {
        start: 1,
        length: 1,
    };
    let pairs = pair_boundaries(&begins, &ends, 200, 1_000_000, window);
    assert_eq!(pairs, vec![interval(0, 150)]);
}

#[test]
fn test_consensus_keeps_agreed_boundaries() {
    let pool = vec![
        interval(999, 2_999),
        interval(1_000, 3_000),
        interval(1_001, 3_001),
        interval(4_999, 6_999),
        interval(5_000, 7_000),
        interval(5_001, 7_001),
        // a lone stage disagreeing with everything else
        interval(9_000, 9_500),
    ];
    let refined = consensus(&pool, &settings(10));

    assert_eq!(
        refined,
        vec![interval(999, 3_001), interval(999, 7_001), interval(4_999, 7_001)]
    );
}

#[test]
fn test_consensus_stops_after_requested_length() {
    let pool = vec![
        interval(1_000, 3_000),
        interval(1_000, 3_000),
        interval(5_000, 7_000),
        interval(5_000, 7_000),
    ];
    let refined = consensus(&pool, &settings(2));
    assert_eq!(refined.len(), 2);
}

#[test]
fn test_settings_follow_configuration() {
    let config = SlicerConfig::default();
    let settings = ConsensusSettings::from_config(&config, 44_100);
    assert_eq!(settings.proximity_samples, 3_307);
    assert_eq!(settings.maximum_clip_samples, 27 * 44_100);
    assert_eq!(settings.window, PageWindow { start: 0, length: 10 });
}
