//! End-to-end tests on generated photo collections with known trips
//!
//! Run with: `cargo test --features synthetic --test synthetic_scenarios`

#![cfg(feature = "synthetic")]

use std::sync::Arc;
use tripcluster::synthetic::{SyntheticDataset, SyntheticScenario};
use tripcluster::{
    Algorithm, DensityClusterer, DensityConfig, DetectionConfig, NoopSink, PhotoId, PhotoRecord,
    TimeGapClusterer, TimeGapConfig, Trip, TripDetector,
};

const DAY: i64 = 86_400;

fn trip_ids(trips: &[Trip<PhotoRecord>]) -> Vec<Vec<PhotoId>> {
    trips.iter().map(|t| t.ids()).collect()
}

fn settled(dataset: &SyntheticDataset) -> i64 {
    dataset.last_timestamp() + 30 * DAY
}

#[test]
fn test_density_recovers_weekend_trips() {
    let dataset = SyntheticScenario::weekend_trips().generate();
    let clusterer = DensityClusterer::with_sink(DensityConfig::default(), Arc::new(NoopSink));

    let trips = clusterer
        .cluster(dataset.photos.clone(), settled(&dataset))
        .unwrap();

    assert_eq!(trip_ids(&trips), dataset.expected_trips);
}

#[test]
fn test_time_gap_recovers_weekend_trips() {
    let dataset = SyntheticScenario::weekend_trips().generate();
    let clusterer = TimeGapClusterer::with_sink(TimeGapConfig::default(), Arc::new(NoopSink));

    let trips = clusterer
        .cluster(dataset.photos.clone(), settled(&dataset))
        .unwrap();

    assert_eq!(trip_ids(&trips), dataset.expected_trips);
}

#[test]
fn test_sparse_geodata_reinjects_unlocated_photos() {
    let dataset = SyntheticScenario::sparse_geodata().generate();
    let clusterer = DensityClusterer::with_sink(
        DensityConfig {
            threshold: 1.0,
            ..DensityConfig::default()
        },
        Arc::new(NoopSink),
    );

    let trips = clusterer
        .cluster(dataset.photos.clone(), settled(&dataset))
        .unwrap();

    assert_eq!(trip_ids(&trips), dataset.expected_trips);
}

#[test]
fn test_most_recent_trip_held_back() {
    let dataset = SyntheticScenario::weekend_trips().generate();
    let clusterer = DensityClusterer::with_sink(DensityConfig::default(), Arc::new(NoopSink));

    // One day after the last photo: the final trip may still be going on
    let trips = clusterer
        .cluster(dataset.photos.clone(), dataset.last_timestamp() + DAY)
        .unwrap();

    assert_eq!(trip_ids(&trips), dataset.expected_trips[..4].to_vec());
}

#[test]
fn test_borrowed_dataset() {
    let dataset = SyntheticScenario::scaling(8, 12).generate();
    let clusterer = DensityClusterer::with_sink(DensityConfig::default(), Arc::new(NoopSink));

    let trips = clusterer
        .cluster(dataset.photos.iter().collect::<Vec<_>>(), settled(&dataset))
        .unwrap();

    assert_eq!(trips.len(), 8);
    // Still the caller's records, not copies
    assert!(std::ptr::eq(trips[0].photos[0], &dataset.photos[0]));
}

#[test]
fn test_detector_names_trips() {
    let dataset = SyntheticScenario::weekend_trips().generate();

    for algorithm in [Algorithm::Hdbscan, Algorithm::TimeGap] {
        let detector = TripDetector::with_sink(
            DetectionConfig {
                algorithm,
                ..DetectionConfig::default()
            },
            Arc::new(NoopSink),
        );
        let trips = detector
            .detect(dataset.photos.clone(), settled(&dataset))
            .unwrap();

        assert_eq!(trips.len(), 5);
        // Starts on 2023-11-14, then a week later
        assert_eq!(trips[0].summary.season, "Fall");
        assert_eq!(trips[1].summary.season, "Late Fall");
        assert_eq!(trips[0].name(), "Fall in Unknown Location");
        assert!(trips.iter().all(|t| t.summary.distance_km < 1.0));
    }
}
