//! Tests for density clustering

use std::sync::Arc;
use tripcluster::clustering::{core_distances, segment_by_reachability};
use tripcluster::{
    ClusterEvent, CollectingSink, DensityClusterer, DensityConfig, DiscardReason,
    DistanceWeights, PhotoId, PhotoRecord, SplitReason, Trip, TripClusterError,
};

const DAY: i64 = 86_400;
const FAR_FUTURE: i64 = 4_000_000_000;

/// `count` photos, `spacing` seconds apart, starting at `start`, no location.
fn burst(first_id: i64, start: i64, count: usize, spacing: i64) -> Vec<PhotoRecord> {
    (0..count as i64)
        .map(|i| PhotoRecord::new(first_id + i, start + i * spacing))
        .collect()
}

/// Same as `burst`, all at one place.
fn located_burst(
    first_id: i64,
    start: i64,
    count: usize,
    spacing: i64,
    lat: f64,
    lng: f64,
) -> Vec<PhotoRecord> {
    burst(first_id, start, count, spacing)
        .into_iter()
        .map(|p| p.with_coordinates(lat, lng))
        .collect()
}

fn ungated(config: DensityConfig) -> DensityConfig {
    DensityConfig {
        min_days_before_today: 0.0,
        ..config
    }
}

fn ids(trip: &Trip<PhotoRecord>) -> Vec<PhotoId> {
    trip.ids()
}

#[test]
fn test_time_only_clusters_split_on_long_gap() {
    let mut photos = burst(0, 0, 10, 600);
    photos.extend(burst(10, 2 * DAY, 10, 600));

    let trips = DensityClusterer::new(ungated(DensityConfig::default()))
        .cluster(photos, FAR_FUTURE)
        .unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].len(), 10);
    assert_eq!(trips[1].len(), 10);
    assert_eq!(trips[1].start(), Some(2 * DAY));
}

#[test]
fn test_core_distance_fewer_than_k_neighbours() {
    let photos = burst(0, 0, 5, 600);
    let core = core_distances(&photos, 5, &DistanceWeights::default());
    assert_eq!(core, vec![f64::MAX; 5]);
}

#[test]
fn test_core_distance_is_kth_nearest() {
    let photos = burst(0, 0, 6, 600);
    let core = core_distances(&photos, 5, &DistanceWeights::default());

    // First photo's neighbours are 10..50 minutes away; the 5th is 50 minutes
    let expected = 3000.0 / 3600.0 / 6.0;
    assert!((core[0] - expected).abs() < 1e-12);
    // Every photo has exactly five neighbours, so the farthest one decides
    assert!((core[5] - expected).abs() < 1e-12);
    assert!(core[2] < core[0]);
}

#[test]
fn test_tiny_working_set_becomes_singletons() {
    // Five photos have only four neighbours each: core distances are infinite
    let photos = burst(0, 0, 5, 60);
    let trips = DensityClusterer::new(ungated(DensityConfig {
        min_photos: 1,
        ..DensityConfig::default()
    }))
    .cluster(photos, FAR_FUTURE)
    .unwrap();

    assert_eq!(trips.len(), 5);
    assert!(trips.iter().all(|t| t.len() == 1));
}

#[test]
fn test_segment_by_reachability_threshold() {
    let photos = burst(0, 0, 4, 3600);
    let core = vec![0.0; 4];
    let weights = DistanceWeights::default();

    // One hour is 1/6 of a unit
    let together = segment_by_reachability(photos.clone(), &core, 0.2, &weights);
    assert_eq!(together.len(), 1);

    let apart = segment_by_reachability(photos, &core, 0.1, &weights);
    assert_eq!(apart.len(), 4);
}

#[test]
fn test_located_trips_split_by_place_and_time() {
    let mut photos = located_burst(0, 0, 10, 600, 48.8566, 2.3522);
    photos.extend(located_burst(10, 3 * DAY, 10, 600, 41.9028, 12.4964));

    let config = ungated(DensityConfig {
        threshold: 20.0,
        ..DensityConfig::default()
    });
    let trips = DensityClusterer::new(config).cluster(photos, FAR_FUTURE).unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(ids(&trips[0]), (0..10).map(PhotoId::Int).collect::<Vec<_>>());
    assert_eq!(ids(&trips[1]), (10..20).map(PhotoId::Int).collect::<Vec<_>>());
}

#[test]
fn test_unlocated_photos_reinjected() {
    let mut photos = located_burst(0, 0, 10, 600, 48.8566, 2.3522);
    photos.extend(located_burst(10, 3 * DAY, 10, 600, 41.9028, 12.4964));
    // Inside the Paris trip
    photos.push(PhotoRecord::new(100, 1800));
    // 40 minutes after the Paris trip ends, within the one-hour buffer
    photos.push(PhotoRecord::new(101, 5400 + 2400));
    // Two days in: closer to the Rome trip's start than to Paris' end
    photos.push(PhotoRecord::new(102, 2 * DAY));

    let config = ungated(DensityConfig {
        threshold: 20.0,
        ..DensityConfig::default()
    });
    let sink = Arc::new(CollectingSink::new());
    let trips = DensityClusterer::with_sink(config, sink.clone())
        .cluster(photos, FAR_FUTURE)
        .unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].len(), 12);
    assert_eq!(trips[1].len(), 11);

    let paris = ids(&trips[0]);
    assert!(paris.contains(&PhotoId::Int(100)));
    assert!(paris.contains(&PhotoId::Int(101)));
    assert_eq!(ids(&trips[1])[0], PhotoId::Int(102));

    // Re-sorted after insertion
    for trip in &trips {
        assert!(trip.photos.windows(2).all(|w| w[0].captured_at <= w[1].captured_at));
    }

    let assigned = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, ClusterEvent::PhotoAssigned { .. }))
        .count();
    assert_eq!(assigned, 3);
}

#[test]
fn test_unlocated_photos_dropped_without_trips() {
    // Enough located photos to skip the fallback, but a day apart: all singletons
    let mut photos: Vec<PhotoRecord> = (0..6)
        .map(|i| PhotoRecord::new(i, i * DAY).with_coordinates(48.8566, 2.3522))
        .collect();
    photos.push(PhotoRecord::new(100, 1200));

    let sink = Arc::new(CollectingSink::new());
    let trips = DensityClusterer::with_sink(
        ungated(DensityConfig {
            threshold: 20.0,
            ..DensityConfig::default()
        }),
        sink.clone(),
    )
    .cluster(photos, FAR_FUTURE)
    .unwrap();

    assert!(trips.is_empty());
    assert!(!sink
        .events()
        .iter()
        .any(|e| matches!(e, ClusterEvent::PhotoAssigned { .. })));
}

#[test]
fn test_recent_unlocated_photo_keeps_trip_open() {
    let now = 100 * DAY;
    let mut photos = located_burst(0, now - 10 * DAY, 10, 600, 48.8566, 2.3522);
    // Taken an hour ago, without coordinates
    photos.push(PhotoRecord::new(99, now - 3600));

    let sink = Arc::new(CollectingSink::new());
    let trips = DensityClusterer::with_sink(
        DensityConfig {
            threshold: 20.0,
            ..DensityConfig::default()
        },
        sink.clone(),
    )
    .cluster(photos, now)
    .unwrap();

    assert!(trips.is_empty());
    assert!(sink.events().iter().any(|e| matches!(
        e,
        ClusterEvent::TripDiscarded {
            photo_count: 11,
            reason: DiscardReason::Unfinished { .. }
        }
    )));
}

#[test]
fn test_in_progress_photos_stay_with_their_trip() {
    let now = 100 * DAY;
    // Trip finished 20 days ago, then one still going on
    let mut photos = located_burst(0, now - 20 * DAY, 10, 600, 48.8566, 2.3522);
    photos.extend(located_burst(10, now - 7200 - 5400, 10, 600, 41.9028, 12.4964));
    photos.push(PhotoRecord::new(99, now - 7200 + 600));

    let trips = DensityClusterer::new(DensityConfig {
        threshold: 20.0,
        ..DensityConfig::default()
    })
    .cluster(photos, now)
    .unwrap();

    assert_eq!(trips.len(), 1);
    assert_eq!(ids(&trips[0]), (0..10).map(PhotoId::Int).collect::<Vec<_>>());
    assert!(trips[0].is_finished(now, 3.0));
}

#[test]
fn test_fallback_clusters_everything_on_time() {
    let mut first = burst(0, 0, 10, 600);
    let mut second = burst(10, 2 * DAY, 10, 600);
    // Too few located photos to cluster on their own
    first[3] = first[3].clone().with_coordinates(48.8566, 2.3522);
    second[3] = second[3].clone().with_coordinates(41.9028, 12.4964);
    let photos: Vec<PhotoRecord> = first.into_iter().chain(second).collect();

    let sink = Arc::new(CollectingSink::new());
    let trips = DensityClusterer::with_sink(ungated(DensityConfig::default()), sink.clone())
        .cluster(photos, FAR_FUTURE)
        .unwrap();

    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].len(), 10);
    assert_eq!(trips[1].len(), 10);
    assert!(sink.events().contains(&ClusterEvent::Fallback {
        with_location: 2,
        min_photos: 5,
    }));
}

#[test]
fn test_finish_gate_uses_density_default() {
    let photos = burst(0, 0, 10, 600);
    let last = 9 * 600;
    let clusterer = DensityClusterer::new(DensityConfig::default());

    assert!(clusterer.cluster(photos.clone(), last + 2 * DAY).unwrap().is_empty());
    assert_eq!(clusterer.cluster(photos, last + 3 * DAY).unwrap().len(), 1);
}

#[test]
fn test_min_photos_filter() {
    let mut photos = burst(0, 0, 10, 600);
    photos.extend(burst(10, 5 * DAY, 10, 600));

    let trips = DensityClusterer::new(ungated(DensityConfig {
        min_photos: 11,
        ..DensityConfig::default()
    }))
    .cluster(photos, FAR_FUTURE)
    .unwrap();

    assert!(trips.is_empty());
}

#[test]
fn test_split_events_use_reachability() {
    let mut photos = burst(0, 0, 10, 600);
    photos.extend(burst(10, 2 * DAY, 10, 600));

    let sink = Arc::new(CollectingSink::new());
    DensityClusterer::with_sink(ungated(DensityConfig::default()), sink.clone())
        .cluster(photos, FAR_FUTURE)
        .unwrap();

    let splits: Vec<usize> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ClusterEvent::Split {
                index,
                reason: SplitReason::Reachability { mutual, threshold },
            } => {
                assert!(mutual > threshold);
                Some(index)
            }
            _ => None,
        })
        .collect();
    assert_eq!(splits, vec![10]);
}

#[test]
fn test_empty_input() {
    let trips = DensityClusterer::new(DensityConfig::default())
        .cluster(Vec::<PhotoRecord>::new(), FAR_FUTURE)
        .unwrap();
    assert!(trips.is_empty());
}

#[test]
fn test_borrowed_handles() {
    let photos = burst(0, 0, 10, 600);
    let refs: Vec<&PhotoRecord> = photos.iter().collect();

    let trips = DensityClusterer::new(ungated(DensityConfig::default()))
        .cluster(refs, FAR_FUTURE)
        .unwrap();

    assert_eq!(trips.len(), 1);
    assert!(std::ptr::eq(trips[0].photos[0], &photos[0]));
}

#[test]
fn test_parameter_validation() {
    let cases = [
        DensityConfig {
            time_weight: 0.0,
            location_weight: 0.0,
            ..DensityConfig::default()
        },
        DensityConfig {
            threshold: f64::NAN,
            ..DensityConfig::default()
        },
        DensityConfig {
            min_core_neighbors: 0,
            ..DensityConfig::default()
        },
        DensityConfig {
            min_days_before_today: -1.0,
            ..DensityConfig::default()
        },
    ];

    for config in cases {
        let result = DensityClusterer::new(config).cluster(burst(0, 0, 3, 60), FAR_FUTURE);
        assert!(matches!(
            result,
            Err(TripClusterError::DegenerateWeights { .. })
                | Err(TripClusterError::InvalidParameter { .. })
        ));
    }
}

#[test]
fn test_repeated_calls_do_not_share_state() {
    let mut photos = burst(0, 0, 10, 600);
    photos.extend(burst(10, 2 * DAY, 10, 600));

    let clusterer = DensityClusterer::new(ungated(DensityConfig::default()));
    let first = clusterer.cluster(photos.clone(), FAR_FUTURE).unwrap();
    // A call on a different working set in between
    clusterer.cluster(burst(50, 0, 7, 60), FAR_FUTURE).unwrap();
    let second = clusterer.cluster(photos, FAR_FUTURE).unwrap();

    assert_eq!(first, second);
}
