//! Density-based trip clustering (HDBSCAN-inspired).
//!
//! ## Algorithm
//! 1. Sort photos by capture time
//! 2. If enough photos carry coordinates, cluster only those; otherwise
//!    cluster everything on time alone
//! 3. Core distance of each photo = distance to its k-th nearest neighbour
//! 4. Walk the time-ordered photos; split wherever the mutual reachability
//!    distance `max(direct, core(prev), core(cur))` exceeds the threshold
//! 5. Drop candidates that are too small
//! 6. Attach photos without coordinates to the trip covering their time
//!    (±1 hour), or to the trip with the nearest edge
//! 7. Drop trips that are still in progress, judged with the attached
//!    photos included
//!
//! This is segmentation of a time series, not a graph clustering: density
//! only enters through how each edge between neighbours is weighted.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{meets_min_photos, passes_finish_gate, Algorithm};
use crate::diagnostics::{ClusterEvent, DiagnosticSink, LogSink, NoopSink, SplitReason};
use crate::distance::{sample_distance, DistanceWeights, Sample};
use crate::error::{ensure_at_least, Result, TripClusterError};
use crate::finish_gate::{FinishGate, DENSITY_MIN_DAYS_BEFORE_TODAY};
use crate::{sort_by_capture_time, Photo, Trip};

/// Neighbour rank used for core distances.
pub const MIN_CORE_NEIGHBORS: usize = 5;

/// Default split threshold in the normalised distance space.
/// Lower values give more, smaller trips.
pub const TRIP_BOUNDARY_THRESHOLD: f64 = 0.25;

/// Grid cell size in degrees for a spatial pre-index. The all-pairs core
/// distance pass does not need it.
pub const GEO_GRID_SIZE: f64 = 0.05;

/// Slack around a trip's time range when attaching photos without location.
const UNLOCATED_BUFFER_SECONDS: i64 = 3600;

/// Configuration for density clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Minimum photos for a trip to be reported.
    /// Default: 5
    pub min_photos: usize,

    /// Mutual reachability distance above which a new trip starts.
    /// Default: 0.25
    pub threshold: f64,

    /// Weight of elapsed time in the distance model.
    /// Default: 0.7
    pub time_weight: f64,

    /// Weight of geographic distance in the distance model.
    /// Default: 0.3
    pub location_weight: f64,

    /// Neighbour rank for core distances.
    /// Default: 5
    pub min_core_neighbors: usize,

    /// Days the latest photo must be in the past before a trip is reported.
    /// Default: 3.0
    pub min_days_before_today: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            min_photos: 5,
            threshold: TRIP_BOUNDARY_THRESHOLD,
            time_weight: 0.7,
            location_weight: 0.3,
            min_core_neighbors: MIN_CORE_NEIGHBORS,
            min_days_before_today: DENSITY_MIN_DAYS_BEFORE_TODAY,
        }
    }
}

impl DensityConfig {
    pub fn weights(&self) -> DistanceWeights {
        DistanceWeights {
            time: self.time_weight,
            location: self.location_weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.weights().validate()?;
        ensure_at_least("threshold", self.threshold, 0.0)?;
        ensure_at_least("min_days_before_today", self.min_days_before_today, 0.0)?;
        if self.min_core_neighbors == 0 {
            return Err(TripClusterError::InvalidParameter {
                name: "min_core_neighbors",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Core distance of every photo: distance to its `k`-th nearest neighbour.
///
/// `f64::MAX` for photos with fewer than `k` neighbours. Results do not
/// depend on the `parallel` feature.
pub fn core_distances<P: Photo>(photos: &[P], k: usize, weights: &DistanceWeights) -> Vec<f64> {
    let samples: Vec<Sample> = photos.iter().map(Sample::of).collect();
    core_distances_of(&samples, k, weights)
}

fn core_distances_of(samples: &[Sample], k: usize, weights: &DistanceWeights) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        (0..samples.len())
            .into_par_iter()
            .map(|i| core_distance_at(samples, i, k, weights))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..samples.len())
            .map(|i| core_distance_at(samples, i, k, weights))
            .collect()
    }
}

fn core_distance_at(samples: &[Sample], i: usize, k: usize, weights: &DistanceWeights) -> f64 {
    if k == 0 || samples.len().saturating_sub(1) < k {
        return f64::MAX;
    }

    let origin = &samples[i];
    let mut distances: Vec<f64> = samples
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .map(|(_, other)| sample_distance(origin, other, weights))
        .collect();

    // k-th smallest; same value a full sort would put at index k - 1
    let (_, kth, _) = distances.select_nth_unstable_by(k - 1, f64::total_cmp);
    *kth
}

/// Split time-sorted photos wherever mutual reachability exceeds `threshold`.
///
/// `core` must be aligned with `photos`; missing entries count as `f64::MAX`.
pub fn segment_by_reachability<P: Photo>(
    photos: Vec<P>,
    core: &[f64],
    threshold: f64,
    weights: &DistanceWeights,
) -> Vec<Vec<P>> {
    segment(photos, core, threshold, weights, &NoopSink)
}

fn segment<P: Photo>(
    photos: Vec<P>,
    core: &[f64],
    threshold: f64,
    weights: &DistanceWeights,
    sink: &dyn DiagnosticSink,
) -> Vec<Vec<P>> {
    let mut segments = Vec::new();
    let mut current: Vec<P> = Vec::new();
    let mut previous: Option<(Sample, f64)> = None;

    for (index, photo) in photos.into_iter().enumerate() {
        let sample = Sample::of(&photo);
        let core_current = core.get(index).copied().unwrap_or(f64::MAX);

        if let Some((prev_sample, core_prev)) = previous {
            let direct = sample_distance(&prev_sample, &sample, weights);
            let mutual = direct.max(core_prev).max(core_current);

            if mutual > threshold {
                sink.record(&ClusterEvent::Split {
                    index,
                    reason: SplitReason::Reachability { mutual, threshold },
                });
                segments.push(std::mem::take(&mut current));
            }
        }

        current.push(photo);
        previous = Some((sample, core_current));
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Index of the trip that should receive a photo taken at `t`.
///
/// The first range containing `t` wins; otherwise the trip with the nearest
/// edge, earlier trips winning ties.
fn nearest_trip(ranges: &[(i64, i64)], t: i64) -> Option<usize> {
    let mut best: Option<(usize, i128)> = None;

    for (index, &(start, end)) in ranges.iter().enumerate() {
        if t >= start && t <= end {
            return Some(index);
        }

        let t = i128::from(t);
        let diff = (t - i128::from(start))
            .abs()
            .min((t - i128::from(end)).abs());

        if best.map_or(true, |(_, best_diff)| diff < best_diff) {
            best = Some((index, diff));
        }
    }

    best.map(|(index, _)| index)
}

/// Density-based trip clusterer.
#[derive(Clone)]
pub struct DensityClusterer {
    config: DensityConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl DensityClusterer {
    /// Clusterer reporting to the `log` facade.
    pub fn new(config: DensityConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    pub fn with_sink(config: DensityConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &DensityConfig {
        &self.config
    }

    /// Group photos into trips.
    ///
    /// Core distances are recomputed on every call.
    pub fn cluster<P: Photo>(&self, mut photos: Vec<P>, now: i64) -> Result<Vec<Trip<P>>> {
        self.config.validate()?;

        self.sink.record(&ClusterEvent::Started {
            algorithm: Algorithm::Hdbscan,
            photo_count: photos.len(),
        });

        sort_by_capture_time(&mut photos);

        let weights = self.config.weights();
        let gate = FinishGate::new(self.config.min_days_before_today);

        let located = photos.iter().filter(|p| p.has_location()).count();
        self.sink.record(&ClusterEvent::Partitioned {
            with_location: located,
            without_location: photos.len() - located,
        });

        let trips = if located < self.config.min_photos {
            self.sink.record(&ClusterEvent::Fallback {
                with_location: located,
                min_photos: self.config.min_photos,
            });
            self.density_trips(photos, &weights)
        } else {
            let (with_location, without_location): (Vec<P>, Vec<P>) =
                photos.into_iter().partition(|p| p.has_location());

            let mut trips = self.density_trips(with_location, &weights);
            if !trips.is_empty() && !without_location.is_empty() {
                self.assign_unlocated(&mut trips, without_location);
            }
            trips
        };

        // Gate after re-injection, so a recent photo keeps its trip open
        let trips: Vec<Trip<P>> = trips
            .into_iter()
            .filter(|trip| passes_finish_gate(&trip.photos, &gate, now, &self.sink))
            .collect();

        self.sink.record(&ClusterEvent::Finished {
            algorithm: Algorithm::Hdbscan,
            trip_count: trips.len(),
        });

        Ok(trips)
    }

    /// Segment and drop undersized candidates. No recency check here.
    fn density_trips<P: Photo>(&self, photos: Vec<P>, weights: &DistanceWeights) -> Vec<Trip<P>> {
        if photos.is_empty() {
            return Vec::new();
        }

        let core = core_distances(&photos, self.config.min_core_neighbors, weights);

        segment(photos, &core, self.config.threshold, weights, self.sink.as_ref())
            .into_iter()
            .filter(|candidate| meets_min_photos(candidate, self.config.min_photos, &self.sink))
            .map(Trip::new)
            .collect()
    }

    /// Attach photos without coordinates to existing trips by capture time.
    ///
    /// `unlocated` must be time-sorted. Trip ranges are taken before any
    /// photo is attached.
    fn assign_unlocated<P: Photo>(&self, trips: &mut [Trip<P>], unlocated: Vec<P>) {
        let ranges: Vec<(i64, i64)> = trips
            .iter()
            .map(|trip| {
                let start = trip.start().unwrap_or(i64::MAX);
                let end = trip.end().unwrap_or(i64::MIN);
                (
                    start.saturating_sub(UNLOCATED_BUFFER_SECONDS),
                    end.saturating_add(UNLOCATED_BUFFER_SECONDS),
                )
            })
            .collect();

        let mut touched = vec![false; trips.len()];

        for photo in unlocated {
            let Some(trip_index) = nearest_trip(&ranges, photo.captured_at()) else {
                continue;
            };

            self.sink.record(&ClusterEvent::PhotoAssigned {
                photo_id: photo.id(),
                trip_index,
            });
            trips[trip_index].photos.push(photo);
            touched[trip_index] = true;
        }

        for (trip, touched) in trips.iter_mut().zip(touched) {
            if touched {
                sort_by_capture_time(&mut trip.photos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_trip_prefers_containing_range() {
        let ranges = [(0, 100), (200, 300)];
        assert_eq!(nearest_trip(&ranges, 250), Some(1));
        assert_eq!(nearest_trip(&ranges, 100), Some(0));
    }

    #[test]
    fn test_nearest_trip_by_edge() {
        let ranges = [(0, 100), (200, 300)];
        assert_eq!(nearest_trip(&ranges, 120), Some(0));
        assert_eq!(nearest_trip(&ranges, 190), Some(1));
        // Equidistant: earlier trip wins
        assert_eq!(nearest_trip(&ranges, 150), Some(0));
        assert_eq!(nearest_trip(&ranges, 10_000), Some(1));
    }

    #[test]
    fn test_nearest_trip_empty() {
        assert_eq!(nearest_trip(&[], 0), None);
    }
}
