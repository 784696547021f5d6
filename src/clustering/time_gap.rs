//! Time-gap trip clustering.
//!
//! Single pass over time-sorted photos. A new trip starts whenever the gap
//! to the previous photo exceeds the maximum, or when two consecutive photos
//! carry unrelated place names.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{accept_candidate, Algorithm};
use crate::diagnostics::{ClusterEvent, DiagnosticSink, LogSink, SplitReason};
use crate::error::{ensure_at_least, Result};
use crate::finish_gate::{FinishGate, TIME_GAP_MIN_DAYS_BEFORE_TODAY};
use crate::{sort_by_capture_time, Photo, Trip, UNKNOWN_LOCATION};

/// Configuration for time-gap clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGapConfig {
    /// Largest gap between consecutive photos that stays within one trip.
    /// Default: 172800 seconds (2 days)
    pub max_time_gap_seconds: u64,

    /// Minimum photos for a trip to be reported.
    /// Default: 5
    pub min_photos: usize,

    /// Days the latest photo must be in the past before a trip is reported.
    /// Default: 5.0
    pub min_days_before_today: f64,
}

impl Default for TimeGapConfig {
    fn default() -> Self {
        Self {
            max_time_gap_seconds: 172_800,
            min_photos: 5,
            min_days_before_today: TIME_GAP_MIN_DAYS_BEFORE_TODAY,
        }
    }
}

impl TimeGapConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_at_least("min_days_before_today", self.min_days_before_today, 0.0)
    }
}

/// Whether two place names describe the same area.
///
/// Deliberately loose: either name containing the other counts, so
/// "Paris, France" and "France" are related.
pub fn locations_related(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Place label of a photo, defaulting to [`UNKNOWN_LOCATION`].
fn label_of<P: Photo>(photo: &P) -> &str {
    photo.location_label().unwrap_or(UNKNOWN_LOCATION)
}

/// True when both labels are known, differ, and are unrelated.
fn is_location_change(previous: &str, current: &str) -> bool {
    previous != UNKNOWN_LOCATION
        && current != UNKNOWN_LOCATION
        && previous != current
        && !locations_related(previous, current)
}

/// Time-gap trip clusterer.
#[derive(Clone)]
pub struct TimeGapClusterer {
    config: TimeGapConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl TimeGapClusterer {
    /// Clusterer reporting to the `log` facade.
    pub fn new(config: TimeGapConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    pub fn with_sink(config: TimeGapConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &TimeGapConfig {
        &self.config
    }

    /// Group photos into trips.
    ///
    /// Photos are sorted by capture time first. Candidates smaller than
    /// `min_photos` or still too recent relative to `now` are dropped.
    pub fn cluster<P: Photo>(&self, mut photos: Vec<P>, now: i64) -> Result<Vec<Trip<P>>> {
        self.config.validate()?;

        self.sink.record(&ClusterEvent::Started {
            algorithm: Algorithm::TimeGap,
            photo_count: photos.len(),
        });

        sort_by_capture_time(&mut photos);

        let gate = FinishGate::new(self.config.min_days_before_today);
        let max_gap = i128::from(self.config.max_time_gap_seconds);

        let mut trips = Vec::new();
        let mut current: Vec<P> = Vec::new();

        for (index, photo) in photos.into_iter().enumerate() {
            let split = match current.last() {
                None => None,
                Some(previous) => {
                    let gap = i128::from(photo.captured_at()) - i128::from(previous.captured_at());
                    let from = label_of(previous);
                    let to = label_of(&photo);

                    // A location change wins over a time gap when both apply
                    if is_location_change(from, to) {
                        Some(SplitReason::LocationChange {
                            from: from.to_string(),
                            to: to.to_string(),
                        })
                    } else if gap > max_gap {
                        Some(SplitReason::TimeGap {
                            gap_seconds: i64::try_from(gap).unwrap_or(i64::MAX),
                        })
                    } else {
                        None
                    }
                }
            };

            if let Some(reason) = split {
                self.sink.record(&ClusterEvent::Split { index, reason });
                let finished = std::mem::take(&mut current);
                self.close(finished, &gate, now, &mut trips);
            }

            current.push(photo);
        }

        self.close(current, &gate, now, &mut trips);

        self.sink.record(&ClusterEvent::Finished {
            algorithm: Algorithm::TimeGap,
            trip_count: trips.len(),
        });

        Ok(trips)
    }

    fn close<P: Photo>(
        &self,
        candidate: Vec<P>,
        gate: &FinishGate,
        now: i64,
        trips: &mut Vec<Trip<P>>,
    ) {
        if accept_candidate(&candidate, self.config.min_photos, gate, now, &self.sink) {
            trips.push(Trip::new(candidate));
        }
    }
}
