//! Diagnostics sink injected into the clusterers.
//!
//! Clusterers report what they decide as structured [`ClusterEvent`]s.
//! Sinks only observe; nothing they do feeds back into clustering.
//! Events are emitted from the calling thread, but sinks must be
//! `Send + Sync` so one sink can be shared between clusterers.

use log::{debug, info};
use std::fmt;
use std::sync::Mutex;

use crate::clustering::Algorithm;
use crate::PhotoId;

/// Why a new trip was started.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitReason {
    /// Gap between consecutive photos exceeded the maximum.
    TimeGap { gap_seconds: i64 },
    /// Consecutive photos carry unrelated place names.
    LocationChange { from: String, to: String },
    /// Mutual reachability distance exceeded the threshold.
    Reachability { mutual: f64, threshold: f64 },
}

/// Why a candidate trip was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscardReason {
    TooSmall {
        min_photos: usize,
    },
    /// Most recent photo is too close to "now"; the trip may still be going on.
    Unfinished {
        days_since_last_photo: f64,
        min_days_before_today: f64,
    },
}

/// A single clustering decision.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterEvent {
    Started {
        algorithm: Algorithm,
        photo_count: usize,
    },
    Partitioned {
        with_location: usize,
        without_location: usize,
    },
    /// Too few located photos, so every photo is clustered on time alone.
    Fallback {
        with_location: usize,
        min_photos: usize,
    },
    /// A new trip starts at `index` in the working set.
    Split {
        index: usize,
        reason: SplitReason,
    },
    TripAccepted {
        photo_count: usize,
    },
    TripDiscarded {
        photo_count: usize,
        reason: DiscardReason,
    },
    /// A photo without location was attached to trip `trip_index`.
    PhotoAssigned {
        photo_id: PhotoId,
        trip_index: usize,
    },
    Finished {
        algorithm: Algorithm,
        trip_count: usize,
    },
}

impl fmt::Display for ClusterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterEvent::Started {
                algorithm,
                photo_count,
            } => write!(f, "starting {} clustering with {} photos", algorithm, photo_count),
            ClusterEvent::Partitioned {
                with_location,
                without_location,
            } => write!(
                f,
                "{} photos have location data, {} do not",
                with_location, without_location
            ),
            ClusterEvent::Fallback {
                with_location,
                min_photos,
            } => write!(
                f,
                "only {} located photos (< {}), clustering all photos",
                with_location, min_photos
            ),
            ClusterEvent::Split { index, reason } => match reason {
                SplitReason::TimeGap { gap_seconds } => write!(
                    f,
                    "new trip at photo {}: time gap {}s ({:.2} days)",
                    index,
                    gap_seconds,
                    *gap_seconds as f64 / 86_400.0
                ),
                SplitReason::LocationChange { from, to } => {
                    write!(f, "new trip at photo {}: location change {} -> {}", index, from, to)
                }
                SplitReason::Reachability { mutual, threshold } => write!(
                    f,
                    "new trip at photo {}: mutual reachability {:.4} > {}",
                    index, mutual, threshold
                ),
            },
            ClusterEvent::TripAccepted { photo_count } => {
                write!(f, "accepted trip with {} photos", photo_count)
            }
            ClusterEvent::TripDiscarded {
                photo_count,
                reason,
            } => match reason {
                DiscardReason::TooSmall { min_photos } => write!(
                    f,
                    "discarded trip with {} photos (minimum is {})",
                    photo_count, min_photos
                ),
                DiscardReason::Unfinished {
                    days_since_last_photo,
                    min_days_before_today,
                } => write!(
                    f,
                    "skipped trip with {} photos: last photo {:.2} days ago (< {}), might be unfinished",
                    photo_count, days_since_last_photo, min_days_before_today
                ),
            },
            ClusterEvent::PhotoAssigned {
                photo_id,
                trip_index,
            } => write!(f, "assigned photo {} to trip {}", photo_id, trip_index + 1),
            ClusterEvent::Finished {
                algorithm,
                trip_count,
            } => write!(f, "{} clustering completed, found {} trips", algorithm, trip_count),
        }
    }
}

/// Receiver for clustering diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: &ClusterEvent);
}

/// Forwards events to the `log` facade. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, event: &ClusterEvent) {
        match event {
            ClusterEvent::Finished { .. } => info!("[TripCluster] {}", event),
            _ => debug!("[TripCluster] {}", event),
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _event: &ClusterEvent) {}
}

/// Keeps every event in memory. Useful in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ClusterEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<ClusterEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, event: &ClusterEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
