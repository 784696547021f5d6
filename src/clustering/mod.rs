//! Trip clustering strategies.
//!
//! Two strategies share the distance model and the finish gate:
//! - [`TimeGapClusterer`]: splits on hard time gaps and place-name changes
//! - [`DensityClusterer`]: HDBSCAN-inspired segmentation on mutual
//!   reachability distance
//!
//! [`TripClusterer`] wraps either one so callers can switch strategies
//! without touching anything else.

pub mod density;
pub mod time_gap;

pub use density::{
    core_distances, segment_by_reachability, DensityClusterer, DensityConfig, GEO_GRID_SIZE,
    MIN_CORE_NEIGHBORS, TRIP_BOUNDARY_THRESHOLD,
};
pub use time_gap::{locations_related, TimeGapClusterer, TimeGapConfig};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::diagnostics::{ClusterEvent, DiagnosticSink, DiscardReason};
use crate::error::{Result, TripClusterError};
use crate::finish_gate::{days_since_last_photo, FinishGate};
use crate::{Photo, Trip};

/// Clustering strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Time-gap segmentation
    TimeGap,
    /// Density (HDBSCAN-inspired) segmentation
    #[default]
    Hdbscan,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::TimeGap => "timegap",
            Algorithm::Hdbscan => "hdbscan",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = TripClusterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timegap" | "time-gap" | "time_gap" => Ok(Algorithm::TimeGap),
            "hdbscan" | "density" => Ok(Algorithm::Hdbscan),
            other => Err(TripClusterError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// One clustering capability, two interchangeable strategies.
#[derive(Clone)]
pub enum TripClusterer {
    TimeGap(TimeGapClusterer),
    Density(DensityClusterer),
}

impl TripClusterer {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TripClusterer::TimeGap(_) => Algorithm::TimeGap,
            TripClusterer::Density(_) => Algorithm::Hdbscan,
        }
    }

    /// Group `photos` into trips. `now` feeds the finish gate.
    pub fn cluster<P: Photo>(&self, photos: Vec<P>, now: i64) -> Result<Vec<Trip<P>>> {
        match self {
            TripClusterer::TimeGap(clusterer) => clusterer.cluster(photos, now),
            TripClusterer::Density(clusterer) => clusterer.cluster(photos, now),
        }
    }
}

impl std::fmt::Debug for TripClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripClusterer::TimeGap(c) => f.debug_tuple("TimeGap").field(c.config()).finish(),
            TripClusterer::Density(c) => f.debug_tuple("Density").field(c.config()).finish(),
        }
    }
}

impl From<TimeGapClusterer> for TripClusterer {
    fn from(clusterer: TimeGapClusterer) -> Self {
        TripClusterer::TimeGap(clusterer)
    }
}

impl From<DensityClusterer> for TripClusterer {
    fn from(clusterer: DensityClusterer) -> Self {
        TripClusterer::Density(clusterer)
    }
}

/// Size and recency check applied to every candidate trip.
///
/// Reports the outcome to the sink and returns whether the candidate is kept.
pub(crate) fn accept_candidate<P: Photo>(
    candidate: &[P],
    min_photos: usize,
    gate: &FinishGate,
    now: i64,
    sink: &Arc<dyn DiagnosticSink>,
) -> bool {
    meets_min_photos(candidate, min_photos, sink) && passes_finish_gate(candidate, gate, now, sink)
}

/// Size check alone. Reports discarded candidates only.
pub(crate) fn meets_min_photos<P: Photo>(
    candidate: &[P],
    min_photos: usize,
    sink: &Arc<dyn DiagnosticSink>,
) -> bool {
    let photo_count = candidate.len();

    if photo_count == 0 {
        return false;
    }

    if photo_count < min_photos {
        sink.record(&ClusterEvent::TripDiscarded {
            photo_count,
            reason: DiscardReason::TooSmall { min_photos },
        });
        return false;
    }

    true
}

/// Recency check alone. Reports whether the trip was accepted or held back.
pub(crate) fn passes_finish_gate<P: Photo>(
    candidate: &[P],
    gate: &FinishGate,
    now: i64,
    sink: &Arc<dyn DiagnosticSink>,
) -> bool {
    let photo_count = candidate.len();

    if !gate.is_finished(candidate, now) {
        sink.record(&ClusterEvent::TripDiscarded {
            photo_count,
            reason: DiscardReason::Unfinished {
                days_since_last_photo: days_since_last_photo(candidate, now).unwrap_or(0.0),
                min_days_before_today: gate.min_days_before_today,
            },
        });
        return false;
    }

    sink.record(&ClusterEvent::TripAccepted { photo_count });
    true
}
