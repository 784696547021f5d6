//! # Trip Cluster
//!
//! Trip detection for photo collections.
//!
//! This library provides:
//! - A weighted time + great-circle distance between photos
//! - Time-gap trip segmentation (fast baseline)
//! - HDBSCAN-inspired density segmentation (primary strategy), with
//!   re-injection of photos that carry no location
//! - A recency gate that holds back trips that may still be in progress
//! - Season labels ("Early Winter", "Summer", ...) and trip summaries
//!
//! ## Features
//!
//! - **`parallel`** - Compute core distances with rayon
//! - **`synthetic`** - Seeded synthetic photo collections for tests and benchmarks
//! - **`cli`** - Debug CLI reading photo records from JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use tripcluster::{DensityClusterer, DensityConfig, PhotoRecord};
//!
//! // Two bursts of photos, ten minutes apart, separated by two days.
//! let photos: Vec<PhotoRecord> = (0..20)
//!     .map(|i| {
//!         let day = if i < 10 { 0 } else { 2 * 86_400 };
//!         PhotoRecord::new(i, day + (i % 10) * 600)
//!     })
//!     .collect();
//!
//! let clusterer = DensityClusterer::new(DensityConfig::default());
//! let now = 30 * 86_400;
//! let trips = clusterer.cluster(photos, now).unwrap();
//! assert_eq!(trips.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// Unified error handling
pub mod error;
pub use error::{Result, TripClusterError};

// Geographic utilities (haversine, path length)
pub mod geo_utils;

// Weighted time/location distance between photos
pub mod distance;
pub use distance::{distance, DistanceWeights};

// Injected diagnostics for the clusterers
pub mod diagnostics;
pub use diagnostics::{
    ClusterEvent, CollectingSink, DiagnosticSink, DiscardReason, LogSink, NoopSink, SplitReason,
};

// Recency gate shared by both strategies
pub mod finish_gate;
pub use finish_gate::{is_finished, FinishGate};

// Clustering strategies
pub mod clustering;
pub use clustering::{
    Algorithm, DensityClusterer, DensityConfig, TimeGapClusterer, TimeGapConfig, TripClusterer,
};

// Season labels
pub mod season;
pub use season::{identify_season, Season, SeasonLabel, SeasonQualifier};

// Trip summaries (timeframe, travelled distance, dominant location)
pub mod summary;
pub use summary::TripSummary;

// Cluster + label + summarise in one call
pub mod detector;
pub use detector::{DetectedTrip, DetectionConfig, TripDetector};

// Synthetic photo collections with known trips
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// Label used when a photo carries no location text.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use tripcluster::GpsPoint;
/// let point = GpsPoint::new(48.8566, 2.3522); // Paris
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from optional parts.
    ///
    /// Returns `None` unless both parts are present, the point is valid and
    /// it is not the `(0, 0)` placeholder that unset metadata decays to.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        let point = Self::new(latitude?, longitude?);
        (point.is_valid() && !point.is_null_island()).then_some(point)
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// `(0, 0)`, the value unset coordinates usually arrive as.
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Opaque photo identifier. Only used for attribution in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoId {
    Int(i64),
    Text(String),
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoId::Int(id) => write!(f, "{}", id),
            PhotoId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PhotoId {
    fn from(id: i64) -> Self {
        PhotoId::Int(id)
    }
}

impl From<&str> for PhotoId {
    fn from(id: &str) -> Self {
        PhotoId::Text(id.to_string())
    }
}

impl From<String> for PhotoId {
    fn from(id: String) -> Self {
        PhotoId::Text(id)
    }
}

/// Anything the engine can cluster.
///
/// The clusterers take ownership of the caller's values and return the same
/// values grouped into trips, so caller-owned fields survive untouched.
/// Implemented for references too, which lets callers cluster borrowed
/// handles (`Vec<&MyPhoto>`).
pub trait Photo {
    /// Identifier used in diagnostics.
    fn id(&self) -> PhotoId;

    /// Capture time, seconds since the Unix epoch.
    fn captured_at(&self) -> i64;

    fn latitude(&self) -> Option<f64>;

    fn longitude(&self) -> Option<f64>;

    /// Free-text place name attached by the caller, if any.
    fn location_label(&self) -> Option<&str> {
        None
    }

    /// Usable coordinates, or `None` when the photo has no location.
    fn coordinates(&self) -> Option<GpsPoint> {
        GpsPoint::from_parts(self.latitude(), self.longitude())
    }

    fn has_location(&self) -> bool {
        self.coordinates().is_some()
    }
}

impl<T: Photo + ?Sized> Photo for &T {
    fn id(&self) -> PhotoId {
        (**self).id()
    }

    fn captured_at(&self) -> i64 {
        (**self).captured_at()
    }

    fn latitude(&self) -> Option<f64> {
        (**self).latitude()
    }

    fn longitude(&self) -> Option<f64> {
        (**self).longitude()
    }

    fn location_label(&self) -> Option<&str> {
        (**self).location_label()
    }
}

/// A flat photo record as extracted from the media index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    /// Unix timestamp (seconds since epoch)
    pub captured_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Display name of the place (e.g. "Paris, France")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl PhotoRecord {
    /// Create a record without location.
    pub fn new(id: impl Into<PhotoId>, captured_at: i64) -> Self {
        Self {
            id: id.into(),
            captured_at,
            latitude: None,
            longitude: None,
            location: None,
        }
    }

    /// Attach coordinates.
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Attach a place name.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl Photo for PhotoRecord {
    fn id(&self) -> PhotoId {
        self.id.clone()
    }

    fn captured_at(&self) -> i64 {
        self.captured_at
    }

    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    fn location_label(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// A group of photos judged to belong to one outing.
///
/// Photos are sorted ascending by capture time. The season label is only
/// set by [`Trip::label_season`]; the clusterers never attach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip<P> {
    pub photos: Vec<P>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_label: Option<String>,
}

impl<P: Photo> Trip<P> {
    pub(crate) fn new(photos: Vec<P>) -> Self {
        Self {
            photos,
            season_label: None,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photos(&self) -> &[P] {
        &self.photos
    }

    pub fn into_photos(self) -> Vec<P> {
        self.photos
    }

    /// Capture time of the earliest photo.
    pub fn start(&self) -> Option<i64> {
        self.photos.iter().map(|p| p.captured_at()).min()
    }

    /// Capture time of the latest photo.
    pub fn end(&self) -> Option<i64> {
        self.photos.iter().map(|p| p.captured_at()).max()
    }

    /// Identifiers of all photos, in trip order.
    pub fn ids(&self) -> Vec<PhotoId> {
        self.photos.iter().map(|p| p.id()).collect()
    }

    /// Whether the trip's most recent photo is old enough for the trip to be closed.
    pub fn is_finished(&self, now: i64, min_days_before_today: f64) -> bool {
        is_finished(&self.photos, now, min_days_before_today)
    }

    /// Attach the season label derived from the trip's start and return it.
    pub fn label_season(&mut self) -> Option<&str> {
        self.season_label = self.start().map(identify_season);
        self.season_label.as_deref()
    }
}

/// Stable sort by capture time. Photos taken in the same second keep the
/// caller's order.
pub(crate) fn sort_by_capture_time<P: Photo>(photos: &mut [P]) {
    photos.sort_by_key(|p| p.captured_at());
}
