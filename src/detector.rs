//! Trip detection facade.
//!
//! Runs the configured clustering strategy, then labels and summarises every
//! trip it reports.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clustering::{
    Algorithm, DensityClusterer, DensityConfig, TimeGapClusterer, TimeGapConfig, TripClusterer,
    MIN_CORE_NEIGHBORS, TRIP_BOUNDARY_THRESHOLD,
};
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::Result;
use crate::finish_gate::{DENSITY_MIN_DAYS_BEFORE_TODAY, TIME_GAP_MIN_DAYS_BEFORE_TODAY};
use crate::summary::TripSummary;
use crate::{Photo, Trip};

/// Configuration for a detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Strategy to run. Default: hdbscan
    pub algorithm: Algorithm,

    /// Time-gap only: largest gap within one trip.
    /// Default: 172800 seconds (2 days)
    pub max_time_gap_seconds: u64,

    /// Minimum photos per trip. Default: 5
    pub min_photos: usize,

    /// Density only: split threshold. Default: 0.25
    pub threshold: f64,

    /// Density only: time weight. Default: 0.7
    pub time_weight: f64,

    /// Density only: location weight. Default: 0.3
    pub location_weight: f64,

    /// Finish gate for time-gap trips, in days. Default: 5.0
    pub time_gap_min_days_before_today: f64,

    /// Finish gate for density trips, in days. Default: 3.0
    pub density_min_days_before_today: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            max_time_gap_seconds: 172_800,
            min_photos: 5,
            threshold: TRIP_BOUNDARY_THRESHOLD,
            time_weight: 0.7,
            location_weight: 0.3,
            time_gap_min_days_before_today: TIME_GAP_MIN_DAYS_BEFORE_TODAY,
            density_min_days_before_today: DENSITY_MIN_DAYS_BEFORE_TODAY,
        }
    }
}

impl DetectionConfig {
    pub fn time_gap_config(&self) -> TimeGapConfig {
        TimeGapConfig {
            max_time_gap_seconds: self.max_time_gap_seconds,
            min_photos: self.min_photos,
            min_days_before_today: self.time_gap_min_days_before_today,
        }
    }

    pub fn density_config(&self) -> DensityConfig {
        DensityConfig {
            min_photos: self.min_photos,
            threshold: self.threshold,
            time_weight: self.time_weight,
            location_weight: self.location_weight,
            min_core_neighbors: MIN_CORE_NEIGHBORS,
            min_days_before_today: self.density_min_days_before_today,
        }
    }

    /// Clusterer for the configured algorithm.
    pub fn clusterer(&self, sink: Arc<dyn DiagnosticSink>) -> TripClusterer {
        match self.algorithm {
            Algorithm::TimeGap => TimeGapClusterer::with_sink(self.time_gap_config(), sink).into(),
            Algorithm::Hdbscan => DensityClusterer::with_sink(self.density_config(), sink).into(),
        }
    }
}

/// A labelled trip with its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedTrip<P> {
    pub trip: Trip<P>,
    pub summary: TripSummary,
}

impl<P> DetectedTrip<P> {
    pub fn name(&self) -> String {
        self.summary.descriptive_name()
    }
}

/// Cluster, label and summarise in one call.
#[derive(Debug, Clone)]
pub struct TripDetector {
    config: DetectionConfig,
    clusterer: TripClusterer,
}

impl TripDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    pub fn with_sink(config: DetectionConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let clusterer = config.clusterer(sink);
        Self { config, clusterer }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn clusterer(&self) -> &TripClusterer {
        &self.clusterer
    }

    /// Detect trips in `photos` as of `now` (Unix seconds).
    pub fn detect<P: Photo>(&self, photos: Vec<P>, now: i64) -> Result<Vec<DetectedTrip<P>>> {
        let trips = self.clusterer.cluster(photos, now)?;

        Ok(trips
            .into_iter()
            .filter_map(|mut trip| {
                trip.label_season();
                let summary = TripSummary::from_trip(&trip)?;
                Some(DetectedTrip { trip, summary })
            })
            .collect())
    }
}
