//! Synthetic photo collections for stress testing and benchmarking.
//!
//! Generates bursts of photos ("trips") at distinct places, separated by
//! quiet days, with ground truth for which photos belong together.
//!
//! Feature-gated behind `synthetic`; not part of default builds.
//!
//! # Example
//!
//! ```rust
//! use tripcluster::synthetic::SyntheticScenario;
//!
//! let scenario = SyntheticScenario::weekend_trips();
//! let dataset = scenario.generate();
//! assert_eq!(dataset.expected_trips.len(), scenario.trip_count);
//! ```

use crate::{GpsPoint, PhotoId, PhotoRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Metres per degree of latitude, close enough for jitter.
const METERS_PER_DEGREE: f64 = 111_000.0;

// ============================================================================
// Types
// ============================================================================

/// Parameters for a generated photo collection.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Place of the first trip; later trips move east from here.
    pub origin: GpsPoint,
    /// Unix timestamp of the first photo.
    pub start: i64,
    pub trip_count: usize,
    pub photos_per_trip: usize,
    /// Seconds between photos inside a trip.
    pub photo_spacing_seconds: i64,
    /// Days between the end of one trip and the start of the next.
    pub days_between_trips: i64,
    /// Degrees of longitude between consecutive trip locations.
    pub trip_spacing_degrees: f64,
    /// Fraction of photos (0.0-1.0) generated without coordinates.
    pub unlocated_fraction: f64,
    /// Positional noise in metres.
    pub gps_noise_meters: f64,
    pub seed: u64,
}

/// A generated collection with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    /// All photos, in generation (time) order.
    pub photos: Vec<PhotoRecord>,
    /// Photo ids of each generated trip.
    pub expected_trips: Vec<Vec<PhotoId>>,
}

impl SyntheticDataset {
    /// Timestamp of the last photo, or `0` when empty.
    pub fn last_timestamp(&self) -> i64 {
        self.photos.iter().map(|p| p.captured_at).max().unwrap_or(0)
    }
}

// ============================================================================
// Presets
// ============================================================================

impl SyntheticScenario {
    /// Five located weekend trips, photos every five seconds.
    ///
    /// Dense enough that the default density threshold keeps every trip whole.
    pub fn weekend_trips() -> Self {
        Self {
            origin: GpsPoint::new(48.8566, 2.3522),
            start: 1_700_000_000,
            trip_count: 5,
            photos_per_trip: 20,
            photo_spacing_seconds: 5,
            days_between_trips: 7,
            trip_spacing_degrees: 2.0,
            unlocated_fraction: 0.0,
            gps_noise_meters: 10.0,
            seed: 42,
        }
    }

    /// Many small trips for benchmark scaling.
    pub fn scaling(trip_count: usize, photos_per_trip: usize) -> Self {
        Self {
            trip_count,
            photos_per_trip,
            ..Self::weekend_trips()
        }
    }

    /// Trips where a share of photos lost their coordinates.
    pub fn sparse_geodata() -> Self {
        Self {
            unlocated_fraction: 0.3,
            seed: 7,
            ..Self::weekend_trips()
        }
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Generate the collection. Same seed, same output.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut photos = Vec::with_capacity(self.trip_count * self.photos_per_trip);
        let mut expected_trips = Vec::with_capacity(self.trip_count);

        let trip_duration = self.photo_spacing_seconds * self.photos_per_trip as i64;
        let mut next_id: i64 = 0;

        for trip in 0..self.trip_count {
            let trip_start = self.start + trip as i64 * (trip_duration + self.days_between_trips * 86_400);
            let center = GpsPoint::new(
                self.origin.latitude,
                wrap_longitude(self.origin.longitude + trip as f64 * self.trip_spacing_degrees),
            );

            let mut ids = Vec::with_capacity(self.photos_per_trip);
            for i in 0..self.photos_per_trip {
                let mut photo =
                    PhotoRecord::new(next_id, trip_start + i as i64 * self.photo_spacing_seconds);
                next_id += 1;

                if !rng.gen_bool(self.unlocated_fraction.clamp(0.0, 1.0)) {
                    let point = jitter(&mut rng, &center, self.gps_noise_meters);
                    photo = photo.with_coordinates(point.latitude, point.longitude);
                }

                ids.push(photo.id.clone());
                photos.push(photo);
            }
            expected_trips.push(ids);
        }

        SyntheticDataset {
            photos,
            expected_trips,
        }
    }
}

fn jitter(rng: &mut StdRng, center: &GpsPoint, noise_meters: f64) -> GpsPoint {
    if noise_meters <= 0.0 {
        return *center;
    }
    let noise_deg = noise_meters / METERS_PER_DEGREE;
    GpsPoint::new(
        (center.latitude + rng.gen_range(-noise_deg..noise_deg)).clamp(-90.0, 90.0),
        wrap_longitude(center.longitude + rng.gen_range(-noise_deg..noise_deg)),
    )
}

fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

// ============================================================================
// Tests
// ============================================================================
