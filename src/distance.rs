//! Distance model between two photos.
//!
//! Combines elapsed time and great-circle distance into a single unitless
//! value. When either photo has no location the result is a pure time
//! heuristic where six hours count as one unit.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripClusterError};
use crate::geo_utils::haversine_km;
use crate::{GpsPoint, Photo};

/// How many kilometres one hour of elapsed time is worth.
pub const TIME_LOCATION_EQUIVALENCE: f64 = 30.0;

/// Hours that make one unit of dissimilarity in the time-only fallback.
pub const TIME_ONLY_UNIT_HOURS: f64 = 6.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Relative importance of time and location in [`distance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceWeights {
    pub time: f64,
    pub location: f64,
}

impl Default for DistanceWeights {
    fn default() -> Self {
        Self {
            time: 0.7,
            location: 0.3,
        }
    }
}

impl DistanceWeights {
    /// Validated weights: both finite, non-negative, and not both zero.
    pub fn new(time: f64, location: f64) -> Result<Self> {
        let weights = Self { time, location };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_usable() {
            Ok(())
        } else {
            Err(TripClusterError::DegenerateWeights {
                time_weight: self.time,
                location_weight: self.location,
            })
        }
    }

    /// Both finite, non-negative, and not both zero.
    fn is_usable(&self) -> bool {
        self.time.is_finite()
            && self.location.is_finite()
            && self.time >= 0.0
            && self.location >= 0.0
            && self.time + self.location > 0.0
    }

    /// Distance between two photos under these weights.
    pub fn distance<A: Photo, B: Photo>(&self, a: &A, b: &B) -> f64 {
        distance(a, b, self.time, self.location)
    }
}

/// Normalised distance between two photos.
///
/// Symmetric and never negative. If either photo lacks coordinates this is
/// `|Δt| / 6h` regardless of the weights. Weights that
/// [`DistanceWeights::new`] would reject (negative, non-finite, or summing
/// to zero) take the same fallback.
pub fn distance<A: Photo, B: Photo>(a: &A, b: &B, time_weight: f64, location_weight: f64) -> f64 {
    sample_distance(
        &Sample::of(a),
        &Sample::of(b),
        &DistanceWeights {
            time: time_weight,
            location: location_weight,
        },
    )
}

/// The two fields the distance model reads, detached from the caller's record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub captured_at: i64,
    pub coordinates: Option<GpsPoint>,
}

impl Sample {
    pub(crate) fn of<P: Photo>(photo: &P) -> Self {
        Self {
            captured_at: photo.captured_at(),
            coordinates: photo.coordinates(),
        }
    }
}

pub(crate) fn sample_distance(a: &Sample, b: &Sample, weights: &DistanceWeights) -> f64 {
    // i128 so that extreme timestamps cannot overflow the subtraction
    let hours = (i128::from(b.captured_at) - i128::from(a.captured_at)).abs() as f64
        / SECONDS_PER_HOUR;

    match (a.coordinates, b.coordinates) {
        (Some(pa), Some(pb)) if weights.is_usable() => {
            let geo_km = haversine_km(&pa, &pb);
            let time_km = hours * TIME_LOCATION_EQUIVALENCE;
            (weights.time * time_km + weights.location * geo_km) / (weights.time + weights.location)
        }
        _ => hours / TIME_ONLY_UNIT_HOURS,
    }
}
