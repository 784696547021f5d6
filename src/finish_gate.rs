//! Trip finish gate.
//!
//! A trip whose latest photo is too recent may still be accumulating photos,
//! so it is held back until enough days have passed.

use serde::{Deserialize, Serialize};

use crate::Photo;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Default gate for the time-gap strategy.
pub const TIME_GAP_MIN_DAYS_BEFORE_TODAY: f64 = 5.0;

/// Default gate for the density strategy.
pub const DENSITY_MIN_DAYS_BEFORE_TODAY: f64 = 3.0;

/// Days between the most recent photo and `now`. `None` for an empty slice.
pub fn days_since_last_photo<P: Photo>(photos: &[P], now: i64) -> Option<f64> {
    let last = photos.iter().map(|p| p.captured_at()).max()?;
    Some((i128::from(now) - i128::from(last)) as f64 / SECONDS_PER_DAY)
}

/// True iff the latest photo is at least `min_days_before_today` days before `now`.
///
/// An empty trip is never finished.
pub fn is_finished<P: Photo>(photos: &[P], now: i64, min_days_before_today: f64) -> bool {
    days_since_last_photo(photos, now).is_some_and(|days| days >= min_days_before_today)
}

/// Finish gate with a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishGate {
    pub min_days_before_today: f64,
}

impl FinishGate {
    pub fn new(min_days_before_today: f64) -> Self {
        Self {
            min_days_before_today,
        }
    }

    pub fn time_gap_default() -> Self {
        Self::new(TIME_GAP_MIN_DAYS_BEFORE_TODAY)
    }

    pub fn density_default() -> Self {
        Self::new(DENSITY_MIN_DAYS_BEFORE_TODAY)
    }

    pub fn is_finished<P: Photo>(&self, photos: &[P], now: i64) -> bool {
        is_finished(photos, now, self.min_days_before_today)
    }
}
