//! Trip summaries: time span, travelled distance, place and season.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geo_utils::path_length_km;
use crate::season::identify_season;
use crate::{Photo, Trip, UNKNOWN_LOCATION};

/// Derived facts about a finished trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    /// Unix timestamp of the first photo
    pub start: i64,
    /// Unix timestamp of the last photo
    pub end: i64,
    pub photo_count: usize,
    /// Distance between consecutive located photos, in kilometres
    pub distance_km: f64,
    /// Human-readable span, e.g. "Mar 5 - 9, 2024"
    pub timeframe: String,
    /// Most common place name among the photos
    pub location: String,
    /// Season label of the start date
    pub season: String,
}

impl TripSummary {
    /// Summarise a trip. `None` for an empty trip.
    pub fn from_trip<P: Photo>(trip: &Trip<P>) -> Option<Self> {
        let start = trip.start()?;
        let end = trip.end()?;

        Some(Self {
            start,
            end,
            photo_count: trip.len(),
            distance_km: path_length_km(trip.photos().iter().map(|photo| photo.coordinates())),
            timeframe: format_timeframe(start, end),
            location: dominant_location(trip.photos()),
            season: identify_season(start),
        })
    }

    /// "{season} in {location}", or just the location when there is no season.
    pub fn descriptive_name(&self) -> String {
        if self.season.is_empty() {
            self.location.clone()
        } else {
            format!("{} in {}", self.season, self.location)
        }
    }
}

/// Most frequent known place name; the first seen wins ties.
pub fn dominant_location<P: Photo>(photos: &[P]) -> String {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (order, label) in photos
        .iter()
        .filter_map(|photo| photo.location_label())
        .filter(|label| !label.is_empty() && *label != UNKNOWN_LOCATION)
        .enumerate()
    {
        counts.entry(label).or_insert((0, order)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}

/// Compact date span of two timestamps (UTC).
///
/// - same day: "Mar 5, 2024"
/// - same month: "Mar 5 - 9, 2024"
/// - same year: "Mar 28 - Apr 2, 2024"
/// - otherwise: "Dec 30, 2023 - Jan 2, 2024"
///
/// "Unknown" when either timestamp is not positive.
pub fn format_timeframe(start: i64, end: i64) -> String {
    if start <= 0 || end <= 0 {
        return "Unknown".to_string();
    }

    let (Some(start), Some(end)) = (to_utc(start), to_utc(end)) else {
        return "Unknown".to_string();
    };

    if start.year() == end.year() {
        if start.month() == end.month() {
            if start.day() == end.day() {
                return start.format("%b %-d, %Y").to_string();
            }
            return format!("{} - {}", start.format("%b %-d"), end.format("%-d, %Y"));
        }
        return format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"));
    }

    format!(
        "{} - {}",
        start.format("%b %-d, %Y"),
        end.format("%b %-d, %Y")
    )
}

fn to_utc(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}
