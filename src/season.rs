//! Season labels for trips.
//!
//! Northern-hemisphere meteorological seasons from the UTC calendar date of
//! a trip's start. Each season is split in thirds: the first third is
//! "Early", the last third is "Late", the middle has no qualifier.

use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season of a calendar month (1-12).
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Fall),
            _ => None,
        }
    }

    /// The (first, second, third) calendar months of the season.
    pub fn months(&self) -> (u32, u32, u32) {
        match self {
            Season::Winter => (12, 1, 2),
            Season::Spring => (3, 4, 5),
            Season::Summer => (6, 7, 8),
            Season::Fall => (9, 10, 11),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonQualifier {
    Early,
    Late,
}

impl SeasonQualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonQualifier::Early => "Early",
            SeasonQualifier::Late => "Late",
        }
    }
}

/// A season with an optional early/late qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonLabel {
    pub season: Season,
    pub qualifier: Option<SeasonQualifier>,
}

impl SeasonLabel {
    /// Label for a calendar month (1-12) and day of month.
    pub fn from_month_day(month: u32, day: u32) -> Option<Self> {
        let season = Season::from_month(month)?;
        let (first, second, third) = season.months();

        let qualifier = if month == first || (month == second && day <= 10) {
            Some(SeasonQualifier::Early)
        } else if (month == third && day >= 20) || (month == third && day > 15) {
            // The second arm subsumes the first: late starts after day 15
            Some(SeasonQualifier::Late)
        } else {
            None
        };

        Some(Self { season, qualifier })
    }

    /// Label for a Unix timestamp, read as a UTC date.
    ///
    /// `None` for timestamps outside chrono's representable range.
    pub fn from_timestamp(timestamp: i64) -> Option<Self> {
        let date = DateTime::from_timestamp(timestamp, 0)?.date_naive();
        Self::from_month_day(date.month(), date.day())
    }
}

impl fmt::Display for SeasonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(qualifier) => write!(f, "{} {}", qualifier.as_str(), self.season.as_str()),
            None => f.write_str(self.season.as_str()),
        }
    }
}

/// Season label for a trip starting at `start_timestamp`.
///
/// Returns `"{Qualifier} {Season}"` or `"{Season}"`, e.g. `"Early Winter"`.
/// Empty for timestamps that cannot be represented as a date.
pub fn identify_season(start_timestamp: i64) -> String {
    SeasonLabel::from_timestamp(start_timestamp)
        .map(|label| label.to_string())
        .unwrap_or_default()
}
