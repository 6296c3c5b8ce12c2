//! Core types for the SRS timeline library
//!
//! This module defines the fundamental types shared by the normalizer, the
//! replay engine and the aggregations. Everything here is plain data; the
//! scheduling algorithm itself lives behind [`crate::engine::StateEngine`].

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the library (always timezone-aware)
pub type Timestamp = DateTime<FixedOffset>;

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors that can occur while normalizing or reconstructing a review history
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("All review datetimes must be timezone-aware")]
    MissingTimezone,

    #[error("Unsupported rating value: {0}")]
    UnsupportedRating(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Review record is missing field: {0}")]
    MissingField(&'static str),

    #[error("No logs found to plot")]
    EmptyInput,

    #[error("Unsupported grouping mode: {0}")]
    InvalidGroupingMode(String),

    #[error("Invalid timezone offset: {0}")]
    InvalidTimezone(String),

    #[error("Failed to parse export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Opaque identifier of a tracked item (the jpdb vocabulary id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quality grade of a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn name(&self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i64> for Rating {
    type Error = TimelineError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(TimelineError::UnsupportedRating(other.to_string())),
        }
    }
}

impl FromStr for Rating {
    type Err = TimelineError;

    /// Case-insensitive match against the variant names
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Rating::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| TimelineError::UnsupportedRating(format!("{:?}", s)))
    }
}

/// Coarse learning state of a card after a review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardState::New => write!(f, "New"),
            CardState::Learning => write!(f, "Learning"),
            CardState::Review => write!(f, "Review"),
            CardState::Relearning => write!(f, "Relearning"),
        }
    }
}

/// A normalized review: timezone-aware instant plus rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewEvent {
    pub timestamp: Timestamp,
    pub rating: Rating,
}

impl ReviewEvent {
    pub fn new(timestamp: Timestamp, rating: Rating) -> Self {
        Self { timestamp, rating }
    }
}

/// One item and its raw, not yet normalized review records
#[derive(Debug, Clone, PartialEq)]
pub struct ItemLog<R> {
    pub id: ItemId,
    pub records: Vec<R>,
}

impl<R> ItemLog<R> {
    pub fn new(id: ItemId, records: Vec<R>) -> Self {
        Self { id, records }
    }
}

/// Count of items for one calendar day of a daily series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u32,
}

/// Inclusive range of calendar days covered by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

impl ObservationWindow {
    pub fn new(start_day: NaiveDate, end_day: NaiveDate) -> Self {
        Self { start_day, end_day }
    }

    /// Iterate every day of the window, both ends included
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_day;
        self.start_day.iter_days().take_while(move |d| *d <= end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_day <= day && day <= self.end_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_from_str() {
        assert_eq!("good".parse::<Rating>().unwrap(), Rating::Good);
        assert_eq!("  AGAIN ".parse::<Rating>().unwrap(), Rating::Again);
        assert_eq!("Easy".parse::<Rating>().unwrap(), Rating::Easy);
        assert!(matches!(
            "blah".parse::<Rating>(),
            Err(TimelineError::UnsupportedRating(_))
        ));
    }

    #[test]
    fn test_rating_from_int() {
        assert_eq!(Rating::try_from(1).unwrap(), Rating::Again);
        assert_eq!(Rating::try_from(4).unwrap(), Rating::Easy);
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(5).is_err());
    }

    #[test]
    fn test_window_days() {
        let window = ObservationWindow::new(
            NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        );
        let days: Vec<_> = window.days().collect();
        assert_eq!(days.len(), 5); // leap year: 27, 28, 29, 1, 2
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()));
    }
}
