//! Calendar bucketing of first-entry timestamps

use crate::types::{ItemId, ObservationWindow, TimelineError, Timestamp};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Aggregation granularity for first-entry buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupingMode {
    /// January–June and July–December
    #[default]
    HalfYear,
}

impl GroupingMode {
    /// Start of the period containing `day`
    pub fn period_start(&self, day: NaiveDate) -> Option<NaiveDate> {
        match self {
            GroupingMode::HalfYear => half_year_start(day),
        }
    }

    /// Start of the period following the one that begins at `start`
    pub fn next_period_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            GroupingMode::HalfYear => next_half_year_start(start),
        }
    }
}

impl FromStr for GroupingMode {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "half-year" | "halfyear" | "half_year" | "6m" => Ok(GroupingMode::HalfYear),
            _ => Err(TimelineError::InvalidGroupingMode(s.to_string())),
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingMode::HalfYear => write!(f, "half-year"),
        }
    }
}

pub fn half_year_start(day: NaiveDate) -> Option<NaiveDate> {
    let month = if day.month() <= 6 { 1 } else { 7 };
    NaiveDate::from_ymd_opt(day.year(), month, 1)
}

pub fn next_half_year_start(day: NaiveDate) -> Option<NaiveDate> {
    if day.month() <= 6 {
        NaiveDate::from_ymd_opt(day.year(), 7, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    }
}

/// Number of first entries within an inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub start: NaiveDate,
    /// Inclusive; clipped to the observation window
    pub end: NaiveDate,
    pub count: u32,
}

impl Bucket {
    pub fn width_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Human label such as `2024 H1`
    pub fn label(&self) -> String {
        let half = if self.start.month() <= 6 { "H1" } else { "H2" };
        format!("{} {}", self.start.year(), half)
    }
}

/// Count first entries per period across `window`, omitting empty periods
pub fn bucket_first_entries(
    mode: GroupingMode,
    first_entries: &BTreeMap<ItemId, Timestamp>,
    window: &ObservationWindow,
) -> Vec<Bucket> {
    let dates: Vec<NaiveDate> = first_entries.values().map(|ts| ts.date_naive()).collect();
    let mut buckets = Vec::new();

    let mut current = mode.period_start(window.start_day);
    while let Some(start) = current {
        if start > window.end_day {
            break;
        }
        let next = mode.next_period_start(start);
        let end = next
            .and_then(|n| n.pred_opt())
            .map_or(window.end_day, |last| last.min(window.end_day));

        let count = dates.iter().filter(|d| start <= **d && **d <= end).count() as u32;
        if count > 0 {
            buckets.push(Bucket { start, end, count });
        }
        current = next;
    }

    log::debug!("{} non-empty {} buckets", buckets.len(), mode);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn test_half_year_boundaries() {
        assert_eq!(half_year_start(date(2024, 6, 30)), Some(date(2024, 1, 1)));
        assert_eq!(half_year_start(date(2024, 7, 1)), Some(date(2024, 7, 1)));
        assert_eq!(next_half_year_start(date(2024, 1, 1)), Some(date(2024, 7, 1)));
        assert_eq!(next_half_year_start(date(2024, 7, 1)), Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_grouping_mode_parse() {
        assert_eq!("half-year".parse::<GroupingMode>().unwrap(), GroupingMode::HalfYear);
        assert_eq!("6M".parse::<GroupingMode>().unwrap(), GroupingMode::HalfYear);
        assert!(matches!(
            "weekly".parse::<GroupingMode>(),
            Err(TimelineError::InvalidGroupingMode(_))
        ));
    }

    #[test]
    fn test_same_day_entries_share_bucket() {
        let entries = BTreeMap::from([
            (ItemId(1), entry(2024, 3, 15)),
            (ItemId(2), entry(2024, 3, 15)),
        ]);
        let window = ObservationWindow::new(date(2023, 11, 2), date(2025, 2, 10));

        let buckets = bucket_first_entries(GroupingMode::HalfYear, &entries, &window);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].start, date(2024, 1, 1));
        assert_eq!(buckets[0].end, date(2024, 6, 30));
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].label(), "2024 H1");
        assert_eq!(buckets[0].width_days(), 182);
    }

    #[test]
    fn test_last_bucket_clipped_to_window() {
        let entries = BTreeMap::from([
            (ItemId(1), entry(2023, 12, 31)),
            (ItemId(2), entry(2024, 7, 1)),
            (ItemId(3), entry(2024, 8, 20)),
        ]);
        let window = ObservationWindow::new(date(2023, 9, 1), date(2024, 9, 1));

        let buckets = bucket_first_entries(GroupingMode::HalfYear, &entries, &window);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start, date(2023, 7, 1));
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].start, date(2024, 7, 1));
        assert_eq!(buckets[1].end, date(2024, 9, 1));
        assert_eq!(buckets[1].count, 2);

        let total: u32 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_entries_outside_window_ignored() {
        let entries = BTreeMap::from([(ItemId(1), entry(2025, 1, 5))]);
        let window = ObservationWindow::new(date(2024, 1, 1), date(2024, 12, 31));
        assert!(bucket_first_entries(GroupingMode::HalfYear, &entries, &window).is_empty());
    }
}
