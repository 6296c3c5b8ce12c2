//! Timeline reconstruction
//!
//! This module provides the primary interface of the library. A
//! [`Replayer`] walks every item's review log through a [`StateEngine`] and
//! samples the resulting states at the end of each calendar day, producing
//! the daily "known" and "relearning" series plus the first time each item
//! reached the known state.

use crate::buckets::{bucket_first_entries, Bucket, GroupingMode};
use crate::config::TimelineConfig;
use crate::engine::StateEngine;
use crate::normalize::{normalize_log, ReviewRecord};
use crate::types::{
    DailyCount, ItemId, ItemLog, ObservationWindow, Result, TimelineError, Timestamp,
};
use chrono::{FixedOffset, NaiveDate, TimeDelta, TimeZone};
use std::collections::BTreeMap;

/// Per-day item counts for one tracked state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayCounter {
    counts: BTreeMap<NaiveDate, u32>,
}

impl DayCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: NaiveDate) -> u32 {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    /// Count the interval `[start, end)` on every day whose sample instant it covers
    ///
    /// A day is sampled at its last microsecond in `offset`, except today,
    /// which is sampled at `min(end of day, now)`. Days after today are
    /// never counted. An empty or inverted interval is ignored.
    pub fn mark_interval(
        &mut self,
        start: Timestamp,
        end: Timestamp,
        offset: &FixedOffset,
        now: Timestamp,
    ) {
        if start >= end {
            return;
        }

        let today = now.with_timezone(offset).date_naive();
        let last_day = end.with_timezone(offset).date_naive().min(today);
        let mut day = start.with_timezone(offset).date_naive();

        while day <= last_day {
            let Some(eod) = end_of_day(day, offset) else {
                break;
            };
            let sample = if day < today { eod } else { eod.min(now) };
            if sample >= end {
                break;
            }
            if sample >= start {
                *self.counts.entry(day).or_insert(0) += 1;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
    }

    /// Dense series over `window`: one entry per day, zero where nothing was marked
    pub fn series(&self, window: &ObservationWindow) -> Vec<DailyCount> {
        window
            .days()
            .map(|day| DailyCount {
                day,
                count: self.get(day),
            })
            .collect()
    }
}

/// Last representable instant of `day` in `offset`
fn end_of_day(day: NaiveDate, offset: &FixedOffset) -> Option<Timestamp> {
    let local = day.and_hms_micro_opt(23, 59, 59, 999_999)?;
    offset.from_local_datetime(&local).single()
}

/// Result of a reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineReport {
    /// Earliest review day through today
    pub window: ObservationWindow,
    /// Sampling horizon the report was built against
    pub now: Timestamp,
    /// Items in the known state at each day's sample instant
    pub known: Vec<DailyCount>,
    /// Items in the relearning state at each day's sample instant
    pub relearning: Vec<DailyCount>,
    /// First time each item reached the known state
    pub first_entries: BTreeMap<ItemId, Timestamp>,
    /// Items with at least one review
    pub items_replayed: usize,
    /// Reviews fed through the engine
    pub events_replayed: usize,
}

impl TimelineReport {
    /// Aggregate first entries into calendar buckets clipped to the window
    pub fn buckets(&self, mode: GroupingMode) -> Vec<Bucket> {
        bucket_first_entries(mode, &self.first_entries, &self.window)
    }

    pub fn known_today(&self) -> u32 {
        self.known.last().map_or(0, |c| c.count)
    }

    pub fn relearning_today(&self) -> u32 {
        self.relearning.last().map_or(0, |c| c.count)
    }
}

/// Replays review logs through a state engine
pub struct Replayer<'a, E: StateEngine> {
    engine: &'a E,
    config: TimelineConfig,
}

impl<'a, E: StateEngine> Replayer<'a, E> {
    pub fn new(engine: &'a E, config: TimelineConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Rebuild the daily series and first-entry map from scratch
    ///
    /// Any normalization error aborts the whole reconstruction. Returns
    /// [`TimelineError::EmptyInput`] when no item has a single review.
    pub fn reconstruct<R: ReviewRecord>(&self, items: &[ItemLog<R>]) -> Result<TimelineReport> {
        let offset = self.config.offset;
        let now = self.config.resolve_now();
        let horizon = now + TimeDelta::seconds(1);

        log::info!("Replaying {} items (now = {})", items.len(), now);

        let mut known = DayCounter::new();
        let mut relearning = DayCounter::new();
        let mut first_entries: BTreeMap<ItemId, Timestamp> = BTreeMap::new();
        let mut start_day: Option<NaiveDate> = None;
        let mut items_replayed = 0;
        let mut events_replayed = 0;

        for item in items {
            let events = normalize_log(&item.records, &offset)?;
            let Some(first) = events.first() else {
                log::debug!("Item {} has no reviews, skipping", item.id);
                continue;
            };

            let first_day = first.timestamp.date_naive();
            start_day = Some(start_day.map_or(first_day, |d| d.min(first_day)));
            items_replayed += 1;
            events_replayed += events.len();

            let mut card = self.engine.new_card();
            for (i, event) in events.iter().enumerate() {
                let (next_card, _log) = self.engine.advance(&card, event.rating, event.timestamp);
                card = next_card;
                let state = self.engine.state(&card);

                if state == self.config.known_state {
                    first_entries.entry(item.id).or_insert(event.timestamp);
                }

                // The state holds until the next review, or until now
                let next_at = events.get(i + 1).map_or(horizon, |e| e.timestamp);
                let interval_end = next_at.min(horizon);
                if interval_end <= event.timestamp {
                    continue;
                }

                log::trace!(
                    "Item {}: {} during [{}, {})",
                    item.id,
                    state,
                    event.timestamp,
                    interval_end
                );
                if state == self.config.known_state {
                    known.mark_interval(event.timestamp, interval_end, &offset, now);
                }
                if state == self.config.relearning_state {
                    relearning.mark_interval(event.timestamp, interval_end, &offset, now);
                }
            }
        }

        let start_day = start_day.ok_or(TimelineError::EmptyInput)?;
        let window = ObservationWindow::new(start_day, now.date_naive());

        log::info!(
            "Replayed {} reviews over {} items ({} → {}), {} reached {}",
            events_replayed,
            items_replayed,
            window.start_day,
            window.end_day,
            first_entries.len(),
            self.config.known_state
        );

        Ok(TimelineReport {
            known: known.series(&window),
            relearning: relearning.series(&window),
            window,
            now,
            first_entries,
            items_replayed,
            events_replayed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Utc};

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn at(day: u32, hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap().fixed_offset()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_empty_interval_is_ignored() {
        let mut counter = DayCounter::new();
        counter.mark_interval(at(3, 12), at(3, 12), &utc(), at(10, 12));
        counter.mark_interval(at(4, 12), at(3, 12), &utc(), at(10, 12));
        assert_eq!(counter, DayCounter::new());
    }

    #[test]
    fn test_interval_superseded_same_day_not_counted() {
        let mut counter = DayCounter::new();
        counter.mark_interval(at(3, 8), at(3, 20), &utc(), at(10, 12));
        assert_eq!(counter.get(date(3)), 0);
    }

    #[test]
    fn test_interval_counts_until_end() {
        let mut counter = DayCounter::new();
        counter.mark_interval(at(3, 8), at(6, 9), &utc(), at(10, 12));
        assert_eq!(counter.get(date(2)), 0);
        assert_eq!(counter.get(date(3)), 1);
        assert_eq!(counter.get(date(5)), 1);
        assert_eq!(counter.get(date(6)), 0);
    }

    #[test]
    fn test_today_sampled_at_now() {
        let now = at(10, 12);
        let horizon = now + TimeDelta::seconds(1);

        let mut open = DayCounter::new();
        open.mark_interval(at(9, 8), horizon, &utc(), now);
        assert_eq!(open.get(date(9)), 1);
        assert_eq!(open.get(date(10)), 1);
        assert_eq!(open.get(date(11)), 0);

        // Superseded before now: today does not count
        let mut closed = DayCounter::new();
        closed.mark_interval(at(9, 8), at(10, 11), &utc(), now);
        assert_eq!(closed.get(date(9)), 1);
        assert_eq!(closed.get(date(10)), 0);
    }

    #[test]
    fn test_future_days_never_counted() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap().fixed_offset();
        let mut counter = DayCounter::new();
        counter.mark_interval(at(9, 8), at(12, 0), &utc(), now);
        assert_eq!(counter.get(date(10)), 1);
        assert_eq!(counter.get(date(11)), 0);
    }

    #[test]
    fn test_days_follow_offset() {
        // 20:00 UTC on the 3rd is already the 4th in UTC+9
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let mut counter = DayCounter::new();
        counter.mark_interval(at(3, 20), at(6, 20), &tokyo, at(10, 12));
        assert_eq!(counter.get(date(3)), 0);
        assert_eq!(counter.get(date(4)), 1);
        assert_eq!(counter.get(date(6)), 1);
        assert_eq!(counter.get(date(7)), 0);
    }

    #[test]
    fn test_series_is_dense() {
        let mut counter = DayCounter::new();
        counter.mark_interval(at(3, 8), at(5, 9), &utc(), at(10, 12));
        let window = ObservationWindow::new(date(1), date(10));
        let series = counter.series(&window);
        assert_eq!(series.len(), 10);
        assert_eq!(series[0].day, date(1));
        assert_eq!(series[9].day, date(10));
        let counts: Vec<_> = series.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 1, 0, 0, 0, 0, 0, 0]);
    }
}
