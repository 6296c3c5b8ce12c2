//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use srs_timeline::{
    CardSnapshot, CardState, ItemId, ItemLog, Rating, ReviewEvent, StateEngine, Timestamp,
};

#[derive(Debug, Clone, Default)]
pub struct StubCard {
    pub state: CardState,
    pub reps: u32,
    pub lapses: u32,
    pub last_review: Option<DateTime<Utc>>,
}

/// Engine whose resulting state depends only on the rating
///
/// Again → Relearning, Hard → Learning, Good/Easy → Review. Difficulty is
/// the lapse count; the card is due `reps` days after its last review.
pub struct RatingEngine;

impl StateEngine for RatingEngine {
    type Card = StubCard;
    type Log = Rating;

    fn new_card(&self) -> StubCard {
        StubCard::default()
    }

    fn advance(&self, card: &StubCard, rating: Rating, at: Timestamp) -> (StubCard, Rating) {
        let state = match rating {
            Rating::Again => CardState::Relearning,
            Rating::Hard => CardState::Learning,
            Rating::Good | Rating::Easy => CardState::Review,
        };
        let lapses = card.lapses + u32::from(rating == Rating::Again);
        let next = StubCard {
            state,
            reps: card.reps + 1,
            lapses,
            last_review: Some(at.with_timezone(&Utc)),
        };
        (next, rating)
    }

    fn snapshot(&self, card: &StubCard) -> CardSnapshot {
        let last = card.last_review.unwrap_or_else(epoch);
        CardSnapshot {
            state: card.state,
            difficulty: f64::from(card.lapses),
            stability: f64::from(card.reps),
            due: last + TimeDelta::days(i64::from(card.reps)),
            reps: card.reps,
            lapses: card.lapses,
        }
    }
}

/// Engine that ignores ratings and cycles New → Learning → Review → Relearning → Learning ...
pub struct CyclingEngine;

impl StateEngine for CyclingEngine {
    type Card = CardState;
    type Log = ();

    fn new_card(&self) -> CardState {
        CardState::New
    }

    fn advance(&self, card: &CardState, _rating: Rating, _at: Timestamp) -> (CardState, ()) {
        let next = match card {
            CardState::New | CardState::Relearning => CardState::Learning,
            CardState::Learning => CardState::Review,
            CardState::Review => CardState::Relearning,
        };
        (next, ())
    }

    fn snapshot(&self, card: &CardState) -> CardSnapshot {
        CardSnapshot {
            state: *card,
            difficulty: 0.0,
            stability: 0.0,
            due: epoch(),
            reps: 0,
            lapses: 0,
        }
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap()
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// Noon UTC on the given date
pub fn noon(y: i32, m: u32, d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().fixed_offset()
}

pub fn event(at: Timestamp, rating: Rating) -> ReviewEvent {
    ReviewEvent::new(at, rating)
}

pub fn item(id: u64, events: Vec<ReviewEvent>) -> ItemLog<ReviewEvent> {
    ItemLog::new(ItemId(id), events)
}
