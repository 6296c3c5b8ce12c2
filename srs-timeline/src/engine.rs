//! Memory-model abstraction
//!
//! The scheduling algorithm is not implemented here. Replay code only talks
//! to a [`StateEngine`], and [`FsrsEngine`] adapts the `rs-fsrs` scheduler to
//! that interface.

use crate::types::{CardState, Rating, Timestamp};
use chrono::{DateTime, Utc};
use rs_fsrs::{Card, Parameters, FSRS};

/// Summary of a card, independent of the engine's own card type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSnapshot {
    pub state: CardState,
    pub difficulty: f64,
    pub stability: f64,
    pub due: DateTime<Utc>,
    pub reps: u32,
    pub lapses: u32,
}

/// A state-transition function: `(card, rating, time) -> (card, log)`
pub trait StateEngine {
    /// Per-item scheduling state
    type Card: Clone;
    /// Whatever the engine records for a single review
    type Log;

    /// The state of an item that has never been reviewed
    fn new_card(&self) -> Self::Card;

    /// Apply one review to a card
    fn advance(&self, card: &Self::Card, rating: Rating, at: Timestamp) -> (Self::Card, Self::Log);

    fn snapshot(&self, card: &Self::Card) -> CardSnapshot;

    fn state(&self, card: &Self::Card) -> CardState {
        self.snapshot(card).state
    }
}

/// FSRS scheduler from the `rs-fsrs` crate
pub struct FsrsEngine {
    fsrs: FSRS,
}

impl FsrsEngine {
    pub fn new(parameters: Parameters) -> Self {
        Self {
            fsrs: FSRS::new(parameters),
        }
    }
}

impl Default for FsrsEngine {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl StateEngine for FsrsEngine {
    type Card = Card;
    type Log = rs_fsrs::ReviewLog;

    fn new_card(&self) -> Card {
        Card::new()
    }

    fn advance(&self, card: &Card, rating: Rating, at: Timestamp) -> (Card, rs_fsrs::ReviewLog) {
        let info = self
            .fsrs
            .next(card.clone(), at.with_timezone(&Utc), to_fsrs_rating(rating));
        (info.card, info.review_log)
    }

    fn snapshot(&self, card: &Card) -> CardSnapshot {
        CardSnapshot {
            state: from_fsrs_state(card.state),
            difficulty: card.difficulty,
            stability: card.stability,
            due: card.due,
            reps: u32::try_from(card.reps).unwrap_or(0),
            lapses: u32::try_from(card.lapses).unwrap_or(0),
        }
    }
}

fn to_fsrs_rating(rating: Rating) -> rs_fsrs::Rating {
    match rating {
        Rating::Again => rs_fsrs::Rating::Again,
        Rating::Hard => rs_fsrs::Rating::Hard,
        Rating::Good => rs_fsrs::Rating::Good,
        Rating::Easy => rs_fsrs::Rating::Easy,
    }
}

fn from_fsrs_state(state: rs_fsrs::State) -> CardState {
    match state {
        rs_fsrs::State::New => CardState::New,
        rs_fsrs::State::Learning => CardState::Learning,
        rs_fsrs::State::Review => CardState::Review,
        rs_fsrs::State::Relearning => CardState::Relearning,
    }
}
