//! Final card state per item
//!
//! Replays every item to the end of its log and keeps the resulting card
//! snapshot, for summary questions such as "which words are hardest" or
//! "which reviews are most overdue".

use crate::engine::{CardSnapshot, StateEngine};
use crate::normalize::{normalize_log, ReviewRecord};
use crate::types::{CardState, ItemId, ItemLog, Result};
use chrono::FixedOffset;

#[derive(Debug, Clone, PartialEq)]
pub struct DeckEntry {
    pub id: ItemId,
    pub snapshot: CardSnapshot,
    /// Reviews replayed for this item
    pub reviews: usize,
}

/// Final snapshot of every item in an export
#[derive(Debug, Clone, Default)]
pub struct Deck {
    entries: Vec<DeckEntry>,
}

impl Deck {
    /// Replay all items; the first invalid record aborts the build
    pub fn build<E, R>(items: &[ItemLog<R>], engine: &E, offset: &FixedOffset) -> Result<Self>
    where
        E: StateEngine,
        R: ReviewRecord,
    {
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let events = normalize_log(&item.records, offset)?;
            let card = events.iter().fold(engine.new_card(), |card, event| {
                engine.advance(&card, event.rating, event.timestamp).0
            });
            entries.push(DeckEntry {
                id: item.id,
                snapshot: engine.snapshot(&card),
                reviews: events.len(),
            });
        }

        log::debug!("Deck built with {} cards", entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn get(&self, id: ItemId) -> Option<&DeckEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Items in the deck, reviewed or not
    pub fn reviewed_word_count(&self) -> usize {
        self.entries.len()
    }

    pub fn replayed_review_count(&self) -> usize {
        self.entries.iter().map(|e| e.reviews).sum()
    }

    pub fn count_in_state(&self, state: CardState) -> usize {
        self.entries.iter().filter(|e| e.snapshot.state == state).count()
    }

    /// Items currently in the review state
    pub fn known_word_count(&self) -> usize {
        self.count_in_state(CardState::Review)
    }

    /// Highest difficulty first; unreviewed items are left out
    pub fn hardest(&self, top: usize) -> Vec<&DeckEntry> {
        let mut reviewed: Vec<&DeckEntry> = self.reviewed().collect();
        reviewed.sort_by(|a, b| b.snapshot.difficulty.total_cmp(&a.snapshot.difficulty));
        reviewed.truncate(top);
        reviewed
    }

    /// Earliest due date first; unreviewed items are left out
    pub fn oldest_dues(&self, top: usize) -> Vec<&DeckEntry> {
        let mut reviewed: Vec<&DeckEntry> = self.reviewed().collect();
        reviewed.sort_by_key(|e| e.snapshot.due);
        reviewed.truncate(top);
        reviewed
    }

    fn reviewed(&self) -> impl Iterator<Item = &DeckEntry> {
        self.entries.iter().filter(|e| e.reviews > 0)
    }
}
