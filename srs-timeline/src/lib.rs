//! SRS Timeline Library
//!
//! Reconstructs learning progress from a spaced-repetition review export.
//!
//! # Architecture
//!
//! The library replays each item's reviews through a memory model and samples
//! the resulting card states once per calendar day:
//! - Normalizes heterogeneous review records into timezone-aware events
//! - Replays events through an injected [`StateEngine`] (FSRS by default)
//! - Builds daily "known" and "relearning" series sampled at end of day
//! - Buckets the first time each item became known into half-years
//! - Summarizes final card state (known count, hardest words, oldest dues)
//!
//! The library does NOT:
//! - Implement or optimize the scheduling algorithm itself
//! - Parse command lines or configuration files
//! - Draw charts
//!
//! All of that lives in the application layer (srs-stats-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use srs_timeline::{FsrsEngine, GradeMap, GroupingMode, JpdbExport, Replayer, TimelineConfig};
//! use std::path::Path;
//!
//! let export = JpdbExport::load(Path::new("reviews.json")).unwrap();
//! let items = export.item_logs(&GradeMap::default());
//!
//! let engine = FsrsEngine::default();
//! let report = Replayer::new(&engine, TimelineConfig::new())
//!     .reconstruct(&items)
//!     .unwrap();
//!
//! for day in &report.known {
//!     println!("{}: {} known", day.day, day.count);
//! }
//! for bucket in report.buckets(GroupingMode::HalfYear) {
//!     println!("{}: {} learned", bucket.label(), bucket.count);
//! }
//! ```

// Public modules
pub mod buckets;
pub mod config;
pub mod deck;
pub mod engine;
pub mod export;
pub mod normalize;
pub mod timeline;
pub mod types;

// Re-export main types for convenience
pub use buckets::{bucket_first_entries, Bucket, GroupingMode};
pub use config::TimelineConfig;
pub use deck::{Deck, DeckEntry};
pub use engine::{CardSnapshot, FsrsEngine, StateEngine};
pub use export::{GradeMap, JpdbExport, JpdbWord};
pub use normalize::{
    normalize, normalize_log, parse_offset, RawRating, RawTimestamp, ReviewInput, ReviewRecord,
};
pub use timeline::{DayCounter, Replayer, TimelineReport};
pub use types::{
    CardState, DailyCount, ItemId, ItemLog, ObservationWindow, Rating, Result, ReviewEvent,
    TimelineError, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an export with no words reconstructs to nothing
        let export = JpdbExport::from_json("{}").unwrap();
        let items = export.item_logs(&GradeMap::default());
        let engine = FsrsEngine::default();
        let result = Replayer::new(&engine, TimelineConfig::new()).reconstruct(&items);
        assert!(matches!(result, Err(TimelineError::EmptyInput)));
    }
}
