//! Timeline configuration types
//!
//! This module defines the small amount of configuration the replay needs:
//! which offset calendar days are counted in, which instant counts as "now",
//! and which card states feed the two daily series. Everything else (file
//! paths, output format, grade words) belongs to the application layer.

use crate::types::{CardState, Timestamp};
use chrono::{FixedOffset, Offset, Utc};

/// Configuration for a timeline reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    /// Offset in which calendar days start and end
    pub offset: FixedOffset,

    /// Sampling horizon; `None` means the wall clock at reconstruction time
    pub now: Option<Timestamp>,

    /// State counted by the "known" series and the first-entry map
    pub known_state: CardState,

    /// State counted by the "relearning" series
    pub relearning_state: CardState,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            now: None,
            known_state: CardState::Review,
            relearning_state: CardState::Relearning,
        }
    }
}

impl TimelineConfig {
    /// Create a new configuration with default settings (UTC, wall clock)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the sampling offset
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Builder method: pin "now" (tests and reproducible reports)
    pub fn with_now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    /// Builder method: set the state tracked as "known"
    pub fn with_known_state(mut self, state: CardState) -> Self {
        self.known_state = state;
        self
    }

    /// Builder method: set the state tracked as "relearning"
    pub fn with_relearning_state(mut self, state: CardState) -> Self {
        self.relearning_state = state;
        self
    }

    /// The sampling horizon, expressed in the configured offset
    pub fn resolve_now(&self) -> Timestamp {
        match self.now {
            Some(now) => now.with_timezone(&self.offset),
            None => Utc::now().with_timezone(&self.offset),
        }
    }
}
