//! Review record normalization
//!
//! Review logs reach the library in several shapes: already-normalized
//! events, `(instant, rating)` pairs, dict-like JSON records, or the raw
//! records produced by the export loader. Each shape implements
//! [`ReviewRecord`], which exposes its timestamp and rating in a raw form;
//! [`normalize`] then validates both and produces a canonical
//! [`ReviewEvent`] in the sampling offset.

use crate::types::{Rating, Result, ReviewEvent, TimelineError, Timestamp};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde_json::Value;

/// Timestamp as carried by a review record, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    /// Instant with an explicit offset
    Aware(Timestamp),
    /// Wall-clock time with no zone attached (always rejected)
    Naive(NaiveDateTime),
    /// Seconds since the Unix epoch (UTC by definition)
    EpochSeconds(i64),
    /// Textual timestamp, expected to be RFC 3339
    Text(String),
    Missing,
}

/// Rating as carried by a review record, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum RawRating {
    Rating(Rating),
    Integer(i64),
    Text(String),
    Missing,
}

/// Anything that exposes a review timestamp and rating
pub trait ReviewRecord {
    fn raw_timestamp(&self) -> RawTimestamp;
    fn raw_rating(&self) -> RawRating;
}

/// Raw review record produced by the export loader
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewInput {
    pub timestamp: RawTimestamp,
    pub rating: RawRating,
}

impl ReviewRecord for ReviewInput {
    fn raw_timestamp(&self) -> RawTimestamp {
        self.timestamp.clone()
    }

    fn raw_rating(&self) -> RawRating {
        self.rating.clone()
    }
}

impl ReviewRecord for ReviewEvent {
    fn raw_timestamp(&self) -> RawTimestamp {
        RawTimestamp::Aware(self.timestamp)
    }

    fn raw_rating(&self) -> RawRating {
        RawRating::Rating(self.rating)
    }
}

impl<Tz: TimeZone> ReviewRecord for (DateTime<Tz>, Rating) {
    fn raw_timestamp(&self) -> RawTimestamp {
        RawTimestamp::Aware(self.0.fixed_offset())
    }

    fn raw_rating(&self) -> RawRating {
        RawRating::Rating(self.1)
    }
}

impl ReviewRecord for (NaiveDateTime, Rating) {
    fn raw_timestamp(&self) -> RawTimestamp {
        RawTimestamp::Naive(self.0)
    }

    fn raw_rating(&self) -> RawRating {
        RawRating::Rating(self.1)
    }
}

/// Dict-like records: `timestamp` (or `review_datetime`) plus `rating` (or `grade`)
impl ReviewRecord for Value {
    fn raw_timestamp(&self) -> RawTimestamp {
        let field = self.get("timestamp").or_else(|| self.get("review_datetime"));
        match field {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(secs) => RawTimestamp::EpochSeconds(secs),
                None => RawTimestamp::Text(n.to_string()),
            },
            Some(Value::String(s)) => RawTimestamp::Text(s.clone()),
            Some(other) => RawTimestamp::Text(other.to_string()),
            None => RawTimestamp::Missing,
        }
    }

    fn raw_rating(&self) -> RawRating {
        let field = self.get("rating").or_else(|| self.get("grade"));
        match field {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) => RawRating::Integer(v),
                None => RawRating::Text(n.to_string()),
            },
            Some(Value::String(s)) => RawRating::Text(s.clone()),
            Some(other) => RawRating::Text(other.to_string()),
            None => RawRating::Missing,
        }
    }
}

/// Validate a raw timestamp and express it in `offset`
pub fn parse_timestamp(raw: RawTimestamp, offset: &FixedOffset) -> Result<Timestamp> {
    let aware = match raw {
        RawTimestamp::Aware(ts) => ts,
        RawTimestamp::Naive(_) => return Err(TimelineError::MissingTimezone),
        RawTimestamp::EpochSeconds(secs) => DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| TimelineError::InvalidTimestamp(secs.to_string()))?
            .fixed_offset(),
        RawTimestamp::Text(text) => parse_timestamp_text(&text)?,
        RawTimestamp::Missing => return Err(TimelineError::MissingField("timestamp")),
    };
    Ok(aware.with_timezone(offset))
}

fn parse_timestamp_text(text: &str) -> Result<Timestamp> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts);
    }
    // A well-formed wall-clock time without an offset is a zone error, not a format error
    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    if NAIVE_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
    {
        return Err(TimelineError::MissingTimezone);
    }
    Err(TimelineError::InvalidTimestamp(text.to_string()))
}

/// Validate a raw rating
pub fn parse_rating(raw: RawRating) -> Result<Rating> {
    match raw {
        RawRating::Rating(r) => Ok(r),
        RawRating::Integer(v) => Rating::try_from(v),
        RawRating::Text(s) => s.parse(),
        RawRating::Missing => Err(TimelineError::MissingField("rating")),
    }
}

/// Normalize one review record into a canonical event
pub fn normalize<R: ReviewRecord + ?Sized>(
    record: &R,
    offset: &FixedOffset,
) -> Result<ReviewEvent> {
    let timestamp = parse_timestamp(record.raw_timestamp(), offset)?;
    let rating = parse_rating(record.raw_rating())?;
    Ok(ReviewEvent::new(timestamp, rating))
}

/// Normalize a whole item log and sort it chronologically
///
/// The first invalid record aborts the item; nothing is returned for the
/// records that preceded it.
pub fn normalize_log<R: ReviewRecord>(
    records: &[R],
    offset: &FixedOffset,
) -> Result<Vec<ReviewEvent>> {
    let mut events = records
        .iter()
        .map(|r| normalize(r, offset))
        .collect::<Result<Vec<_>>>()?;
    events.sort_by_key(|e| e.timestamp);
    Ok(events)
}

/// Parse a sampling offset: `UTC`, `Z`, or `±HH:MM`
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| TimelineError::InvalidTimezone(s.to_string()));
    }

    let invalid = || TimelineError::InvalidTimezone(s.to_string());
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours = offset_part(hours).ok_or_else(invalid)?;
    let minutes = offset_part(minutes).ok_or_else(invalid)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// One or two ASCII digits; no sign
fn offset_part(part: &str) -> Option<i32> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
