//! jpdb review export loading
//!
//! Reads the `reviews.json` export and turns each vocabulary card into an
//! [`ItemLog`] of raw review records. jpdb grades words ("okay", "fail", ...)
//! rather than rating them, so a [`GradeMap`] translates grades into
//! [`Rating`]s and drops grades that carry no scheduling information.
//! Grade words that neither translate nor parse as a rating are skipped with
//! a warning.

use crate::normalize::{parse_rating, RawRating, RawTimestamp, ReviewInput};
use crate::types::{ItemId, ItemLog, Rating, Result};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Top level of the export document
#[derive(Debug, Clone, Deserialize)]
pub struct JpdbExport {
    #[serde(rename = "cards_vocabulary_jp_en", default)]
    pub words: Vec<JpdbWord>,
}

/// One vocabulary card with its review history
#[derive(Debug, Clone, Deserialize)]
pub struct JpdbWord {
    pub vid: u64,
    #[serde(default)]
    pub spelling: Option<Label>,
    #[serde(default)]
    pub reading: Option<Label>,
    #[serde(default)]
    pub reviews: Vec<JpdbReview>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JpdbReview {
    pub timestamp: TimestampField,
    #[serde(alias = "rating")]
    pub grade: GradeField,
    #[serde(default)]
    pub from_anki: bool,
}

/// Spelling and reading are usually text, older exports carry numeric ids
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(i64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(s) => f.write_str(s),
            Label::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimestampField {
    EpochSeconds(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GradeField {
    Integer(i64),
    Text(String),
}

impl From<&TimestampField> for RawTimestamp {
    fn from(field: &TimestampField) -> Self {
        match field {
            TimestampField::EpochSeconds(secs) => RawTimestamp::EpochSeconds(*secs),
            TimestampField::Text(s) => RawTimestamp::Text(s.clone()),
        }
    }
}

/// Translation from jpdb grade words to ratings
#[derive(Debug, Clone, PartialEq)]
pub struct GradeMap {
    ratings: HashMap<String, Rating>,
    ignored: HashSet<String>,
}

impl Default for GradeMap {
    fn default() -> Self {
        let ratings = [
            ("fail", Rating::Again),
            ("nothing", Rating::Again),
            ("something", Rating::Again),
            ("hard", Rating::Hard),
            ("okay", Rating::Good),
            ("easy", Rating::Easy),
        ];
        let ignored = ["known", "unknown", "never-forget", "blacklist"];

        Self {
            ratings: ratings
                .into_iter()
                .map(|(grade, rating)| (grade.to_string(), rating))
                .collect(),
            ignored: ignored.into_iter().map(str::to_string).collect(),
        }
    }
}

impl GradeMap {
    /// A map that translates nothing and ignores nothing
    pub fn empty() -> Self {
        Self {
            ratings: HashMap::new(),
            ignored: HashSet::new(),
        }
    }

    /// Builder method: map a grade word to a rating
    pub fn with_grade(mut self, grade: impl AsRef<str>, rating: Rating) -> Self {
        let key = grade.as_ref().trim().to_lowercase();
        self.ignored.remove(&key);
        self.ratings.insert(key, rating);
        self
    }

    /// Builder method: drop reviews carrying this grade
    pub fn with_ignored(mut self, grade: impl AsRef<str>) -> Self {
        let key = grade.as_ref().trim().to_lowercase();
        self.ratings.remove(&key);
        self.ignored.insert(key);
        self
    }

    /// `None` for ignored grades; unknown words pass through for the normalizer to judge
    pub fn translate(&self, grade: &GradeField) -> Option<RawRating> {
        match grade {
            GradeField::Integer(v) => Some(RawRating::Integer(*v)),
            GradeField::Text(text) => {
                let key = text.trim().to_lowercase();
                if self.ignored.contains(&key) {
                    None
                } else if let Some(rating) = self.ratings.get(&key) {
                    Some(RawRating::Rating(*rating))
                } else {
                    Some(RawRating::Text(text.clone()))
                }
            }
        }
    }
}

impl JpdbExport {
    /// Parse an export from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an export from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load an export from disk
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading review export: {:?}", path);

        let file = File::open(path)?;
        let export = Self::from_reader(BufReader::new(file))?;

        log::info!(
            "Export loaded: {} words, {} reviews",
            export.words.len(),
            export.total_review_count()
        );
        Ok(export)
    }

    /// Review records in the file, ignored grades included
    pub fn total_review_count(&self) -> usize {
        self.words.iter().map(|w| w.reviews.len()).sum()
    }

    pub fn word(&self, id: ItemId) -> Option<&JpdbWord> {
        self.words.iter().find(|w| w.vid == id.0)
    }

    /// Per-word raw review logs, with grades translated through `grades`
    ///
    /// Reviews with ignored grades are dropped, as are reviews whose grade is
    /// not a rating at all.
    pub fn item_logs(&self, grades: &GradeMap) -> Vec<ItemLog<ReviewInput>> {
        self.words
            .iter()
            .map(|word| {
                let records: Vec<ReviewInput> = word
                    .reviews
                    .iter()
                    .filter_map(|review| {
                        let rating = grades.translate(&review.grade)?;
                        if let Err(e) = parse_rating(rating.clone()) {
                            log::warn!("Word {}: skipping review: {}", word.vid, e);
                            return None;
                        }
                        Some(ReviewInput {
                            timestamp: RawTimestamp::from(&review.timestamp),
                            rating,
                        })
                    })
                    .collect();

                let dropped = word.reviews.len() - records.len();
                if dropped > 0 {
                    log::debug!("Word {}: dropped {} reviews", word.vid, dropped);
                }
                ItemLog::new(ItemId(word.vid), records)
            })
            .collect()
    }
}

impl JpdbWord {
    /// Spelling, falling back to the reading, then the id
    pub fn display_name(&self) -> String {
        match (&self.spelling, &self.reading) {
            (Some(spelling), Some(reading)) if spelling != reading => {
                format!("{} ({})", spelling, reading)
            }
            (Some(spelling), _) => spelling.to_string(),
            (None, Some(reading)) => reading.to_string(),
            (None, None) => format!("#{}", self.vid),
        }
    }
}
