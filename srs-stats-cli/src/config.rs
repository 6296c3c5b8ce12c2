//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use srs_timeline::{parse_offset, GradeMap, GroupingMode, Rating, TimelineConfig};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub timeline: TimelineSection,
    #[serde(default)]
    pub grades: GradesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimelineSection {
    /// `UTC` or a fixed offset such as `+09:00`
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_grouping")]
    pub grouping: String,
    #[serde(default = "default_true")]
    pub show_bars: bool,
}

impl Default for TimelineSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            grouping: default_grouping(),
            show_bars: true,
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_grouping() -> String {
    "half-year".to_string()
}

fn default_true() -> bool {
    true
}

/// Extra grade translations on top of the built-in jpdb ones
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GradesConfig {
    /// grade word → rating name (`again`, `hard`, `good`, `easy`)
    #[serde(default)]
    pub map: BTreeMap<String, String>,
    /// grade words whose reviews are dropped
    #[serde(default)]
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    pub output_dir: Option<PathBuf>,
    /// Length of the "hardest" and "oldest due" lists
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output_dir: None,
            top: default_top(),
        }
    }
}

fn default_top() -> usize {
    10
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Csv,
}

impl AppConfig {
    /// Library-side timeline configuration (wall-clock "now")
    pub fn timeline_config(&self) -> Result<TimelineConfig> {
        let offset = parse_offset(&self.timeline.timezone)
            .with_context(|| format!("Invalid timeline.timezone: {:?}", self.timeline.timezone))?;
        Ok(TimelineConfig::new().with_offset(offset))
    }

    pub fn grouping(&self) -> Result<GroupingMode> {
        self.timeline
            .grouping
            .parse()
            .with_context(|| format!("Invalid timeline.grouping: {:?}", self.timeline.grouping))
    }

    /// Built-in jpdb grades with the configured overrides applied
    pub fn grade_map(&self) -> Result<GradeMap> {
        let mut grades = GradeMap::default();
        for (grade, rating) in &self.grades.map {
            let rating: Rating = rating
                .parse()
                .with_context(|| format!("Invalid rating for grade {:?}", grade))?;
            grades = grades.with_grade(grade, rating);
        }
        for grade in &self.grades.ignored {
            grades = grades.with_ignored(grade);
        }
        Ok(grades)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    // Fail on bad values before any export is read
    config.timeline_config()?;
    config.grouping()?;
    config.grade_map()?;

    Ok(config)
}
