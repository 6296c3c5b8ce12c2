//! Report generation
//!
//! Renders the reconstructed timeline through a [`ChartSink`] (a text chart
//! on stdout, or CSV files for an external plotting tool) and prints the
//! deck summary.

use anyhow::{Context, Result};
use chrono::Datelike;
use srs_timeline::{Bucket, DailyCount, Deck, JpdbExport, TimelineReport};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Something that can draw ordered day series and calendar bars
pub trait ChartSink {
    fn plot_series(&mut self, label: &str, series: &[DailyCount]) -> Result<()>;
    fn plot_bars(&mut self, label: &str, buckets: &[Bucket]) -> Result<()>;
}

/// Draw the known/relearning lines and, optionally, the first-entry bars
pub fn render_timeline(
    sink: &mut dyn ChartSink,
    report: &TimelineReport,
    buckets: Option<&[Bucket]>,
) -> Result<()> {
    sink.plot_series("Known", &report.known)?;
    sink.plot_series("Relearning", &report.relearning)?;
    if let Some(buckets) = buckets.filter(|b| !b.is_empty()) {
        sink.plot_bars("Learned per 6 months", buckets)?;
    }
    Ok(())
}

const BAR_WIDTH: usize = 40;

/// Text chart: one row per month end plus the last day
pub struct TxtChart<W: Write> {
    out: W,
}

impl<W: Write> TxtChart<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn bar(count: u32, max: u32) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count as usize * BAR_WIDTH).div_ceil(max as usize);
    "█".repeat(len)
}

impl<W: Write> ChartSink for TxtChart<W> {
    fn plot_series(&mut self, label: &str, series: &[DailyCount]) -> Result<()> {
        let max = series.iter().map(|c| c.count).max().unwrap_or(0);
        writeln!(self.out, "\n{} (max {})", label, max)?;
        writeln!(self.out, "───────────────────────────────────────────────")?;

        // Month ends keep long histories readable
        for (i, point) in series.iter().enumerate() {
            let is_last = i + 1 == series.len();
            let month_end = series
                .get(i + 1)
                .is_some_and(|next| next.day.month() != point.day.month());
            if is_last || month_end {
                writeln!(self.out, "{}  {:>6}  {}", point.day, point.count, bar(point.count, max))?;
            }
        }
        Ok(())
    }

    fn plot_bars(&mut self, label: &str, buckets: &[Bucket]) -> Result<()> {
        let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
        writeln!(self.out, "\n{}", label)?;
        writeln!(self.out, "───────────────────────────────────────────────")?;
        for bucket in buckets {
            writeln!(
                self.out,
                "{}  {} → {}  {:>6}  {}",
                bucket.label(),
                bucket.start,
                bucket.end,
                bucket.count,
                bar(bucket.count, max)
            )?;
        }
        Ok(())
    }
}

/// CSV files, one per series, in an output directory
pub struct CsvChart {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvChart {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, label: &str) -> PathBuf {
        let slug: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        self.dir.join(format!("{}.csv", slug))
    }
}

impl ChartSink for CsvChart {
    fn plot_series(&mut self, label: &str, series: &[DailyCount]) -> Result<()> {
        let path = self.path_for(label);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        writer.write_record(["day", "count"])?;
        for point in series {
            writer.write_record([point.day.to_string(), point.count.to_string()])?;
        }
        writer.flush()?;

        log::info!("Wrote {} rows to {:?}", series.len(), path);
        self.written.push(path);
        Ok(())
    }

    fn plot_bars(&mut self, label: &str, buckets: &[Bucket]) -> Result<()> {
        let path = self.path_for(label);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        writer.write_record(["bucket", "start", "end", "width_days", "count"])?;
        for bucket in buckets {
            writer.write_record([
                bucket.label(),
                bucket.start.to_string(),
                bucket.end.to_string(),
                bucket.width_days().to_string(),
                bucket.count.to_string(),
            ])?;
        }
        writer.flush()?;

        log::info!("Wrote {} buckets to {:?}", buckets.len(), path);
        self.written.push(path);
        Ok(())
    }
}

/// Totals, hardest words and oldest due dates
pub fn write_summary<W: Write>(
    out: &mut W,
    export: &JpdbExport,
    deck: &Deck,
    top: usize,
) -> Result<()> {
    writeln!(out, "\n📊 Review History:")?;
    writeln!(out, "  Words:    {}", deck.reviewed_word_count())?;
    writeln!(out, "  Reviews:  {}", export.total_review_count())?;
    writeln!(out, "  Replayed: {}", deck.replayed_review_count())?;
    writeln!(out, "  Known:    {}", deck.known_word_count())?;

    let name = |id| {
        export
            .word(id)
            .map_or_else(|| format!("#{}", id), |w| w.display_name())
    };

    writeln!(out, "\nHardest words:")?;
    for entry in deck.hardest(top) {
        writeln!(out, "  {:>5.2}  {}", entry.snapshot.difficulty, name(entry.id))?;
    }

    writeln!(out, "\nOldest due:")?;
    for entry in deck.oldest_dues(top) {
        writeln!(
            out,
            "  {}  {}",
            entry.snapshot.due.format("%Y-%m-%d"),
            name(entry.id)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use srs_timeline::{FsrsEngine, GradeMap, ObservationWindow};
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_report() -> TimelineReport {
        let counts = [0, 1, 1, 2, 2];
        TimelineReport {
            window: ObservationWindow::new(day(1), day(5)),
            now: Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap().fixed_offset(),
            known: counts
                .iter()
                .enumerate()
                .map(|(i, c)| DailyCount { day: day(i as u32 + 1), count: *c })
                .collect(),
            relearning: (1..=5).map(|d| DailyCount { day: day(d), count: 0 }).collect(),
            first_entries: BTreeMap::new(),
            items_replayed: 2,
            events_replayed: 3,
        }
    }

    fn sample_buckets() -> Vec<Bucket> {
        vec![Bucket {
            start: day(1),
            end: day(5),
            count: 2,
        }]
    }

    #[test]
    fn test_txt_chart() {
        let mut chart = TxtChart::new(Vec::new());
        let buckets = sample_buckets();
        render_timeline(&mut chart, &sample_report(), Some(buckets.as_slice())).unwrap();

        let text = String::from_utf8(chart.into_inner()).unwrap();
        assert!(text.contains("Known (max 2)"));
        assert!(text.contains("Relearning (max 0)"));
        assert!(text.contains("2024-01-05"));
        assert!(text.contains("Learned per 6 months"));
        assert!(text.contains("2024 H1"));
    }

    #[test]
    fn test_empty_buckets_not_plotted() {
        let mut chart = TxtChart::new(Vec::new());
        render_timeline(&mut chart, &sample_report(), Some(&[][..])).unwrap();
        let text = String::from_utf8(chart.into_inner()).unwrap();
        assert!(!text.contains("Learned per 6 months"));
    }

    #[test]
    fn test_csv_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut chart = CsvChart::new(dir.path()).unwrap();
        let buckets = sample_buckets();
        render_timeline(&mut chart, &sample_report(), Some(buckets.as_slice())).unwrap();

        assert_eq!(chart.written().len(), 3);
        let known = fs::read_to_string(dir.path().join("known.csv")).unwrap();
        let lines: Vec<&str> = known.lines().collect();
        assert_eq!(lines[0], "day,count");
        assert_eq!(lines[4], "2024-01-04,2");
        assert_eq!(lines.len(), 6);

        let bars = fs::read_to_string(dir.path().join("learned_per_6_months.csv")).unwrap();
        assert!(bars.contains("2024 H1,2024-01-01,2024-01-05,5,2"));
    }

    #[test]
    fn test_summary() {
        let json = r#"{"cards_vocabulary_jp_en": [
            {"vid": 5, "spelling": "本", "reading": "ほん", "reviews": [{"timestamp": 1704110400, "grade": "okay"}]}
        ]}"#;
        let export = JpdbExport::from_json(json).unwrap();
        let items = export.item_logs(&GradeMap::default());
        let offset = srs_timeline::parse_offset("UTC").unwrap();
        let deck = Deck::build(&items, &FsrsEngine::default(), &offset).unwrap();

        let mut out = Vec::new();
        write_summary(&mut out, &export, &deck, 10).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Words:    1"));
        assert!(text.contains("本 (ほん)"));
    }
}
