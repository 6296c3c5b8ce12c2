//! SRS Stats CLI Application
//!
//! This is the command-line interface for the review-history analyzer.
//! It uses the srs-timeline library and adds:
//! - Argument parsing and export path validation
//! - TOML configuration (timezone, grade words, output)
//! - Opening the jpdb export page in a browser
//! - Report generation (text chart or CSV files)

use anyhow::{Context, Result};
use clap::Parser;
use srs_timeline::{Deck, FsrsEngine, JpdbExport, Replayer, TimelineError};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod browser;
mod config;
mod report;

use config::{AppConfig, OutputFormat};
use report::{render_timeline, write_summary, CsvChart, TxtChart};

/// SRS Stats - View stats of your SRS from jpdb
#[derive(Parser, Debug)]
#[command(name = "srs-stats")]
#[command(about = "View stats of your SRS from Jpdb.", long_about = None)]
#[command(version)]
struct Args {
    /// Get the stats of the SRS from a JSON data file. You can get it with the -g option.
    #[arg(
        short = 'r',
        long = "json",
        visible_aliases = ["json-path", "read"],
        value_name = "FILE",
        value_parser = json_path
    )]
    json: Option<PathBuf>,

    /// Open "https://jpdb.io/export/reviews.json" to get the JSON file
    #[arg(short = 'g', long)]
    get_json: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write CSV files to this directory instead of printing a chart
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, thiserror::Error)]
enum JsonPathError {
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("not a .json file: {0:?}")]
    NotJson(PathBuf),
}

/// Accept only existing files with a `.json` extension
fn json_path(s: &str) -> std::result::Result<PathBuf, JsonPathError> {
    let path = PathBuf::from(s);
    if !path.is_file() {
        return Err(JsonPathError::NotFound(path));
    }
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(JsonPathError::NotJson(path));
    }
    Ok(path)
}

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("SRS Stats CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using timeline library v{}", srs_timeline::VERSION);

    if args.get_json {
        browser::open_url(browser::EXPORT_URL)?;
        if args.json.is_none() {
            return Ok(ExitCode::from(1));
        }
    }

    let Some(json_path) = &args.json else {
        // No arguments - show help
        println!("SRS Stats - No input specified");
        println!("\nQuick Start:");
        println!("  srs-stats -g                  # download reviews.json from jpdb");
        println!("  srs-stats -r reviews.json");
        println!("\nUse --help for more options");
        return Ok(ExitCode::SUCCESS);
    };

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    stats_mode(json_path, &app_config, &args)
}

/// Replay the export, print the summary and render the timeline
fn stats_mode(json_path: &Path, config: &AppConfig, args: &Args) -> Result<ExitCode> {
    let timeline_config = config.timeline_config()?;
    let grouping = config.grouping()?;
    let grades = config.grade_map()?;

    println!("═══════════════════════════════════════════════");
    println!("  SRS Stats");
    println!("═══════════════════════════════════════════════");

    let export = JpdbExport::load(json_path)
        .with_context(|| format!("Failed to load review export: {:?}", json_path))?;
    let items = export.item_logs(&grades);
    let engine = FsrsEngine::default();

    let deck = Deck::build(&items, &engine, &timeline_config.offset)
        .context("Failed to replay review history")?;
    write_summary(&mut io::stdout().lock(), &export, &deck, config.output.top)?;

    let report = match Replayer::new(&engine, timeline_config).reconstruct(&items) {
        Ok(report) => report,
        Err(TimelineError::EmptyInput) => {
            println!("\nNo logs found to plot.");
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => return Err(e).context("Failed to reconstruct timeline"),
    };
    let buckets = config.timeline.show_bars.then(|| report.buckets(grouping));

    println!(
        "\n📈 Known words over time ({} → {})",
        report.window.start_day, report.window.end_day
    );

    // --output-dir implies CSV output
    let format = if args.output_dir.is_some() {
        OutputFormat::Csv
    } else {
        config.output.format
    };

    match format {
        OutputFormat::Txt => {
            let mut chart = TxtChart::new(io::stdout().lock());
            render_timeline(&mut chart, &report, buckets.as_deref())?;
        }
        OutputFormat::Csv => {
            let dir = args
                .output_dir
                .clone()
                .or_else(|| config.output.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let mut chart = CsvChart::new(&dir)?;
            render_timeline(&mut chart, &report, buckets.as_deref())?;
            println!("✓ Wrote {} files to {:?}", chart.written().len(), dir);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
