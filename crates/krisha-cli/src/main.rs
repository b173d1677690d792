use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use krisha_acquire::HttpFetcher;
use krisha_merge::{DuplicatePolicy, MergeOptions};

#[derive(Parser)]
#[command(name = "krisha")]
#[command(about = "Enrich listing datasets with square-footage fields scraped from listing pages")]
#[command(version)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every url in a CSV file and write the fields back into it
    Merge {
        /// CSV file with a `url` column; rewritten in place
        #[arg(default_value = "test.csv")]
        csv: PathBuf,

        /// How to join rows whose url appears more than once
        #[arg(short, long, value_enum, default_value = "fan-out")]
        duplicates: Duplicates,
    },

    /// Scrape the given urls and print the extracted fields as JSON
    Extract {
        /// Listing page urls
        #[arg(required = true)]
        urls: Vec<String>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Duplicates {
    /// Standard left join: one output row per matching record
    FanOut,
    /// Keep the original row count; use the first record per url
    FirstMatch,
}

impl From<Duplicates> for DuplicatePolicy {
    fn from(value: Duplicates) -> Self {
        match value {
            Duplicates::FanOut => DuplicatePolicy::FanOut,
            Duplicates::FirstMatch => DuplicatePolicy::FirstMatch,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,hyper_util=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,hyper_util=info",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let fetcher = HttpFetcher::new();

    match cli.command {
        Commands::Merge { csv, duplicates } => {
            tracing::info!(path = %csv.display(), "Updating dataset");
            let options = MergeOptions {
                duplicates: duplicates.into(),
            };
            let report = krisha_merge::merge(&csv, &fetcher, &options).await?;
            if report.fetch_failures > 0 {
                tracing::warn!(
                    failures = report.fetch_failures,
                    urls = report.urls,
                    "Some listings could not be fetched; their fields are empty"
                );
            }
            tracing::info!("Data has been updated in {}", csv.display());
        }
        Commands::Extract { urls, output } => {
            let records = krisha_acquire::extract(&fetcher, &urls).await;
            let json = serde_json::to_string_pretty(&records)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), records = records.len(), "Wrote extracted records");
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
