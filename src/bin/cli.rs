//! Job ad collector CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use jobads::{
    error::{AppError, Result},
    models::{Config, Language, Site},
    pipeline::{self, ExportFormat},
    services::CancelFlag,
    storage::{AdQuery, JobStore, LocalStorage},
    utils::http::HttpFetcher,
};

const DATE_FORMAT: &str = "%d-%m-%Y";

/// jobads - Finnish Job Ad Collector
#[derive(Parser, Debug)]
#[command(
    name = "jobads",
    version,
    about = "Collects job advertisements from Finnish job boards"
)]
struct Cli {
    /// Path to storage directory containing config.toml and the job store
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search every configured site and store new ads
    Collect {
        /// Search term (repeatable); defaults to the configured terms
        #[arg(short, long = "term")]
        terms: Vec<String>,
    },

    /// Write stored ads to an HTML or CSV file
    Export {
        /// Output file
        output: PathBuf,

        /// First date to include (dd-mm-YYYY)
        #[arg(long, value_parser = parse_date, default_value = "01-01-2015")]
        start: NaiveDate,

        /// Last date to include (dd-mm-YYYY), default today
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// html or csv
        #[arg(short, long, default_value = "html")]
        format: ExportFormat,

        /// Only ads detected as this language (English or Finnish)
        #[arg(long)]
        language: Option<Language>,

        /// Only ads with a relevance tag
        #[arg(long)]
        classified: bool,
    },

    /// Mark a stored ad as relevant (1) or not (0)
    Tag {
        site: Site,
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        relevant: u8,
    },

    /// Validate configuration files
    Validate,

    /// Show job store info
    Info,
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("expected dd-mm-YYYY, got '{value}': {e}"))
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Cancel the flag on the first Ctrl-C.
fn spawn_interrupt_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping after the current term...");
            cancel.cancel();
        }
    });
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("jobads starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = Arc::new(LocalStorage::with_file(
        &cli.storage_dir,
        config.storage.file.clone(),
    ));

    match cli.command {
        Command::Collect { terms } => {
            config.validate()?;

            let fetcher = Arc::new(HttpFetcher::new(&config.collector)?);
            let cancel = CancelFlag::new();
            spawn_interrupt_handler(cancel.clone());

            let report =
                pipeline::run_collect(&config, fetcher, storage.clone(), &terms, cancel).await?;
            if report.cancelled {
                log::warn!("Collection was interrupted");
            }
        }

        Command::Export {
            output,
            start,
            end,
            format,
            language,
            classified,
        } => {
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            if start > end {
                return Err(AppError::validation(format!(
                    "start date {start} is after end date {end}"
                )));
            }

            let query = AdQuery::between(Some(start), Some(end))
                .with_language(language)
                .classified(classified);
            pipeline::run_export(storage.as_ref(), &query, &output, format).await?;
        }

        Command::Tag { site, id, relevant } => {
            pipeline::run_tag(storage.as_ref(), site, &id, relevant).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} terms, {} sites)",
                config.search.terms.len(),
                config.search.sites.len()
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let store_path = storage.store_path();
            if store_path.exists() {
                let ads = storage.get_ads(&AdQuery::default()).await?;
                let tagged = ads.iter().filter(|ad| ad.relevant.is_some()).count();
                log::info!("Job store: {}", store_path.display());
                log::info!("Stored ads: {} ({} tagged)", ads.len(), tagged);
                if let Some(latest) = ads.iter().filter_map(|ad| ad.date).max() {
                    log::info!("Newest ad: {}", latest.format(DATE_FORMAT));
                }
            } else {
                log::info!("No job store found yet.");
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
