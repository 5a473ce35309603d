//! # SAM-Radar
//!
//! Polls news-search APIs for the number of articles mentioning a company or
//! individual within a recent time window, and reports the counts.
//!
//! ## Features
//!
//! - Queries GNews and a configurable NewsLookup endpoint concurrently
//! - Each source is timeout-bounded and fails independently; a failed
//!   source reports a zero count with the error attached
//! - Combines counts as a total or as a leader/difference comparison
//! - Scores sample headlines for adverse-media risk
//! - Optionally checks the term against the OpenSanctions watchlist
//! - Prints a table to the terminal and optionally writes JSON snapshots,
//!   Markdown reports, and CSV exports
//!
//! ## Usage
//!
//! ```sh
//! GNEWS_API_KEY=... sam_radar --term "Litasco" --once
//! ```
//!
//! ## Architecture
//!
//! Each cycle is stateless:
//! 1. **Fetching**: one request per source, joined before reporting
//! 2. **Reporting**: one log line per source, then the combined figure
//! 3. **Rendering**: console table, JSON, Markdown, and CSV outputs

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetcher;
mod models;
mod outputs;
mod reporter;
mod runner;
mod sanctions;
mod screening;
mod sources;
mod utils;

use cli::Cli;
use config::Settings;
use fetcher::Fetcher;
use outputs::{
    console::ConsoleRenderer, csv_export::CsvRenderer, json::JsonRenderer, markdown::MarkdownRenderer,
};
use reporter::{Renderer, Reporter};
use screening::aliases_for;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sam_radar starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.json_output_dir, ?args.markdown_output_dir, "Parsed CLI arguments");

    let file = args.config.as_deref().map(|p| config::load_file(p)).transpose()?;
    let settings = Settings::resolve(&args, file)?;

    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
    if settings.console {
        renderers.push(Box::new(ConsoleRenderer));
    }
    if let Some(dir) = &settings.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
        renderers.push(Box::new(JsonRenderer::new(dir)));
    }
    if let Some(dir) = &settings.markdown_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Markdown output directory is not writable");
            return Err(e);
        }
        renderers.push(Box::new(MarkdownRenderer::new(dir)));
    }
    if let Some(dir) = &settings.csv_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "CSV output directory is not writable");
            return Err(e);
        }
        renderers.push(Box::new(CsvRenderer::new(dir)));
    }

    let fetcher = Fetcher::new(settings.sources.clone(), settings.timeout, settings.headline_limit)?
        .with_sanctions(settings.sanctions.clone());
    let aliases = aliases_for(&settings.term);
    info!(
        term = %settings.term,
        ?aliases,
        sources = fetcher.source_count(),
        sanctions = settings.sanctions.is_some(),
        renderers = renderers.len(),
        "Configuration loaded"
    );

    let reporter = Reporter::new(settings.combine, renderers);

    runner::run(&fetcher, &reporter, &settings, &aliases).await?;

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}
