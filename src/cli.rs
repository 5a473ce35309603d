//! Command-line interface definitions for SAM-Radar.
//!
//! Every option can also come from the YAML config file; flags and
//! environment variables take precedence over the file.

use crate::config::CombinePolicy;
use clap::Parser;

/// Command-line arguments for SAM-Radar.
///
/// # Examples
///
/// ```sh
/// # One cycle, printed to the terminal
/// sam_radar --term "Litasco" --once
///
/// # Poll every 10 minutes and keep JSON and Markdown snapshots
/// sam_radar --term "Lukoil" --interval-secs 600 -j ./json -m ./markdown
///
/// # Sources and defaults from a file
/// sam_radar --config radar.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Company or individual to search for
    #[arg(short, long, env = "SAM_RADAR_TERM")]
    pub term: Option<String>,

    /// Size of the search window in hours, ending now
    #[arg(long)]
    pub window_hours: Option<u32>,

    /// Seconds between fetch cycles
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How the per-source counts are combined
    #[arg(long, value_enum)]
    pub combine: Option<CombinePolicy>,

    /// Maximum headlines kept per source
    #[arg(long)]
    pub headline_limit: Option<usize>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for JSON snapshots
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for Markdown reports
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Output directory for CSV exports of the screened headlines
    #[arg(long)]
    pub csv_output_dir: Option<String>,

    /// Check the term against the OpenSanctions watchlist every cycle
    #[arg(long)]
    pub sanctions: bool,

    /// OpenSanctions search endpoint URL
    #[arg(long, env = "OPENSANCTIONS_ENDPOINT")]
    pub sanctions_endpoint: Option<String>,

    /// OpenSanctions API key
    #[arg(long, env = "OPENSANCTIONS_API_KEY")]
    pub sanctions_api_key: Option<String>,

    /// Do not print the report table to stdout
    #[arg(long)]
    pub no_console: bool,

    /// GNews API key
    #[arg(long, env = "GNEWS_API_KEY")]
    pub gnews_api_key: Option<String>,

    /// NewsLookup API key
    #[arg(long, env = "NEWSLOOKUP_API_KEY")]
    pub newslookup_api_key: Option<String>,

    /// NewsLookup search endpoint URL
    #[arg(long, env = "NEWSLOOKUP_ENDPOINT")]
    pub newslookup_endpoint: Option<String>,
}
