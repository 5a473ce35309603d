//! Runtime settings, layered from presets, a YAML file, and the CLI.
//!
//! Precedence, lowest first:
//! 1. Built-in defaults and source presets ([`crate::sources::builtin`])
//! 2. The optional YAML file given with `--config`
//! 3. Environment variables and command-line flags
//!
//! A missing endpoint or API key is not a startup error. The affected
//! source reports an `Unconfigured` failure each cycle instead, so the
//! other source keeps working.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::sanctions::SanctionsConfig;
use crate::sources::{self, SourceConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const DEFAULT_WINDOW_HOURS: u32 = 24;
/// One leap year. The news APIs do not search further back than this.
pub const MAX_WINDOW_HOURS: u32 = 366 * 24;
pub const DEFAULT_INTERVAL_SECS: u64 = 300;
pub const MIN_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const DEFAULT_HEADLINE_LIMIT: usize = 5;

/// How per-source counts are folded into one figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CombinePolicy {
    /// Total of all counts.
    #[default]
    Sum,
    /// Which source leads and by how much.
    Compare,
}

/// Contents of the YAML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub term: Option<String>,
    pub window_hours: Option<u32>,
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub combine: Option<CombinePolicy>,
    pub headline_limit: Option<usize>,
    pub json_output_dir: Option<String>,
    pub markdown_output_dir: Option<String>,
    pub csv_output_dir: Option<String>,
    /// Enables the watchlist lookup when present.
    pub sanctions: Option<SanctionsConfig>,
    /// Replaces the built-in presets when present.
    pub sources: Option<Vec<SourceConfig>>,
}

/// Read and parse a YAML config file.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_file(path: impl AsRef<Path>) -> Result<FileConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: FileConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded config file");
    Ok(file)
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub term: String,
    pub window_hours: u32,
    pub interval: Duration,
    pub once: bool,
    pub timeout: Duration,
    pub combine: CombinePolicy,
    pub headline_limit: usize,
    pub sources: Vec<SourceConfig>,
    pub json_output_dir: Option<String>,
    pub markdown_output_dir: Option<String>,
    pub csv_output_dir: Option<String>,
    /// `None` when the watchlist lookup is disabled.
    pub sanctions: Option<SanctionsConfig>,
    pub console: bool,
}

impl Settings {
    /// Merge CLI arguments over an optional file config and validate the result.
    pub fn resolve(cli: &Cli, file: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let term = cli
            .term
            .clone()
            .or(file.term)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::EmptyTerm)?;

        let window_hours = cli
            .window_hours
            .or(file.window_hours)
            .unwrap_or(DEFAULT_WINDOW_HOURS);
        if window_hours == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if window_hours > MAX_WINDOW_HOURS {
            return Err(ConfigError::WindowTooLarge {
                max: MAX_WINDOW_HOURS,
                got: window_hours,
            });
        }

        let interval_secs = cli
            .interval_secs
            .or(file.interval_secs)
            .unwrap_or(DEFAULT_INTERVAL_SECS);
        if !cli.once && interval_secs < MIN_INTERVAL_SECS {
            return Err(ConfigError::IntervalTooShort {
                min: MIN_INTERVAL_SECS,
                got: interval_secs,
            });
        }

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);

        let mut sources = file.sources.unwrap_or_else(sources::builtin);
        apply_overrides(cli, &mut sources);
        for source in &mut sources {
            source.resolve_api_key_from_env();
        }
        validate_sources(&sources)?;

        let sanctions = resolve_sanctions(cli, file.sanctions);

        let settings = Settings {
            term,
            window_hours,
            interval: Duration::from_secs(interval_secs),
            once: cli.once,
            timeout: Duration::from_secs(timeout_secs),
            combine: cli.combine.or(file.combine).unwrap_or_default(),
            headline_limit: cli
                .headline_limit
                .or(file.headline_limit)
                .unwrap_or(DEFAULT_HEADLINE_LIMIT),
            sources,
            json_output_dir: cli.json_output_dir.clone().or(file.json_output_dir),
            markdown_output_dir: cli.markdown_output_dir.clone().or(file.markdown_output_dir),
            csv_output_dir: cli.csv_output_dir.clone().or(file.csv_output_dir),
            sanctions,
            console: !cli.no_console,
        };
        debug!(
            ?settings.combine,
            window_hours,
            interval_secs,
            timeout_secs,
            sanctions = settings.sanctions.is_some(),
            "Resolved settings"
        );
        Ok(settings)
    }
}

/// Apply the per-preset CLI/env flags to sources with a matching name.
fn apply_overrides(cli: &Cli, sources: &mut [SourceConfig]) {
    for source in sources.iter_mut() {
        if source.name.eq_ignore_ascii_case(sources::gnews::NAME) {
            if let Some(key) = &cli.gnews_api_key {
                source.api_key = Some(key.clone());
            }
        } else if source.name.eq_ignore_ascii_case(sources::newslookup::NAME) {
            if let Some(key) = &cli.newslookup_api_key {
                source.api_key = Some(key.clone());
            }
            if let Some(endpoint) = &cli.newslookup_endpoint {
                source.endpoint = Some(endpoint.clone());
            }
        }
    }
}

/// The lookup runs when `--sanctions` is passed or the file has a
/// `sanctions` section; CLI/env values override the file's.
fn resolve_sanctions(cli: &Cli, file: Option<SanctionsConfig>) -> Option<SanctionsConfig> {
    if !cli.sanctions && file.is_none() {
        return None;
    }
    let mut config = file.unwrap_or_default();
    if let Some(endpoint) = &cli.sanctions_endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(key) = &cli.sanctions_api_key {
        config.api_key = Some(key.clone());
    }
    Some(config)
}

fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::NoSources);
    }
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.name.to_lowercase()) {
            return Err(ConfigError::DuplicateSource(source.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["sam_radar"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_defaults_with_builtin_sources() {
        let settings = Settings::resolve(&cli(&["--term", " Litasco "]), None).unwrap();
        assert_eq!(settings.term, "Litasco");
        assert_eq!(settings.window_hours, DEFAULT_WINDOW_HOURS);
        assert_eq!(settings.interval, Duration::from_secs(DEFAULT_INTERVAL_SECS));
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.combine, CombinePolicy::Sum);
        assert_eq!(settings.sources.len(), 2);
        assert_eq!(settings.sources[0].name, "GNews");
        assert_eq!(settings.sources[1].name, "NewsLookup");
        assert!(settings.console);
    }

    #[test]
    fn test_empty_term_rejected() {
        let err = Settings::resolve(&cli(&["--term", "   "]), None).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTerm));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = Settings::resolve(&cli(&["--term", "x", "--window-hours", "0"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyWindow));
    }

    #[test]
    fn test_oversized_window_rejected_at_startup() {
        let err = Settings::resolve(&cli(&["--term", "x", "--window-hours", "4294967295", "--once"]), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WindowTooLarge { max: MAX_WINDOW_HOURS, got: 4294967295 }
        ));

        let ok = Settings::resolve(&cli(&["--term", "x", "--window-hours", "8784"]), None);
        assert_eq!(ok.unwrap().window_hours, MAX_WINDOW_HOURS);
    }

    #[test]
    fn test_sanctions_disabled_by_default() {
        let settings = Settings::resolve(&cli(&["--term", "x"]), None).unwrap();
        assert!(settings.sanctions.is_none());
        assert!(settings.csv_output_dir.is_none());
    }

    #[test]
    fn test_sanctions_flag_and_file_section() {
        let settings = Settings::resolve(
            &cli(&["--term", "x", "--sanctions", "--sanctions-endpoint", "http://127.0.0.1:9/match"]),
            None,
        )
        .unwrap();
        let sanctions = settings.sanctions.unwrap();
        assert_eq!(sanctions.endpoint, "http://127.0.0.1:9/match");

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("radar.yaml");
        fs::write(
            &path,
            "term: Litasco\ncsv_output_dir: ./csv\nsanctions:\n  limit: 3\n",
        )
        .unwrap();
        let settings = Settings::resolve(&cli(&[]), Some(load_file(&path).unwrap())).unwrap();
        assert_eq!(settings.csv_output_dir.as_deref(), Some("./csv"));
        let sanctions = settings.sanctions.unwrap();
        assert_eq!(sanctions.limit, 3);
        assert_eq!(sanctions.endpoint, crate::sanctions::ENDPOINT);
    }

    #[test]
    fn test_short_interval_rejected_unless_once() {
        let err = Settings::resolve(&cli(&["--term", "x", "--interval-secs", "3"]), None).unwrap_err();
        assert!(matches!(err, ConfigError::IntervalTooShort { min: 10, got: 3 }));

        let ok = Settings::resolve(&cli(&["--term", "x", "--interval-secs", "3", "--once"]), None);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_cli_overrides_preset_endpoint_and_key() {
        let settings = Settings::resolve(
            &cli(&[
                "--term",
                "x",
                "--newslookup-endpoint",
                "http://127.0.0.1:9/search",
                "--gnews-api-key",
                "secret",
            ]),
            None,
        )
        .unwrap();
        assert_eq!(settings.sources[0].api_key.as_deref(), Some("secret"));
        assert_eq!(
            settings.sources[1].endpoint.as_deref(),
            Some("http://127.0.0.1:9/search")
        );
    }

    #[test]
    fn test_file_config_layering() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("radar.yaml");
        fs::write(
            &path,
            r#"
term: Lukoil
window_hours: 72
combine: compare
headline_limit: 3
sources:
  - name: Local
    endpoint: "http://127.0.0.1:8080/search"
    count_pointer: /count
"#,
        )
        .unwrap();

        let file = load_file(&path).unwrap();
        // CLI window wins over the file; everything else comes from the file.
        let settings = Settings::resolve(&cli(&["--window-hours", "6"]), Some(file)).unwrap();
        assert_eq!(settings.term, "Lukoil");
        assert_eq!(settings.window_hours, 6);
        assert_eq!(settings.combine, CombinePolicy::Compare);
        assert_eq!(settings.headline_limit, 3);
        assert_eq!(settings.sources.len(), 1);
        assert_eq!(settings.sources[0].query_param, "q");
        assert_eq!(settings.sources[0].count_pointer, "/count");
    }

    #[test]
    fn test_file_unknown_field_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("radar.yaml");
        fs::write(&path, "term: x\nwindow: 3\n").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_file("/definitely/not/here/radar.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_duplicate_source_names_rejected() {
        let file = FileConfig {
            term: Some("x".into()),
            sources: Some(vec![sources::gnews::preset(), sources::gnews::preset()]),
            ..FileConfig::default()
        };
        let err = Settings::resolve(&cli(&[]), Some(file)).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSource(name) if name == "GNews"));
    }
}
