//! Error types for fetching, configuration, and rendering.
//!
//! Fetch errors never escape a cycle: the fetcher downgrades every
//! [`FetchError`] to a zero-count [`FetchResult`](crate::models::FetchResult)
//! carrying the error's `Display` text. Configuration errors are startup
//! failures and end the process.

use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection error or timeout.
    NetworkFailure,
    /// Non-2xx status, malformed JSON, or no usable count in the body.
    BadResponse,
    /// A required setting (endpoint, API key) is missing or invalid.
    Unconfigured,
}

/// Failure of a single source request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("malformed JSON body: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("no article count at `{pointer}`")]
    MissingCount { pointer: String },
    #[error("invalid article count at `{pointer}`: {value}")]
    InvalidCount { pointer: String, value: String },
    #[error("not configured: {0}")]
    Unconfigured(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout(_) | FetchError::Network(_) => FailureKind::NetworkFailure,
            FetchError::HttpStatus(_)
            | FetchError::MalformedJson(_)
            | FetchError::MissingCount { .. }
            | FetchError::InvalidCount { .. } => FailureKind::BadResponse,
            FetchError::Unconfigured(_) => FailureKind::Unconfigured,
        }
    }
}

/// Startup configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("search term must not be empty")]
    EmptyTerm,
    #[error("time window must be at least one hour")]
    EmptyWindow,
    #[error("time window must be at most {max} hours, got {got}")]
    WindowTooLarge { max: u32, got: u32 },
    #[error("poll interval must be at least {min}s, got {got}s")]
    IntervalTooShort { min: u64, got: u64 },
    #[error("no sources configured")]
    NoSources,
    #[error("duplicate source name `{0}`")]
    DuplicateSource(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failure of a renderer to present a report.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
