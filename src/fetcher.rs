//! Concurrent, timeout-bounded queries against every configured source.
//!
//! # Architecture
//!
//! - [`SearchSource`]: one queryable source returning a count and headlines
//! - [`HttpSource`]: a [`SourceConfig`] bound to a shared HTTP client
//! - [`fetch_all`]: fan-out over all sources, fan-in into one
//!   [`FetchResult`] per source
//!
//! A failure of any kind becomes a zero-count [`FetchResult`] for that
//! source only. There are no retries; the next cycle is the next attempt.

use crate::error::{ConfigError, FetchError};
use crate::models::{FetchResult, Headline, SanctionsCheck, SearchQuery};
use crate::sanctions::{self, SanctionsConfig};
use crate::sources::SourceConfig;
use crate::utils::truncate_for_log;
use futures::future::join_all;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{Level, debug, info, instrument, warn};

pub const USER_AGENT: &str = "sam-radar-bot/1.0";

/// A news source that can be asked for an article count.
pub trait SearchSource {
    /// Name reported in results and log lines.
    fn name(&self) -> &str;

    /// Query the source once, returning the article count and up to
    /// `limit` headlines.
    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<(u64, Vec<Headline>), FetchError>;
}

/// Build the HTTP client shared by all sources.
pub fn build_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::Client(e.to_string()))
}

/// Map a reqwest error to a fetch error without leaking the request URL.
pub(crate) fn classify(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout.as_secs())
    } else {
        // reqwest's Display embeds the full URL, including the API key.
        FetchError::Network(e.without_url().to_string())
    }
}

/// A configured HTTP source.
#[derive(Debug)]
pub struct HttpSource<'a> {
    pub client: &'a Client,
    pub config: &'a SourceConfig,
    /// Timeout the client was built with, for error messages.
    pub timeout: Duration,
}

impl SearchSource for HttpSource<'_> {
    fn name(&self) -> &str {
        &self.config.name
    }

    #[instrument(level = "info", skip_all, fields(source = %self.config.name))]
    async fn search(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> Result<(u64, Vec<Headline>), FetchError> {
        let url = self.config.request_url(query)?;
        debug!(endpoint = %url.origin().ascii_serialization(), path = url.path(), "Sending request");

        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(e, self.timeout))?;
        let status = response.status();
        info!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Response received");

        if !status.is_success() {
            // The body is only read for the debug log; the status decides.
            if tracing::enabled!(Level::DEBUG) {
                match response.text().await {
                    Ok(body) => debug!(body = %truncate_for_log(&body, 300), "Non-success body"),
                    Err(e) => debug!(error = %e.without_url(), "Non-success body unreadable"),
                }
            }
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| classify(e, self.timeout))?;
        self.config.parse_response(&body, &query.aliases, limit)
    }
}

/// Query every source concurrently; one result per source, in input order.
#[instrument(level = "info", skip_all, fields(term = %query.term, sources = sources.len()))]
pub async fn fetch_all<S: SearchSource>(
    sources: &[S],
    query: &SearchQuery,
    limit: usize,
) -> Vec<FetchResult> {
    let futures = sources.iter().map(|source| async move {
        match source.search(query, limit).await {
            Ok((count, headlines)) => FetchResult::success(source.name(), count, headlines),
            Err(e) => {
                debug!(source = source.name(), kind = ?e.kind(), error = %e, "Source failed");
                FetchResult::failure(source.name(), e.to_string())
            }
        }
    });
    join_all(futures).await
}

/// Owns the client and source configurations for the lifetime of a run.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    sources: Vec<SourceConfig>,
    timeout: Duration,
    headline_limit: usize,
    sanctions: Option<SanctionsConfig>,
}

impl Fetcher {
    pub fn new(
        sources: Vec<SourceConfig>,
        timeout: Duration,
        headline_limit: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(timeout)?,
            sources,
            timeout,
            headline_limit,
            sanctions: None,
        })
    }

    /// Enable the per-cycle watchlist lookup.
    pub fn with_sanctions(mut self, sanctions: Option<SanctionsConfig>) -> Self {
        self.sanctions = sanctions;
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Run one fetch cycle.
    pub async fn fetch_cycle(&self, query: &SearchQuery) -> Vec<FetchResult> {
        let sources: Vec<HttpSource<'_>> = self
            .sources
            .iter()
            .map(|config| HttpSource {
                client: &self.client,
                config,
                timeout: self.timeout,
            })
            .collect();
        let results = fetch_all(&sources, query, self.headline_limit).await;
        if results.iter().any(|r| !r.is_ok()) {
            warn!(
                failed = results.iter().filter(|r| !r.is_ok()).count(),
                total = results.len(),
                "Some sources failed this cycle"
            );
        }
        results
    }

    /// Check the term against the watchlist, if enabled.
    ///
    /// A failed lookup is reported in the check's `error` field; it never
    /// fails the cycle.
    pub async fn check_sanctions(&self, term: &str) -> Option<SanctionsCheck> {
        let config = self.sanctions.as_ref()?;
        let check = match sanctions::lookup(&self.client, config, term, self.timeout).await {
            Ok(hits) => SanctionsCheck { hits, error: None },
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "Watchlist lookup failed");
                SanctionsCheck {
                    hits: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        Some(check)
    }
}
