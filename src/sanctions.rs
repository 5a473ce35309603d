//! Watchlist lookup against the OpenSanctions search API.
//!
//! The lookup runs once per cycle next to the news fetch when enabled. Any
//! hit is a strong signal on its own, independent of the article counts.

use crate::error::FetchError;
use crate::fetcher::classify;
use crate::models::SanctionsHit;
use crate::screening::summarize;
use crate::sources::first_str;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const NAME: &str = "OpenSanctions";
pub const ENDPOINT: &str = "https://api.opensanctions.org/search/default";
pub const DEFAULT_LIMIT: usize = 8;
/// Characters of an entity's notes kept in a hit.
pub const NOTE_MAX_CHARS: usize = 800;

/// Where and how to query the watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanctionsConfig {
    pub endpoint: String,
    /// Sent as `Authorization: ApiKey <key>` when set.
    pub api_key: Option<String>,
    /// Maximum hits kept.
    pub limit: usize,
}

impl Default for SanctionsConfig {
    fn default() -> Self {
        Self {
            endpoint: ENDPOINT.to_string(),
            api_key: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Browser link for checking a term by hand.
pub fn quick_check_link(term: &str) -> String {
    format!("https://www.opensanctions.org/search/?q={}", urlencoding::encode(term))
}

/// Query the watchlist for `term`.
#[instrument(level = "info", skip_all, fields(source = NAME, term = %term))]
pub async fn lookup(
    client: &Client,
    config: &SanctionsConfig,
    term: &str,
    timeout: Duration,
) -> Result<Vec<SanctionsHit>, FetchError> {
    let mut url = Url::parse(&config.endpoint)
        .map_err(|e| FetchError::Unconfigured(format!("invalid watchlist endpoint: {e}")))?;
    url.query_pairs_mut()
        .append_pair("q", term)
        .append_pair("limit", &config.limit.to_string());

    let mut request = client.get(url);
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        request = request.header(AUTHORIZATION, format!("ApiKey {key}"));
    }

    let response = request.send().await.map_err(|e| classify(e, timeout))?;
    let status = response.status();
    info!(status = status.as_u16(), "Watchlist response received");
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await.map_err(|e| classify(e, timeout))?;
    let hits = parse_hits(&body, config.limit)?;
    info!(hits = hits.len(), "Watchlist lookup complete");
    Ok(hits)
}

/// Extract up to `limit` hits from a search response.
///
/// Hits are read from `results` (or `data`). Entities without any name
/// are skipped.
pub fn parse_hits(body: &str, limit: usize) -> Result<Vec<SanctionsHit>, FetchError> {
    let json: Value = serde_json::from_str(body)?;
    let entries = json
        .get("results")
        .or_else(|| json.get("data"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let hits = entries
        .iter()
        .filter_map(|entry| {
            let name = first_str(entry, &["caption", "name", "label"])?;
            let note = first_str(entry, &["notes", "summary"])
                .or_else(|| entry.pointer("/properties/notes/0").and_then(Value::as_str))
                .unwrap_or_default();
            Some(SanctionsHit {
                name: name.to_string(),
                schema: first_str(entry, &["schema", "type"]).unwrap_or_default().to_string(),
                datasets: datasets(entry),
                note: summarize(note.trim(), NOTE_MAX_CHARS),
            })
        })
        .take(limit)
        .collect();
    Ok(hits)
}

/// `datasets` (or `sources`) as a list, whether sent as an array or a string.
fn datasets(entry: &Value) -> Vec<String> {
    match entry.get("datasets").or_else(|| entry.get("sources")) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
