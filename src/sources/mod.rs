//! News-search sources: request building and response parsing.
//!
//! Every source is a query-parameterised HTTP GET endpoint returning JSON.
//! A [`SourceConfig`] describes where the query term, the time window, and
//! the API key go in the request, and where the article count and sample
//! articles live in the response.
//!
//! # Built-in Sources
//!
//! | Source | Module | Count field | Notes |
//! |--------|--------|-------------|-------|
//! | GNews | [`gnews`] | `/totalArticles` | Requires API key |
//! | NewsLookup | [`newslookup`] | `/totalResults` | Endpoint must be configured |
//!
//! Both can be replaced wholesale by a `sources:` list in the YAML file.

pub mod gnews;
pub mod newslookup;

use crate::error::FetchError;
use crate::models::{Headline, SearchQuery};
use crate::screening::{is_relevant, risk_level, summarize};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Characters of article text kept in a headline summary.
pub const SUMMARY_MAX_CHARS: usize = 400;

/// Request and response shape of one news-search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Display name, also used in log lines.
    pub name: String,
    /// Absolute http(s) URL of the search endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_from_param")]
    pub from_param: String,
    #[serde(default = "default_to_param")]
    pub to_param: String,
    /// Query parameter carrying the API key, if the API takes one.
    #[serde(default)]
    pub key_param: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Fail without a request when no key is available.
    #[serde(default)]
    pub key_required: bool,
    /// Static parameters added to every request.
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
    /// JSON pointer (RFC 6901) to the article count.
    #[serde(default = "default_count_pointer")]
    pub count_pointer: String,
    /// JSON pointer to the array of sample articles.
    #[serde(default)]
    pub articles_pointer: Option<String>,
}

fn default_query_param() -> String {
    "q".into()
}
fn default_from_param() -> String {
    "from".into()
}
fn default_to_param() -> String {
    "to".into()
}
fn default_count_pointer() -> String {
    "/totalResults".into()
}

/// The built-in sources, in reporting order.
pub fn builtin() -> Vec<SourceConfig> {
    vec![gnews::preset(), newslookup::preset()]
}

impl SourceConfig {
    /// Fill `api_key` from `api_key_env` when no key was given directly.
    pub fn resolve_api_key_from_env(&mut self) {
        if self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            return;
        }
        self.api_key = self
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Build the request URL for a query.
    ///
    /// # Errors
    ///
    /// [`FetchError::Unconfigured`] when the endpoint is missing, is not an
    /// absolute http(s) URL, or a required API key is absent.
    pub fn request_url(&self, query: &SearchQuery) -> Result<Url, FetchError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| FetchError::Unconfigured("no endpoint configured".into()))?;

        let mut url = Url::parse(endpoint)
            .map_err(|e| FetchError::Unconfigured(format!("invalid endpoint `{endpoint}`: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::Unconfigured(format!(
                "endpoint `{endpoint}` is not http(s)"
            )));
        }
        if self.key_required && self.api_key().is_none() {
            return Err(FetchError::Unconfigured("missing API key".into()));
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(&self.query_param, &query.term);
            pairs.append_pair(&self.from_param, &query.window.from_param());
            pairs.append_pair(&self.to_param, &query.window.to_param());
            for (k, v) in &self.extra_params {
                pairs.append_pair(k, v);
            }
            if let (Some(param), Some(key)) = (self.key_param.as_deref(), self.api_key()) {
                pairs.append_pair(param, key);
            }
        }
        Ok(url)
    }

    /// Extract the article count and up to `limit` headlines from a JSON body.
    ///
    /// The count comes from `count_pointer`; when that field is absent the
    /// length of the articles array is used instead.
    pub fn parse_response(
        &self,
        body: &str,
        aliases: &[String],
        limit: usize,
    ) -> Result<(u64, Vec<Headline>), FetchError> {
        let value: Value = serde_json::from_str(body)?;
        let articles = self
            .articles_pointer
            .as_deref()
            .and_then(|p| value.pointer(p))
            .and_then(Value::as_array);

        let count = match value.pointer(&self.count_pointer) {
            Some(v) => parse_count(v).ok_or_else(|| FetchError::InvalidCount {
                pointer: self.count_pointer.clone(),
                value: v.to_string(),
            })?,
            None => articles
                .map(|a| a.len() as u64)
                .ok_or_else(|| FetchError::MissingCount {
                    pointer: self.count_pointer.clone(),
                })?,
        };

        let headlines = articles
            .map(|a| extract_headlines(a, aliases, limit))
            .unwrap_or_default();
        Ok((count, headlines))
    }
}

fn parse_count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn first_str<'a>(article: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| article.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Link identity for de-duplication: no query string, no trailing slash.
fn link_key(link: &str) -> String {
    link.split('?').next().unwrap_or(link).trim_end_matches('/').to_string()
}

fn extract_headlines(articles: &[Value], aliases: &[String], limit: usize) -> Vec<Headline> {
    articles
        .iter()
        .filter_map(|article| {
            let link = first_str(article, &["url", "link"])?;
            let title = first_str(article, &["title", "name"]).unwrap_or_default();
            let text = first_str(article, &["description", "summary", "content"]).unwrap_or_default();
            Some(Headline {
                title: title.to_string(),
                link: link.to_string(),
                summary: summarize(text, SUMMARY_MAX_CHARS),
                risk: risk_level(&format!("{title} {text}")),
                relevant: is_relevant(aliases, title, text),
            })
        })
        .unique_by(|h| link_key(&h.link))
        .take(limit)
        .collect()
}
