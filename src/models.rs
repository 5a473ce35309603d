//! Data models for a fetch cycle and its report.
//!
//! This module defines the values that flow through one cycle:
//! - [`SearchQuery`] and [`SearchWindow`]: what is asked of every source
//! - [`FetchResult`]: the per-source outcome, a count or an error
//! - [`Headline`]: a sample article returned alongside a count
//! - [`CycleReport`]: everything a renderer needs to present the cycle
//!
//! Nothing here is persisted; a cycle's values are dropped once they have
//! been logged and rendered.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Screening risk level of a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        };
        f.write_str(s)
    }
}

/// A sample article returned by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
    /// Truncated description or content of the article.
    pub summary: String,
    pub risk: RiskLevel,
    /// Whether the headline mentions the term (or an alias) or an adverse keyword.
    pub relevant: bool,
}

/// Outcome of querying one source in one cycle.
///
/// Fields are private so the invariant holds by construction: a result
/// carrying an error always has a zero count and no headlines. Deserialized
/// values go through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FetchResultRecord")]
pub struct FetchResult {
    source_name: String,
    article_count: u64,
    error: Option<String>,
    headlines: Vec<Headline>,
}

impl FetchResult {
    pub fn success(source_name: impl Into<String>, article_count: u64, headlines: Vec<Headline>) -> Self {
        Self {
            source_name: source_name.into(),
            article_count,
            error: None,
            headlines,
        }
    }

    pub fn failure(source_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            article_count: 0,
            error: Some(error.into()),
            headlines: Vec::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn article_count(&self) -> u64 {
        self.article_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn headlines(&self) -> &[Headline] {
        &self.headlines
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Deserialize)]
struct FetchResultRecord {
    source_name: String,
    article_count: u64,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    headlines: Vec<Headline>,
}

impl TryFrom<FetchResultRecord> for FetchResult {
    type Error = String;

    fn try_from(record: FetchResultRecord) -> Result<Self, Self::Error> {
        match record.error {
            None => Ok(FetchResult::success(
                record.source_name,
                record.article_count,
                record.headlines,
            )),
            Some(_) if record.article_count != 0 || !record.headlines.is_empty() => Err(format!(
                "result for `{}` carries an error alongside a count or headlines",
                record.source_name
            )),
            Some(error) => Ok(FetchResult::failure(record.source_name, error)),
        }
    }
}

/// Bounded time window a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl SearchWindow {
    /// The `hours` hours ending at `now`.
    ///
    /// Returns `None` for a zero-length window or one reaching before the
    /// earliest representable timestamp.
    pub fn last_hours(now: DateTime<Utc>, hours: u32) -> Option<Self> {
        if hours == 0 {
            return None;
        }
        let span = TimeDelta::try_hours(i64::from(hours))?;
        Some(Self {
            from: now.checked_sub_signed(span)?,
            to: now,
        })
    }

    /// Timestamps in the `YYYY-MM-DDTHH:MM:SSZ` form the news APIs accept.
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// What every source is asked in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub term: String,
    /// The term itself plus any known aliases, used for relevance checks.
    pub aliases: Vec<String>,
    pub window: SearchWindow,
}

/// The combined figure forwarded to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum Combined {
    Sum {
        total: u64,
    },
    Compare {
        /// Source with the strictly largest count; `None` on a tie.
        leader: Option<String>,
        difference: u64,
    },
}

/// Headline counts per risk level across all sources of a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskDistribution {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// One watchlist entry matching the screened term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionsHit {
    pub name: String,
    /// Entity schema, e.g. `Person` or `Company`.
    pub schema: String,
    /// Lists the entity appears on.
    pub datasets: Vec<String>,
    pub note: String,
}

/// Outcome of the per-cycle watchlist lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SanctionsCheck {
    pub hits: Vec<SanctionsHit>,
    /// Set when the lookup failed; `hits` is then empty.
    pub error: Option<String>,
}

/// Everything a renderer receives for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub term: String,
    pub window: SearchWindow,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub results: Vec<FetchResult>,
    pub combined: Combined,
    pub risk_distribution: RiskDistribution,
    /// Present when the watchlist lookup is enabled.
    #[serde(default)]
    pub sanctions: Option<SanctionsCheck>,
}

impl CycleReport {
    pub fn failed_sources(&self) -> usize {
        self.results.iter().filter(|r| !r.is_ok()).count()
    }

    /// True when no source produced a non-zero count.
    pub fn is_empty(&self) -> bool {
        self.results.iter().all(|r| r.article_count() == 0)
    }
}
