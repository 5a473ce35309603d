//! Turns a cycle's [`FetchResult`]s into a [`CycleReport`], logs it, and
//! hands it to every configured [`Renderer`].
//!
//! Apart from logging and rendering this is a pure function of its inputs.

use crate::config::CombinePolicy;
use crate::error::RenderError;
use crate::models::{Combined, CycleReport, FetchResult, RiskDistribution, SanctionsCheck, SearchQuery};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// A consumer of cycle reports: terminal, file snapshots, dashboards.
pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, report: &CycleReport) -> Result<(), RenderError>;
}

/// Fold per-source counts into one figure. Errored sources count as zero.
pub fn combine(policy: CombinePolicy, results: &[FetchResult]) -> Combined {
    match policy {
        CombinePolicy::Sum => Combined::Sum {
            total: results.iter().map(FetchResult::article_count).sum(),
        },
        CombinePolicy::Compare => {
            let max = results.iter().map(FetchResult::article_count).max().unwrap_or(0);
            let min = results.iter().map(FetchResult::article_count).min().unwrap_or(0);
            let mut at_max = results.iter().filter(|r| r.article_count() == max);
            let leader = match (at_max.next(), at_max.next()) {
                (Some(only), None) if max > min => Some(only.source_name().to_string()),
                _ => None,
            };
            Combined::Compare {
                leader,
                difference: max - min,
            }
        }
    }
}

pub fn risk_distribution(results: &[FetchResult]) -> RiskDistribution {
    let mut dist = RiskDistribution::default();
    results
        .iter()
        .flat_map(FetchResult::headlines)
        .for_each(|h| dist.record(h.risk));
    dist
}

/// Logs and renders fetch cycles.
pub struct Reporter {
    policy: CombinePolicy,
    renderers: Vec<Box<dyn Renderer>>,
}

impl Reporter {
    pub fn new(policy: CombinePolicy, renderers: Vec<Box<dyn Renderer>>) -> Self {
        Self { policy, renderers }
    }

    /// Build the report for a finished cycle.
    pub fn build(
        &self,
        query: &SearchQuery,
        started_at: DateTime<Utc>,
        elapsed_ms: u64,
        results: Vec<FetchResult>,
        sanctions: Option<SanctionsCheck>,
    ) -> CycleReport {
        CycleReport {
            term: query.term.clone(),
            window: query.window,
            started_at,
            elapsed_ms,
            combined: combine(self.policy, &results),
            risk_distribution: risk_distribution(&results),
            results,
            sanctions,
        }
    }

    /// Log one line per source plus the combined figure, then render.
    ///
    /// Renderer failures are logged and do not stop other renderers.
    pub fn report(&self, report: &CycleReport) {
        for result in &report.results {
            match result.error() {
                None => info!(
                    source = result.source_name(),
                    count = result.article_count(),
                    headlines = result.headlines().len(),
                    "Source result"
                ),
                Some(e) => warn!(
                    source = result.source_name(),
                    count = result.article_count(),
                    error = e,
                    "Source failed"
                ),
            }
        }

        match &report.combined {
            Combined::Sum { total } => info!(term = %report.term, total, "Combined article count"),
            Combined::Compare { leader, difference } => info!(
                term = %report.term,
                leader = leader.as_deref().unwrap_or("tie"),
                difference,
                "Compared article counts"
            ),
        }

        // Lookup failures were already logged by the fetcher.
        if let Some(check) = report.sanctions.as_ref().filter(|c| c.error.is_none()) {
            if check.hits.is_empty() {
                info!(term = %report.term, "No watchlist matches");
            } else {
                let names: Vec<&str> = check.hits.iter().map(|h| h.name.as_str()).collect();
                warn!(term = %report.term, hits = check.hits.len(), ?names, "Watchlist matches found");
            }
        }

        for renderer in &self.renderers {
            if let Err(e) = renderer.render(report) {
                error!(renderer = renderer.name(), error = %e, "Renderer failed");
            }
        }
    }
}
