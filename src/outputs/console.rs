//! Plain-text table on stdout.

use crate::error::RenderError;
use crate::models::{Combined, CycleReport};
use crate::reporter::Renderer;
use crate::screening::summarize;
use std::fmt::Write as _;
use std::io::Write as _;

/// Headlines shown per source in the terminal.
const HEADLINES_PER_SOURCE: usize = 3;

#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn name(&self) -> &str {
        "console"
    }

    fn render(&self, report: &CycleReport) -> Result<(), RenderError> {
        let table = format_report(report);
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(table.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|source| RenderError::Io {
                path: "<stdout>".into(),
                source,
            })
    }
}

/// Render the report as the text block printed to the terminal.
pub fn format_report(report: &CycleReport) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "SAM-Radar | \"{}\" | {} .. {}",
        report.term,
        report.window.from_param(),
        report.window.to_param()
    )
    .unwrap();
    writeln!(out, "{:<16} {:>8}  {}", "SOURCE", "COUNT", "STATUS").unwrap();
    for result in &report.results {
        let status = match result.error() {
            None => "ok".to_string(),
            Some(e) => format!("error: {e}"),
        };
        writeln!(
            out,
            "{:<16} {:>8}  {}",
            result.source_name(),
            result.article_count(),
            status
        )
        .unwrap();
    }

    match &report.combined {
        Combined::Sum { total } => writeln!(out, "Total: {total}").unwrap(),
        Combined::Compare { leader: Some(leader), difference } => {
            writeln!(out, "Leader: {leader} (+{difference})").unwrap()
        }
        Combined::Compare { leader: None, .. } => writeln!(out, "Leader: tie").unwrap(),
    }

    if let Some(check) = &report.sanctions {
        match (&check.error, check.hits.is_empty()) {
            (Some(e), _) => writeln!(out, "Sanctions: lookup failed: {e}").unwrap(),
            (None, true) => writeln!(out, "Sanctions: no matches").unwrap(),
            (None, false) => {
                writeln!(out, "Sanctions: {} hit(s), treat as HIGH RISK", check.hits.len()).unwrap();
                for hit in &check.hits {
                    writeln!(out, "  {} ({}) {}", hit.name, hit.schema, hit.datasets.join(", ")).unwrap();
                }
            }
        }
    }

    let dist = &report.risk_distribution;
    if dist.total() > 0 {
        writeln!(
            out,
            "Risk: high {} / medium {} / low {}",
            dist.high, dist.medium, dist.low
        )
        .unwrap();
    }

    for result in report.results.iter().filter(|r| !r.headlines().is_empty()) {
        writeln!(out, "{}:", result.source_name()).unwrap();
        for headline in result.headlines().iter().take(HEADLINES_PER_SOURCE) {
            writeln!(
                out,
                "  [{}] {} <{}>",
                headline.risk,
                summarize(&headline.title, 80),
                headline.link
            )
            .unwrap();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        FetchResult, Headline, RiskDistribution, RiskLevel, SanctionsCheck, SanctionsHit, SearchWindow,
    };
    use chrono::{TimeZone, Utc};

    fn report(results: Vec<FetchResult>, combined: Combined) -> CycleReport {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
        let mut risk_distribution = RiskDistribution::default();
        for h in results.iter().flat_map(FetchResult::headlines) {
            risk_distribution.record(h.risk);
        }
        CycleReport {
            term: "Litasco".into(),
            window: SearchWindow::last_hours(now, 24).unwrap(),
            started_at: now,
            elapsed_ms: 120,
            results,
            combined,
            risk_distribution,
            sanctions: None,
        }
    }

    #[test]
    fn test_format_report_lists_every_source() {
        let text = format_report(&report(
            vec![
                FetchResult::failure("GNews", "request timed out after 12s"),
                FetchResult::success("NewsLookup", 3, vec![]),
            ],
            Combined::Sum { total: 3 },
        ));
        assert!(text.starts_with("SAM-Radar | \"Litasco\" | 2025-05-05T12:00:00Z .. 2025-05-06T12:00:00Z"));
        assert!(text.contains("GNews                   0  error: request timed out after 12s"));
        assert!(text.contains("NewsLookup              3  ok"));
        assert!(text.contains("Total: 3"));
        assert!(!text.contains("Risk:"));
        assert!(!text.contains("Sanctions:"));
    }

    #[test]
    fn test_format_report_sanctions_lines() {
        let mut with_hits = report(vec![FetchResult::success("GNews", 2, vec![])], Combined::Sum { total: 2 });
        with_hits.sanctions = Some(SanctionsCheck {
            hits: vec![SanctionsHit {
                name: "LITASCO SA".into(),
                schema: "Company".into(),
                datasets: vec!["eu_fsf".into(), "ua_nsdc".into()],
                note: String::new(),
            }],
            error: None,
        });
        let text = format_report(&with_hits);
        assert!(text.contains("Sanctions: 1 hit(s), treat as HIGH RISK\n  LITASCO SA (Company) eu_fsf, ua_nsdc\n"));

        with_hits.sanctions = Some(SanctionsCheck::default());
        assert!(format_report(&with_hits).contains("Sanctions: no matches"));

        with_hits.sanctions = Some(SanctionsCheck {
            hits: Vec::new(),
            error: Some("unexpected status code: 401".into()),
        });
        assert!(format_report(&with_hits).contains("Sanctions: lookup failed: unexpected status code: 401"));
    }

    #[test]
    fn test_format_report_headlines_and_compare() {
        let headline = Headline {
            title: "Litasco fined".into(),
            link: "https://news.example/1".into(),
            summary: String::new(),
            risk: RiskLevel::Medium,
            relevant: true,
        };
        let text = format_report(&report(
            vec![FetchResult::success("GNews", 9, vec![headline])],
            Combined::Compare {
                leader: Some("GNews".into()),
                difference: 9,
            },
        ));
        assert!(text.contains("Leader: GNews (+9)"));
        assert!(text.contains("Risk: high 0 / medium 1 / low 0"));
        assert!(text.contains("  [Medium] Litasco fined <https://news.example/1>"));
    }
}
