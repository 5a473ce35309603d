//! CSV export of the screened headlines.
//!
//! Each cycle produces `{csv_output_dir}/{YYYY-MM-DD}_{HHMMSS}.csv` with one
//! row per headline and the columns `Source, Title, Summary, Risk Level,
//! Link`. A cycle without headlines still gets a header-only file.

use crate::error::RenderError;
use crate::models::CycleReport;
use crate::reporter::Renderer;
use crate::screening::summarize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const HEADER: [&str; 5] = ["Source", "Title", "Summary", "Risk Level", "Link"];
/// Characters of title plus summary kept in the Summary column.
const SUMMARY_MAX_CHARS: usize = 600;

#[derive(Debug)]
pub struct CsvRenderer {
    dir: PathBuf,
}

impl CsvRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Renderer for CsvRenderer {
    fn name(&self) -> &str {
        "csv"
    }

    fn render(&self, report: &CycleReport) -> Result<(), RenderError> {
        write_report(report, &self.dir).map(|_| ())
    }
}

/// Write the headline rows for a cycle and return the file path.
#[instrument(level = "info", skip_all, fields(csv_output_dir = %csv_output_dir.display()))]
pub fn write_report(report: &CycleReport, csv_output_dir: &Path) -> Result<PathBuf, RenderError> {
    let path = csv_output_dir.join(format!(
        "{}.csv",
        report.started_at.format("%Y-%m-%d_%H%M%S")
    ));
    let mut writer = ::csv::Writer::from_path(&path)?;
    writer.write_record(HEADER)?;

    let mut rows = 0usize;
    for result in &report.results {
        for h in result.headlines() {
            let text = format!("{} {}", h.title, h.summary);
            let summary = summarize(text.trim(), SUMMARY_MAX_CHARS);
            let risk = h.risk.to_string();
            writer.write_record([
                result.source_name(),
                h.title.as_str(),
                summary.as_str(),
                risk.as_str(),
                h.link.as_str(),
            ])?;
            rows += 1;
        }
    }
    writer.flush().map_err(|source| RenderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), rows, "Wrote CSV export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Combined, FetchResult, Headline, RiskDistribution, RiskLevel, SearchWindow};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report(results: Vec<FetchResult>) -> CycleReport {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 8, 30, 15).unwrap();
        CycleReport {
            term: "Litasco".into(),
            window: SearchWindow::last_hours(now, 24).unwrap(),
            started_at: now,
            elapsed_ms: 90,
            results,
            combined: Combined::Sum { total: 0 },
            risk_distribution: RiskDistribution::default(),
            sanctions: None,
        }
    }

    #[test]
    fn test_write_report_rows() {
        let tmp = TempDir::new().unwrap();
        let headline = Headline {
            title: "Litasco, trader, sanctioned".into(),
            link: "https://news.example/1".into(),
            summary: "EU adds \"Litasco\" to list".into(),
            risk: RiskLevel::High,
            relevant: true,
        };
        let path = write_report(
            &report(vec![
                FetchResult::success("GNews", 1, vec![headline]),
                FetchResult::failure("NewsLookup", "network error: refused"),
            ]),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(path, tmp.path().join("2025-05-06_083015.csv"));

        let mut reader = ::csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().iter().collect::<Vec<_>>(), HEADER);
        let rows: Vec<::csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "GNews");
        assert_eq!(&rows[0][1], "Litasco, trader, sanctioned");
        assert_eq!(&rows[0][2], "Litasco, trader, sanctioned EU adds \"Litasco\" to list");
        assert_eq!(&rows[0][3], "High");
        assert_eq!(&rows[0][4], "https://news.example/1");
    }

    #[test]
    fn test_write_report_header_only_without_headlines() {
        let tmp = TempDir::new().unwrap();
        let path = write_report(&report(vec![FetchResult::success("GNews", 4, vec![])]), tmp.path()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "Source,Title,Summary,Risk Level,Link\n");
    }

    #[test]
    fn test_render_into_missing_dir_fails() {
        let renderer = CsvRenderer::new("/definitely/not/here");
        let err = renderer.render(&report(Vec::new())).unwrap_err();
        assert!(matches!(err, RenderError::Csv(_)));
    }
}
