//! JSON snapshots of cycle reports.
//!
//! Files are organized by the UTC date the cycle started:
//! ```text
//! json_output_dir/
//! ├── latest.json
//! └── 2025-05-06/
//!     └── 120000.json
//! ```
//!
//! `latest.json` is overwritten every cycle so a dashboard can poll one path.

use crate::error::RenderError;
use crate::models::CycleReport;
use crate::reporter::Renderer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug)]
pub struct JsonRenderer {
    dir: PathBuf,
}

impl JsonRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, report: &CycleReport) -> Result<(), RenderError> {
        write_report(report, &self.dir).map(|_| ())
    }
}

/// Write a [`CycleReport`] to its dated snapshot path and to `latest.json`.
///
/// # Returns
///
/// The path of the dated snapshot.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub fn write_report(report: &CycleReport, json_output_dir: &Path) -> Result<PathBuf, RenderError> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = json_output_dir.join(report.started_at.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&full_json_dir).map_err(|source| io_error(&full_json_dir, source))?;

    let snapshot = full_json_dir.join(format!("{}.json", report.started_at.format("%H%M%S")));
    fs::write(&snapshot, &json).map_err(|source| io_error(&snapshot, source))?;

    let latest = json_output_dir.join("latest.json");
    fs::write(&latest, &json).map_err(|source| io_error(&latest, source))?;

    info!(path = %snapshot.display(), "Wrote JSON snapshot");
    Ok(snapshot)
}

fn io_error(path: &Path, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Combined, FetchResult, RiskDistribution, SearchWindow};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report() -> CycleReport {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 8, 30, 15).unwrap();
        CycleReport {
            term: "Lukoil".into(),
            window: SearchWindow::last_hours(now, 24).unwrap(),
            started_at: now,
            elapsed_ms: 340,
            results: vec![
                FetchResult::success("GNews", 5, vec![]),
                FetchResult::failure("NewsLookup", "unexpected status code: 500"),
            ],
            combined: Combined::Sum { total: 5 },
            risk_distribution: RiskDistribution::default(),
            sanctions: None,
        }
    }

    #[test]
    fn test_write_report_paths_and_contents() {
        let tmp = TempDir::new().unwrap();
        let path = write_report(&report(), tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join("2025-05-06").join("083015.json"));

        let written: CycleReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.term, "Lukoil");
        assert_eq!(written.results.len(), 2);
        assert_eq!(written.results[1].error(), Some("unexpected status code: 500"));
        assert_eq!(written.combined, Combined::Sum { total: 5 });

        let latest = fs::read_to_string(tmp.path().join("latest.json")).unwrap();
        assert_eq!(latest, fs::read_to_string(&path).unwrap());
    }

    #[test]
    fn test_renderer_reports_io_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();
        let err = JsonRenderer::new(&blocker).render(&report()).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
