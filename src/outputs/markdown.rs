//! Markdown report per cycle.
//!
//! Each cycle produces `{markdown_output_dir}/{YYYY-MM-DD}_{HHMMSS}.md`
//! containing the count table, the combined figure, the watchlist result
//! (when enabled), the risk distribution, and headlines grouped by source.
//! When no source found anything, the report closes with manual quick-check
//! links for the term.

use crate::error::RenderError;
use crate::models::{Combined, CycleReport};
use crate::reporter::Renderer;
use crate::sanctions;
use crate::sources::gnews;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Debug)]
pub struct MarkdownRenderer {
    dir: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Renderer for MarkdownRenderer {
    fn name(&self) -> &str {
        "markdown"
    }

    fn render(&self, report: &CycleReport) -> Result<(), RenderError> {
        write_report(report, &self.dir).map(|_| ())
    }
}

/// Escape characters that would break a table cell or a link label.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('[', "\\[").replace(']', "\\]")
}

/// Percent-encode the characters that end or split a link destination.
fn link_destination(link: &str) -> String {
    link.trim()
        .replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
        .replace('<', "%3C")
        .replace('>', "%3E")
}

/// Convert a [`CycleReport`] to a Markdown document.
pub fn report_to_markdown(report: &CycleReport) -> String {
    let mut md = String::new();
    writeln!(md, "# SAM-Radar: {}\n", escape(&report.term)).unwrap();
    writeln!(
        md,
        "Window: `{}` to `{}`  \nRun at: `{}` ({} ms)\n",
        report.window.from_param(),
        report.window.to_param(),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed_ms
    )
    .unwrap();

    writeln!(md, "| Source | Articles | Status |").unwrap();
    writeln!(md, "|--------|---------:|--------|").unwrap();
    for result in &report.results {
        let status = result
            .error()
            .map(|e| format!("error: {}", escape(e)))
            .unwrap_or_else(|| "ok".to_string());
        writeln!(
            md,
            "| {} | {} | {} |",
            escape(result.source_name()),
            result.article_count(),
            status
        )
        .unwrap();
    }
    md.push('\n');

    match &report.combined {
        Combined::Sum { total } => writeln!(md, "**Total articles:** {total}\n").unwrap(),
        Combined::Compare { leader: Some(leader), difference } => {
            writeln!(md, "**Leader:** {} by {difference}\n", escape(leader)).unwrap()
        }
        Combined::Compare { leader: None, .. } => writeln!(md, "**Leader:** tie\n").unwrap(),
    }

    if let Some(check) = &report.sanctions {
        writeln!(md, "## Sanctions / watchlist\n").unwrap();
        if let Some(e) = &check.error {
            writeln!(md, "Lookup failed: {}\n", escape(e)).unwrap();
        } else if check.hits.is_empty() {
            writeln!(md, "No watchlist matches.\n").unwrap();
        } else {
            writeln!(md, "**{} watchlist hit(s). Treat as HIGH RISK.**\n", check.hits.len()).unwrap();
            for hit in &check.hits {
                write!(md, "- **{}**", escape(&hit.name)).unwrap();
                if !hit.schema.is_empty() {
                    write!(md, " _{}_", escape(&hit.schema)).unwrap();
                }
                if !hit.datasets.is_empty() {
                    write!(md, " `{}`", hit.datasets.join(", ")).unwrap();
                }
                md.push('\n');
                if !hit.note.is_empty() {
                    writeln!(md, "  > {}", hit.note.replace('\n', " ")).unwrap();
                }
            }
            md.push('\n');
        }
    }

    let dist = &report.risk_distribution;
    if dist.total() > 0 {
        writeln!(md, "## Risk distribution\n").unwrap();
        writeln!(md, "- High: {}", dist.high).unwrap();
        writeln!(md, "- Medium: {}", dist.medium).unwrap();
        writeln!(md, "- Low: {}\n", dist.low).unwrap();
    }

    for result in report.results.iter().filter(|r| !r.headlines().is_empty()) {
        writeln!(md, "## {}\n", escape(result.source_name())).unwrap();
        for h in result.headlines() {
            let marker = if h.relevant { "" } else { " _(possibly unrelated)_" };
            writeln!(
                md,
                "- **{}** [{}]({}){}",
                h.risk,
                escape(&h.title),
                link_destination(&h.link),
                marker
            )
            .unwrap();
            if !h.summary.is_empty() {
                writeln!(md, "  > {}", h.summary.replace('\n', " ")).unwrap();
            }
        }
        md.push('\n');
    }

    if report.is_empty() {
        let adverse_query = urlencoding::encode(&format!("{} sanctions", report.term)).into_owned();
        writeln!(md, "## Manual quick-check\n").unwrap();
        writeln!(md, "No source returned articles. Try these by hand:\n").unwrap();
        writeln!(md, "- GNews: <{}>", gnews::search_page(&report.term)).unwrap();
        writeln!(
            md,
            "- DuckDuckGo: <https://api.duckduckgo.com/?q={adverse_query}&format=json>"
        )
        .unwrap();
        writeln!(md, "- Bing: <https://www.bing.com/search?q={adverse_query}>").unwrap();
        writeln!(md, "- OpenSanctions: <{}>", sanctions::quick_check_link(&report.term)).unwrap();
    }
    md
}

/// Write the Markdown report for a cycle and return its path.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir.display()))]
pub fn write_report(report: &CycleReport, markdown_output_dir: &Path) -> Result<PathBuf, RenderError> {
    let path = markdown_output_dir.join(format!(
        "{}.md",
        report.started_at.format("%Y-%m-%d_%H%M%S")
    ));
    fs::write(&path, report_to_markdown(report)).map_err(|source| RenderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
