//! Drives fetch cycles: once, or on a fixed interval until Ctrl-C.

use crate::config::Settings;
use crate::error::ConfigError;
use crate::fetcher::Fetcher;
use crate::models::{CycleReport, SearchQuery, SearchWindow};
use crate::reporter::Reporter;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument};

/// Build the query for a cycle starting at `now`.
pub fn query_at(settings: &Settings, aliases: &[String], now: DateTime<Utc>) -> Result<SearchQuery, ConfigError> {
    let window = SearchWindow::last_hours(now, settings.window_hours).ok_or(ConfigError::EmptyWindow)?;
    Ok(SearchQuery {
        term: settings.term.clone(),
        aliases: aliases.to_vec(),
        window,
    })
}

/// Run one fetch cycle: fetch all sources, then log and render the results.
#[instrument(level = "info", skip_all, fields(cycle = cycle))]
pub async fn run_cycle(
    cycle: u64,
    fetcher: &Fetcher,
    reporter: &Reporter,
    settings: &Settings,
    aliases: &[String],
) -> Result<CycleReport, ConfigError> {
    let started_at = Utc::now();
    let t0 = Instant::now();
    let query = query_at(settings, aliases, started_at)?;
    info!(
        term = %query.term,
        from = %query.window.from_param(),
        to = %query.window.to_param(),
        "Fetch cycle starting"
    );

    let (results, sanctions) = tokio::join!(
        fetcher.fetch_cycle(&query),
        fetcher.check_sanctions(&query.term)
    );
    let report = reporter.build(&query, started_at, t0.elapsed().as_millis() as u64, results, sanctions);
    reporter.report(&report);

    info!(
        elapsed_ms = report.elapsed_ms,
        failed = report.failed_sources(),
        "Fetch cycle complete"
    );
    Ok(report)
}

/// Run cycles until interrupted, or a single cycle when `settings.once` is set.
///
/// The first cycle starts immediately. A cycle that overruns the interval
/// skips the missed ticks instead of bursting.
pub async fn run(
    fetcher: &Fetcher,
    reporter: &Reporter,
    settings: &Settings,
    aliases: &[String],
) -> Result<(), ConfigError> {
    if settings.once {
        run_cycle(1, fetcher, reporter, settings, aliases).await?;
        return Ok(());
    }
    run_until(fetcher, reporter, settings, aliases, tokio::signal::ctrl_c()).await?;
    Ok(())
}

/// Run cycles on the configured interval until `shutdown` completes.
///
/// `shutdown` is polled for the whole run, so a signal during a cycle ends
/// the loop once that cycle is done. Returns the number of cycles run.
pub async fn run_until<F>(
    fetcher: &Fetcher,
    reporter: &Reporter,
    settings: &Settings,
    aliases: &[String],
    shutdown: F,
) -> Result<u64, ConfigError>
where
    F: Future,
{
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cycle = 0u64;
    info!(interval_secs = settings.interval.as_secs(), "Polling started");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cycle += 1;
                run_cycle(cycle, fetcher, reporter, settings, aliases).await?;
            }
            _ = &mut shutdown => {
                info!(cycles = cycle, "Interrupted; shutting down");
                return Ok(cycle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::CombinePolicy;
    use crate::models::Combined;
    use crate::sanctions::SanctionsConfig;
    use crate::sources::{SourceConfig, gnews, newslookup};
    use axum::Router;
    use axum::routing::get;
    use chrono::TimeZone;
    use clap::Parser;

    async fn spawn_test_server() -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/gnews", get(|| async { r#"{"totalArticles": 5, "articles": []}"# }))
            .route("/lookup", get(|| async { r#"{"totalResults": 7}"# }))
            .route(
                "/sanctions",
                get(|| async { r#"{"results": [{"caption": "LITASCO SA", "schema": "Company"}]}"# }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}"), join_handle)
    }

    fn settings(base: &str, combine: &str) -> Settings {
        let mut settings = Settings::resolve(
            &Cli::parse_from(["sam_radar", "--term", "Litasco", "--once", "--combine", combine]),
            None,
        )
        .unwrap();
        settings.sources = vec![
            SourceConfig {
                endpoint: Some(format!("{base}/gnews")),
                api_key: Some("k".into()),
                ..gnews::preset()
            },
            SourceConfig {
                endpoint: Some(format!("{base}/lookup")),
                ..newslookup::preset()
            },
        ];
        settings
    }

    #[test]
    fn test_query_at_uses_window_and_aliases() {
        let settings = Settings::resolve(
            &Cli::parse_from(["sam_radar", "--term", "Lukoil", "--window-hours", "6"]),
            None,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
        let aliases = vec!["Lukoil".to_string(), "PJSC Lukoil".to_string()];
        let query = query_at(&settings, &aliases, now).unwrap();
        assert_eq!(query.term, "Lukoil");
        assert_eq!(query.window.from_param(), "2025-05-06T06:00:00Z");
        assert_eq!(query.aliases, aliases);
    }

    #[tokio::test]
    async fn test_run_cycle_sums_both_sources() {
        let (base, server) = spawn_test_server().await;
        let settings = settings(&base, "sum");
        let fetcher = Fetcher::new(settings.sources.clone(), settings.timeout, 5).unwrap();
        let reporter = Reporter::new(settings.combine, Vec::new());

        let report = run_cycle(1, &fetcher, &reporter, &settings, &["Litasco".to_string()])
            .await
            .unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.combined, Combined::Sum { total: 12 });
        assert_eq!(report.failed_sources(), 0);

        server.abort();
    }

    #[tokio::test]
    async fn test_run_cycle_attaches_watchlist_check() {
        let (base, server) = spawn_test_server().await;
        let settings = settings(&base, "sum");
        let fetcher = Fetcher::new(settings.sources.clone(), settings.timeout, 5)
            .unwrap()
            .with_sanctions(Some(SanctionsConfig {
                endpoint: format!("{base}/sanctions"),
                ..SanctionsConfig::default()
            }));
        let reporter = Reporter::new(settings.combine, Vec::new());

        let report = run_cycle(1, &fetcher, &reporter, &settings, &["Litasco".to_string()])
            .await
            .unwrap();
        assert_eq!(report.combined, Combined::Sum { total: 12 });
        let check = report.sanctions.unwrap();
        assert_eq!(check.hits.len(), 1);
        assert_eq!(check.hits[0].name, "LITASCO SA");

        server.abort();
    }

    #[tokio::test]
    async fn test_run_once_with_compare_policy() {
        let (base, server) = spawn_test_server().await;
        let settings = settings(&base, "compare");
        assert_eq!(settings.combine, CombinePolicy::Compare);
        let fetcher = Fetcher::new(settings.sources.clone(), settings.timeout, 5).unwrap();
        let reporter = Reporter::new(settings.combine, Vec::new());

        run(&fetcher, &reporter, &settings, &["Litasco".to_string()])
            .await
            .unwrap();

        server.abort();
    }

    #[tokio::test]
    async fn test_polling_stops_when_shutdown_completes() {
        let (base, server) = spawn_test_server().await;
        let mut settings = settings(&base, "sum");
        settings.once = false;
        settings.interval = std::time::Duration::from_secs(3600);
        let fetcher = Fetcher::new(settings.sources.clone(), settings.timeout, 5).unwrap();
        let reporter = Reporter::new(settings.combine, Vec::new());

        // The first tick fires at once; the next is an hour away.
        let shutdown = tokio::time::sleep(std::time::Duration::from_millis(500));
        let cycles = run_until(&fetcher, &reporter, &settings, &["Litasco".to_string()], shutdown)
            .await
            .unwrap();
        assert_eq!(cycles, 1);

        server.abort();
    }
}
