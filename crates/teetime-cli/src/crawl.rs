//! One-shot upstream fetches and offline queries for the CLI.
//!
//! Nothing here touches a running server: `crawl` calls the upstreams
//! directly and `query` reads the snapshot file the server writes.

use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use teetime_core::{AppConfig, ClubDirectory, TeeTimeRecord};
use teetime_scraper::{
    CallBudget, FetchReport, GolfpangClient, RetryPolicy, ScraperError, TeeTimeSource,
    TeescannerClient,
};
use teetime_store::{CacheStore, TeeTimeQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceChoice {
    Teescanner,
    Golfpang,
    Both,
}

impl SourceChoice {
    fn includes_teescanner(self) -> bool {
        matches!(self, Self::Teescanner | Self::Both)
    }

    fn includes_golfpang(self) -> bool {
        matches!(self, Self::Golfpang | Self::Both)
    }
}

fn build_golfpang(config: &AppConfig) -> anyhow::Result<GolfpangClient> {
    let client = GolfpangClient::new(
        &config.golfpang_base_url,
        CallBudget {
            connect: Duration::from_secs(config.connect_timeout_secs),
            read: Duration::from_secs(config.read_timeout_secs),
        },
        RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_base_ms),
        ),
        &config.user_agent,
        config.golfpang_accept_invalid_certs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Golfpang client: {e}"))?;
    Ok(client.with_favorites(config.crawl_favorites.clone()))
}

/// Appends a source's records, reporting failures on stderr instead of
/// aborting the crawl.
fn collect_report(
    source: &str,
    result: Result<FetchReport, ScraperError>,
    into: &mut Vec<TeeTimeRecord>,
) {
    match result {
        Ok(report) => {
            if report.is_partial() {
                eprintln!(
                    "warning: {source}: {} of {} lookups failed",
                    report.failed_units, report.attempted_units
                );
            }
            into.extend(report.records);
        }
        Err(e) => eprintln!("error: {source} fetch failed: {e}"),
    }
}

/// Fetches `date` from the chosen upstreams and prints the combined records.
///
/// # Errors
///
/// Returns an error if the club list cannot be loaded, a client cannot be
/// built, or the output cannot be serialized. Upstream failures are printed
/// and skipped.
pub(crate) async fn run_crawl(
    config: &AppConfig,
    date: NaiveDate,
    source: SourceChoice,
) -> anyhow::Result<()> {
    let clubs: ClubDirectory = teetime_core::load_clubs(&config.clubs_path)?;
    let mut records = Vec::new();

    if source.includes_teescanner() {
        let client = TeescannerClient::new(
            &config.teescanner_base_url,
            config.teescanner_timeout_secs,
            &config.user_agent,
        )
        .map_err(|e| anyhow::anyhow!("failed to build Teescanner client: {e}"))?;
        collect_report("teescanner", client.fetch(date, &clubs).await, &mut records);
    }

    if source.includes_golfpang() {
        let client = build_golfpang(config)?;
        collect_report("golfpang", client.fetch(date, &clubs).await, &mut records);
    }

    tracing::info!(%date, records = records.len(), "crawl finished");
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Consolidates the snapshot file's contents for the given range.
///
/// # Errors
///
/// Returns an error when no snapshot path is configured, the snapshot cannot
/// be read, or the output cannot be serialized.
pub(crate) async fn run_query(
    config: &AppConfig,
    start: NaiveDate,
    end: NaiveDate,
    hours: Vec<u8>,
    favorites: Vec<String>,
) -> anyhow::Result<()> {
    let Some(path) = &config.snapshot_path else {
        anyhow::bail!("query needs a snapshot file; set TEETIME_SNAPSHOT_PATH");
    };

    let store = CacheStore::new(Duration::from_millis(config.cache_lock_timeout_ms));
    let dates = store.restore_snapshot(path).await?;
    tracing::debug!(dates, path = %path.display(), "snapshot loaded");

    let request = TeeTimeQuery::new(start, end)
        .with_hours(hours)
        .with_favorites(favorites);
    let rows = teetime_store::query(&store, &request).await;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
