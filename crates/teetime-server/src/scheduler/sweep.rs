//! One pass over the refresh window.

use std::time::Duration;

use chrono::NaiveDate;
use teetime_core::TeeTimeRecord;
use teetime_scraper::{FetchReport, ScraperError, TeeTimeSource};

use super::RefreshScheduler;

/// What happened to one date's cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    /// The entry was replaced with this many records.
    Stored(usize),
    /// Nothing came back; the previous entry was left alone.
    KeptPrevious,
    /// Records came back but the cache lock timed out.
    WriteSkipped,
}

/// Totals for one sweep, logged when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub dates: usize,
    pub stored: usize,
    pub kept_previous: usize,
    pub write_skipped: usize,
    pub records: usize,
    pub elapsed: Duration,
}

impl SweepSummary {
    fn record(&mut self, outcome: DateOutcome) {
        self.dates += 1;
        match outcome {
            DateOutcome::Stored(n) => {
                self.stored += 1;
                self.records += n;
            }
            DateOutcome::KeptPrevious => self.kept_previous += 1,
            DateOutcome::WriteSkipped => self.write_skipped += 1,
        }
    }
}

/// Records from one adapter call; a failed call counts as zero records.
fn records_or_empty(
    date: NaiveDate,
    source: &str,
    result: Result<FetchReport, ScraperError>,
) -> Vec<TeeTimeRecord> {
    match result {
        Ok(report) => {
            if report.skipped {
                tracing::info!(%date, %source, "source skipped this pass");
            } else if report.is_partial() {
                tracing::warn!(
                    %date,
                    %source,
                    failed = report.failed_units,
                    attempted = report.attempted_units,
                    "source returned partial results"
                );
            }
            report.records
        }
        Err(e) => {
            tracing::warn!(
                %date,
                %source,
                error = %e,
                "source fetch failed, treating as no records"
            );
            Vec::new()
        }
    }
}

impl<A, B> RefreshScheduler<A, B>
where
    A: TeeTimeSource + 'static,
    B: TeeTimeSource + 'static,
{
    /// Fetches both sources for `date` and applies the overwrite policy:
    /// an empty combined result keeps the cached entry, anything else
    /// replaces it.
    pub async fn refresh_date(&self, date: NaiveDate) -> DateOutcome {
        let (a, b) = tokio::join!(
            self.source_a.fetch(date, &self.clubs),
            self.source_b.fetch(date, &self.clubs),
        );

        let mut records = records_or_empty(date, self.source_a.source_id().as_str(), a);
        records.extend(records_or_empty(date, self.source_b.source_id().as_str(), b));

        if records.is_empty() {
            tracing::warn!(%date, "no tee times from any source, keeping cached entry");
            return DateOutcome::KeptPrevious;
        }

        let count = records.len();
        match self.store.put(date, records).await {
            Ok(()) => {
                tracing::info!(%date, records = count, "cache entry replaced");
                DateOutcome::Stored(count)
            }
            Err(e) => {
                tracing::warn!(%date, error = %e, "cache write skipped");
                DateOutcome::WriteSkipped
            }
        }
    }

    /// Refreshes every date of the window starting at `today`, one date at a
    /// time. Does not take the sweep gate.
    pub async fn sweep_window(&self, today: NaiveDate) -> SweepSummary {
        let started = tokio::time::Instant::now();
        let mut summary = SweepSummary::default();

        for date in self.window(today) {
            summary.record(self.refresh_date(date).await);
        }

        summary.elapsed = started.elapsed();
        summary
    }
}
