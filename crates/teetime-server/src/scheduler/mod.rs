//! Background refresh of the tee-time cache.
//!
//! A single long-lived task sweeps the rolling window of dates at a fixed
//! cadence, subtracting the sweep's own duration from the following sleep.
//! Sweeps are serialized by a gate: the periodic loop waits for it, while a
//! manual trigger that finds it taken is coalesced into the running sweep.

mod sweep;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use teetime_core::ClubDirectory;
use teetime_scraper::TeeTimeSource;
use teetime_store::CacheStore;
use tokio::sync::Mutex;

pub use sweep::{DateOutcome, SweepSummary};

/// Result of a manual refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    Started,
    AlreadyRunning,
}

/// Sweep timing and window settings.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub window_days: u32,
    pub interval: Duration,
    pub snapshot_path: Option<PathBuf>,
}

impl SchedulerSettings {
    #[must_use]
    pub fn from_app_config(config: &teetime_core::AppConfig) -> Self {
        Self {
            window_days: config.window_days,
            interval: Duration::from_secs(config.refresh_interval_secs),
            snapshot_path: config.snapshot_path.clone(),
        }
    }
}

/// Drives both sources over the window and writes results to the cache.
///
/// `A` is called unconditionally. `B` is expected to arrive already wrapped
/// in its circuit breaker.
pub struct RefreshScheduler<A, B> {
    source_a: A,
    source_b: B,
    clubs: Arc<ClubDirectory>,
    store: CacheStore,
    settings: SchedulerSettings,
    gate: Arc<Mutex<()>>,
}

impl<A, B> RefreshScheduler<A, B>
where
    A: TeeTimeSource + 'static,
    B: TeeTimeSource + 'static,
{
    pub fn new(
        source_a: A,
        source_b: B,
        clubs: Arc<ClubDirectory>,
        store: CacheStore,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            source_a,
            source_b,
            clubs,
            store,
            settings,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// `window_days` consecutive dates starting at `today`.
    #[must_use]
    pub fn window(&self, today: NaiveDate) -> Vec<NaiveDate> {
        today
            .iter_days()
            .take(usize::try_from(self.settings.window_days).unwrap_or(usize::MAX))
            .collect()
    }

    /// Runs one full sweep for the current local date, waiting for any sweep
    /// already in progress to finish first.
    pub async fn run_sweep(&self) -> SweepSummary {
        let _gate = self.gate.lock().await;
        self.sweep_and_persist().await
    }

    async fn sweep_and_persist(&self) -> SweepSummary {
        let today = chrono::Local::now().date_naive();
        tracing::info!(%today, window_days = self.settings.window_days, "refresh sweep starting");

        let summary = self.sweep_window(today).await;
        tracing::info!(
            dates = summary.dates,
            stored = summary.stored,
            kept_previous = summary.kept_previous,
            write_skipped = summary.write_skipped,
            records = summary.records,
            elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            "refresh sweep finished"
        );

        if summary.stored > 0 {
            if let Some(path) = &self.settings.snapshot_path {
                if let Err(e) = self.store.save_snapshot(path).await {
                    tracing::warn!(error = %e, "cache snapshot not written");
                }
            }
        }
        summary
    }

    /// Starts an immediate sweep in the background unless one is running.
    pub fn trigger(self: &Arc<Self>) -> TriggerOutcome {
        let Ok(guard) = Arc::clone(&self.gate).try_lock_owned() else {
            tracing::info!("manual refresh coalesced into running sweep");
            return TriggerOutcome::AlreadyRunning;
        };

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let _gate = guard;
            tracing::info!("manual refresh sweep started");
            scheduler.sweep_and_persist().await;
        });
        TriggerOutcome::Started
    }

    /// Sweeps forever at the configured cadence.
    pub async fn run_forever(self: Arc<Self>) {
        loop {
            let started = tokio::time::Instant::now();
            self.run_sweep().await;
            let pause = next_sleep(self.settings.interval, started.elapsed());
            tracing::info!(sleep_secs = pause.as_secs(), "next refresh sweep scheduled");
            tokio::time::sleep(pause).await;
        }
    }
}

/// Time left in the interval after a sweep that took `elapsed`.
#[must_use]
pub fn next_sleep(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
