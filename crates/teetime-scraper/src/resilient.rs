//! Circuit-breaker decorator over a [`TeeTimeSource`].

use std::sync::Arc;

use chrono::NaiveDate;
use teetime_core::{ClubDirectory, SourceId};

use crate::breaker::CircuitBreaker;
use crate::error::ScraperError;
use crate::source::{FetchReport, TeeTimeSource};

/// Wraps a source so that repeated whole-call failures suspend it.
///
/// While the circuit is open, `fetch` returns an empty, `skipped` report
/// without touching the network; the sweep carries on with the other source.
pub struct ResilientSource<S> {
    inner: S,
    breaker: Arc<CircuitBreaker>,
}

impl<S: TeeTimeSource> ResilientSource<S> {
    pub fn new(inner: S, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }

    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl<S: TeeTimeSource> TeeTimeSource for ResilientSource<S> {
    fn source_id(&self) -> SourceId {
        self.inner.source_id()
    }

    async fn fetch(
        &self,
        date: NaiveDate,
        clubs: &ClubDirectory,
    ) -> Result<FetchReport, ScraperError> {
        let source = self.inner.source_id();
        if !self.breaker.allow_request() {
            let status = self.breaker.status();
            tracing::warn!(
                %source,
                %date,
                reopens_in_secs = status.reopens_in_secs,
                "circuit open, skipping upstream call"
            );
            return Ok(FetchReport::skipped());
        }

        match self.inner.fetch(date, clubs).await {
            Ok(report) => {
                self.breaker.record_success();
                Ok(report)
            }
            Err(err) => {
                if self.breaker.record_failure() {
                    tracing::warn!(
                        %source,
                        consecutive_failures = self.breaker.consecutive_failures(),
                        error = %err,
                        "circuit opened after consecutive failures"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::{BreakerConfig, CircuitState};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;
    use teetime_core::TeeTimeRecord;

    /// Fake upstream that fails while `failing` is set and counts calls.
    struct FakeSource {
        calls: AtomicU32,
        failing: AtomicBool,
    }

    impl FakeSource {
        fn new(failing: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failing: AtomicBool::new(failing),
            }
        }
    }

    impl TeeTimeSource for Arc<FakeSource> {
        fn source_id(&self) -> SourceId {
            SourceId::Golfpang
        }

        async fn fetch(
            &self,
            date: NaiveDate,
            _clubs: &ClubDirectory,
        ) -> Result<FetchReport, ScraperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ScraperError::SourceUnavailable {
                    source_id: SourceId::Golfpang,
                    failed: 1,
                });
            }
            Ok(FetchReport {
                records: vec![TeeTimeRecord::new(
                    "Lakeside CC",
                    date,
                    9,
                    Some(80_000),
                    SourceId::Golfpang,
                    "https://www.golfpang.com/",
                )],
                attempted_units: 1,
                ..FetchReport::default()
            })
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn wrapped(fake: &Arc<FakeSource>) -> ResilientSource<Arc<FakeSource>> {
        ResilientSource::new(
            Arc::clone(fake),
            Arc::new(CircuitBreaker::new(BreakerConfig::default())),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn skips_call_one_second_after_three_failures() {
        let fake = Arc::new(FakeSource::new(true));
        let source = wrapped(&fake);
        let clubs = ClubDirectory::default();

        for _ in 0..3 {
            assert!(source.fetch(day(), &clubs).await.is_err());
        }
        assert_eq!(source.breaker().state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(1)).await;
        let report = source.fetch(day(), &clubs).await.expect("skip is not an error");
        assert!(report.skipped);
        assert!(report.records.is_empty());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 3, "no network attempt while open");
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_again_after_cool_down() {
        let fake = Arc::new(FakeSource::new(true));
        let source = wrapped(&fake);
        let clubs = ClubDirectory::default();

        for _ in 0..3 {
            let _ = source.fetch(day(), &clubs).await;
        }
        fake.failing.store(false, Ordering::SeqCst);

        tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;
        let report = source.fetch(day(), &clubs).await.expect("recovered");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.records.len(), 1);
        assert_eq!(source.breaker().state(), CircuitState::Closed);
        assert_eq!(source.breaker().consecutive_failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn success_passes_records_through() {
        let fake = Arc::new(FakeSource::new(false));
        let source = wrapped(&fake);
        let report = source
            .fetch(day(), &ClubDirectory::default())
            .await
            .expect("ok");
        assert!(!report.skipped);
        assert_eq!(report.records[0].date, day());
    }
}
