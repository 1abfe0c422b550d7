//! The adapter contract every upstream implements.

use std::future::Future;

use chrono::NaiveDate;
use teetime_core::{ClubDirectory, SourceId, TeeTimeRecord};

use crate::error::ScraperError;

/// Outcome of one adapter call for one date.
///
/// Per-club and per-page failures do not abort the call: records gathered
/// before a failure are kept and the failure is counted in `failed_units`, so
/// a caller can tell "zero results" apart from "some lookups aborted".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub records: Vec<TeeTimeRecord>,
    /// Club (or club/page) lookups that were attempted.
    pub attempted_units: usize,
    /// Lookups that failed and were skipped.
    pub failed_units: usize,
    /// `true` when the call was skipped by an open circuit.
    pub skipped: bool,
}

impl FetchReport {
    /// A report for a call that was never attempted.
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.failed_units > 0
    }

    /// Converts a report where every attempted lookup failed into
    /// [`ScraperError::SourceUnavailable`].
    ///
    /// # Errors
    ///
    /// Returns `SourceUnavailable` when at least one lookup was attempted and
    /// none succeeded.
    pub fn into_result(self, source_id: SourceId) -> Result<Self, ScraperError> {
        if self.attempted_units > 0 && self.failed_units == self.attempted_units {
            return Err(ScraperError::SourceUnavailable {
                source_id,
                failed: self.failed_units,
            });
        }
        Ok(self)
    }
}

/// Translates one provider's transport into [`TeeTimeRecord`]s.
pub trait TeeTimeSource: Send + Sync {
    fn source_id(&self) -> SourceId;

    /// Fetches every slot the provider lists for `date` across the directory.
    ///
    /// Every returned record carries `date` verbatim.
    fn fetch(
        &self,
        date: NaiveDate,
        clubs: &ClubDirectory,
    ) -> impl Future<Output = Result<FetchReport, ScraperError>> + Send;
}
