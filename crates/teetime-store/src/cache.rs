//! Date-keyed cache of tee-time records.
//!
//! Every accessor takes the table lock with a bounded wait. Readers that miss
//! the window get an empty result; writers get [`StoreError::LockTimeout`] and
//! decide for themselves whether to skip.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use teetime_core::TeeTimeRecord;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::snapshot::{read_snapshot, write_snapshot, SnapshotFile};

type Table = HashMap<NaiveDate, Vec<TeeTimeRecord>>;

/// Thread-safe, cloneable handle to the cache table.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<Mutex<Table>>,
    lock_timeout: Duration,
}

impl CacheStore {
    #[must_use]
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Table::new())),
            lock_timeout,
        }
    }

    async fn lock(&self) -> Result<MutexGuard<'_, Table>, StoreError> {
        tokio::time::timeout(self.lock_timeout, self.inner.lock())
            .await
            .map_err(|_| StoreError::LockTimeout {
                waited_ms: u64::try_from(self.lock_timeout.as_millis()).unwrap_or(u64::MAX),
            })
    }

    /// Records cached for `date`, or an error if the lock was not acquired.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockTimeout`] when the bounded wait expires.
    pub async fn try_get(&self, date: NaiveDate) -> Result<Vec<TeeTimeRecord>, StoreError> {
        let table = self.lock().await?;
        Ok(table.get(&date).cloned().unwrap_or_default())
    }

    /// Records cached for `date`. Absent dates and lock timeouts both read as
    /// empty.
    pub async fn get(&self, date: NaiveDate) -> Vec<TeeTimeRecord> {
        match self.try_get(date).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(%date, error = %e, "cache read skipped");
                Vec::new()
            }
        }
    }

    /// Every cached date in `start..=end`, in ascending order, read under a
    /// single lock acquisition. Dates with no entry are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockTimeout`] when the bounded wait expires.
    pub async fn get_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, Vec<TeeTimeRecord>>, StoreError> {
        let table = self.lock().await?;
        Ok(start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter_map(|d| table.get(&d).map(|records| (d, records.clone())))
            .collect())
    }

    /// Replaces the entry for `date` with `records` in one lock acquisition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockTimeout`] when the bounded wait expires; the
    /// previous entry is then left untouched.
    pub async fn put(
        &self,
        date: NaiveDate,
        records: Vec<TeeTimeRecord>,
    ) -> Result<(), StoreError> {
        let mut table = self.lock().await?;
        table.insert(date, records);
        Ok(())
    }

    /// Cached dates in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockTimeout`] when the bounded wait expires.
    pub async fn cached_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let table = self.lock().await?;
        let mut dates: Vec<_> = table.keys().copied().collect();
        dates.sort_unstable();
        Ok(dates)
    }

    /// Writes the whole table to `path`. The lock is only held while the
    /// table is cloned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LockTimeout`], or the snapshot I/O and format
    /// errors from the write.
    pub async fn save_snapshot(&self, path: &Path) -> Result<usize, StoreError> {
        let table = self.lock().await?.clone();
        let dates = table.len();
        write_snapshot(path, &SnapshotFile::from_table(table)).await?;
        tracing::info!(path = %path.display(), dates, "cache snapshot saved");
        Ok(dates)
    }

    /// Loads the snapshot at `path` into the table, overwriting dates it
    /// contains.
    ///
    /// # Errors
    ///
    /// Returns the snapshot read/parse error, or [`StoreError::LockTimeout`].
    pub async fn restore_snapshot(&self, path: &Path) -> Result<usize, StoreError> {
        let restored = read_snapshot(path).await?.into_table();
        let dates = restored.len();
        self.lock().await?.extend(restored);
        Ok(dates)
    }

    /// [`restore_snapshot`](Self::restore_snapshot), treating every failure
    /// as "start empty".
    pub async fn restore_or_start_empty(&self, path: &Path) -> usize {
        match self.restore_snapshot(path).await {
            Ok(dates) => {
                tracing::info!(path = %path.display(), dates, "cache restored from snapshot");
                dates
            }
            Err(StoreError::SnapshotIo { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::info!(path = %path.display(), "no cache snapshot, starting empty");
                0
            }
            Err(e) => {
                tracing::warn!(error = %e, "cache snapshot unusable, starting empty");
                0
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
