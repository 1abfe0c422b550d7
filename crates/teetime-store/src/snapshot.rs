//! On-disk snapshot of the cache table.
//!
//! Written with temp-file + rename so a crash mid-write leaves the previous
//! snapshot intact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use teetime_core::TeeTimeRecord;

use crate::error::StoreError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub date: NaiveDate,
    pub records: Vec<TeeTimeRecord>,
}

impl SnapshotFile {
    /// Entries sorted by date so consecutive snapshots diff cleanly.
    #[must_use]
    pub fn from_table(table: HashMap<NaiveDate, Vec<TeeTimeRecord>>) -> Self {
        let mut entries: Vec<SnapshotEntry> = table
            .into_iter()
            .map(|(date, records)| SnapshotEntry { date, records })
            .collect();
        entries.sort_by_key(|e| e.date);
        Self {
            saved_at: Utc::now(),
            entries,
        }
    }

    /// Rebuilds the table, dropping records filed under a date they do not
    /// carry.
    #[must_use]
    pub fn into_table(self) -> HashMap<NaiveDate, Vec<TeeTimeRecord>> {
        self.entries
            .into_iter()
            .map(|entry| {
                let date = entry.date;
                let records: Vec<_> =
                    entry.records.into_iter().filter(|r| r.date == date).collect();
                (date, records)
            })
            .filter(|(_, records)| !records.is_empty())
            .collect()
    }
}

/// Serializes `snapshot` to `path` atomically.
///
/// # Errors
///
/// Returns [`StoreError::SnapshotIo`] if the directory, temp file, or rename
/// fails, and [`StoreError::SnapshotFormat`] if serialization fails.
pub async fn write_snapshot(path: &Path, snapshot: &SnapshotFile) -> Result<(), StoreError> {
    let io_err = |source| StoreError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_json::to_vec(snapshot).map_err(|source| StoreError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, &content).await.map_err(io_err)?;
    tokio::fs::rename(&temp_path, path).await.map_err(io_err)?;
    Ok(())
}

/// Reads and parses the snapshot at `path`.
///
/// # Errors
///
/// Returns [`StoreError::SnapshotIo`] if the file cannot be read (including
/// when it does not exist) and [`StoreError::SnapshotFormat`] if it does not
/// parse.
pub async fn read_snapshot(path: &Path) -> Result<SnapshotFile, StoreError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| StoreError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&content).map_err(|source| StoreError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teetime_core::SourceId;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn record(date: NaiveDate) -> TeeTimeRecord {
        TeeTimeRecord::new(
            "A",
            date,
            9,
            Some(80_000),
            SourceId::Teescanner,
            "https://www.teescanner.com/",
        )
    }

    #[test]
    fn from_table_sorts_entries_by_date() {
        let table = HashMap::from([(day(3), vec![record(day(3))]), (day(1), vec![record(day(1))])]);
        let snapshot = SnapshotFile::from_table(table);
        let dates: Vec<_> = snapshot.entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(3)]);
    }

    #[test]
    fn into_table_drops_misfiled_records_and_empty_dates() {
        let snapshot = SnapshotFile {
            saved_at: Utc::now(),
            entries: vec![
                SnapshotEntry {
                    date: day(1),
                    records: vec![record(day(1)), record(day(2))],
                },
                SnapshotEntry {
                    date: day(5),
                    records: vec![record(day(6))],
                },
            ],
        };
        let table = snapshot.into_table();
        assert_eq!(table.len(), 1);
        assert_eq!(table[&day(1)].len(), 1);
    }

    #[test]
    fn temp_path_sits_next_to_target() {
        assert_eq!(
            temp_path_for(Path::new("/data/cache-snapshot.json")),
            PathBuf::from("/data/cache-snapshot.json.tmp")
        );
    }

    #[tokio::test]
    async fn write_then_read_through_a_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");
        let snapshot = SnapshotFile::from_table(HashMap::from([(day(1), vec![record(day(1))])]));

        write_snapshot(&path, &snapshot).await.expect("write");
        assert!(!temp_path_for(&path).exists(), "temp file renamed away");

        let restored = read_snapshot(&path).await.expect("read").into_table();
        assert_eq!(restored[&day(1)], vec![record(day(1))]);
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "not valid json {{{").unwrap();
        assert!(matches!(
            read_snapshot(&path).await,
            Err(StoreError::SnapshotFormat { .. })
        ));
    }
}
