use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The cache lock was held past the bounded wait.
    #[error("cache lock not acquired within {waited_ms}ms")]
    LockTimeout { waited_ms: u64 },

    #[error("snapshot I/O error at {}: {source}", path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot at {} is not valid: {source}", path.display())]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
