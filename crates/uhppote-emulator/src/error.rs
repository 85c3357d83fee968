use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or saving device snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot already exists: {0}")]
    AlreadyExists(PathBuf),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
