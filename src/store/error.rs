//! Error types for store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or persisting the task table.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing, syncing or renaming a snapshot file failed.
    #[error("IO error on snapshot {path}: {source}")]
    Io {
        /// The snapshot or temp file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot on disk is not a valid task table.
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        /// The snapshot file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory table could not be serialized.
    #[error("failed to serialize task table: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
