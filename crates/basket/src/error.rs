//! Storage error types.
//!
//! Aggregate operations never fail: storage problems are logged and the
//! in-memory state carries on. These errors only surface through the
//! fallible `try_*` methods of [`FileStorage`](crate::storage::FileStorage).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a persistent storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be mapped onto the medium.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {}: {source}", path.display())]
    Io {
        /// File the operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for `StorageError`.
pub type Result<T> = std::result::Result<T, StorageError>;
