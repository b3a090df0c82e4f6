//! Error types for settings and profile storage.

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the config crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced while reading, validating or writing launcher data.
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied profile name is empty after sanitizing.
    #[error("invalid profile name")]
    InvalidName,
    /// Another profile already uses this name.
    #[error("profile '{0}' already exists")]
    Duplicate(String),
    /// No profile with this name exists.
    #[error("profile '{0}' not found")]
    NotFound(String),
    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
