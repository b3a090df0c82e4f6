use std::io;

use thiserror::Error;

/// Errors reported by the `launcher` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Profile or settings storage failed.
    #[error(transparent)]
    Config(#[from] config::Error),

    /// A shortcut argument could not be parsed.
    #[error("{input}: {source}")]
    Shortcut {
        /// The argument as given.
        input: String,
        /// Parse failure.
        source: keyspec::Error,
    },

    /// Logging could not be set up.
    #[error("logging: {0}")]
    Logging(#[from] io::Error),
}
