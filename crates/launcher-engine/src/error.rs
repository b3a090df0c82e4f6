use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the launcher engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS hotkey service rejected an operation.
    #[error("Hotkey service error: {0}")]
    Hotkey(String),

    /// The typing-focus probe could not query the window content.
    #[error("Input focus probe failed: {0}")]
    Probe(String),

}
