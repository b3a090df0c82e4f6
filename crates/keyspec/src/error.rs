//! Error types and result alias for the keyspec crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Reasons a shortcut string cannot be turned into an accelerator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The shortcut string was empty or whitespace.
    #[error("empty shortcut")]
    Empty,
    /// A `+`-separated component was empty (e.g. "Ctrl++1").
    #[error("empty component in shortcut '{0}'")]
    EmptyToken(String),
    /// Only modifiers were given.
    #[error("shortcut '{0}' has no key")]
    MissingKey(String),
    /// More than one non-modifier key, or a key before a modifier.
    #[error("shortcut '{0}' names more than one key")]
    MultipleKeys(String),
}
