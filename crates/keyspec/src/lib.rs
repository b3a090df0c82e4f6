//! Canonical accelerators for global shortcut registration.
//!
//! Shortcut strings arrive from assist windows in whatever spelling the user
//! typed ("CTRL+1", "ctrl + 1", "Control+1"). [`Accelerator::parse`] folds them
//! into a single canonical form so that equal physical key combinations compare
//! equal, and so the OS hotkey service sees one spelling per combination.

mod accelerator;
mod error;
mod modifiers;

pub use accelerator::Accelerator;
pub use error::{Error, Result};
pub use modifiers::Modifier;

/// Canonical names for the named (non-character) keys the launcher understands.
///
/// Tokens not listed here are passed through uppercased.
pub(crate) fn canonical_key_name(token: &str) -> Option<&'static str> {
    let name = match token.to_ascii_uppercase().as_str() {
        "SPACE" => "Space",
        "ESC" | "ESCAPE" => "Escape",
        "ENTER" | "RETURN" => "Enter",
        "UP" | "ARROWUP" => "Up",
        "DOWN" | "ARROWDOWN" => "Down",
        "LEFT" | "ARROWLEFT" => "Left",
        "RIGHT" | "ARROWRIGHT" => "Right",
        "PAGEUP" | "PGUP" => "PageUp",
        "PAGEDOWN" | "PGDN" => "PageDown",
        "HOME" => "Home",
        "END" => "End",
        "INSERT" | "INS" => "Insert",
        "DELETE" | "DEL" => "Delete",
        "BACKSPACE" => "Backspace",
        "TAB" => "Tab",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_and_abbreviations() {
        assert_eq!(canonical_key_name("ins"), Some("Insert"));
        assert_eq!(canonical_key_name("DEL"), Some("Delete"));
        assert_eq!(canonical_key_name("PgDn"), Some("PageDown"));
        assert_eq!(canonical_key_name("escape"), Some("Escape"));
        assert_eq!(canonical_key_name("F5"), None);
        assert_eq!(canonical_key_name("a"), None);
    }
}
