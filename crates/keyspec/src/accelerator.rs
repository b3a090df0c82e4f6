use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Modifier, Result, canonical_key_name};

/// A canonical key combination: a set of modifiers plus a single key.
///
/// Two accelerators are equal iff their canonical renderings are equal, so
/// "CTRL+1", "control + 1" and "Ctrl+1" all name the same accelerator.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Accelerator {
    /// Modifiers in canonical order, without duplicates.
    modifiers: Vec<Modifier>,
    /// Canonical key name ("1", "F5", "PageUp", "Space").
    key: String,
}

impl Accelerator {
    /// Parses a shortcut specification such as "CTRL+ALT+1" or "pgdn".
    ///
    /// - Components are separated by "+" and trimmed; the last one is the key.
    /// - Modifier keywords and named keys are case-insensitive and accept the
    ///   usual aliases (see [`Modifier::from_spec`]).
    /// - Unrecognized key tokens are passed through uppercased.
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::Empty);
        }
        let mut modifiers = Vec::new();
        let mut key: Option<String> = None;
        for raw in s.split('+') {
            let token = raw.trim();
            if token.is_empty() {
                return Err(Error::EmptyToken(s.to_string()));
            }
            if key.is_some() {
                // Nothing may follow the key.
                return Err(Error::MultipleKeys(s.to_string()));
            }
            if let Some(m) = Modifier::from_spec(token) {
                modifiers.push(m);
            } else {
                let name = canonical_key_name(token)
                    .map(str::to_string)
                    .unwrap_or_else(|| token.to_ascii_uppercase());
                key = Some(name);
            }
        }
        let key = key.ok_or_else(|| Error::MissingKey(s.to_string()))?;
        modifiers.sort();
        modifiers.dedup();
        Ok(Self { modifiers, key })
    }

    /// True when at least one modifier is held for this accelerator.
    pub fn has_modifier(&self) -> bool {
        !self.modifiers.is_empty()
    }

    /// Modifiers in canonical order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// The canonical key name.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m)?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for Accelerator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Accelerator> for String {
    fn from(a: Accelerator) -> Self {
        a.to_string()
    }
}

impl TryFrom<String> for Accelerator {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn acc(s: &str) -> Accelerator {
        Accelerator::parse(s).expect("valid accelerator")
    }

    #[test]
    fn modifier_aliases_fold_together() {
        assert_eq!(acc("CTRL+1"), acc("Control+1"));
        assert_eq!(acc("ctrl + 1"), acc("Ctrl+1"));
        assert_eq!(acc("CTRL+1").to_string(), "Control+1");
        assert_eq!(acc("META+SHIFT+p").to_string(), "CommandOrControl+Shift+P");
        assert_eq!(acc("alt+INS").to_string(), "Alt+Insert");
    }

    #[test]
    fn modifier_order_is_canonical() {
        assert_eq!(acc("Shift+Ctrl+Tab"), acc("Ctrl+Shift+Tab"));
        assert_eq!(acc("Shift+Ctrl+Tab").to_string(), "Control+Shift+Tab");
        assert_eq!(acc("Ctrl+Ctrl+A").to_string(), "Control+A");
    }

    #[test]
    fn bare_keys_have_no_modifier() {
        let f5 = acc("f5");
        assert!(!f5.has_modifier());
        assert_eq!(f5.to_string(), "F5");
        assert_eq!(acc("pgup").to_string(), "PageUp");
        assert_eq!(acc("DEL").to_string(), "Delete");
        assert!(acc("Alt+Home").has_modifier());
    }

    #[test]
    fn rejects_malformed_shortcuts() {
        assert_eq!(Accelerator::parse("  "), Err(Error::Empty));
        assert!(matches!(
            Accelerator::parse("Ctrl++1"),
            Err(Error::EmptyToken(_))
        ));
        assert!(matches!(
            Accelerator::parse("CTRL+SHIFT"),
            Err(Error::MissingKey(_))
        ));
        assert!(matches!(
            Accelerator::parse("1+Ctrl"),
            Err(Error::MultipleKeys(_))
        ));
        assert!(matches!(
            Accelerator::parse("A+B"),
            Err(Error::MultipleKeys(_))
        ));
    }

    #[test]
    fn serializes_as_canonical_string() {
        let a = acc("ctrl+space");
        let json = serde_json::to_string(&a).expect("serialize");
        assert_eq!(json, "\"Control+Space\"");
        let back: Accelerator = serde_json::from_str("\"CONTROL+SPACE\"").expect("deserialize");
        assert_eq!(back, a);
    }

    fn token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("ctrl".to_string()),
            Just("ALT".to_string()),
            Just("Shift".to_string()),
            Just("meta".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn canonical_form_is_a_fixed_point(
            mods in proptest::collection::vec(token(), 0..4),
            key in prop_oneof![
                Just("1".to_string()),
                Just("f5".to_string()),
                Just("pgdn".to_string()),
                Just("Space".to_string()),
                Just("q".to_string()),
            ],
        ) {
            let mut parts = mods.clone();
            parts.push(key);
            let a = Accelerator::parse(&parts.join("+")).expect("valid");
            let again = Accelerator::parse(&a.to_string()).expect("reparse");
            prop_assert_eq!(&a, &again);
            prop_assert_eq!(a.has_modifier(), !mods.is_empty());
        }
    }
}
