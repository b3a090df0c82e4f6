use std::fmt;

/// Modifier keys recognized in shortcut strings.
///
/// Variant order is the canonical order used when rendering an accelerator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    /// Command on macOS, Control elsewhere.
    CommandOrControl,
    /// Control.
    Control,
    /// Alt (Option on macOS).
    Alt,
    /// Shift.
    Shift,
}

impl Modifier {
    /// Parse a modifier keyword, case-insensitively.
    ///
    /// Accepts the common aliases (ctrl/control, alt/option, meta/cmd/command/super).
    pub fn from_spec(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CTRL" | "CONTROL" => Some(Self::Control),
            "ALT" | "OPTION" => Some(Self::Alt),
            "SHIFT" => Some(Self::Shift),
            "META" | "CMD" | "COMMAND" | "SUPER" | "COMMANDORCONTROL" | "CMDORCTRL" => {
                Some(Self::CommandOrControl)
            }
            _ => None,
        }
    }

    /// Canonical spelling for this modifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommandOrControl => "CommandOrControl",
            Self::Control => "Control",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_specs() {
        assert_eq!(Modifier::from_spec("CTRL"), Some(Modifier::Control));
        assert_eq!(Modifier::from_spec("control"), Some(Modifier::Control));
        assert_eq!(Modifier::from_spec("Alt"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_spec("option"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_spec("META"), Some(Modifier::CommandOrControl));
        assert_eq!(
            Modifier::from_spec("CommandOrControl"),
            Some(Modifier::CommandOrControl)
        );
        assert_eq!(Modifier::from_spec("space"), None);
    }

    #[test]
    fn canonical_order() {
        let mut mods = vec![Modifier::Shift, Modifier::Alt, Modifier::Control];
        mods.sort();
        assert_eq!(mods, [Modifier::Control, Modifier::Alt, Modifier::Shift]);
    }
}
