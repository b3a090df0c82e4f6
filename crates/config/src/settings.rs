//! Launcher-wide settings (`settings.json`).

use std::{fs, io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, write_json};

/// User-tunable launcher settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Keep the launcher window open after a profile is launched.
    pub stay_open_after_launch: bool,
    /// Allow bare single-key macro shortcuts (no modifier) to be registered
    /// globally. Off by default so that ordinary keys are not hijacked system-wide.
    pub allow_single_key_global: bool,
}

/// A partial update to [`Settings`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// New value for [`Settings::stay_open_after_launch`].
    pub stay_open_after_launch: Option<bool>,
    /// New value for [`Settings::allow_single_key_global`].
    pub allow_single_key_global: Option<bool>,
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file yields defaults silently; an unreadable or malformed file
    /// yields defaults with a warning.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings_missing_using_defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings_unreadable_using_defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings_invalid_using_defaults");
                Self::default()
            }
        }
    }

    /// Persist settings to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Merge a partial update into these settings.
    pub fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.stay_open_after_launch {
            self.stay_open_after_launch = v;
        }
        if let Some(v) = patch.allow_single_key_global {
            self.allow_single_key_global = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{settings_path, test_util::unique_tmp_dir};

    #[test]
    fn missing_file_is_default() {
        let dir = unique_tmp_dir("settings-missing");
        let s = Settings::load(&settings_path(&dir));
        assert_eq!(s, Settings::default());
        assert!(!s.allow_single_key_global);
    }

    #[test]
    fn malformed_file_is_default() {
        let dir = unique_tmp_dir("settings-bad");
        let path = settings_path(&dir);
        fs::write(&path, "{ not json").expect("write");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn partial_document_keeps_defaults_for_missing_keys() {
        let dir = unique_tmp_dir("settings-partial");
        let path = settings_path(&dir);
        fs::write(&path, r#"{"allowSingleKeyGlobal": true}"#).expect("write");
        let s = Settings::load(&path);
        assert!(s.allow_single_key_global);
        assert!(!s.stay_open_after_launch);
    }

    #[test]
    fn save_then_load() {
        let dir = unique_tmp_dir("settings-save");
        let path = dir.join("nested").join("settings.json");
        let mut s = Settings::default();
        s.apply_patch(SettingsPatch {
            stay_open_after_launch: Some(true),
            allow_single_key_global: None,
        });
        s.save(&path).expect("save");
        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"stayOpenAfterLaunch\": true"));
        assert_eq!(Settings::load(&path), s);
    }
}
