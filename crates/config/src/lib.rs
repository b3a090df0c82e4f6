//! Launcher settings and the on-disk profile store.
//!
//! Both live as JSON files in the launcher data directory. Reads are lenient:
//! missing or malformed files fall back to defaults so that a corrupt file never
//! prevents the launcher from starting.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

mod error;
mod profiles;
mod settings;

pub use error::{Error, Result};
pub use profiles::{
    Bounds, DEFAULT_JOB, JOBS, Profile, ProfileStore, ProfileUpdate, WinState,
    partition_from_name, safe_profile_name,
};
pub use settings::{Settings, SettingsPatch};

/// File name of the settings document inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";
/// File name of the profile list inside the data directory.
pub const PROFILES_FILE: &str = "profiles.json";

/// Resolve the launcher data directory.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `$LAUNCHER_HOME` when set.
/// 3) Else `~/.flyff-launcher`.
pub fn data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Some(p) = env::var_os("LAUNCHER_HOME") {
        return PathBuf::from(p);
    }
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".flyff-launcher");
    p
}

/// Path of the settings file under `dir`.
pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

/// Path of the profiles file under `dir`.
pub fn profiles_path(dir: &Path) -> PathBuf {
    dir.join(PROFILES_FILE)
}

/// Write `value` as pretty JSON to `path`, creating parent directories.
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::{
        env, fs,
        path::PathBuf,
        process,
        time::{SystemTime, UNIX_EPOCH},
    };

    pub fn unique_tmp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let mut dir = env::temp_dir();
        dir.push(format!("launcher-{name}-{}-{nanos}", process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }
}
