//! Profile records and the `profiles.json` store.
//!
//! A profile is one isolated game session: a display name, a job, and the
//! persistent storage partition its browser session is bound to. The partition
//! is fixed at creation and survives renames, so a renamed profile keeps its
//! login state.

use std::{fs, io::ErrorKind, mem, path::PathBuf, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Error, Result, write_json};

/// Jobs a profile can be tagged with.
pub const JOBS: [&str; 8] = [
    "Ringmaster",
    "Billposter",
    "Psykeeper",
    "Elementor",
    "Knight",
    "Blade",
    "Ranger",
    "Jester",
];

/// Job assigned when none (or an unknown one) is given.
pub const DEFAULT_JOB: &str = JOBS[0];

/// Maximum profile name length, in characters.
const MAX_NAME_CHARS: usize = 40;

/// Smallest restored window edge, in pixels.
const MIN_WINDOW_EDGE: f64 = 200.0;

/// Names produced by cloning: "X Copy", "X Copy 2", ...
static CLONE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCopy(?:\s+\d+)?$").expect("valid clone regex"));

/// Characters not allowed verbatim in a partition name.
static PARTITION_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\-_ ]").expect("valid partition regex"));

/// Saved window geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Top edge, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Saved window state for a profile's game window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinState {
    /// Restored bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Whether the window was maximized.
    #[serde(default)]
    pub is_maximized: bool,
}

/// One launcher profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display name; unique within the store.
    pub name: String,
    /// Job tag, one of [`JOBS`].
    pub job: String,
    /// Storage partition identifier (`persist:...`).
    pub partition: String,
    /// Show the native window frame.
    #[serde(default)]
    pub frame: bool,
    /// Profile was created by cloning another one.
    #[serde(default)]
    pub is_clone: bool,
    /// Last saved window state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_state: Option<WinState>,
    /// Session audio muted.
    #[serde(default)]
    pub muted: bool,
}

/// Fields changed by [`ProfileStore::update`]; `None` leaves a field as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New name.
    pub name: Option<String>,
    /// New frame setting.
    pub frame: Option<bool>,
    /// New job; ignored when not one of [`JOBS`].
    pub job: Option<String>,
}

/// Trim, collapse inner whitespace and cap a profile name at 40 characters.
pub fn safe_profile_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_NAME_CHARS).collect()
}

/// The stable partition identifier derived from a profile name.
pub fn partition_from_name(name: &str) -> String {
    format!("persist:profile-{}", PARTITION_UNSAFE.replace_all(name, "_"))
}

/// The `n`th clone name for `base`, shortening `base` so the suffix survives
/// the length cap.
fn clone_name(base: &str, n: usize) -> String {
    let suffix = if n == 1 {
        " Copy".to_string()
    } else {
        format!(" Copy {n}")
    };
    let keep = MAX_NAME_CHARS.saturating_sub(suffix.chars().count());
    let stem: String = base.chars().take(keep).collect();
    safe_profile_name(&format!("{}{suffix}", stem.trim_end()))
}

fn infer_is_clone(name: &str) -> bool {
    CLONE_NAME.is_match(name.trim())
}

fn valid_job(job: &str) -> Option<&'static str> {
    let job = job.trim();
    JOBS.iter().copied().find(|j| *j == job)
}

fn sanitize_win_state(v: &Value) -> Option<WinState> {
    let obj = v.as_object()?;
    let is_maximized = obj
        .get("isMaximized")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let bounds = obj.get("bounds").and_then(Value::as_object).map(|b| {
        let coord = |k: &str| b.get(k).and_then(Value::as_f64).map(|f| f as i32);
        let edge = |k: &str| {
            b.get(k)
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
                .max(MIN_WINDOW_EDGE) as u32
        };
        Bounds {
            x: coord("x"),
            y: coord("y"),
            width: edge("width"),
            height: edge("height"),
        }
    });
    if bounds.is_none() && !is_maximized {
        return None;
    }
    Some(WinState {
        bounds,
        is_maximized,
    })
}

fn normalize_object(m: &Map<String, Value>) -> Option<Profile> {
    let name = safe_profile_name(m.get("name").and_then(Value::as_str).unwrap_or(""));
    if name.is_empty() {
        return None;
    }
    let job = m
        .get("job")
        .and_then(Value::as_str)
        .and_then(valid_job)
        .unwrap_or(DEFAULT_JOB);
    let partition = match m.get("partition").and_then(Value::as_str) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => partition_from_name(&name),
    };
    let is_clone = m
        .get("isClone")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| infer_is_clone(&name));
    Some(Profile {
        job: job.to_string(),
        partition,
        frame: m.get("frame").and_then(Value::as_bool).unwrap_or(false),
        is_clone,
        win_state: m.get("winState").and_then(sanitize_win_state),
        muted: m.get("muted").and_then(Value::as_bool).unwrap_or(false),
        name,
    })
}

/// Normalize a raw profile document into well-formed profiles.
///
/// Entries may be bare name strings (legacy format) or objects. Entries with
/// no usable name are dropped.
pub(crate) fn normalize_profiles(raw: &Value) -> Vec<Profile> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => {
                let name = safe_profile_name(s);
                if name.is_empty() {
                    return None;
                }
                Some(Profile {
                    job: DEFAULT_JOB.to_string(),
                    partition: partition_from_name(&name),
                    frame: false,
                    is_clone: infer_is_clone(&name),
                    win_state: None,
                    muted: false,
                    name,
                })
            }
            Value::Object(m) => normalize_object(m),
            _ => None,
        })
        .collect()
}

/// Reads and writes the profile list at a fixed path.
///
/// Every mutation is a full read-modify-write of the file.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    /// Location of `profiles.json`.
    path: PathBuf,
}

impl ProfileStore {
    /// A store backed by the file at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load and normalize all profiles. Missing or malformed files yield an empty list.
    pub fn load(&self) -> Vec<Profile> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "profiles_unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(v) => normalize_profiles(&v),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "profiles_invalid");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list.
    pub fn save(&self, list: &[Profile]) -> Result<()> {
        write_json(&self.path, &list)
    }

    /// Look up one profile by exact name.
    pub fn get(&self, name: &str) -> Option<Profile> {
        self.load().into_iter().find(|p| p.name == name)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<Profile>) -> Result<T>) -> Result<T> {
        let mut list = self.load();
        let out = f(&mut list)?;
        self.save(&list)?;
        Ok(out)
    }

    /// Create a new profile. Unknown jobs fall back to [`DEFAULT_JOB`].
    pub fn add(&self, name: &str, job: Option<&str>) -> Result<Profile> {
        let name = safe_profile_name(name);
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        self.mutate(|list| {
            if list.iter().any(|p| p.name == name) {
                return Err(Error::Duplicate(name.clone()));
            }
            let profile = Profile {
                job: job.and_then(valid_job).unwrap_or(DEFAULT_JOB).to_string(),
                partition: partition_from_name(&name),
                frame: true,
                is_clone: false,
                win_state: None,
                muted: false,
                name: name.clone(),
            };
            debug!(name = %profile.name, partition = %profile.partition, "profile_added");
            list.push(profile.clone());
            Ok(profile)
        })
    }

    /// Duplicate a profile under the first free "<name> Copy[ N]" name.
    ///
    /// The clone gets its own partition; copying session data between
    /// partitions is left to the caller.
    pub fn clone_profile(&self, name: &str) -> Result<Profile> {
        self.mutate(|list| {
            let src = list
                .iter()
                .find(|p| p.name == name)
                .cloned()
                .ok_or_else(|| Error::NotFound(name.to_string()))?;
            // n = 1 is the plain " Copy" suffix. Among list.len() + 1
            // candidates at least one is free.
            let target = (1..=list.len() + 1)
                .map(|n| clone_name(&src.name, n))
                .find(|c| !list.iter().any(|p| p.name == *c))
                .ok_or_else(|| Error::Duplicate(src.name.clone()))?;
            let cloned = Profile {
                partition: partition_from_name(&target),
                job: src.job.clone(),
                frame: src.frame,
                is_clone: true,
                win_state: src.win_state,
                muted: false,
                name: target,
            };
            debug!(from = %src.name, to = %cloned.name, "profile_cloned");
            list.push(cloned.clone());
            Ok(cloned)
        })
    }

    /// Rename a profile, keeping its partition.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let new_name = safe_profile_name(to);
        if new_name.is_empty() {
            return Err(Error::InvalidName);
        }
        self.mutate(|list| {
            if list.iter().any(|p| p.name == new_name) {
                return Err(Error::Duplicate(new_name.clone()));
            }
            let p = list
                .iter_mut()
                .find(|p| p.name == from)
                .ok_or_else(|| Error::NotFound(from.to_string()))?;
            p.name = new_name.clone();
            Ok(())
        })
    }

    /// Change name, frame and/or job of a profile.
    pub fn update(&self, from: &str, update: ProfileUpdate) -> Result<()> {
        self.mutate(|list| {
            let idx = list
                .iter()
                .position(|p| p.name == from)
                .ok_or_else(|| Error::NotFound(from.to_string()))?;
            let new_name = safe_profile_name(update.name.as_deref().unwrap_or(from));
            if new_name.is_empty() {
                return Err(Error::InvalidName);
            }
            if new_name != from && list.iter().any(|p| p.name == new_name) {
                return Err(Error::Duplicate(new_name));
            }
            let p = &mut list[idx];
            p.name = new_name;
            if let Some(frame) = update.frame {
                p.frame = frame;
            }
            if let Some(job) = update.job.as_deref().and_then(valid_job) {
                p.job = job.to_string();
            }
            Ok(())
        })
    }

    /// Remove a profile, returning it. Partition data cleanup is the caller's concern.
    pub fn delete(&self, name: &str) -> Result<Profile> {
        self.mutate(|list| {
            let idx = list
                .iter()
                .position(|p| p.name == name)
                .ok_or_else(|| Error::NotFound(name.to_string()))?;
            Ok(list.remove(idx))
        })
    }

    /// Put the named profiles first, in the given order; the rest keep their
    /// relative order after them. Unknown names are ignored.
    pub fn reorder<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        self.mutate(|list| {
            let mut rest = mem::take(list);
            for name in names {
                if let Some(i) = rest.iter().position(|p| p.name == name.as_ref()) {
                    list.push(rest.remove(i));
                }
            }
            list.append(&mut rest);
            Ok(())
        })
    }

    /// Store the window state for a profile.
    pub fn set_win_state(&self, name: &str, state: Option<WinState>) -> Result<()> {
        self.patch(name, |p| p.win_state = state)
    }

    /// Forget the saved window state for a profile.
    pub fn reset_win_state(&self, name: &str) -> Result<()> {
        self.set_win_state(name, None)
    }

    /// Record the mute state of a profile's session.
    pub fn set_muted(&self, name: &str, muted: bool) -> Result<()> {
        self.patch(name, |p| p.muted = muted)
    }

    fn patch(&self, name: &str, f: impl FnOnce(&mut Profile)) -> Result<()> {
        self.mutate(|list| {
            let p = list
                .iter_mut()
                .find(|p| p.name == name)
                .ok_or_else(|| Error::NotFound(name.to_string()))?;
            f(p);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{profiles_path, test_util::unique_tmp_dir};

    fn store(name: &str) -> ProfileStore {
        ProfileStore::at(profiles_path(&unique_tmp_dir(name)))
    }

    fn names(store: &ProfileStore) -> Vec<String> {
        store.load().into_iter().map(|p| p.name).collect()
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(safe_profile_name("  Hero   the\tGreat "), "Hero the Great");
        assert_eq!(safe_profile_name(&"x".repeat(60)).chars().count(), 40);
        assert_eq!(safe_profile_name("   "), "");
    }

    #[test]
    fn partitions_replace_unsafe_characters() {
        assert_eq!(partition_from_name("Hero 1"), "persist:profile-Hero 1");
        assert_eq!(partition_from_name("Mage/Ü"), "persist:profile-Mage__");
    }

    #[test]
    fn normalizes_legacy_and_object_entries() {
        let raw = json!([
            "  Hero ",
            { "name": "Mage Copy 2", "job": "Nope" },
            { "name": "Tank", "job": "Knight", "partition": "persist:old", "frame": true,
              "isClone": false, "muted": true,
              "winState": { "bounds": { "x": 10, "y": 20, "width": 50, "height": "x" } } },
            { "name": "   " },
            { "name": "Max", "winState": { "isMaximized": true } },
            { "name": "NoState", "winState": { "isMaximized": false } },
            42
        ]);
        let list = normalize_profiles(&raw);
        assert_eq!(list.len(), 5);

        assert_eq!(list[0].name, "Hero");
        assert_eq!(list[0].job, DEFAULT_JOB);
        assert_eq!(list[0].partition, "persist:profile-Hero");
        assert!(!list[0].is_clone);

        assert_eq!(list[1].job, DEFAULT_JOB);
        assert!(list[1].is_clone);

        let tank = &list[2];
        assert_eq!(tank.job, "Knight");
        assert_eq!(tank.partition, "persist:old");
        assert!(tank.frame && tank.muted && !tank.is_clone);
        assert_eq!(
            tank.win_state,
            Some(WinState {
                bounds: Some(Bounds {
                    x: Some(10),
                    y: Some(20),
                    width: 200,
                    height: 200
                }),
                is_maximized: false,
            })
        );

        assert_eq!(
            list[3].win_state,
            Some(WinState {
                bounds: None,
                is_maximized: true
            })
        );
        assert_eq!(list[4].win_state, None);
    }

    #[test]
    fn add_rejects_empty_and_duplicate_names() {
        let s = store("profiles-add");
        let p = s.add(" Hero ", Some("Blade")).expect("add");
        assert_eq!(p.name, "Hero");
        assert_eq!(p.job, "Blade");
        assert!(p.frame);
        assert!(matches!(s.add("Hero", None), Err(Error::Duplicate(_))));
        assert!(matches!(s.add("  ", None), Err(Error::InvalidName)));
        assert_eq!(s.add("Mage", Some("Wizard")).expect("add").job, DEFAULT_JOB);
        assert_eq!(names(&s), ["Hero", "Mage"]);
    }

    #[test]
    fn clone_picks_free_copy_name() {
        let s = store("profiles-clone");
        s.add("Hero", Some("Ranger")).expect("add");
        let a = s.clone_profile("Hero").expect("clone");
        let b = s.clone_profile("Hero").expect("clone");
        assert_eq!(a.name, "Hero Copy");
        assert_eq!(b.name, "Hero Copy 2");
        assert!(a.is_clone && b.is_clone);
        assert_eq!(a.job, "Ranger");
        assert_ne!(a.partition, b.partition);
        assert!(matches!(s.clone_profile("Nobody"), Err(Error::NotFound(_))));
    }

    #[test]
    fn clone_of_max_length_name_stays_unique() {
        let s = store("profiles-clone-long");
        let long = "x".repeat(40);
        s.add(&long, None).expect("add");
        let a = s.clone_profile(&long).expect("clone");
        let b = s.clone_profile(&long).expect("clone");
        assert_eq!(a.name, format!("{} Copy", "x".repeat(35)));
        assert_eq!(b.name, format!("{} Copy 2", "x".repeat(33)));
        assert_eq!(a.name.chars().count(), 40);

        let all = names(&s);
        assert_eq!(all.len(), 3);
        assert_ne!(all[0], all[1]);
        assert_ne!(all[1], all[2]);
    }

    #[test]
    fn rename_keeps_partition() {
        let s = store("profiles-rename");
        s.add("Hero", None).expect("add");
        s.add("Mage", None).expect("add");
        s.rename("Hero", "Paladin").expect("rename");
        let p = s.get("Paladin").expect("renamed");
        assert_eq!(p.partition, "persist:profile-Hero");
        assert!(matches!(s.rename("Paladin", "Mage"), Err(Error::Duplicate(_))));
        assert!(matches!(s.rename("Ghost", "X"), Err(Error::NotFound(_))));
    }

    #[test]
    fn update_changes_only_given_fields() {
        let s = store("profiles-update");
        s.add("Hero", Some("Knight")).expect("add");
        s.update(
            "Hero",
            ProfileUpdate {
                frame: Some(false),
                job: Some("Bogus".into()),
                ..ProfileUpdate::default()
            },
        )
        .expect("update");
        let p = s.get("Hero").expect("exists");
        assert!(!p.frame);
        assert_eq!(p.job, "Knight");
    }

    #[test]
    fn reorder_moves_named_first() {
        let s = store("profiles-reorder");
        for n in ["A", "B", "C", "D"] {
            s.add(n, None).expect("add");
        }
        s.reorder(&["C", "zzz", "A"]).expect("reorder");
        assert_eq!(names(&s), ["C", "A", "B", "D"]);
    }

    #[test]
    fn delete_and_patch() {
        let s = store("profiles-delete");
        s.add("Hero", None).expect("add");
        s.set_muted("Hero", true).expect("mute");
        s.set_win_state(
            "Hero",
            Some(WinState {
                bounds: None,
                is_maximized: true,
            }),
        )
        .expect("win state");
        let p = s.get("Hero").expect("exists");
        assert!(p.muted);
        assert!(p.win_state.is_some());
        s.reset_win_state("Hero").expect("reset");
        assert!(s.get("Hero").expect("exists").win_state.is_none());
        assert_eq!(s.delete("Hero").expect("delete").name, "Hero");
        assert!(s.load().is_empty());
        assert!(matches!(s.delete("Hero"), Err(Error::NotFound(_))));
    }
}
