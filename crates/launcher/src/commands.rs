//! Subcommand implementations. Each returns the text to print.

use std::path::Path;

use config::{ProfileStore, ProfileUpdate, Settings, SettingsPatch};
use keyspec::Accelerator;
use launcher_engine::{AppShortcut, COMMON_SHORTCUTS};
use tracing::debug;

use crate::error::CliError;

/// Result type for subcommands.
pub(crate) type CmdResult = Result<String, CliError>;

/// One line per profile: name, job, partition and flags.
pub(crate) fn list_profiles(store: &ProfileStore) -> String {
    let mut out = String::new();
    for p in store.load() {
        let mut flags = Vec::new();
        if p.is_clone {
            flags.push("clone");
        }
        if p.frame {
            flags.push("frame");
        }
        if p.muted {
            flags.push("muted");
        }
        out.push_str(&format!("{}\t{}\t{}", p.name, p.job, p.partition));
        if !flags.is_empty() {
            out.push_str(&format!("\t[{}]", flags.join(",")));
        }
        out.push('\n');
    }
    out
}

pub(crate) fn add_profile(store: &ProfileStore, name: &str, job: Option<&str>) -> CmdResult {
    let p = store.add(name, job)?;
    Ok(format!("added {} ({})\n", p.name, p.job))
}

pub(crate) fn clone_profile(store: &ProfileStore, name: &str) -> CmdResult {
    let p = store.clone_profile(name)?;
    Ok(format!("cloned {name} as {}\n", p.name))
}

pub(crate) fn rename_profile(store: &ProfileStore, from: &str, to: &str) -> CmdResult {
    store.rename(from, to)?;
    Ok(format!("renamed {from} to {to}\n"))
}

pub(crate) fn update_profile(store: &ProfileStore, name: &str, update: ProfileUpdate) -> CmdResult {
    store.update(name, update)?;
    Ok(format!("updated {name}\n"))
}

pub(crate) fn delete_profile(store: &ProfileStore, name: &str) -> CmdResult {
    let p = store.delete(name)?;
    Ok(format!("deleted {} (partition {})\n", p.name, p.partition))
}

pub(crate) fn reorder_profiles(store: &ProfileStore, names: &[String]) -> CmdResult {
    store.reorder(names)?;
    Ok(list_profiles(store))
}

pub(crate) fn reset_window(store: &ProfileStore, name: &str) -> CmdResult {
    store.reset_win_state(name)?;
    Ok(format!("reset window state of {name}\n"))
}

pub(crate) fn set_muted(store: &ProfileStore, name: &str, muted: bool) -> CmdResult {
    store.set_muted(name, muted)?;
    Ok(format!("{name} {}\n", if muted { "muted" } else { "unmuted" }))
}

pub(crate) fn show_settings(settings: &Settings) -> String {
    format!(
        "stayOpenAfterLaunch\t{}\nallowSingleKeyGlobal\t{}\n",
        settings.stay_open_after_launch, settings.allow_single_key_global
    )
}

pub(crate) fn set_settings(path: &Path, patch: SettingsPatch) -> CmdResult {
    let mut settings = Settings::load(path);
    settings.apply_patch(patch);
    settings.save(path)?;
    debug!(?settings, "settings_saved");
    Ok(show_settings(&settings))
}

/// What a shortcut collides with among the launcher's own shortcuts.
fn reserved_by(acc: &Accelerator) -> Option<String> {
    if let Some(app) = AppShortcut::ALL
        .iter()
        .find(|s| Accelerator::parse(s.spec()).is_ok_and(|a| a == *acc))
    {
        return Some(format!("app shortcut {app:?}"));
    }
    COMMON_SHORTCUTS
        .iter()
        .any(|s| Accelerator::parse(s).is_ok_and(|a| a == *acc))
        .then(|| "common shortcut".to_string())
}

/// Normalize each shortcut and report whether it may be registered globally.
pub(crate) fn check_shortcuts(settings: &Settings, shortcuts: &[String]) -> CmdResult {
    let mut out = String::new();
    for input in shortcuts {
        let acc = Accelerator::parse(input).map_err(|source| CliError::Shortcut {
            input: input.clone(),
            source,
        })?;
        let global = if acc.has_modifier() || settings.allow_single_key_global {
            "global"
        } else {
            "inert (bare key; allowSingleKeyGlobal is off)"
        };
        out.push_str(&format!("{input}\t{acc}\t{global}"));
        if let Some(r) = reserved_by(&acc) {
            out.push_str(&format!("\treserved: {r}"));
        }
        out.push('\n');
    }
    Ok(out)
}

/// The launcher's fixed shortcuts.
pub(crate) fn list_reserved() -> String {
    let mut out = String::new();
    for s in AppShortcut::ALL {
        out.push_str(&format!("{}\t{s:?}\n", s.spec()));
    }
    for s in COMMON_SHORTCUTS {
        out.push_str(&format!("{s}\tcommon\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, process};

    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("launcher-cli-{name}-{}", process::id()));
        let _ignored = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn profile_commands_round_trip_through_the_store() {
        let dir = tmp_dir("profiles");
        let store = ProfileStore::at(config::profiles_path(&dir));
        assert_eq!(add_profile(&store, "Hero", None).unwrap(), "added Hero (Ringmaster)\n");
        assert_eq!(clone_profile(&store, "Hero").unwrap(), "cloned Hero as Hero Copy\n");
        set_muted(&store, "Hero", true).unwrap();

        let listing = list_profiles(&store);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Hero\tRingmaster\tpersist:profile-Hero"));
        assert!(lines[0].ends_with("[frame,muted]"));
        assert!(lines[1].contains("clone"));

        let reordered = reorder_profiles(&store, &["Hero Copy".to_string()]).unwrap();
        assert!(reordered.starts_with("Hero Copy"));
        assert!(delete_profile(&store, "Nobody").is_err());
        let _ignored = fs::remove_dir_all(&dir);
    }

    #[test]
    fn settings_set_persists() {
        let dir = tmp_dir("settings");
        let path = config::settings_path(&dir);
        let patch = SettingsPatch {
            allow_single_key_global: Some(true),
            ..SettingsPatch::default()
        };
        let shown = set_settings(&path, patch).unwrap();
        assert!(shown.contains("allowSingleKeyGlobal\ttrue"));
        assert!(Settings::load(&path).allow_single_key_global);
        let _ignored = fs::remove_dir_all(&dir);
    }

    #[test]
    fn shortcut_check_reports_eligibility_and_reservations() {
        let settings = Settings::default();
        let out = check_shortcuts(&settings, &["ctrl+1".into(), "f5".into(), "F1".into()]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ctrl+1\tControl+1\tglobal");
        assert!(lines[1].starts_with("f5\tF5\tinert"));
        assert!(lines[1].ends_with("reserved: common shortcut"));
        assert!(lines[2].ends_with("reserved: app shortcut Buff"));

        let err = check_shortcuts(&settings, &["Ctrl+".into()]).unwrap_err();
        assert!(err.to_string().starts_with("Ctrl+:"));
    }

    #[test]
    fn reserved_listing_covers_both_sets() {
        let out = list_reserved();
        assert_eq!(
            out.lines().count(),
            AppShortcut::ALL.len() + COMMON_SHORTCUTS.len()
        );
        assert!(out.contains("Control+Tab\tNextSession"));
    }
}
