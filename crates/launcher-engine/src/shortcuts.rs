//! The launcher's fixed shortcut sets: reserved "common" shortcuts and the
//! app-level shortcuts (launcher toggle, buff key, mute, screenshot, session
//! cycling).

use keyspec::Accelerator;
use tracing::{debug, trace};

use crate::{
    deps::LauncherActions,
    registry::{AssistMsg, WindowId, WindowRegistry},
};

/// Reserved navigation and function-key shortcuts, broadcast to every assist
/// window when they fire and suspended during a capture session.
pub const COMMON_SHORTCUTS: [&str; 25] = [
    "Home", "End", "Insert", "Delete", "PageUp", "PageDown", "F2", "F3", "F4", "F5", "F6", "F7",
    "F8", "F9", "F10", "F11", "F12", "Ctrl+Home", "Ctrl+End", "Ctrl+Insert", "Ctrl+Delete",
    "Alt+Home", "Alt+End", "Alt+Insert", "Alt+Delete",
];

/// Launcher-level shortcuts, installed while any game session is open.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AppShortcut {
    /// Show or hide the launcher window.
    ToggleLauncher,
    /// Forward the buff key to the target profile's assist window.
    Buff,
    /// Mute or unmute the target session.
    ToggleMute,
    /// Screenshot the target session.
    Screenshot,
    /// Focus the next game window.
    NextSession,
    /// Focus the previous game window.
    PrevSession,
}

impl AppShortcut {
    /// Every app shortcut.
    pub const ALL: [Self; 6] = [
        Self::ToggleLauncher,
        Self::Buff,
        Self::ToggleMute,
        Self::Screenshot,
        Self::NextSession,
        Self::PrevSession,
    ];

    /// The shortcut string this action is bound to.
    pub fn spec(self) -> &'static str {
        match self {
            Self::ToggleLauncher => "CommandOrControl+Shift+L",
            Self::Buff => "F1",
            Self::ToggleMute => "CommandOrControl+Shift+M",
            Self::Screenshot => "CommandOrControl+Shift+P",
            Self::NextSession => "Control+Tab",
            Self::PrevSession => "Control+Shift+Tab",
        }
    }
}

/// Common shortcuts as (accelerator, original text) pairs.
pub(crate) fn common_accelerators() -> Vec<(Accelerator, &'static str)> {
    COMMON_SHORTCUTS
        .iter()
        .filter_map(|s| Accelerator::parse(s).ok().map(|a| (a, *s)))
        .collect()
}

/// App shortcuts keyed by accelerator.
pub(crate) fn app_accelerators() -> Vec<(Accelerator, AppShortcut)> {
    AppShortcut::ALL
        .iter()
        .filter_map(|s| Accelerator::parse(s.spec()).ok().map(|a| (a, *s)))
        .collect()
}

/// The game window an app shortcut acts on: the focused one if it is a game
/// window, else the most recently listed game window.
fn target_window(registry: &WindowRegistry) -> Option<(String, WindowId)> {
    if let Some(focused) = registry.focused_window()
        && let Some(profile) = registry.profile_for_window(focused)
    {
        return Some((profile, focused));
    }
    registry.all_game_windows().pop()
}

/// The window to focus when cycling sessions by `step` (+1 next, -1 previous).
///
/// None with fewer than two game windows, no focus, focus on the launcher, or
/// focus outside the game windows.
pub(crate) fn cycle_target(registry: &WindowRegistry, step: isize) -> Option<WindowId> {
    let all: Vec<WindowId> = registry
        .all_game_windows()
        .into_iter()
        .map(|(_, w)| w)
        .collect();
    if all.len() < 2 {
        return None;
    }
    let focused = registry.focused_window()?;
    if registry.launcher_window() == Some(focused) {
        return None;
    }
    let idx = all.iter().position(|w| *w == focused)? as isize;
    let len = all.len() as isize;
    Some(all[(idx + step).rem_euclid(len) as usize])
}

/// Perform an app shortcut.
pub(crate) fn run_app_shortcut(
    shortcut: AppShortcut,
    registry: &WindowRegistry,
    actions: &dyn LauncherActions,
) {
    debug!(?shortcut, "app_shortcut");
    match shortcut {
        AppShortcut::ToggleLauncher => actions.toggle_launcher(),
        AppShortcut::Buff => {
            if let Some((profile, _)) = target_window(registry)
                && !registry.send_to_assist(&profile, AssistMsg::GlobalF1Pressed)
            {
                trace!(profile = %profile, "buff key: no assist window");
            }
        }
        AppShortcut::ToggleMute => {
            if let Some((profile, _)) = target_window(registry) {
                actions.toggle_mute(&profile);
            }
        }
        AppShortcut::Screenshot => {
            if let Some((_, window)) = target_window(registry) {
                actions.capture_screenshot(window);
            }
        }
        AppShortcut::NextSession => {
            if let Some(w) = cycle_target(registry, 1) {
                actions.focus_window(w);
            }
        }
        AppShortcut::PrevSession => {
            if let Some(w) = cycle_target(registry, -1) {
                actions.focus_window(w);
            }
        }
    }
}
