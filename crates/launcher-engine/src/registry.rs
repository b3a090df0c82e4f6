//! Live windows per profile, the assist window channels, and current focus.
//!
//! The registry is owned by the top-level process, which feeds it window
//! open/close and focus events. The engine only reads from it, apart from
//! delivering messages to assist windows.

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

/// Opaque platform window identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win#{}", self.0)
    }
}

/// Messages delivered to a profile's assist window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssistMsg {
    /// A bound macro shortcut fired; carries the profile's own shortcut text.
    QuickCommandShortcut(String),
    /// The global buff key was pressed for this profile.
    GlobalF1Pressed,
}

#[derive(Default)]
struct Inner {
    /// Game windows per profile, profiles in first-open order.
    games: Vec<(String, Vec<WindowId>)>,
    /// Sender half of each open assist window's inbox.
    assist: HashMap<String, UnboundedSender<AssistMsg>>,
    /// Window holding OS focus, if any.
    focused: Option<WindowId>,
    /// The launcher's own window.
    launcher: Option<WindowId>,
}

impl Inner {
    fn profile_windows(&self, profile: &str) -> Option<&Vec<WindowId>> {
        self.games
            .iter()
            .find(|(p, _)| p == profile)
            .map(|(_, wins)| wins)
    }
}

/// Shared window bookkeeping. Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct WindowRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl WindowRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly opened game window for `profile`.
    pub fn open_game_window(&self, profile: &str, window: WindowId) {
        let mut g = self.inner.write();
        if g.games.iter().any(|(_, wins)| wins.contains(&window)) {
            trace!(%window, "game window already tracked");
            return;
        }
        match g.games.iter_mut().find(|(p, _)| p == profile) {
            Some((_, wins)) => wins.push(window),
            None => g.games.push((profile.to_string(), vec![window])),
        }
        debug!(profile, %window, "game_window_opened");
    }

    /// Forget a closed game window. Returns the profile it belonged to.
    pub fn close_game_window(&self, window: WindowId) -> Option<String> {
        let mut g = self.inner.write();
        let idx = g.games.iter().position(|(_, wins)| wins.contains(&window))?;
        let (profile, wins) = &mut g.games[idx];
        wins.retain(|w| *w != window);
        let profile = profile.clone();
        if g.games[idx].1.is_empty() {
            g.games.remove(idx);
        }
        debug!(profile = %profile, %window, "game_window_closed");
        Some(profile)
    }

    /// Live game windows of `profile`, in open order.
    pub fn windows_for_profile(&self, profile: &str) -> Vec<WindowId> {
        self.inner
            .read()
            .profile_windows(profile)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `window` is one of `profile`'s live game windows.
    pub fn owns_window(&self, profile: &str, window: WindowId) -> bool {
        self.inner
            .read()
            .profile_windows(profile)
            .is_some_and(|wins| wins.contains(&window))
    }

    /// The profile owning a game window.
    pub fn profile_for_window(&self, window: WindowId) -> Option<String> {
        self.inner
            .read()
            .games
            .iter()
            .find(|(_, wins)| wins.contains(&window))
            .map(|(p, _)| p.clone())
    }

    /// Profiles with at least one open game window, in first-open order.
    pub fn active_profiles(&self) -> Vec<String> {
        self.inner
            .read()
            .games
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Every game window as (profile, window), profile order then open order.
    pub fn all_game_windows(&self) -> Vec<(String, WindowId)> {
        let g = self.inner.read();
        g.games
            .iter()
            .flat_map(|(p, wins)| wins.iter().map(move |w| (p.clone(), *w)))
            .collect()
    }

    /// Update the focused window (None when no launcher-owned window has focus).
    pub fn set_focused(&self, window: Option<WindowId>) {
        self.inner.write().focused = window;
    }

    /// The window currently holding focus.
    pub fn focused_window(&self) -> Option<WindowId> {
        self.inner.read().focused
    }

    /// Record the launcher's own window.
    pub fn set_launcher_window(&self, window: Option<WindowId>) {
        self.inner.write().launcher = window;
    }

    /// The launcher's own window.
    pub fn launcher_window(&self) -> Option<WindowId> {
        self.inner.read().launcher
    }

    /// Open (or replace) the assist window of `profile`, returning its inbox.
    ///
    /// Dropping the receiver marks the assist window as destroyed.
    pub fn open_assist(&self, profile: &str) -> UnboundedReceiver<AssistMsg> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.write().assist.insert(profile.to_string(), tx);
        debug!(profile, "assist_window_opened");
        rx
    }

    /// Close the assist window of `profile`. Returns whether one was open.
    pub fn close_assist(&self, profile: &str) -> bool {
        let removed = self.inner.write().assist.remove(profile).is_some();
        if removed {
            debug!(profile, "assist_window_closed");
        }
        removed
    }

    /// Whether `profile` has a live assist window.
    pub fn has_assist(&self, profile: &str) -> bool {
        self.inner
            .read()
            .assist
            .get(profile)
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Profiles with a live assist window, sorted by name.
    pub fn assist_profiles(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .inner
            .read()
            .assist
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .map(|(p, _)| p.clone())
            .collect();
        out.sort();
        out
    }

    /// Deliver `msg` to `profile`'s assist window. Returns false when there is
    /// no live assist window.
    pub fn send_to_assist(&self, profile: &str, msg: AssistMsg) -> bool {
        let g = self.inner.read();
        match g.assist.get(profile) {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }

    /// Move windows and the assist window of `from` over to `to`.
    pub fn rename_profile(&self, from: &str, to: &str) {
        let mut g = self.inner.write();
        if let Some((name, _)) = g.games.iter_mut().find(|(p, _)| p == from) {
            *name = to.to_string();
        }
        if let Some(tx) = g.assist.remove(from) {
            g.assist.insert(to.to_string(), tx);
        }
    }
}
