//! Boundary traits for the collaborators the engine drives but does not own.

use async_trait::async_trait;
use keyspec::Accelerator;

use crate::{Result, registry::WindowId};

// ---- OS hotkey service ----

/// Minimal OS-level global hotkey API used by the multiplexer.
///
/// Implementations deliver fired registrations back to the engine by calling
/// [`crate::Engine::trigger`] with the accelerator that fired.
pub trait HotkeyService: Send + Sync {
    /// Register `acc` globally. Returns false if the OS refused, e.g. because
    /// another application already holds the combination.
    fn register(&self, acc: &Accelerator) -> bool;
    /// Remove the registration for `acc`.
    fn unregister(&self, acc: &Accelerator) -> Result<()>;
    /// Whether `acc` is currently registered by this process.
    fn is_registered(&self, acc: &Accelerator) -> bool;
}

// ---- Window content ----

/// Asks a game window whether keyboard focus is inside a text-entry control.
#[async_trait]
pub trait InputFocusProbe: Send + Sync {
    /// Resolve to true when the user is typing into `window` (chat box, input field).
    async fn is_typing(&self, window: WindowId) -> Result<bool>;
}

// ---- Launcher side effects ----

/// Launcher-level actions triggered by the app shortcuts.
pub trait LauncherActions: Send + Sync {
    /// Show the launcher window if hidden or unfocused, else hide it.
    fn toggle_launcher(&self);
    /// Flip the audio mute state of every game window of `profile`.
    fn toggle_mute(&self, profile: &str);
    /// Save a screenshot of `window`.
    fn capture_screenshot(&self, window: WindowId);
    /// Raise and focus `window`.
    fn focus_window(&self, window: WindowId);
}
