//! Launcher Engine
//!
//! Shares a pool of OS-level global shortcut registrations between any number
//! of per-profile macro bindings:
//! - one registration per accelerator, however many profiles bind it
//! - capture mode, suspending bare-key and common shortcuts while rebinding
//! - focus-based dispatch to the owning profile's assist window
//!
//! The public surface is [`Engine`], the [`WindowRegistry`] it reads focus and
//! window ownership from, and the boundary traits in [`deps`]. Test doubles
//! for those traits live in [`test_support`].
use std::sync::Arc;

use keyspec::Accelerator;
use parking_lot::Mutex;
use tracing::{debug, info, trace};

mod capture;
pub mod deps;
mod dispatch;
mod error;
mod multiplexer;
mod probe;
mod registry;
mod shortcuts;
pub mod test_support;

pub use dispatch::DispatchOutcome;
pub use error::{Error, Result};
pub use multiplexer::Binding;
pub use probe::{ActiveElement, ActiveElementSource, ElementProbe};
pub use registry::{AssistMsg, WindowId, WindowRegistry};
pub use shortcuts::{AppShortcut, COMMON_SHORTCUTS};

use capture::CaptureCoordinator;
use deps::{HotkeyService, InputFocusProbe, LauncherActions};
use multiplexer::Multiplexer;

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Allow bare single-key bindings to be registered globally.
    pub allow_single_key_global: bool,
}

impl From<&config::Settings> for EngineConfig {
    fn from(s: &config::Settings) -> Self {
        Self {
            allow_single_key_global: s.allow_single_key_global,
        }
    }
}

/// How a fired accelerator was handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Ran an app shortcut.
    App(AppShortcut),
    /// Went through the dispatch resolver.
    Bound(DispatchOutcome),
    /// Broadcast a common shortcut to this many assist windows.
    Common {
        /// Assist windows reached.
        delivered: usize,
    },
    /// Not a live registration; stale trigger.
    Ignored,
}

/// Where a trigger goes, decided under the lock.
enum Route {
    App(AppShortcut),
    Bound,
    Common(&'static str),
    Ignored,
}

/// State guarded by the engine lock.
struct Core {
    mux: Multiplexer,
    capture: CaptureCoordinator,
}

impl Core {
    /// Bring `acc`'s OS registration in line with its owners and the capture
    /// session.
    fn reconcile(&mut self, acc: &Accelerator) {
        if !self.mux.wanted(acc) {
            self.mux.unregister(acc);
            self.capture.unpark(acc);
            return;
        }
        if self.capture.holds(acc, &self.mux) {
            self.mux.unregister(acc);
            self.capture.park(acc);
            return;
        }
        self.mux.register(acc);
    }

    fn reconcile_all(&mut self, accs: &[Accelerator]) {
        for acc in accs {
            self.reconcile(acc);
        }
    }

    fn route(&self, acc: &Accelerator) -> Route {
        if !self.mux.is_live(acc) {
            Route::Ignored
        } else if let Some(app) = self.mux.installed_app(acc) {
            Route::App(app)
        } else if self.mux.is_bound(acc) && self.mux.eligible(acc) {
            // Inert bare-key bindings leave the key to the common broadcast.
            Route::Bound
        } else if let Some(raw) = self.mux.installed_common(acc) {
            Route::Common(raw)
        } else {
            Route::Ignored
        }
    }
}

/// Owns the launcher's global shortcut state.
///
/// Construct with [`Engine::new`] at startup and call [`Engine::shutdown`] on
/// exit. The platform driver forwards fired registrations to
/// [`Engine::trigger`]. Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct Engine {
    /// Bindings, registrations and capture state.
    core: Arc<Mutex<Core>>,
    /// Windows, focus and assist inboxes.
    registry: WindowRegistry,
    /// Typing detection for the focused window.
    probe: Arc<dyn InputFocusProbe>,
    /// Launcher side effects for app shortcuts.
    actions: Arc<dyn LauncherActions>,
}

impl Engine {
    /// Create an engine with no bindings and no registrations.
    pub fn new(
        service: Arc<dyn HotkeyService>,
        registry: WindowRegistry,
        probe: Arc<dyn InputFocusProbe>,
        actions: Arc<dyn LauncherActions>,
        config: EngineConfig,
    ) -> Self {
        let core = Core {
            mux: Multiplexer::new(service, config.allow_single_key_global),
            capture: CaptureCoordinator::default(),
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            registry,
            probe,
            actions,
        }
    }

    /// The window registry this engine reads.
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Replace `profile`'s bindings with `shortcuts`.
    ///
    /// Invalid shortcut strings are logged and skipped. An accelerator kept
    /// across the replacement keeps its registration.
    pub fn set_bindings<S: AsRef<str>>(&self, profile: &str, shortcuts: &[S]) {
        let mut core = self.core.lock();
        let touched = core.mux.replace_bindings(profile, shortcuts);
        core.reconcile_all(&touched);
    }

    /// Remove every binding of `profile`. No-op if it has none.
    pub fn clear_bindings(&self, profile: &str) {
        let mut core = self.core.lock();
        let touched = core.mux.remove_profile(profile);
        core.reconcile_all(&touched);
    }

    /// Close `profile`'s assist window and drop its bindings.
    pub fn close_assist(&self, profile: &str) {
        self.registry.close_assist(profile);
        self.clear_bindings(profile);
    }

    /// Begin a capture session. Repeated calls are safe.
    pub fn begin_capture(&self) {
        let mut core = self.core.lock();
        let Core { mux, capture } = &mut *core;
        capture.begin(mux);
    }

    /// End the capture session and restore what it suspended. No-op when no
    /// session is open.
    pub fn end_capture(&self) {
        let mut core = self.core.lock();
        let Some((paused, common)) = core.capture.end() else {
            trace!("end_capture without an open session");
            return;
        };
        core.reconcile_all(&paused);
        if common {
            let common = core.mux.common_accelerators();
            core.reconcile_all(&common);
        }
    }

    /// Whether a capture session is open.
    pub fn is_capturing(&self) -> bool {
        self.core.lock().capture.is_open()
    }

    /// Update the single-key setting. Takes effect on the next reconcile of
    /// each accelerator; call [`Engine::resync`] to apply it everywhere now.
    pub fn set_allow_single_key(&self, allow: bool) {
        self.core.lock().mux.set_allow_single_key(allow);
        debug!(allow, "allow_single_key_changed");
    }

    /// Current single-key setting.
    pub fn allow_single_key(&self) -> bool {
        self.core.lock().mux.allow_single_key()
    }

    /// Reconcile every known accelerator, retrying failed registrations and
    /// applying configuration changes.
    pub fn resync(&self) {
        let mut core = self.core.lock();
        let all = core.mux.known_accelerators();
        core.reconcile_all(&all);
        debug!(count = all.len(), "resync");
    }

    /// Install the common and app shortcuts while any game window is open,
    /// uninstall them otherwise.
    pub fn refresh_app_shortcuts(&self) {
        let installed = !self.registry.active_profiles().is_empty();
        let mut core = self.core.lock();
        let fixed = core.mux.set_fixed_installed(installed);
        core.reconcile_all(&fixed);
    }

    /// Track a new game window and refresh the app shortcuts.
    pub fn open_game_window(&self, profile: &str, window: WindowId) {
        self.registry.open_game_window(profile, window);
        self.refresh_app_shortcuts();
    }

    /// Forget a closed game window and refresh the app shortcuts.
    pub fn close_game_window(&self, window: WindowId) {
        self.registry.close_game_window(window);
        self.refresh_app_shortcuts();
    }

    /// Handle a fired registration.
    ///
    /// Never fails: stale triggers, missing windows and probe failures are
    /// logged and reported through the outcome.
    pub async fn trigger(&self, acc: &Accelerator) -> TriggerOutcome {
        let route = self.core.lock().route(acc);
        match route {
            Route::Ignored => {
                trace!(%acc, "stale trigger ignored");
                TriggerOutcome::Ignored
            }
            Route::App(shortcut) => {
                shortcuts::run_app_shortcut(shortcut, &self.registry, self.actions.as_ref());
                TriggerOutcome::App(shortcut)
            }
            Route::Bound => {
                let outcome = dispatch::resolve_target(
                    acc,
                    &self.registry,
                    self.probe.as_ref(),
                    || self.core.lock().mux.candidates(acc),
                )
                .await;
                TriggerOutcome::Bound(outcome)
            }
            Route::Common(raw) => {
                let delivered = self
                    .registry
                    .assist_profiles()
                    .iter()
                    .filter(|p| {
                        self.registry
                            .send_to_assist(p, AssistMsg::QuickCommandShortcut(raw.to_string()))
                    })
                    .count();
                debug!(%acc, delivered, "common_shortcut_broadcast");
                TriggerOutcome::Common { delivered }
            }
        }
    }

    /// Release every registration and drop all bindings and capture state.
    pub fn shutdown(&self) {
        let mut core = self.core.lock();
        core.mux.clear();
        core.capture.reset();
        info!("engine_shutdown");
    }

    /// Bindings per accelerator, sorted by accelerator.
    pub fn bindings_snapshot(&self) -> Vec<(Accelerator, Vec<Binding>)> {
        self.core.lock().mux.bindings_snapshot()
    }

    /// Accelerators with a live OS registration, sorted.
    pub fn live_snapshot(&self) -> Vec<Accelerator> {
        self.core.lock().mux.live_snapshot()
    }

    /// Accelerators suspended by the current capture session, sorted.
    pub fn paused_snapshot(&self) -> Vec<Accelerator> {
        self.core.lock().capture.paused_snapshot()
    }
}
