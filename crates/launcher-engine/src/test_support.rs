//! Test doubles for the engine's boundary traits.

use std::{
    collections::{HashMap, HashSet},
    mem,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use keyspec::Accelerator;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    Error, Result,
    deps::{HotkeyService, InputFocusProbe, LauncherActions},
    registry::WindowId,
};

fn parse(spec: &str) -> Option<Accelerator> {
    Accelerator::parse(spec).ok()
}

/// In-memory OS hotkey service.
///
/// Registering an accelerator that is already registered counts as a double
/// registration and is refused, as the OS would.
#[derive(Clone, Default)]
pub struct MockHotkeyService {
    registered: Arc<Mutex<HashSet<Accelerator>>>,
    refused: Arc<Mutex<HashSet<Accelerator>>>,
    register_calls: Arc<Mutex<HashMap<Accelerator, usize>>>,
    doubles: Arc<AtomicUsize>,
    fail_unregister: Arc<AtomicBool>,
}

impl MockHotkeyService {
    /// Create an empty service that accepts every registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse future registrations of `spec`, as if another app held it.
    pub fn refuse(&self, spec: &str) {
        if let Some(acc) = parse(spec) {
            self.refused.lock().insert(acc);
        }
    }

    /// Accept `spec` again.
    pub fn allow(&self, spec: &str) {
        if let Some(acc) = parse(spec) {
            self.refused.lock().remove(&acc);
        }
    }

    /// Make every unregister call fail (after removing the registration).
    pub fn set_fail_unregister(&self, v: bool) {
        self.fail_unregister.store(v, Ordering::SeqCst);
    }

    /// Currently registered accelerators, sorted.
    pub fn registered(&self) -> Vec<Accelerator> {
        let mut out: Vec<Accelerator> = self.registered.lock().iter().cloned().collect();
        out.sort();
        out
    }

    /// Whether `spec` is currently registered.
    pub fn is_live(&self, spec: &str) -> bool {
        parse(spec).is_some_and(|acc| self.registered.lock().contains(&acc))
    }

    /// How many times registration of `acc` was attempted.
    pub fn register_calls(&self, acc: &Accelerator) -> usize {
        self.register_calls.lock().get(acc).copied().unwrap_or(0)
    }

    /// Attempts to register an accelerator that was already registered.
    pub fn double_registrations(&self) -> usize {
        self.doubles.load(Ordering::SeqCst)
    }
}

impl HotkeyService for MockHotkeyService {
    fn register(&self, acc: &Accelerator) -> bool {
        *self.register_calls.lock().entry(acc.clone()).or_default() += 1;
        if self.refused.lock().contains(acc) {
            return false;
        }
        if !self.registered.lock().insert(acc.clone()) {
            self.doubles.fetch_add(1, Ordering::SeqCst);
            return false;
        }
        true
    }

    fn unregister(&self, acc: &Accelerator) -> Result<()> {
        let removed = self.registered.lock().remove(acc);
        if self.fail_unregister.load(Ordering::SeqCst) {
            return Err(Error::Hotkey(format!("unregister {acc} failed")));
        }
        if !removed {
            return Err(Error::Hotkey(format!("{acc} is not registered")));
        }
        Ok(())
    }

    fn is_registered(&self, acc: &Accelerator) -> bool {
        self.registered.lock().contains(acc)
    }
}

/// Probe with a switchable answer.
#[derive(Clone, Default)]
pub struct StaticProbe {
    typing: Arc<AtomicBool>,
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl StaticProbe {
    /// A probe that reports "not typing".
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reported typing state.
    pub fn set_typing(&self, v: bool) {
        self.typing.store(v, Ordering::SeqCst);
    }

    /// Make the probe fail.
    pub fn set_fail(&self, v: bool) {
        self.fail.store(v, Ordering::SeqCst);
    }

    /// Number of probe calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InputFocusProbe for StaticProbe {
    async fn is_typing(&self, window: WindowId) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Probe(format!("{window} did not answer")));
        }
        Ok(self.typing.load(Ordering::SeqCst))
    }
}

/// Probe that blocks until released, for exercising state changes while a
/// dispatch is suspended.
#[derive(Clone, Default)]
pub struct GatedProbe {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedProbe {
    /// A closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until a probe call is pending.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the pending probe call answer "not typing".
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl InputFocusProbe for GatedProbe {
    async fn is_typing(&self, _window: WindowId) -> Result<bool> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(false)
    }
}

/// Launcher action recorded by [`RecordingActions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// `toggle_launcher`
    ToggleLauncher,
    /// `toggle_mute(profile)`
    ToggleMute(String),
    /// `capture_screenshot(window)`
    Screenshot(WindowId),
    /// `focus_window(window)`
    Focus(WindowId),
}

/// Launcher actions that are only recorded.
#[derive(Clone, Default)]
pub struct RecordingActions {
    calls: Arc<Mutex<Vec<Action>>>,
}

impl RecordingActions {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded actions.
    pub fn take(&self) -> Vec<Action> {
        mem::take(&mut *self.calls.lock())
    }

    fn note(&self, a: Action) {
        self.calls.lock().push(a);
    }
}

impl LauncherActions for RecordingActions {
    fn toggle_launcher(&self) {
        self.note(Action::ToggleLauncher);
    }

    fn toggle_mute(&self, profile: &str) {
        self.note(Action::ToggleMute(profile.to_string()));
    }

    fn capture_screenshot(&self, window: WindowId) {
        self.note(Action::Screenshot(window));
    }

    fn focus_window(&self, window: WindowId) {
        self.note(Action::Focus(window));
    }
}
