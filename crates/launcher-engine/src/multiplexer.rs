//! Accelerator multiplexer: profile bindings and the single OS registration
//! backing each accelerator.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use keyspec::Accelerator;
use tracing::{debug, trace, warn};

use crate::{
    deps::HotkeyService,
    shortcuts::{AppShortcut, app_accelerators, common_accelerators},
};

/// Threshold for warning about slow binding updates that may cause key drops
const BIND_UPDATE_WARN_MS: u64 = 10;

/// One profile's claim on an accelerator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Owning profile.
    pub profile: String,
    /// The profile's shortcut text, passed back verbatim on dispatch.
    pub raw: String,
}

/// Owns the Binding set and the Registration set.
///
/// Invariant: an accelerator is in `live` iff this process holds exactly one OS
/// registration for it.
pub(crate) struct Multiplexer {
    /// OS hotkey service.
    service: Arc<dyn HotkeyService>,
    /// Accelerator → bindings, in insertion order.
    bindings: HashMap<Accelerator, Vec<Binding>>,
    /// Profile → accelerators it binds, in the order given.
    by_profile: HashMap<String, Vec<Accelerator>>,
    /// Accelerators with a live registration.
    live: HashSet<Accelerator>,
    /// Whether bare-key bindings may be registered globally.
    allow_single_key: bool,
    /// Reserved common shortcuts with their original spelling.
    common: Vec<(Accelerator, &'static str)>,
    /// App shortcuts.
    app: Vec<(Accelerator, AppShortcut)>,
    /// Common shortcuts currently wanted.
    common_installed: bool,
    /// App shortcuts currently wanted.
    app_installed: bool,
}

impl Multiplexer {
    pub(crate) fn new(service: Arc<dyn HotkeyService>, allow_single_key: bool) -> Self {
        Self {
            service,
            bindings: HashMap::new(),
            by_profile: HashMap::new(),
            live: HashSet::new(),
            allow_single_key,
            common: common_accelerators(),
            app: app_accelerators(),
            common_installed: false,
            app_installed: false,
        }
    }

    /// Replace `profile`'s bindings. Returns every accelerator whose ownership
    /// may have changed (old ∪ new), for the caller to reconcile.
    pub(crate) fn replace_bindings<S: AsRef<str>>(
        &mut self,
        profile: &str,
        shortcuts: &[S],
    ) -> Vec<Accelerator> {
        let start = Instant::now();
        let mut touched = self.remove_profile(profile);

        let mut added: Vec<Accelerator> = Vec::with_capacity(shortcuts.len());
        for raw in shortcuts {
            let raw = raw.as_ref();
            let acc = match Accelerator::parse(raw) {
                Ok(acc) => acc,
                Err(e) => {
                    warn!(profile, shortcut = raw, error = %e, "invalid_shortcut");
                    continue;
                }
            };
            let owners = self.bindings.entry(acc.clone()).or_default();
            match owners.iter_mut().find(|b| b.profile == profile) {
                // Two spellings of one accelerator: the later text wins.
                Some(b) => b.raw = raw.to_string(),
                None => owners.push(Binding {
                    profile: profile.to_string(),
                    raw: raw.to_string(),
                }),
            }
            if !added.contains(&acc) {
                added.push(acc);
            }
        }
        debug!(profile, keys = added.len(), "bindings_replaced");

        for acc in &added {
            if !touched.contains(acc) {
                touched.push(acc.clone());
            }
        }
        if !added.is_empty() {
            self.by_profile.insert(profile.to_string(), added);
        }

        let elapsed = start.elapsed();
        if elapsed > Duration::from_millis(BIND_UPDATE_WARN_MS) {
            warn!("Binding update took {:?}, may cause key drops", elapsed);
        }
        touched
    }

    /// Drop every binding owned by `profile`. Returns the accelerators it held.
    pub(crate) fn remove_profile(&mut self, profile: &str) -> Vec<Accelerator> {
        let Some(accs) = self.by_profile.remove(profile) else {
            return Vec::new();
        };
        for acc in &accs {
            if let Some(owners) = self.bindings.get_mut(acc) {
                owners.retain(|b| b.profile != profile);
                if owners.is_empty() {
                    self.bindings.remove(acc);
                }
            }
        }
        trace!(profile, keys = accs.len(), "profile_bindings_removed");
        accs
    }

    /// Whether any profile binds `acc`.
    pub(crate) fn is_bound(&self, acc: &Accelerator) -> bool {
        self.bindings.contains_key(acc)
    }

    /// Whether a binding on `acc` is allowed an OS registration.
    pub(crate) fn eligible(&self, acc: &Accelerator) -> bool {
        acc.has_modifier() || self.allow_single_key
    }

    pub(crate) fn set_allow_single_key(&mut self, allow: bool) {
        self.allow_single_key = allow;
    }

    pub(crate) fn allow_single_key(&self) -> bool {
        self.allow_single_key
    }

    /// Original spelling of `acc` if it is a common shortcut.
    pub(crate) fn common_raw(&self, acc: &Accelerator) -> Option<&'static str> {
        self.common.iter().find(|(a, _)| a == acc).map(|(_, s)| *s)
    }

    /// Installed common shortcut spelling of `acc`.
    pub(crate) fn installed_common(&self, acc: &Accelerator) -> Option<&'static str> {
        self.common_installed
            .then(|| self.common_raw(acc))
            .flatten()
    }

    /// Installed app shortcut bound to `acc`.
    pub(crate) fn installed_app(&self, acc: &Accelerator) -> Option<AppShortcut> {
        if !self.app_installed {
            return None;
        }
        self.app.iter().find(|(a, _)| a == acc).map(|(_, s)| *s)
    }

    /// Toggle both the common and app shortcut sets. Returns their accelerators.
    pub(crate) fn set_fixed_installed(&mut self, installed: bool) -> Vec<Accelerator> {
        if self.common_installed != installed {
            debug!(installed, "fixed_shortcuts_changed");
        }
        self.common_installed = installed;
        self.app_installed = installed;
        self.fixed_accelerators()
    }

    /// Accelerators of the common shortcut list.
    pub(crate) fn common_accelerators(&self) -> Vec<Accelerator> {
        self.common.iter().map(|(a, _)| a.clone()).collect()
    }

    fn fixed_accelerators(&self) -> Vec<Accelerator> {
        self.common
            .iter()
            .map(|(a, _)| a.clone())
            .chain(self.app.iter().map(|(a, _)| a.clone()))
            .collect()
    }

    /// Whether some owner wants an OS registration for `acc`.
    pub(crate) fn wanted(&self, acc: &Accelerator) -> bool {
        (self.is_bound(acc) && self.eligible(acc))
            || self.installed_common(acc).is_some()
            || self.installed_app(acc).is_some()
    }

    pub(crate) fn is_live(&self, acc: &Accelerator) -> bool {
        self.live.contains(acc)
    }

    /// Ensure `acc` holds an OS registration. Returns whether it is live.
    ///
    /// A refusal is logged and leaves the accelerator unregistered; the next
    /// reconcile retries it.
    pub(crate) fn register(&mut self, acc: &Accelerator) -> bool {
        if self.live.contains(acc) {
            return true;
        }
        if self.service.is_registered(acc) {
            trace!(%acc, "already registered with the OS");
        } else if !self.service.register(acc) {
            warn!(%acc, "registration_conflict");
            return false;
        }
        self.live.insert(acc.clone());
        debug!(%acc, "registered");
        true
    }

    /// Release `acc`'s OS registration if it is live. Errors are swallowed.
    pub(crate) fn unregister(&mut self, acc: &Accelerator) {
        if !self.live.remove(acc) {
            return;
        }
        match self.service.unregister(acc) {
            Ok(()) => debug!(%acc, "unregistered"),
            Err(e) => debug!(%acc, error = %e, "unregister failed; ignoring"),
        }
    }

    /// Live bare-key accelerators that some profile binds.
    pub(crate) fn live_bare_bound(&self) -> Vec<Accelerator> {
        self.live
            .iter()
            .filter(|a| !a.has_modifier() && self.is_bound(a))
            .cloned()
            .collect()
    }

    /// Live accelerators from the common list.
    pub(crate) fn live_common(&self) -> Vec<Accelerator> {
        self.common
            .iter()
            .filter(|(a, _)| self.live.contains(a))
            .map(|(a, _)| a.clone())
            .collect()
    }

    /// Bindings on `acc`, in insertion order.
    pub(crate) fn candidates(&self, acc: &Accelerator) -> Vec<Binding> {
        self.bindings.get(acc).cloned().unwrap_or_default()
    }

    /// Every accelerator with an owner or a registration.
    pub(crate) fn known_accelerators(&self) -> Vec<Accelerator> {
        let mut out: Vec<Accelerator> = self.bindings.keys().cloned().collect();
        out.extend(self.fixed_accelerators());
        out.extend(self.live.iter().cloned());
        out.sort();
        out.dedup();
        out
    }

    /// Release every registration and forget all owners.
    pub(crate) fn clear(&mut self) {
        let live: Vec<Accelerator> = self.live.iter().cloned().collect();
        for acc in &live {
            self.unregister(acc);
        }
        self.bindings.clear();
        self.by_profile.clear();
        self.common_installed = false;
        self.app_installed = false;
    }

    /// Bindings sorted by accelerator.
    pub(crate) fn bindings_snapshot(&self) -> Vec<(Accelerator, Vec<Binding>)> {
        let mut out: Vec<(Accelerator, Vec<Binding>)> = self
            .bindings
            .iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Live registrations, sorted.
    pub(crate) fn live_snapshot(&self) -> Vec<Accelerator> {
        let mut out: Vec<Accelerator> = self.live.iter().cloned().collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockHotkeyService;

    fn acc(s: &str) -> Accelerator {
        Accelerator::parse(s).unwrap()
    }

    #[test]
    fn replace_reports_old_and_new_accelerators() {
        let mut mux = Multiplexer::new(Arc::new(MockHotkeyService::new()), false);
        let touched = mux.replace_bindings("Hero", &["CTRL+1", "ctrl+2"]);
        assert_eq!(touched, [acc("Control+1"), acc("Control+2")]);

        let touched = mux.replace_bindings("Hero", &["Control+2", "Alt+3"]);
        assert_eq!(touched, [acc("Control+1"), acc("Control+2"), acc("Alt+3")]);
        assert!(!mux.is_bound(&acc("Control+1")));
        assert_eq!(mux.candidates(&acc("Control+2"))[0].raw, "Control+2");
    }

    #[test]
    fn invalid_shortcuts_are_skipped() {
        let mut mux = Multiplexer::new(Arc::new(MockHotkeyService::new()), false);
        let touched = mux.replace_bindings("Hero", &["", "Ctrl+", "Ctrl+1"]);
        assert_eq!(touched, [acc("Ctrl+1")]);
    }

    #[test]
    fn duplicate_spelling_keeps_one_binding() {
        let mut mux = Multiplexer::new(Arc::new(MockHotkeyService::new()), false);
        mux.replace_bindings("Hero", &["ctrl+1", "CONTROL+1"]);
        let cands = mux.candidates(&acc("Control+1"));
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].raw, "CONTROL+1");
    }

    #[test]
    fn eligibility_follows_modifier_and_flag() {
        let mut mux = Multiplexer::new(Arc::new(MockHotkeyService::new()), false);
        mux.replace_bindings("Hero", &["F5", "Shift+F5"]);
        assert!(!mux.wanted(&acc("F5")));
        assert!(mux.wanted(&acc("Shift+F5")));
        mux.set_allow_single_key(true);
        assert!(mux.wanted(&acc("F5")));
    }

    #[test]
    fn register_adopts_existing_and_reports_conflicts() {
        let svc = Arc::new(MockHotkeyService::new());
        svc.refuse("Alt+9");
        let mut mux = Multiplexer::new(svc.clone(), false);
        assert!(!mux.register(&acc("Alt+9")));
        assert!(!mux.is_live(&acc("Alt+9")));

        assert!(mux.register(&acc("Alt+1")));
        assert!(mux.register(&acc("Alt+1")));
        assert_eq!(svc.register_calls(&acc("Alt+1")), 1);

        mux.unregister(&acc("Alt+1"));
        mux.unregister(&acc("Alt+1"));
        assert!(svc.registered().is_empty());
    }
}
