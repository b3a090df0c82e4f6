//! Capture coordinator: suspends bare-key and common registrations while a
//! shortcut is being rebound.

use std::{collections::BTreeSet, mem};

use keyspec::Accelerator;
use tracing::debug;

use crate::multiplexer::Multiplexer;

/// Owns the Paused Set.
///
/// Invariant: `paused` is empty whenever `open` is false.
#[derive(Default)]
pub(crate) struct CaptureCoordinator {
    /// A capture session is in progress.
    open: bool,
    /// Accelerators torn down for the current session.
    paused: BTreeSet<Accelerator>,
    /// The common shortcut list was suspended and must be restored whole.
    common_paused: bool,
}

impl CaptureCoordinator {
    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    /// Whether `acc` must stay unregistered during the current session.
    pub(crate) fn holds(&self, acc: &Accelerator, mux: &Multiplexer) -> bool {
        self.open
            && ((!acc.has_modifier() && mux.is_bound(acc)) || mux.installed_common(acc).is_some())
    }

    /// Record `acc` as suspended.
    pub(crate) fn park(&mut self, acc: &Accelerator) {
        if self.open && self.paused.insert(acc.clone()) {
            debug!(%acc, "capture_paused");
        }
    }

    /// Forget `acc` once nothing wants it any more.
    pub(crate) fn unpark(&mut self, acc: &Accelerator) {
        self.paused.remove(acc);
    }

    /// Open a session, tearing down live bare-key bindings and common
    /// shortcuts. Already-paused accelerators are left alone.
    pub(crate) fn begin(&mut self, mux: &mut Multiplexer) {
        if !self.open {
            debug!("capture_begin");
        }
        self.open = true;
        for acc in mux.live_bare_bound() {
            if !self.paused.contains(&acc) {
                mux.unregister(&acc);
                self.park(&acc);
            }
        }
        let common = mux.live_common();
        if !common.is_empty() {
            self.common_paused = true;
        }
        for acc in common {
            mux.unregister(&acc);
            self.park(&acc);
        }
    }

    /// Close the session. Returns the accelerators to restore and whether the
    /// whole common list must be re-registered; None when no session was open.
    pub(crate) fn end(&mut self) -> Option<(Vec<Accelerator>, bool)> {
        if !self.open {
            return None;
        }
        self.open = false;
        let paused: Vec<Accelerator> = mem::take(&mut self.paused).into_iter().collect();
        let common = mem::take(&mut self.common_paused);
        debug!(restore = paused.len(), common, "capture_end");
        Some((paused, common))
    }

    /// Paused accelerators, sorted.
    pub(crate) fn paused_snapshot(&self) -> Vec<Accelerator> {
        self.paused.iter().cloned().collect()
    }

    /// Drop any session state without restoring.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::MockHotkeyService;

    fn acc(s: &str) -> Accelerator {
        Accelerator::parse(s).unwrap()
    }

    #[test]
    fn begin_pauses_only_live_bare_bindings() {
        let svc = Arc::new(MockHotkeyService::new());
        let mut mux = Multiplexer::new(svc.clone(), true);
        for a in mux.replace_bindings("Hero", &["F5", "Ctrl+1", "G"]) {
            mux.register(&a);
        }
        mux.unregister(&acc("G"));

        let mut cap = CaptureCoordinator::default();
        cap.begin(&mut mux);
        assert_eq!(cap.paused_snapshot(), [acc("F5")]);
        assert!(mux.is_live(&acc("Ctrl+1")));
        assert!(!svc.is_live("F5"));

        cap.begin(&mut mux);
        assert_eq!(cap.paused_snapshot(), [acc("F5")]);

        let (restore, common) = cap.end().unwrap();
        assert_eq!(restore, [acc("F5")]);
        assert!(!common);
        assert!(cap.end().is_none());
        assert!(cap.paused_snapshot().is_empty());
    }

    #[test]
    fn park_is_ignored_outside_a_session() {
        let mut cap = CaptureCoordinator::default();
        cap.park(&acc("F5"));
        assert!(cap.paused_snapshot().is_empty());
    }
}
