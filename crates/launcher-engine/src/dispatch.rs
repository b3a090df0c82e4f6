//! Dispatch target resolver: picks the profile whose window holds focus and
//! forwards the profile's own shortcut text to its assist window.
//!
//! Resolution runs in two phases. A synchronous gather phase reads focus and
//! candidates; the asynchronous typing probe follows, after which focus,
//! bindings and window ownership are re-read before anything is delivered.

use keyspec::Accelerator;
use tracing::{info, trace, warn};

use crate::{
    deps::InputFocusProbe,
    multiplexer::Binding,
    registry::{AssistMsg, WindowRegistry},
};

/// Result of resolving one bound trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Delivered to this profile's assist window.
    Delivered {
        /// Receiving profile.
        profile: String,
    },
    /// No window holds focus.
    NoFocus,
    /// The focused window is in a text-entry control.
    Typing,
    /// No profile binds the accelerator any more.
    Unbound,
    /// No bound profile owns the focused window.
    NoMatch,
    /// The matching profile has no live assist window.
    NoAssist,
    /// Focus changed while the probe was running.
    FocusMoved,
}

/// Resolve and deliver a bound trigger.
///
/// `candidates` yields the current bindings for `acc` and is called once per
/// phase so that changes made during the probe are observed.
pub(crate) async fn resolve_target<F>(
    acc: &Accelerator,
    registry: &WindowRegistry,
    probe: &dyn InputFocusProbe,
    candidates: F,
) -> DispatchOutcome
where
    F: Fn() -> Vec<Binding>,
{
    let Some(focused) = registry.focused_window() else {
        trace!(%acc, "dispatch: no focused window");
        return DispatchOutcome::NoFocus;
    };
    if candidates().is_empty() {
        return DispatchOutcome::Unbound;
    }

    match probe.is_typing(focused).await {
        Ok(true) => {
            trace!(%acc, %focused, "dispatch: user is typing");
            return DispatchOutcome::Typing;
        }
        Ok(false) => {}
        Err(e) => warn!(%acc, %focused, error = %e, "typing probe failed; dispatching anyway"),
    }

    if registry.focused_window() != Some(focused) {
        trace!(%acc, "dispatch: focus moved during probe");
        return DispatchOutcome::FocusMoved;
    }
    // First match in binding order wins.
    let Some(target) = candidates()
        .into_iter()
        .find(|b| registry.owns_window(&b.profile, focused))
    else {
        trace!(%acc, %focused, "dispatch: no bound profile owns focus");
        return DispatchOutcome::NoMatch;
    };

    if registry.send_to_assist(&target.profile, AssistMsg::QuickCommandShortcut(target.raw)) {
        info!(%acc, profile = %target.profile, "shortcut_dispatched");
        DispatchOutcome::Delivered {
            profile: target.profile,
        }
    } else {
        trace!(%acc, profile = %target.profile, "dispatch: no assist window");
        DispatchOutcome::NoAssist
    }
}
