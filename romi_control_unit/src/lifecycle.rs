//! Actuator lifecycle transitions.
//!
//! Ordered bring-up: Created → SetUp → Configured → Calibrated →
//! Enabled ↔ Disabled, with Error as a latched fault state. Disable is
//! accepted from every state; from any non-Enabled state it succeeds
//! without changing state. All other unlisted (state, event) pairs are
//! rejected and leave the state untouched, so a rejected command is
//! retryable.

use romi_common::state::LifecycleState;

/// Result of a lifecycle transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded — new state.
    Ok(LifecycleState),
    /// Transition rejected — reason.
    Rejected(&'static str),
}

/// Lifecycle event that can trigger a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Bind sensor interrupts and claim power-stage pins.
    Setup,
    /// Apply tuning constants and initialize the drive.
    Configure,
    /// Run the drive origin-alignment procedure.
    Calibrate,
    /// Enable the power stage.
    Enable,
    /// Disable the power stage (idempotent).
    Disable,
}

/// Lifecycle state holder. Exactly one per actuator; the only writer
/// of the state it owns.
#[derive(Debug, Clone)]
pub struct ActuatorLifecycle {
    state: LifecycleState,
}

impl ActuatorLifecycle {
    /// Create a new lifecycle in Created state.
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Created,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether `update()` performs work in the current state.
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Whether `handle_event` would accept the event right now. Used by
    /// operations that must validate before touching hardware.
    #[inline]
    pub const fn permits(&self, event: LifecycleEvent) -> bool {
        next_state(self.state, event).is_some()
    }

    /// Attempt a transition given an event.
    ///
    /// Returns `TransitionResult::Ok(new_state)` on success,
    /// `TransitionResult::Rejected(reason)` if the transition is not
    /// valid. A rejected transition leaves the state unchanged.
    pub fn handle_event(&mut self, event: LifecycleEvent) -> TransitionResult {
        match next_state(self.state, event) {
            Some(next) => {
                self.state = next;
                TransitionResult::Ok(next)
            }
            None => TransitionResult::Rejected(invalid_transition_reason(self.state, event)),
        }
    }

    /// Latch the Error state. Reserved for the fault path in the
    /// control cycle; commands cannot reach Error.
    #[inline]
    pub fn latch_error(&mut self) {
        self.state = LifecycleState::Error;
    }
}

impl Default for ActuatorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// The transition table. `None` means rejected.
const fn next_state(state: LifecycleState, event: LifecycleEvent) -> Option<LifecycleState> {
    use LifecycleEvent::*;
    use LifecycleState::*;

    match (state, event) {
        // Ordered bring-up.
        (Created, Setup) => Some(SetUp),
        (SetUp, Configure) => Some(Configured),
        (Configured, Calibrate) => Some(Calibrated),

        // Power-stage gating.
        (Calibrated, Enable) => Some(Enabled),
        (Disabled, Enable) => Some(Enabled),
        (Enabled, Disable) => Some(Disabled),

        // Disable from any non-Enabled state is an accepted no-op.
        (s, Disable) => Some(s),

        // All other combinations are invalid.
        _ => None,
    }
}

fn invalid_transition_reason(state: LifecycleState, event: LifecycleEvent) -> &'static str {
    use LifecycleState::*;
    match (state, event) {
        (Error, _) => "Error: fault latched, only disable accepted",
        (Created, _) => "Created: only setup allowed",
        (SetUp, _) => "SetUp: only configure allowed",
        (Configured, _) => "Configured: only calibrate allowed",
        (Calibrated, _) => "Calibrated: only enable allowed",
        (Enabled, _) => "Enabled: only disable allowed",
        (Disabled, _) => "Disabled: only enable allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleEvent::*;
    use LifecycleState::*;

    const ALL_STATES: [LifecycleState; 7] =
        [Created, SetUp, Configured, Calibrated, Enabled, Disabled, Error];
    const ALL_EVENTS: [LifecycleEvent; 5] = [Setup, Configure, Calibrate, Enable, Disable];

    #[test]
    fn initial_state_is_created() {
        let lc = ActuatorLifecycle::new();
        assert_eq!(lc.state(), Created);
        assert!(!lc.is_enabled());
    }

    #[test]
    fn normal_bringup_sequence() {
        let mut lc = ActuatorLifecycle::new();
        assert_eq!(lc.handle_event(Setup), TransitionResult::Ok(SetUp));
        assert_eq!(lc.handle_event(Configure), TransitionResult::Ok(Configured));
        assert_eq!(lc.handle_event(Calibrate), TransitionResult::Ok(Calibrated));
        assert_eq!(lc.handle_event(Enable), TransitionResult::Ok(Enabled));
        assert!(lc.is_enabled());
    }

    #[test]
    fn enable_disable_cycle() {
        let mut lc = ActuatorLifecycle { state: Enabled };
        assert_eq!(lc.handle_event(Disable), TransitionResult::Ok(Disabled));
        assert_eq!(lc.handle_event(Enable), TransitionResult::Ok(Enabled));
        assert_eq!(lc.handle_event(Disable), TransitionResult::Ok(Disabled));
    }

    #[test]
    fn reordered_bringup_rejected_and_state_pinned() {
        let mut lc = ActuatorLifecycle::new();
        assert!(matches!(
            lc.handle_event(Configure),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(lc.state(), Created);

        lc.handle_event(Setup);
        assert!(matches!(
            lc.handle_event(Calibrate),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(lc.state(), SetUp);

        lc.handle_event(Configure);
        assert!(matches!(
            lc.handle_event(Enable),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(lc.state(), Configured);
    }

    #[test]
    fn setup_twice_rejected() {
        let mut lc = ActuatorLifecycle::new();
        lc.handle_event(Setup);
        assert!(matches!(
            lc.handle_event(Setup),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(lc.state(), SetUp);
    }

    #[test]
    fn enable_while_enabled_rejected() {
        let mut lc = ActuatorLifecycle { state: Enabled };
        assert!(matches!(
            lc.handle_event(Enable),
            TransitionResult::Rejected(_)
        ));
        assert_eq!(lc.state(), Enabled);
    }

    #[test]
    fn disable_accepted_from_every_state() {
        for initial in ALL_STATES {
            let mut lc = ActuatorLifecycle { state: initial };
            let expected = if initial == Enabled { Disabled } else { initial };
            assert_eq!(
                lc.handle_event(Disable),
                TransitionResult::Ok(expected),
                "Disable from {initial:?} should succeed"
            );
            assert_ne!(lc.state(), Enabled);
        }
    }

    #[test]
    fn error_rejects_commanded_events_except_disable() {
        let mut lc = ActuatorLifecycle { state: Error };
        for event in [Setup, Configure, Calibrate, Enable] {
            assert!(
                matches!(lc.handle_event(event), TransitionResult::Rejected(_)),
                "{event:?} from Error should be rejected"
            );
            assert_eq!(lc.state(), Error);
        }
        assert_eq!(lc.handle_event(Disable), TransitionResult::Ok(Error));
    }

    #[test]
    fn latch_error_from_enabled() {
        let mut lc = ActuatorLifecycle { state: Enabled };
        lc.latch_error();
        assert_eq!(lc.state(), Error);
        assert!(!lc.is_enabled());
    }

    #[test]
    fn permits_agrees_with_handle_event() {
        for state in ALL_STATES {
            for event in ALL_EVENTS {
                let lc = ActuatorLifecycle { state };
                let mut probe = lc.clone();
                let accepted = matches!(probe.handle_event(event), TransitionResult::Ok(_));
                assert_eq!(
                    lc.permits(event),
                    accepted,
                    "permits and handle_event disagree for ({state:?}, {event:?})"
                );
            }
        }
    }

    #[test]
    fn rejection_reasons_name_the_state() {
        let mut lc = ActuatorLifecycle::new();
        match lc.handle_event(Enable) {
            TransitionResult::Rejected(reason) => assert!(reason.contains("Created")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
