#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayLifecycle {
    Constructing,
    Running,
    Stopping,
    Terminated,
}

impl OverlayLifecycle {
    pub fn is_ticking(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Move to `to` if the transition is legal, returning whether it happened.
    pub fn advance_to(&mut self, to: OverlayLifecycle) -> bool {
        if !can_transition(*self, to) {
            tracing::warn!(from = ?*self, ?to, "ignored illegal overlay transition");
            return false;
        }
        if *self != to {
            tracing::debug!(from = ?*self, ?to, "overlay lifecycle");
            *self = to;
        }
        true
    }
}

pub fn can_transition(from: OverlayLifecycle, to: OverlayLifecycle) -> bool {
    matches!(
        (from, to),
        (OverlayLifecycle::Constructing, OverlayLifecycle::Running)
            | (OverlayLifecycle::Constructing, OverlayLifecycle::Stopping)
            | (OverlayLifecycle::Running, OverlayLifecycle::Stopping)
            | (OverlayLifecycle::Stopping, OverlayLifecycle::Terminated)
    ) || from == to
}

#[cfg(test)]
mod tests {
    use super::{can_transition, OverlayLifecycle::*};

    #[test]
    fn forward_path_is_legal() {
        let mut state = Constructing;
        assert!(state.advance_to(Running));
        assert!(state.is_ticking());
        assert!(state.advance_to(Stopping));
        assert!(!state.is_ticking());
        assert!(state.advance_to(Terminated));
        assert_eq!(state, Terminated);
    }

    #[test]
    fn no_resume_after_stopping() {
        assert!(!can_transition(Stopping, Running));
        assert!(!can_transition(Terminated, Running));
        assert!(!can_transition(Running, Constructing));
        assert!(!can_transition(Running, Terminated));

        let mut state = Stopping;
        assert!(!state.advance_to(Running));
        assert_eq!(state, Stopping);
    }

    #[test]
    fn self_transitions_are_allowed() {
        for state in [Constructing, Running, Stopping, Terminated] {
            assert!(can_transition(state, state));
        }
    }
}
