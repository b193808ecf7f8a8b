//! Layer 2 of the flap-protection pipeline: consecutive-observation verification for
//! states 2, 3 and 4.

use crate::state::StateCode;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The gate accepts: either the state doesn't require verification, matches the
    /// already-committed state, or has reached its consecutive-observation threshold.
    Accepted,
    /// Not enough consecutive observations yet; committed state must stay unchanged.
    Pending { count: usize, threshold: usize },
}

/// Per-state consecutive-observation counters. Only one counter is ever non-zero,
/// per the data-model invariant in §3.
#[derive(Debug, Clone)]
pub struct VerificationGate {
    thresholds: HashMap<u8, usize>,
    current: Option<(StateCode, usize)>,
}

impl VerificationGate {
    /// `thresholds` maps state code (2, 3 or 4) to its required consecutive-observation
    /// count (1–10, default 2 per §6; a threshold of 1 disables verification for that
    /// state).
    pub fn new(thresholds: HashMap<u8, usize>) -> Self {
        for (&state, &threshold) in &thresholds {
            assert!(
                (2..=4).contains(&state),
                "verification thresholds only apply to states 2-4, got {state}"
            );
            assert!(
                (1..=10).contains(&threshold),
                "verification threshold must be in 1..=10, got {threshold}"
            );
        }
        Self { thresholds, current: None }
    }

    fn threshold_for(&self, state: StateCode) -> usize {
        self.thresholds.get(&state.value()).copied().unwrap_or(2)
    }

    /// Evaluate a newly computed raw state against the verification counters, given
    /// the currently committed state.
    pub fn evaluate(&mut self, raw_state: StateCode, committed_state: StateCode) -> VerificationOutcome {
        if raw_state == committed_state {
            self.current = None;
            return VerificationOutcome::Accepted;
        }

        if !raw_state.is_verifiable() {
            self.current = None;
            return VerificationOutcome::Accepted;
        }

        let threshold = self.threshold_for(raw_state);
        let count = match self.current {
            Some((state, count)) if state == raw_state => count + 1,
            _ => 1,
        };
        self.current = Some((raw_state, count));

        if count >= threshold {
            self.current = None;
            VerificationOutcome::Accepted
        } else {
            VerificationOutcome::Pending { count, threshold }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(threshold: usize) -> VerificationGate {
        VerificationGate::new(HashMap::from([(2, threshold), (3, threshold), (4, threshold)]))
    }

    #[test]
    fn non_verifiable_states_accept_immediately() {
        let mut g = gate(2);
        assert_eq!(
            g.evaluate(StateCode::new(1), StateCode::new(1)),
            VerificationOutcome::Accepted
        );
        assert_eq!(
            g.evaluate(StateCode::new(0), StateCode::new(1)),
            VerificationOutcome::Accepted
        );
    }

    #[test]
    fn verifiable_state_requires_consecutive_observations() {
        let mut g = gate(2);
        assert_eq!(
            g.evaluate(StateCode::new(4), StateCode::new(1)),
            VerificationOutcome::Pending { count: 1, threshold: 2 }
        );
        assert_eq!(
            g.evaluate(StateCode::new(4), StateCode::new(1)),
            VerificationOutcome::Accepted
        );
    }

    #[test]
    fn observing_a_different_state_resets_the_counter() {
        let mut g = gate(3);
        assert_eq!(
            g.evaluate(StateCode::new(2), StateCode::new(1)),
            VerificationOutcome::Pending { count: 1, threshold: 3 }
        );
        // different raw state resets
        assert_eq!(
            g.evaluate(StateCode::new(3), StateCode::new(1)),
            VerificationOutcome::Pending { count: 1, threshold: 3 }
        );
        assert_eq!(
            g.evaluate(StateCode::new(3), StateCode::new(1)),
            VerificationOutcome::Pending { count: 2, threshold: 3 }
        );
    }

    #[test]
    fn threshold_of_one_disables_verification() {
        let mut g = gate(1);
        assert_eq!(
            g.evaluate(StateCode::new(2), StateCode::new(1)),
            VerificationOutcome::Accepted
        );
    }
}
