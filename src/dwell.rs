//! Layer 3 of the flap-protection pipeline: minimum dwell time with an exception set.

use crate::state::StateCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellOutcome {
    /// Either an exception state is involved (bypasses dwell) or enough time has
    /// passed since the last commit.
    Commit { exception_bypass: bool },
    /// Not enough time has passed and neither state is in the exception set.
    Blocked,
}

#[derive(Debug, Clone)]
pub struct DwellGate {
    min_dwell: Duration,
    exception_set: Vec<StateCode>,
}

impl DwellGate {
    pub fn new(min_dwell: Duration, exception_set: Vec<StateCode>) -> Self {
        Self { min_dwell, exception_set }
    }

    /// `elapsed_since_commit` is `now - committed.since`. Boundary is inclusive: an
    /// elapsed value exactly equal to `min_dwell` permits the transition.
    pub fn evaluate(
        &self,
        committed_state: StateCode,
        candidate_state: StateCode,
        elapsed_since_commit: Duration,
    ) -> DwellOutcome {
        let exception_bypass = committed_state.is_exception(&self.exception_set)
            || candidate_state.is_exception(&self.exception_set);

        if exception_bypass {
            return DwellOutcome::Commit { exception_bypass: true };
        }

        if elapsed_since_commit >= self.min_dwell {
            DwellOutcome::Commit { exception_bypass: false }
        } else {
            DwellOutcome::Blocked
        }
    }
}
