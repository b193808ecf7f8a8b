//! State codes and the reducer that derives them from three post-hysteresis health
//! values.

use std::fmt;

/// One of the seven states named in §4.6. Kept as a thin newtype over `u8` (the wire
/// and event representation is an integer per the historical schema) but with
/// behavior methods so callers never have to hand-roll the exception-set or
/// verifiable-state checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateCode(u8);

impl StateCode {
    pub const UNKNOWN: StateCode = StateCode(0);

    pub fn new(code: u8) -> Self {
        assert!(code <= 6, "state code must be in 0..=6, got {code}");
        StateCode(code)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// States 2, 3, 4 require consecutive-observation verification before commit.
    pub fn is_verifiable(self) -> bool {
        matches!(self.0, 2 | 3 | 4)
    }

    pub fn is_exception(self, exception_set: &[StateCode]) -> bool {
        exception_set.contains(&self)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for StateCode {
    fn default() -> Self {
        StateCode::UNKNOWN
    }
}

/// Three tri-valued health signals, already passed through hysteresis, ready for
/// reduction into a `StateCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothedObservation {
    pub local_healthy: bool,
    pub remote_healthy: bool,
    pub bgp_up: bool,
}

/// Reduce three post-hysteresis signals into a state code per the §4.6 table.
///
/// Any upstream `Health::Unknown` must be caught before this function is called
/// (see [`crate::health::RawObservation::any_unknown`]); this function only sees
/// known, already-smoothed booleans and only produces state 0 for combinations the
/// table leaves unlisted.
pub fn reduce(obs: SmoothedObservation) -> StateCode {
    use SmoothedObservation as O;
    match obs {
        O { local_healthy: true, remote_healthy: true, bgp_up: true } => StateCode::new(1),
        O { local_healthy: false, remote_healthy: true, bgp_up: true } => StateCode::new(2),
        O { local_healthy: true, remote_healthy: false, bgp_up: true } => StateCode::new(3),
        O { local_healthy: false, remote_healthy: false, bgp_up: true } => StateCode::new(4),
        O { local_healthy: false, remote_healthy: true, bgp_up: false } => StateCode::new(5),
        O { local_healthy: true, remote_healthy: true, bgp_up: false } => StateCode::new(6),
        _ => StateCode::UNKNOWN,
    }
}
