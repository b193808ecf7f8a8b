//! Tri-valued health signal and the classifier that produces it.
//!
//! `Health` deliberately is not `Option<bool>`: a nullable boolean lets callers forget
//! to handle the "monitoring plane could not decide" branch, whereas a three-variant
//! enum forces a match arm for it everywhere the value is consumed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Health {
    Healthy,
    Unhealthy,
    /// The monitoring plane could not decide: a transient or unclassified probe error.
    /// Propagates into state 0 rather than being guessed at.
    Unknown,
}

impl Health {
    pub fn is_known(self) -> bool {
        !matches!(self, Health::Unknown)
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Health::Healthy => Some(true),
            Health::Unhealthy => Some(false),
            Health::Unknown => None,
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Health::Healthy => "healthy",
            Health::Unhealthy => "unhealthy",
            Health::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Three probe results observed within a single tick, before hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawObservation {
    pub local: Health,
    pub remote: Health,
    pub bgp: Health,
}

impl RawObservation {
    /// Any probe returning `Unknown` short-circuits the tick per §4.4: the raw state
    /// for classification purposes is forced to 0 and hysteresis windows are left
    /// untouched, regardless of what the other two probes reported.
    pub fn any_unknown(&self) -> bool {
        !self.local.is_known() || !self.remote.is_known() || !self.bgp.is_known()
    }
}
