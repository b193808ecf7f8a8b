//! Action Planner: maps a committed state to a deterministic actuation plan.

use crate::state::StateCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitPriority {
    Primary,
    Secondary,
}

impl std::fmt::Display for TransitPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransitPriority::Primary => "PRIMARY",
            TransitPriority::Secondary => "SECONDARY",
        };
        write!(f, "{s}")
    }
}

/// `None` for a prefix means "do not call the advertise endpoint for this prefix";
/// `None` for priority means "do not call the priority-update endpoint".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionPlan {
    pub advertise_primary: Option<bool>,
    pub advertise_secondary: Option<bool>,
    pub transit_priority: Option<TransitPriority>,
}

impl ActionPlan {
    pub fn no_op() -> Self {
        Self::default()
    }
}

/// Build the plan for a committed state per the §4.9 table.
pub fn plan_for(state: StateCode) -> ActionPlan {
    match state.value() {
        1 => ActionPlan {
            advertise_primary: Some(true),
            advertise_secondary: Some(false),
            transit_priority: Some(TransitPriority::Primary),
        },
        2 => ActionPlan {
            advertise_primary: Some(false),
            advertise_secondary: Some(false),
            transit_priority: Some(TransitPriority::Secondary),
        },
        3 => ActionPlan {
            advertise_primary: Some(true),
            advertise_secondary: Some(true),
            transit_priority: Some(TransitPriority::Primary),
        },
        4 => ActionPlan {
            advertise_primary: Some(true),
            advertise_secondary: Some(false),
            transit_priority: Some(TransitPriority::Secondary),
        },
        5 => ActionPlan {
            advertise_primary: Some(true),
            advertise_secondary: Some(false),
            transit_priority: Some(TransitPriority::Secondary),
        },
        6 => ActionPlan {
            advertise_primary: Some(true),
            advertise_secondary: Some(true),
            transit_priority: Some(TransitPriority::Primary),
        },
        _ => ActionPlan::no_op(),
    }
}
