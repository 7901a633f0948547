//! Pure evaluation of a Job's lifecycle state from its status snapshot.
//!
//! A Job is in one of three derived states:
//! - Idle: nothing has ever run (`startTime` unset)
//! - Running: started, and no terminal condition is true
//! - Terminal: started, and at least one of Complete/Failed/Suspended is true
//!
//! Every decision in the controller is made from a freshly fetched status,
//! never from cached state, so these helpers take the snapshot by reference
//! and perform no I/O.

use k8s_openapi::api::batch::v1::{JobCondition, JobStatus};

/// Closed set of Job condition kinds the evaluator understands.
///
/// Conditions arrive from the API server as open strings; anything outside
/// the known set maps to `Unknown` and never counts as terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// Job ran to completion
    Complete,
    /// Job exceeded its failure policy
    Failed,
    /// Job is suspended by the control plane
    Suspended,
    /// Any condition kind this controller does not reason about
    Unknown,
}

impl ConditionKind {
    /// Parse a condition's `type` field into the closed set
    pub fn parse(kind: &str) -> Self {
        match kind {
            "Complete" => Self::Complete,
            "Failed" => Self::Failed,
            "Suspended" => Self::Suspended,
            _ => Self::Unknown,
        }
    }

    /// Whether this kind ends or pauses execution when true
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Suspended)
    }
}

fn condition_is_true(cond: &JobCondition) -> bool {
    cond.status == "True"
}

/// Whether the Job is actively executing.
///
/// Started (non-nil `startTime`) and no terminal condition currently true.
/// Condition order does not matter: any one true terminal condition is
/// sufficient to call the Job not-running, even if the list also carries
/// contradictory entries.
pub fn is_running(status: &JobStatus) -> bool {
    if status.start_time.is_none() {
        // Never scheduled, not even a first attempt
        return false;
    }

    let conditions = status.conditions.as_deref().unwrap_or_default();
    !conditions
        .iter()
        .any(|c| ConditionKind::parse(&c.type_).is_terminal() && condition_is_true(c))
}

/// The condition with the latest transition timestamp, for display.
///
/// A missing timestamp counts as the minimum, so any real timestamp wins
/// over it. Ties resolve to the first-seen entry, matching the append order
/// the API server maintains.
pub fn latest_condition(status: &JobStatus) -> Option<&JobCondition> {
    let conditions = status.conditions.as_deref().unwrap_or_default();
    let mut latest = conditions.first()?;
    for cond in conditions {
        // Option ordering puts None below every timestamp; strict greater
        // keeps the first-seen entry on ties
        if cond.last_transition_time > latest.last_transition_time {
            latest = cond;
        }
    }
    Some(latest)
}
