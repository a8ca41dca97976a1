//! Errors raised by the lifecycle, the authorizer, and the custody tracker.

use thiserror::Error;

use docket_core::{CaseId, Role, ValidationError};

use crate::lifecycle::{CaseAction, CaseState};

/// Authorization refusals.
///
/// `InvalidTransition` means no such edge exists from the current state for
/// anybody; `Forbidden` means the edge exists but not for this role. Clients
/// react differently (refresh vs. hide the control), so the two never merge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No edge for `(state, action)`.
    #[error("invalid transition: {action} is not available from {state}")]
    InvalidTransition {
        /// Current case state.
        state: CaseState,
        /// Requested action.
        action: CaseAction,
    },

    /// The edge exists but the role is not in its allowed set.
    #[error("forbidden: role {role} may not {action} a case in {state}")]
    Forbidden {
        /// Caller role.
        role: Role,
        /// Current case state.
        state: CaseState,
        /// Requested action.
        action: CaseAction,
    },
}

/// Failures while applying an authorized transition to a case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The grant's edge does not start at the case's current status.
    #[error("invalid transition: {action} is not available from {from}")]
    InvalidTransition {
        /// Case status at apply time.
        from: CaseState,
        /// Action carried by the grant.
        action: CaseAction,
    },

    /// The grant was issued for a different case.
    #[error("grant issued for {granted} cannot be applied to {target}")]
    GrantMismatch {
        /// Case named in the grant.
        granted: CaseId,
        /// Case the grant was applied to.
        target: CaseId,
    },

    /// Custody may be renewed once.
    #[error("custody for {case_id} has already been extended")]
    CustodyAlreadyExtended {
        /// The case in custody.
        case_id: CaseId,
    },

    /// The action needs data the request did not carry.
    #[error("{action} requires {field}")]
    MissingTransitionData {
        /// Action being applied.
        action: CaseAction,
        /// Name of the missing input.
        field: &'static str,
    },
}

/// Custody tracker errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The case has no running custody clock.
    #[error("case {case_id} is not in custody (status {status})")]
    NotInCustody {
        /// The case queried.
        case_id: CaseId,
        /// Its current status.
        status: CaseState,
    },
}

/// Refusals when opening a new case.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilingError {
    /// Only citizens and police file complaints.
    #[error("role {role} may not file a complaint")]
    RoleCannotFile {
        /// Caller role.
        role: Role,
    },

    /// Filing payload failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
