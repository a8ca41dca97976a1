//! # Transition Authorizer
//!
//! The single enforcement point before any case mutation. Given an actor, a
//! case and an action it either refuses with a structured [`AuthError`] or
//! issues a [`Grant`]. A `Grant` has no public constructor, and
//! [`Case::apply_transition`](crate::Case::apply_transition) requires one, so
//! every status change has passed through here.
//!
//! Checks run in a fixed order: the edge must exist for the current state
//! (whoever asks), then the role must be in the edge's allowed set.

use docket_core::{ActorRef, CaseId, Role};

use crate::case::Case;
use crate::error::AuthError;
use crate::lifecycle::{find_edge, CaseAction, CaseState, Transition};

/// Proof that an actor was authorized to fire one edge on one case.
#[derive(Debug, Clone)]
pub struct Grant {
    edge: &'static Transition,
    actor: ActorRef,
    case_id: CaseId,
}

impl Grant {
    /// The authorized edge.
    pub fn edge(&self) -> &'static Transition {
        self.edge
    }

    /// The actor the grant was issued to.
    pub fn actor(&self) -> &ActorRef {
        &self.actor
    }

    /// The case the grant applies to.
    pub fn case_id(&self) -> CaseId {
        self.case_id
    }

    /// Shorthand for `edge().action`.
    pub fn action(&self) -> CaseAction {
        self.edge.action
    }
}

/// Check `(role, state, action)` against the transition table without a
/// concrete case.
///
/// Used by the actor registry and by tooling that answers "could this role
/// do that here?".
pub fn authorize_in_state(
    role: Role,
    state: CaseState,
    action: CaseAction,
) -> Result<&'static Transition, AuthError> {
    let edge = find_edge(state, action).ok_or(AuthError::InvalidTransition { state, action })?;
    if !edge.permits(role) {
        return Err(AuthError::Forbidden {
            role,
            state,
            action,
        });
    }
    Ok(edge)
}

/// Authorize `actor` to fire `action` on `case` in its current status.
pub fn authorize(actor: &ActorRef, case: &Case, action: CaseAction) -> Result<Grant, AuthError> {
    let edge = authorize_in_state(actor.role, case.status(), action)?;
    Ok(Grant {
        edge,
        actor: actor.clone(),
        case_id: case.id(),
    })
}
