//! # Actor Registry
//!
//! Per-role views derived from [`TRANSITIONS`]. Nothing here is maintained by
//! hand, so a role can never be listed for an action the authorizer would
//! refuse.

use docket_core::Role;

use crate::lifecycle::{CaseAction, CaseState, Transition, TRANSITIONS};

/// Roles allowed to open a case.
pub const FILING_ROLES: &[Role] = &[Role::Citizen, Role::Police];

/// Whether `role` may file a complaint.
pub fn can_file(role: Role) -> bool {
    FILING_ROLES.contains(&role)
}

/// The full authorization matrix.
pub fn matrix() -> &'static [Transition] {
    TRANSITIONS
}

/// Distinct actions `role` can fire from some state, in table order.
pub fn actions_for(role: Role) -> Vec<CaseAction> {
    let mut actions = Vec::new();
    for t in TRANSITIONS.iter().filter(|t| t.permits(role)) {
        if !actions.contains(&t.action) {
            actions.push(t.action);
        }
    }
    actions
}

/// Actions `role` can fire on a case currently in `state`.
pub fn available_actions(role: Role, state: CaseState) -> Vec<CaseAction> {
    state
        .outgoing()
        .filter(|t| t.permits(role))
        .map(|t| t.action)
        .collect()
}

/// Roles allowed to fire `action` from any state.
pub fn roles_for(action: CaseAction) -> Vec<Role> {
    Role::ALL
        .iter()
        .copied()
        .filter(|r| TRANSITIONS.iter().any(|t| t.action == action && t.permits(*r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorize::authorize_in_state;

    #[test]
    fn police_actions() {
        assert_eq!(
            actions_for(Role::Police),
            vec![
                CaseAction::BeginInvestigation,
                CaseAction::PlaceInCustody,
                CaseAction::ReleaseCustody,
                CaseAction::RequestVisa,
            ]
        );
    }

    #[test]
    fn schedule_hearing_listed_once_for_clerk() {
        let clerk = actions_for(Role::Clerk);
        assert_eq!(
            clerk.iter().filter(|a| **a == CaseAction::ScheduleHearing).count(),
            1
        );
        assert_eq!(
            clerk,
            vec![
                CaseAction::Enroll,
                CaseAction::ScheduleHearing,
                CaseAction::Adjourn,
                CaseAction::Close,
            ]
        );
    }

    #[test]
    fn citizens_admins_and_bailiffs_fire_nothing() {
        for role in [Role::Citizen, Role::Admin, Role::Bailiff] {
            assert!(actions_for(role).is_empty(), "{role}");
        }
    }

    #[test]
    fn available_actions_in_custody() {
        assert_eq!(
            available_actions(Role::Commissaire, CaseState::InCustody),
            vec![CaseAction::ExtendCustody, CaseAction::ReleaseCustody]
        );
        assert_eq!(
            available_actions(Role::Police, CaseState::InCustody),
            vec![CaseAction::ReleaseCustody]
        );
    }

    #[test]
    fn available_actions_agree_with_authorizer() {
        for role in Role::ALL {
            for state in CaseState::ALL {
                for action in CaseAction::ALL {
                    let listed = available_actions(role, state).contains(&action);
                    let allowed = authorize_in_state(role, state, action).is_ok();
                    assert_eq!(listed, allowed, "{role} {state} {action}");
                }
            }
        }
    }

    #[test]
    fn appeal_roles() {
        assert_eq!(
            roles_for(CaseAction::Appeal),
            vec![Role::Prosecutor, Role::Judge, Role::Lawyer]
        );
    }

    #[test]
    fn filing_roles() {
        assert!(can_file(Role::Citizen));
        assert!(can_file(Role::Police));
        assert!(!can_file(Role::Clerk));
        assert!(!can_file(Role::Admin));
    }

    #[test]
    fn matrix_is_the_table() {
        assert_eq!(matrix().len(), 17);
    }
}
