//! # Case Lifecycle
//!
//! The closed set of case states, the closed set of workflow actions, and the
//! single transition table that binds them together with the roles allowed
//! to fire each edge.
//!
//! ```text
//! Submitted ──beginInvestigation──▶ UnderInvestigation ◀──────────────────────┐
//!                                      │        │  ▲                          │
//!                         placeInCustody   requestVisa  releaseCustody        │
//!                                      ▼        │  │                          │
//!                     extendCustody ⟲ InCustody ┘  │                          │
//!                                               ▼  │ rejectVisa               │
//!                                  PendingSupervisorVisa                      │
//!                                               │ grantVisa                   │
//!                                               ▼                             │
//!                                  TransmittedToProsecutor ─returnForMoreInvestigation
//!                                     │                 │
//!                              openInstruction        dismiss ──▶ Dismissed
//!                                     ▼
//!                              AssignedToJudge ──enroll──▶ Enrolled
//!                                                              │ scheduleHearing
//!                                                              ▼
//!                               Adjourned ◀──adjourn── HearingScheduled
//!                                   └────scheduleHearing──────▲   │ complete
//!                                                                 ▼
//!                                            Appealed ◀─appeal─ Completed ─close─▶ Closed
//! ```
//!
//! ## Design Choice: One Table
//!
//! Edges and their allowed roles live in [`TRANSITIONS`] only. The state
//! machine, the authorizer, and the actor registry all read that table, so
//! they cannot drift apart. Re-entrant edges such as
//! `Adjourned → HearingScheduled` are ordinary rows.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use docket_core::{Role, ValidationError};

// ─── Case State ──────────────────────────────────────────────────────

/// Workflow position of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseState {
    /// Complaint filed, nobody has picked it up yet.
    Submitted,
    /// Police investigation in progress.
    UnderInvestigation,
    /// A suspect is held in police custody (garde à vue).
    InCustody,
    /// Investigation report awaits the commissaire's visa.
    PendingSupervisorVisa,
    /// File is with the prosecutor.
    TransmittedToProsecutor,
    /// Judicial instruction opened, awaiting enrollment.
    AssignedToJudge,
    /// Prosecutor dropped the case. Terminal.
    Dismissed,
    /// Registered on the court roll with an RG number.
    Enrolled,
    /// A hearing date is set.
    HearingScheduled,
    /// The last hearing was adjourned.
    Adjourned,
    /// Judgment rendered.
    Completed,
    /// Judgment appealed; the case leaves this court. Terminal.
    Appealed,
    /// Case closed after judgment. Terminal.
    Closed,
}

impl CaseState {
    /// Every state, in lifecycle order.
    pub const ALL: [CaseState; 13] = [
        CaseState::Submitted,
        CaseState::UnderInvestigation,
        CaseState::InCustody,
        CaseState::PendingSupervisorVisa,
        CaseState::TransmittedToProsecutor,
        CaseState::AssignedToJudge,
        CaseState::Dismissed,
        CaseState::Enrolled,
        CaseState::HearingScheduled,
        CaseState::Adjourned,
        CaseState::Completed,
        CaseState::Appealed,
        CaseState::Closed,
    ];

    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::UnderInvestigation => "UNDER_INVESTIGATION",
            Self::InCustody => "IN_CUSTODY",
            Self::PendingSupervisorVisa => "PENDING_SUPERVISOR_VISA",
            Self::TransmittedToProsecutor => "TRANSMITTED_TO_PROSECUTOR",
            Self::AssignedToJudge => "ASSIGNED_TO_JUDGE",
            Self::Dismissed => "DISMISSED",
            Self::Enrolled => "ENROLLED",
            Self::HearingScheduled => "HEARING_SCHEDULED",
            Self::Adjourned => "ADJOURNED",
            Self::Completed => "COMPLETED",
            Self::Appealed => "APPEALED",
            Self::Closed => "CLOSED",
        }
    }

    /// Whether this state is terminal (no outgoing edges).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dismissed | Self::Appealed | Self::Closed)
    }

    /// Whether the case has been enrolled, i.e. carries an RG number and an
    /// assigned judge.
    pub fn is_enrolled(&self) -> bool {
        matches!(
            self,
            Self::Enrolled
                | Self::HearingScheduled
                | Self::Adjourned
                | Self::Completed
                | Self::Appealed
                | Self::Closed
        )
    }

    /// Edges leaving this state, in table order.
    pub fn outgoing(&self) -> impl Iterator<Item = &'static Transition> + '_ {
        TRANSITIONS.iter().filter(move |t| t.from == *self)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> Vec<CaseState> {
        let mut targets: Vec<CaseState> = Vec::new();
        for t in self.outgoing() {
            if !targets.contains(&t.to) {
                targets.push(t.to);
            }
        }
        targets
    }
}

impl std::fmt::Display for CaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `UNDER_INVESTIGATION`, `UnderInvestigation`, `under_investigation`.
impl FromStr for CaseState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .iter()
            .copied()
            .find(|st| normalize(st.as_str()) == wanted)
            .ok_or_else(|| ValidationError::UnknownState(s.to_string()))
    }
}

// ─── Case Action ─────────────────────────────────────────────────────

/// A workflow action an actor asks to perform on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseAction {
    /// Police pick up a submitted complaint.
    BeginInvestigation,
    /// Police place a suspect in custody.
    PlaceInCustody,
    /// Commissaire renews custody once.
    ExtendCustody,
    /// Custody ends, investigation continues.
    ReleaseCustody,
    /// Police submit the report for the commissaire's visa.
    RequestVisa,
    /// Commissaire endorses the report; the file goes to the prosecutor.
    GrantVisa,
    /// Commissaire sends the report back.
    RejectVisa,
    /// Prosecutor opens a judicial instruction (réquisitoire).
    OpenInstruction,
    /// Prosecutor drops the case.
    Dismiss,
    /// Prosecutor returns the file to the police.
    ReturnForMoreInvestigation,
    /// Clerk registers the case on the court roll.
    Enroll,
    /// Clerk sets a hearing date.
    ScheduleHearing,
    /// The hearing is postponed.
    Adjourn,
    /// Judge renders judgment.
    Complete,
    /// A party appeals the judgment.
    Appeal,
    /// Clerk closes the case.
    Close,
}

impl CaseAction {
    /// Every action, in table order.
    pub const ALL: [CaseAction; 16] = [
        CaseAction::BeginInvestigation,
        CaseAction::PlaceInCustody,
        CaseAction::ExtendCustody,
        CaseAction::ReleaseCustody,
        CaseAction::RequestVisa,
        CaseAction::GrantVisa,
        CaseAction::RejectVisa,
        CaseAction::OpenInstruction,
        CaseAction::Dismiss,
        CaseAction::ReturnForMoreInvestigation,
        CaseAction::Enroll,
        CaseAction::ScheduleHearing,
        CaseAction::Adjourn,
        CaseAction::Complete,
        CaseAction::Appeal,
        CaseAction::Close,
    ];

    /// The wire name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeginInvestigation => "beginInvestigation",
            Self::PlaceInCustody => "placeInCustody",
            Self::ExtendCustody => "extendCustody",
            Self::ReleaseCustody => "releaseCustody",
            Self::RequestVisa => "requestVisa",
            Self::GrantVisa => "grantVisa",
            Self::RejectVisa => "rejectVisa",
            Self::OpenInstruction => "openInstruction",
            Self::Dismiss => "dismiss",
            Self::ReturnForMoreInvestigation => "returnForMoreInvestigation",
            Self::Enroll => "enroll",
            Self::ScheduleHearing => "scheduleHearing",
            Self::Adjourn => "adjourn",
            Self::Complete => "complete",
            Self::Appeal => "appeal",
            Self::Close => "close",
        }
    }

    /// Whether firing this action must append to the hearing ledger in the
    /// same commit.
    pub fn records_hearing(&self) -> bool {
        matches!(self, Self::ScheduleHearing | Self::Adjourn | Self::Complete)
    }
}

impl std::fmt::Display for CaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `scheduleHearing`, `SCHEDULE_HEARING`, `schedule-hearing`.
impl FromStr for CaseAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .iter()
            .copied()
            .find(|a| normalize(a.as_str()) == wanted)
            .ok_or_else(|| ValidationError::UnknownAction(s.to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ─── Transition Table ────────────────────────────────────────────────

/// One edge of the lifecycle graph and the roles allowed to fire it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Source state.
    pub from: CaseState,
    /// Action naming the edge.
    pub action: CaseAction,
    /// Target state.
    pub to: CaseState,
    /// Roles permitted to fire this edge.
    pub allowed_roles: &'static [Role],
}

impl Transition {
    /// Whether `role` may fire this edge.
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }

    /// Whether this edge starts and ends in the same state.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

const fn edge(
    from: CaseState,
    action: CaseAction,
    to: CaseState,
    allowed_roles: &'static [Role],
) -> Transition {
    Transition {
        from,
        action,
        to,
        allowed_roles,
    }
}

use CaseAction as A;
use CaseState as S;

/// The authorization matrix. Each `(from, action)` pair appears at most once.
pub static TRANSITIONS: &[Transition] = &[
    edge(S::Submitted, A::BeginInvestigation, S::UnderInvestigation, &[Role::Police]),
    edge(S::UnderInvestigation, A::PlaceInCustody, S::InCustody, &[Role::Police]),
    edge(S::InCustody, A::ExtendCustody, S::InCustody, &[Role::Commissaire]),
    edge(
        S::InCustody,
        A::ReleaseCustody,
        S::UnderInvestigation,
        &[Role::Police, Role::Commissaire],
    ),
    edge(S::UnderInvestigation, A::RequestVisa, S::PendingSupervisorVisa, &[Role::Police]),
    edge(S::PendingSupervisorVisa, A::GrantVisa, S::TransmittedToProsecutor, &[Role::Commissaire]),
    edge(S::PendingSupervisorVisa, A::RejectVisa, S::UnderInvestigation, &[Role::Commissaire]),
    edge(S::TransmittedToProsecutor, A::OpenInstruction, S::AssignedToJudge, &[Role::Prosecutor]),
    edge(S::TransmittedToProsecutor, A::Dismiss, S::Dismissed, &[Role::Prosecutor]),
    edge(
        S::TransmittedToProsecutor,
        A::ReturnForMoreInvestigation,
        S::UnderInvestigation,
        &[Role::Prosecutor],
    ),
    edge(S::AssignedToJudge, A::Enroll, S::Enrolled, &[Role::Clerk]),
    edge(S::Enrolled, A::ScheduleHearing, S::HearingScheduled, &[Role::Clerk]),
    edge(S::HearingScheduled, A::Adjourn, S::Adjourned, &[Role::Clerk, Role::Judge]),
    edge(S::Adjourned, A::ScheduleHearing, S::HearingScheduled, &[Role::Clerk]),
    edge(S::HearingScheduled, A::Complete, S::Completed, &[Role::Judge]),
    edge(
        S::Completed,
        A::Appeal,
        S::Appealed,
        &[Role::Judge, Role::Prosecutor, Role::Lawyer],
    ),
    edge(S::Completed, A::Close, S::Closed, &[Role::Clerk]),
];

/// Look up the edge for `(from, action)`, independent of who asks.
pub fn find_edge(from: CaseState, action: CaseAction) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.action == action)
}
