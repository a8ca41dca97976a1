//! # Case Aggregate
//!
//! A [`Case`] owns its workflow status, its custody record, its enrollment
//! data and its transition log. The status field is private: the only
//! mutation path is [`Case::apply_transition`], which requires a
//! [`Grant`] from the authorizer.
//!
//! ## Invariants
//!
//! - `custody` is present iff `status == InCustody`.
//! - `assigned_judge` and `case_number` are present iff the status is
//!   `Enrolled` or later.
//! - The transition log only grows.
//!
//! `apply_transition` computes every new field before touching `self`, so a
//! rejected transition leaves the case exactly as it was.

use serde::Serialize;

use docket_core::{ActorId, ActorRef, CaseId, CaseNumber, Timestamp, ValidationError};

use crate::authorize::Grant;
use crate::error::{FilingError, TransitionError};
use crate::lifecycle::{CaseAction, CaseState};
use crate::registry::can_file;

/// Maximum length of the offence qualification, in characters.
pub const MAX_OFFENCE_LEN: usize = 500;

// ─── Records ─────────────────────────────────────────────────────────

/// The running custody measure. Present only while the case is in custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustodyRecord {
    /// When the suspect was placed in custody.
    pub custody_start: Timestamp,
    /// Whether the commissaire renewed the measure.
    pub extended: bool,
}

/// One entry of a case's transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    /// Status before the transition.
    pub from: CaseState,
    /// Status after the transition.
    pub to: CaseState,
    /// Action that was fired.
    pub action: CaseAction,
    /// Who fired it.
    pub by: ActorRef,
    /// When.
    pub at: Timestamp,
}

/// Extra data some transitions need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInput {
    /// Commit time of the transition.
    pub now: Timestamp,
    /// Judge to assign. Required by `enroll`.
    pub assigned_judge: Option<ActorId>,
    /// RG number to assign. Required by `enroll`.
    pub case_number: Option<CaseNumber>,
}

impl TransitionInput {
    /// Input carrying only the commit time.
    pub fn at(now: Timestamp) -> Self {
        Self {
            now,
            assigned_judge: None,
            case_number: None,
        }
    }

    /// Attach the judge to assign at enrollment.
    pub fn with_judge(mut self, judge: ActorId) -> Self {
        self.assigned_judge = Some(judge);
        self
    }

    /// Attach the RG number to assign at enrollment.
    pub fn with_case_number(mut self, number: CaseNumber) -> Self {
        self.case_number = Some(number);
        self
    }
}

// ─── Case ────────────────────────────────────────────────────────────

/// A citizen complaint and everything that follows from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    id: CaseId,
    status: CaseState,
    offence: String,
    filed_at: Timestamp,
    filed_by: ActorRef,
    assigned_judge: Option<ActorId>,
    case_number: Option<CaseNumber>,
    custody: Option<CustodyRecord>,
    transition_log: Vec<TransitionRecord>,
}

impl Case {
    /// Open a new case in `Submitted`.
    ///
    /// # Errors
    ///
    /// [`FilingError::RoleCannotFile`] unless the filer is a citizen or a
    /// police officer; [`FilingError::Invalid`] for an empty or oversized
    /// offence.
    pub fn file(
        filed_by: ActorRef,
        offence: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, FilingError> {
        if !can_file(filed_by.role) {
            return Err(FilingError::RoleCannotFile {
                role: filed_by.role,
            });
        }
        let offence = offence.into().trim().to_string();
        if offence.is_empty() {
            return Err(ValidationError::InvalidOffence("offence must not be empty".into()).into());
        }
        if offence.chars().count() > MAX_OFFENCE_LEN {
            return Err(ValidationError::InvalidOffence(format!(
                "offence exceeds {MAX_OFFENCE_LEN} characters"
            ))
            .into());
        }
        Ok(Self {
            id: CaseId::new(),
            status: CaseState::Submitted,
            offence,
            filed_at: now,
            filed_by,
            assigned_judge: None,
            case_number: None,
            custody: None,
            transition_log: Vec::new(),
        })
    }

    /// Case identifier.
    pub fn id(&self) -> CaseId {
        self.id
    }

    /// Current workflow status.
    pub fn status(&self) -> CaseState {
        self.status
    }

    /// Provisional legal qualification.
    pub fn offence(&self) -> &str {
        &self.offence
    }

    /// Filing time.
    pub fn filed_at(&self) -> Timestamp {
        self.filed_at
    }

    /// Who filed the complaint.
    pub fn filed_by(&self) -> &ActorRef {
        &self.filed_by
    }

    /// Judge assigned at enrollment.
    pub fn assigned_judge(&self) -> Option<&ActorId> {
        self.assigned_judge.as_ref()
    }

    /// RG number assigned at enrollment.
    pub fn case_number(&self) -> Option<CaseNumber> {
        self.case_number
    }

    /// Running custody measure, if any.
    pub fn custody(&self) -> Option<&CustodyRecord> {
        self.custody.as_ref()
    }

    /// Every transition applied so far, oldest first.
    pub fn transition_log(&self) -> &[TransitionRecord] {
        &self.transition_log
    }

    /// Apply an authorized transition.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::GrantMismatch`] if the grant names another case.
    /// - [`TransitionError::InvalidTransition`] if the status moved since the
    ///   grant was issued.
    /// - [`TransitionError::CustodyAlreadyExtended`] on a second renewal.
    /// - [`TransitionError::MissingTransitionData`] when enrolling without a
    ///   judge or an RG number.
    pub fn apply_transition(
        &mut self,
        grant: Grant,
        input: &TransitionInput,
    ) -> Result<TransitionRecord, TransitionError> {
        if grant.case_id() != self.id {
            return Err(TransitionError::GrantMismatch {
                granted: grant.case_id(),
                target: self.id,
            });
        }
        let edge = grant.edge();
        if edge.from != self.status {
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                action: edge.action,
            });
        }

        let mut custody = self.custody;
        let mut assigned_judge = self.assigned_judge.clone();
        let mut case_number = self.case_number;

        match edge.action {
            CaseAction::ExtendCustody => {
                let record = custody.as_mut().ok_or(TransitionError::InvalidTransition {
                    from: self.status,
                    action: edge.action,
                })?;
                if record.extended {
                    return Err(TransitionError::CustodyAlreadyExtended { case_id: self.id });
                }
                record.extended = true;
            }
            CaseAction::Enroll => {
                let judge = input.assigned_judge.clone().ok_or(
                    TransitionError::MissingTransitionData {
                        action: edge.action,
                        field: "assigned_judge",
                    },
                )?;
                let number = input.case_number.ok_or(TransitionError::MissingTransitionData {
                    action: edge.action,
                    field: "case_number",
                })?;
                assigned_judge = Some(judge);
                case_number = Some(number);
            }
            _ => {}
        }

        if edge.to == CaseState::InCustody {
            if edge.from != CaseState::InCustody {
                custody = Some(CustodyRecord {
                    custody_start: input.now,
                    extended: false,
                });
            }
        } else {
            custody = None;
        }

        let record = TransitionRecord {
            from: self.status,
            to: edge.to,
            action: edge.action,
            by: grant.actor().clone(),
            at: input.now,
        };

        self.status = edge.to;
        self.custody = custody;
        self.assigned_judge = assigned_judge;
        self.case_number = case_number;
        self.transition_log.push(record.clone());
        Ok(record)
    }

    /// Whether the structural invariants listed in the module docs hold.
    pub fn invariants_hold(&self) -> bool {
        let custody_ok = self.custody.is_some() == (self.status == CaseState::InCustody);
        let enrolled = self.status.is_enrolled();
        let enrollment_ok = self.assigned_judge.is_some() == enrolled
            && self.case_number.is_some() == enrolled;
        let log_ok = self
            .transition_log
            .last()
            .map_or(self.status == CaseState::Submitted, |r| r.to == self.status);
        custody_ok && enrollment_ok && log_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorize::authorize;
    use chrono::Duration;
    use docket_core::Role;

    fn actor(role: Role) -> ActorRef {
        ActorRef::new(role, ActorId::new(format!("{role}-7")).unwrap())
    }

    fn t0() -> Timestamp {
        Timestamp::parse("2026-02-10T08:00:00Z").unwrap()
    }

    fn fire(case: &mut Case, role: Role, action: CaseAction, input: &TransitionInput) -> Result<TransitionRecord, TransitionError> {
        let grant = authorize(&actor(role), case, action).expect("authorized");
        case.apply_transition(grant, input)
    }

    fn new_case() -> Case {
        Case::file(actor(Role::Citizen), "coups et blessures", t0()).unwrap()
    }

    fn in_custody() -> Case {
        let mut case = new_case();
        fire(&mut case, Role::Police, CaseAction::BeginInvestigation, &TransitionInput::at(t0())).unwrap();
        fire(&mut case, Role::Police, CaseAction::PlaceInCustody, &TransitionInput::at(t0())).unwrap();
        case
    }

    // ── Filing ──────────────────────────────────────────────────────

    #[test]
    fn filing_starts_in_submitted() {
        let case = new_case();
        assert_eq!(case.status(), CaseState::Submitted);
        assert_eq!(case.filed_at(), t0());
        assert_eq!(case.filed_by().role, Role::Citizen);
        assert!(case.transition_log().is_empty());
        assert!(case.invariants_hold());
    }

    #[test]
    fn police_may_file() {
        assert!(Case::file(actor(Role::Police), "flagrant délit", t0()).is_ok());
    }

    #[test]
    fn judge_may_not_file() {
        assert_eq!(
            Case::file(actor(Role::Judge), "x", t0()).unwrap_err(),
            FilingError::RoleCannotFile { role: Role::Judge }
        );
    }

    #[test]
    fn offence_is_validated() {
        assert!(matches!(
            Case::file(actor(Role::Citizen), "   ", t0()),
            Err(FilingError::Invalid(ValidationError::InvalidOffence(_)))
        ));
        assert!(Case::file(actor(Role::Citizen), "a".repeat(501), t0()).is_err());
        assert!(Case::file(actor(Role::Citizen), "a".repeat(500), t0()).is_ok());
    }

    // ── Custody ─────────────────────────────────────────────────────

    #[test]
    fn entering_custody_starts_the_clock() {
        let case = in_custody();
        let custody = case.custody().unwrap();
        assert_eq!(custody.custody_start, t0());
        assert!(!custody.extended);
        assert!(case.invariants_hold());
    }

    #[test]
    fn extension_keeps_start_and_sets_flag() {
        let mut case = in_custody();
        let later = TransitionInput::at(t0().plus(Duration::hours(40)));
        fire(&mut case, Role::Commissaire, CaseAction::ExtendCustody, &later).unwrap();
        let custody = case.custody().unwrap();
        assert_eq!(custody.custody_start, t0());
        assert!(custody.extended);
        assert_eq!(case.status(), CaseState::InCustody);
    }

    #[test]
    fn second_extension_is_refused_without_side_effects() {
        let mut case = in_custody();
        let input = TransitionInput::at(t0());
        fire(&mut case, Role::Commissaire, CaseAction::ExtendCustody, &input).unwrap();
        let before = case.clone();
        let err = fire(&mut case, Role::Commissaire, CaseAction::ExtendCustody, &input).unwrap_err();
        assert_eq!(err, TransitionError::CustodyAlreadyExtended { case_id: case.id() });
        assert_eq!(case, before);
    }

    #[test]
    fn release_clears_custody() {
        let mut case = in_custody();
        fire(&mut case, Role::Commissaire, CaseAction::ReleaseCustody, &TransitionInput::at(t0())).unwrap();
        assert_eq!(case.status(), CaseState::UnderInvestigation);
        assert!(case.custody().is_none());
        assert!(case.invariants_hold());
    }

    #[test]
    fn re_entering_custody_restarts_the_clock() {
        let mut case = in_custody();
        fire(&mut case, Role::Commissaire, CaseAction::ExtendCustody, &TransitionInput::at(t0())).unwrap();
        fire(&mut case, Role::Police, CaseAction::ReleaseCustody, &TransitionInput::at(t0())).unwrap();
        let again = t0().plus(Duration::days(3));
        fire(&mut case, Role::Police, CaseAction::PlaceInCustody, &TransitionInput::at(again)).unwrap();
        let custody = case.custody().unwrap();
        assert_eq!(custody.custody_start, again);
        assert!(!custody.extended);
    }

    #[test]
    fn visa_request_from_custody_is_not_an_edge() {
        let case = in_custody();
        assert!(authorize(&actor(Role::Police), &case, CaseAction::RequestVisa).is_err());
    }

    // ── Enrollment ──────────────────────────────────────────────────

    fn assigned_to_judge() -> Case {
        let mut case = new_case();
        let input = TransitionInput::at(t0());
        fire(&mut case, Role::Police, CaseAction::BeginInvestigation, &input).unwrap();
        fire(&mut case, Role::Police, CaseAction::RequestVisa, &input).unwrap();
        fire(&mut case, Role::Commissaire, CaseAction::GrantVisa, &input).unwrap();
        fire(&mut case, Role::Prosecutor, CaseAction::OpenInstruction, &input).unwrap();
        case
    }

    #[test]
    fn enroll_requires_judge_and_number() {
        let mut case = assigned_to_judge();
        let before = case.clone();

        let err = fire(&mut case, Role::Clerk, CaseAction::Enroll, &TransitionInput::at(t0())).unwrap_err();
        assert_eq!(
            err,
            TransitionError::MissingTransitionData {
                action: CaseAction::Enroll,
                field: "assigned_judge",
            }
        );
        let only_judge = TransitionInput::at(t0()).with_judge(ActorId::new("juge-3").unwrap());
        let err = fire(&mut case, Role::Clerk, CaseAction::Enroll, &only_judge).unwrap_err();
        assert!(matches!(err, TransitionError::MissingTransitionData { field: "case_number", .. }));
        assert_eq!(case, before);
    }

    #[test]
    fn enroll_assigns_judge_and_rg_number() {
        let mut case = assigned_to_judge();
        let input = TransitionInput::at(t0())
            .with_judge(ActorId::new("juge-3").unwrap())
            .with_case_number(CaseNumber::new(2026, 12).unwrap());
        fire(&mut case, Role::Clerk, CaseAction::Enroll, &input).unwrap();
        assert_eq!(case.status(), CaseState::Enrolled);
        assert_eq!(case.assigned_judge().map(ActorId::as_str), Some("juge-3"));
        assert_eq!(case.case_number().map(|n| n.to_string()).as_deref(), Some("RG 2026/00012"));
        assert!(case.invariants_hold());
    }

    // ── Grants ──────────────────────────────────────────────────────

    #[test]
    fn grant_for_another_case_is_refused() {
        let other = new_case();
        let mut case = new_case();
        let grant = authorize(&actor(Role::Police), &other, CaseAction::BeginInvestigation).unwrap();
        let err = case.apply_transition(grant, &TransitionInput::at(t0())).unwrap_err();
        assert!(matches!(err, TransitionError::GrantMismatch { .. }));
        assert_eq!(case.status(), CaseState::Submitted);
    }

    #[test]
    fn stale_grant_is_refused() {
        let mut case = new_case();
        let grant = authorize(&actor(Role::Police), &case, CaseAction::BeginInvestigation).unwrap();
        let replay = grant.clone();
        case.apply_transition(grant, &TransitionInput::at(t0())).unwrap();
        let err = case.apply_transition(replay, &TransitionInput::at(t0())).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: CaseState::UnderInvestigation,
                action: CaseAction::BeginInvestigation,
            }
        );
        assert_eq!(case.transition_log().len(), 1);
    }

    #[test]
    fn log_records_actor_and_time() {
        let mut case = new_case();
        let at = t0().plus(Duration::minutes(5));
        let record = fire(&mut case, Role::Police, CaseAction::BeginInvestigation, &TransitionInput::at(at)).unwrap();
        assert_eq!(record.from, CaseState::Submitted);
        assert_eq!(record.to, CaseState::UnderInvestigation);
        assert_eq!(record.by.role, Role::Police);
        assert_eq!(record.at, at);
        assert_eq!(case.transition_log(), &[record]);
    }

    #[test]
    fn case_serializes_status_name() {
        let case = new_case();
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["status"], "SUBMITTED");
        assert!(json["custody"].is_null());
    }
}
