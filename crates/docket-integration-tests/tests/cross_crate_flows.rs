//! # Cross-Crate Flows
//!
//! Drives the orchestration layer over the in-memory repository with a
//! controlled clock: a case from complaint to closure, the hearing ledger it
//! leaves behind, the events it emits, and the CLI authorizer agreeing with
//! what the orchestration refuses.

use chrono::Duration;

use docket_api::events::Outbox;
use docket_api::orchestration::{
    execute_transition, file_case, CaseNumberAllocator, HearingDetails, TransitionCommand,
    TransitionContext, WorkflowError,
};
use docket_api::repository::{CaseFile, CaseRepository, InMemoryCaseRepository};
use docket_cli::check::decide;
use docket_cli::{EXIT_FORBIDDEN, EXIT_INVALID_TRANSITION};
use docket_core::{ActorId, ActorRef, CaseId, Role, Timestamp};
use docket_ledger::{calendar, HearingKind, HearingOutcome};
use docket_state::{custody_watchlist, AuthError, CaseAction, CaseState, UrgencyLevel};

struct Court {
    repo: InMemoryCaseRepository,
    outbox: Outbox,
    numbers: CaseNumberAllocator,
}

impl Court {
    fn new() -> Self {
        Self {
            repo: InMemoryCaseRepository::new(),
            outbox: Outbox::new(),
            numbers: CaseNumberAllocator::new(),
        }
    }

    fn ctx(&self) -> TransitionContext<'_> {
        TransitionContext {
            outbox: &self.outbox,
            case_numbers: &self.numbers,
        }
    }

    fn file(&self, role: Role, offence: &str, now: Timestamp) -> CaseFile {
        file_case(&self.repo, &actor(role), offence, now).unwrap()
    }

    fn try_step(
        &self,
        role: Role,
        id: CaseId,
        command: TransitionCommand,
        now: Timestamp,
    ) -> Result<CaseFile, WorkflowError> {
        execute_transition(&self.repo, self.ctx(), &actor(role), id, &command, now)
    }

    fn step(&self, role: Role, id: CaseId, action: CaseAction, now: Timestamp) -> CaseFile {
        let version = self.repo.get(id).unwrap().version;
        self.try_step(role, id, TransitionCommand::new(action, version), now)
            .unwrap_or_else(|e| panic!("{role} {action}: {e}"))
    }

    fn hearing_step(
        &self,
        role: Role,
        id: CaseId,
        action: CaseAction,
        at: Timestamp,
        room: Option<&str>,
        now: Timestamp,
    ) -> CaseFile {
        let version = self.repo.get(id).unwrap().version;
        let mut command = TransitionCommand::new(action, version);
        command.hearing = Some(HearingDetails {
            scheduled_at: Some(at),
            room: room.map(str::to_string),
        });
        self.try_step(role, id, command, now)
            .unwrap_or_else(|e| panic!("{role} {action}: {e}"))
    }

    fn enroll(&self, id: CaseId, now: Timestamp) -> CaseFile {
        let version = self.repo.get(id).unwrap().version;
        let mut command = TransitionCommand::new(CaseAction::Enroll, version);
        command.assigned_judge = Some(ActorId::new("juge-diallo").unwrap());
        self.try_step(Role::Clerk, id, command, now).unwrap()
    }
}

fn actor(role: Role) -> ActorRef {
    ActorRef::new(role, ActorId::new(format!("{role}-7")).unwrap())
}

fn t(raw: &str) -> Timestamp {
    Timestamp::parse(raw).unwrap()
}

/// Walk a case up to `ASSIGNED_TO_JUDGE`, one hour per step from `start`.
fn to_judge(court: &Court, id: CaseId, start: Timestamp) -> Timestamp {
    let mut now = start;
    for (role, action) in [
        (Role::Police, CaseAction::BeginInvestigation),
        (Role::Police, CaseAction::RequestVisa),
        (Role::Commissaire, CaseAction::GrantVisa),
        (Role::Prosecutor, CaseAction::OpenInstruction),
    ] {
        now = now.plus(Duration::hours(1));
        court.step(role, id, action, now);
    }
    now
}

#[test]
fn complaint_to_closure() {
    let court = Court::new();
    let filed_at = t("2026-01-05T08:00:00Z");
    let id = court.file(Role::Citizen, "abus de confiance", filed_at).id();

    // Investigation with a custody episode in the middle.
    court.step(Role::Police, id, CaseAction::BeginInvestigation, t("2026-01-05T09:00:00Z"));
    court.step(Role::Police, id, CaseAction::PlaceInCustody, t("2026-01-05T10:00:00Z"));
    court.step(Role::Commissaire, id, CaseAction::ExtendCustody, t("2026-01-06T20:00:00Z"));
    let released = court.step(Role::Commissaire, id, CaseAction::ReleaseCustody, t("2026-01-07T10:00:00Z"));
    assert!(released.case.custody().is_none());

    let mut now = t("2026-01-08T08:00:00Z");
    court.step(Role::Police, id, CaseAction::RequestVisa, now);
    court.step(Role::Commissaire, id, CaseAction::GrantVisa, now);
    court.step(Role::Prosecutor, id, CaseAction::OpenInstruction, now);
    let enrolled = court.enroll(id, now);
    assert_eq!(enrolled.case.case_number().unwrap().to_string(), "RG 2026/00001");

    // First hearing, adjourned once, then re-listed and judged.
    let first = t("2026-02-02T09:00:00Z");
    court.hearing_step(Role::Clerk, id, CaseAction::ScheduleHearing, first, Some("Salle 2"), now);
    now = first;
    let relisted = t("2026-03-02T09:00:00Z");
    court.hearing_step(Role::Judge, id, CaseAction::Adjourn, relisted, None, now);
    court.hearing_step(Role::Clerk, id, CaseAction::ScheduleHearing, relisted, Some("Salle 3"), now);
    now = relisted.plus(Duration::hours(3));
    court.step(Role::Judge, id, CaseAction::Complete, now);
    let closed = court.step(Role::Clerk, id, CaseAction::Close, now.plus(Duration::days(30)));

    assert_eq!(closed.case.status(), CaseState::Closed);
    assert!(closed.case.invariants_hold());
    assert_eq!(closed.version as usize, closed.case.transition_log().len() + 1);

    let ledger = &closed.hearings;
    ledger.verify_chain().unwrap();
    let shape: Vec<(HearingKind, HearingOutcome, &str)> = ledger
        .events()
        .iter()
        .map(|e| (e.kind, e.outcome, e.room.as_str()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (HearingKind::FirstAppearance, HearingOutcome::Scheduled, "Salle 2"),
            (HearingKind::Adjournment, HearingOutcome::Adjourned, "Salle 2"),
            (HearingKind::Adjournment, HearingOutcome::Scheduled, "Salle 3"),
            (HearingKind::Verdict, HearingOutcome::Completed, "Salle 3"),
        ]
    );

    // One event per committed transition, in commit order.
    let events = court.outbox.drain(100);
    assert_eq!(events.len(), closed.case.transition_log().len());
    assert!(events.windows(2).all(|w| w[0].version + 1 == w[1].version));
    assert_eq!(events.last().unwrap().to, CaseState::Closed);
}

#[test]
fn dismissal_and_appeal_are_terminal() {
    let court = Court::new();
    let start = t("2026-04-01T08:00:00Z");

    let dismissed = court.file(Role::Police, "tapage nocturne", start).id();
    court.step(Role::Police, dismissed, CaseAction::BeginInvestigation, start);
    court.step(Role::Police, dismissed, CaseAction::RequestVisa, start);
    court.step(Role::Commissaire, dismissed, CaseAction::GrantVisa, start);
    let file = court.step(Role::Prosecutor, dismissed, CaseAction::Dismiss, start);
    assert_eq!(file.case.status(), CaseState::Dismissed);

    let appealed = court.file(Role::Citizen, "faux en écriture", start).id();
    let now = to_judge(&court, appealed, start);
    court.enroll(appealed, now);
    let hearing = now.plus(Duration::days(7));
    court.hearing_step(Role::Clerk, appealed, CaseAction::ScheduleHearing, hearing, Some("Salle 1"), now);
    court.step(Role::Judge, appealed, CaseAction::Complete, hearing);
    let file = court.step(Role::Lawyer, appealed, CaseAction::Appeal, hearing.plus(Duration::days(2)));
    assert_eq!(file.case.status(), CaseState::Appealed);

    for id in [dismissed, appealed] {
        let version = court.repo.get(id).unwrap().version;
        let err = court
            .try_step(Role::Clerk, id, TransitionCommand::new(CaseAction::Close, version), start)
            .unwrap_err();
        assert_eq!(err.outcome_label(), "invalid_transition");
    }
}

#[test]
fn visa_rejection_loops_back_to_investigation() {
    let court = Court::new();
    let now = t("2026-04-01T08:00:00Z");
    let id = court.file(Role::Police, "recel", now).id();
    court.step(Role::Police, id, CaseAction::BeginInvestigation, now);
    court.step(Role::Police, id, CaseAction::RequestVisa, now);
    let back = court.step(Role::Commissaire, id, CaseAction::RejectVisa, now);
    assert_eq!(back.case.status(), CaseState::UnderInvestigation);
    court.step(Role::Police, id, CaseAction::RequestVisa, now);
    court.step(Role::Commissaire, id, CaseAction::GrantVisa, now);
    let returned = court.step(Role::Prosecutor, id, CaseAction::ReturnForMoreInvestigation, now);
    assert_eq!(returned.case.status(), CaseState::UnderInvestigation);
    assert_eq!(returned.version, 7);
}

#[test]
fn cli_check_agrees_with_orchestration_refusals() {
    let court = Court::new();
    let now = t("2026-04-01T08:00:00Z");
    let id = court.file(Role::Citizen, "vol simple", now).id();

    let err = court
        .try_step(Role::Judge, id, TransitionCommand::new(CaseAction::BeginInvestigation, 1), now)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Auth(AuthError::Forbidden { .. })));
    assert_eq!(
        decide(Role::Judge, CaseState::Submitted, CaseAction::BeginInvestigation).0,
        EXIT_FORBIDDEN
    );

    let err = court
        .try_step(Role::Clerk, id, TransitionCommand::new(CaseAction::Close, 1), now)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Auth(AuthError::InvalidTransition { .. })));
    assert_eq!(
        decide(Role::Clerk, CaseState::Submitted, CaseAction::Close).0,
        EXIT_INVALID_TRANSITION
    );
}

#[test]
fn watchlist_and_calendar_span_cases() {
    let court = Court::new();
    let start = t("2026-06-01T00:00:00Z");

    // Two detentions started twelve hours apart.
    let early = court.file(Role::Police, "vol à main armée", start).id();
    let late = court.file(Role::Police, "coups et blessures", start).id();
    court.step(Role::Police, early, CaseAction::BeginInvestigation, start);
    court.step(Role::Police, early, CaseAction::PlaceInCustody, start);
    court.step(Role::Police, late, CaseAction::BeginInvestigation, start);
    court.step(Role::Police, late, CaseAction::PlaceInCustody, start.plus(Duration::hours(12)));

    let now = start.plus(Duration::hours(40));
    let files = court.repo.list();
    let watchlist = custody_watchlist(files.iter().map(|f| &f.case), now);
    let order: Vec<CaseId> = watchlist.iter().map(|e| e.case_id).collect();
    assert_eq!(order, vec![early, late]);
    assert_eq!(watchlist[0].clock.remaining_hours(), 8);
    assert_eq!(watchlist[0].clock.level, UrgencyLevel::Warning);
    assert_eq!(watchlist[1].clock.level, UrgencyLevel::Normal);

    // Hearings in two cases, one outside the window.
    let a = court.file(Role::Citizen, "escroquerie", start).id();
    let b = court.file(Role::Citizen, "abus de biens sociaux", start).id();
    for id in [a, b] {
        let now = to_judge(&court, id, start);
        court.enroll(id, now);
    }
    let now = start.plus(Duration::hours(6));
    court.hearing_step(Role::Clerk, a, CaseAction::ScheduleHearing, t("2026-06-20T09:00:00Z"), Some("Salle 1"), now);
    court.hearing_step(Role::Clerk, b, CaseAction::ScheduleHearing, t("2026-06-10T09:00:00Z"), Some("Salle 4"), now);

    let files = court.repo.list();
    let events = calendar(
        files.iter().map(|f| &f.hearings),
        t("2026-06-01T00:00:00Z"),
        t("2026-06-15T00:00:00Z"),
    );
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].case_id, b);

    let events = calendar(
        files.iter().map(|f| &f.hearings),
        t("2026-06-01T00:00:00Z"),
        t("2026-07-01T00:00:00Z"),
    );
    let rooms: Vec<&str> = events.iter().map(|e| e.room.as_str()).collect();
    assert_eq!(rooms, vec!["Salle 4", "Salle 1"]);
}
