//! # Transition Orchestration
//!
//! Runs one workflow request end to end:
//!
//! ```text
//! load ─▶ staleness check ─▶ authorize ─▶ apply on working copy
//!      ─▶ ledger append (hearing actions) ─▶ conditional commit ─▶ outbox
//! ```
//!
//! Every step before the commit works on a clone of the stored
//! [`CaseFile`]. If any step fails the clone is dropped and the store is
//! untouched, so a status change is never persisted without its ledger
//! entry, and a ledger entry never without its status change.
//!
//! Route handlers call into this module and never mutate cases themselves.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Datelike;
use parking_lot::Mutex;
use thiserror::Error;

use docket_core::{ActorId, ActorRef, CaseId, CaseNumber, Timestamp, ValidationError};
use docket_ledger::{HearingKind, HearingOutcome, LedgerError, NewHearingEvent};
use docket_state::{
    authorize, AuthError, Case, CaseAction, CaseState, FilingError, TransitionError,
    TransitionInput,
};

use crate::events::{CaseTransitioned, Outbox};
use crate::repository::{CaseFile, CaseRepository, RepositoryError};

// ─── Commands ────────────────────────────────────────────────────────

/// Hearing data carried by `scheduleHearing` and `adjourn`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HearingDetails {
    /// Hearing date, or proposed new date for an adjournment.
    pub scheduled_at: Option<Timestamp>,
    /// Courtroom. Defaults to the previous hearing's room on adjournment.
    pub room: Option<String>,
}

/// A transition request after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommand {
    pub action: CaseAction,
    /// Version the caller last read.
    pub expected_version: u64,
    /// Status the caller last read, if it wants that checked too.
    pub expected_status: Option<CaseState>,
    pub hearing: Option<HearingDetails>,
    /// Judge to assign at enrollment.
    pub assigned_judge: Option<ActorId>,
}

impl TransitionCommand {
    /// A bare command for `action` at `expected_version`.
    pub fn new(action: CaseAction, expected_version: u64) -> Self {
        Self {
            action,
            expected_version,
            expected_status: None,
            hearing: None,
            assigned_judge: None,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from the orchestration layer.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0} not found")]
    NotFound(CaseId),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Filing(#[from] FilingError),

    /// The caller's version or status no longer matches the store.
    #[error("{case_id} is at version {current_version} ({current_status}), request expected version {expected_version}")]
    StaleState {
        case_id: CaseId,
        expected_version: u64,
        current_version: u64,
        current_status: CaseState,
    },

    #[error("{action} requires hearing {field}")]
    MissingHearingDetails {
        action: CaseAction,
        field: &'static str,
    },

    /// The ledger refused the entry; the transition was rolled back.
    #[error("{action} on {case_id} rolled back: {source}")]
    TransactionFailed {
        case_id: CaseId,
        action: CaseAction,
        #[source]
        source: LedgerError,
    },

    #[error("cannot allocate an RG number: {0}")]
    CaseNumberExhausted(ValidationError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Short label used as the `outcome` metric dimension.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Auth(AuthError::InvalidTransition { .. })
            | Self::Transition(TransitionError::InvalidTransition { .. }) => "invalid_transition",
            Self::Auth(AuthError::Forbidden { .. }) => "forbidden",
            Self::StaleState { .. } => "stale_state",
            Self::TransactionFailed { .. } => "transaction_failed",
            Self::Transition(_) | Self::MissingHearingDetails { .. } | Self::Filing(_) => {
                "rejected"
            }
            Self::CaseNumberExhausted(_) | Self::Storage(_) => "error",
        }
    }
}

// ─── RG Number Allocation ────────────────────────────────────────────

/// Hands out RG numbers, one sequence per registry year.
///
/// Numbers are allocated before the commit; a commit that then fails leaves
/// a gap in the sequence, never a duplicate.
#[derive(Debug, Clone, Default)]
pub struct CaseNumberAllocator {
    next: Arc<Mutex<HashMap<i32, u32>>>,
}

impl CaseNumberAllocator {
    /// Create an allocator starting at sequence 1 for every year.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next number for the year of `now`.
    pub fn allocate(&self, now: Timestamp) -> Result<CaseNumber, ValidationError> {
        let year = now.as_datetime().year();
        let mut next = self.next.lock();
        let seq = next.entry(year).or_insert(1);
        let number = CaseNumber::new(year, *seq)?;
        *seq += 1;
        Ok(number)
    }
}

// ─── Operations ──────────────────────────────────────────────────────

/// File a new complaint.
pub fn file_case(
    repo: &dyn CaseRepository,
    caller: &ActorRef,
    offence: &str,
    now: Timestamp,
) -> Result<CaseFile, WorkflowError> {
    let case = Case::file(caller.clone(), offence, now)?;
    let file = CaseFile::new(case);
    repo.insert(file.clone())
        .map_err(|e| WorkflowError::Storage(e.to_string()))?;
    tracing::info!(
        case_id = %file.id(),
        filed_by = %caller,
        "case filed"
    );
    Ok(file)
}

/// Collaborators a transition needs besides the repository.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub outbox: &'a Outbox,
    pub case_numbers: &'a CaseNumberAllocator,
}

/// Execute one authorized transition atomically.
///
/// Records the `docket_transitions_total{action,outcome}` counter whatever
/// the outcome.
pub fn execute_transition(
    repo: &dyn CaseRepository,
    ctx: TransitionContext<'_>,
    caller: &ActorRef,
    case_id: CaseId,
    command: &TransitionCommand,
    now: Timestamp,
) -> Result<CaseFile, WorkflowError> {
    let result = run_transition(repo, ctx, caller, case_id, command, now);
    let outcome = match &result {
        Ok(_) => "committed",
        Err(e) => e.outcome_label(),
    };
    metrics::counter!(
        "docket_transitions_total",
        "action" => command.action.as_str(),
        "outcome" => outcome,
    )
    .increment(1);

    match &result {
        Ok(file) => tracing::info!(
            case_id = %case_id,
            action = %command.action,
            status = %file.case.status(),
            version = file.version,
            actor = %caller,
            "case transition committed"
        ),
        Err(e @ (WorkflowError::Auth(_) | WorkflowError::StaleState { .. })) => tracing::warn!(
            case_id = %case_id,
            action = %command.action,
            actor = %caller,
            outcome,
            error = %e,
            "case transition refused"
        ),
        Err(e @ (WorkflowError::Storage(_) | WorkflowError::CaseNumberExhausted(_))) => {
            tracing::error!(case_id = %case_id, action = %command.action, error = %e, "case transition failed")
        }
        Err(e) => tracing::info!(
            case_id = %case_id,
            action = %command.action,
            outcome,
            error = %e,
            "case transition rejected"
        ),
    }
    result
}

fn run_transition(
    repo: &dyn CaseRepository,
    ctx: TransitionContext<'_>,
    caller: &ActorRef,
    case_id: CaseId,
    command: &TransitionCommand,
    now: Timestamp,
) -> Result<CaseFile, WorkflowError> {
    let current = repo.get(case_id).ok_or(WorkflowError::NotFound(case_id))?;

    let status = current.case.status();
    let status_mismatch = command.expected_status.is_some_and(|s| s != status);
    if current.version != command.expected_version || status_mismatch {
        return Err(WorkflowError::StaleState {
            case_id,
            expected_version: command.expected_version,
            current_version: current.version,
            current_status: status,
        });
    }

    let grant = authorize(caller, &current.case, command.action)?;

    let mut next = current.clone();
    let mut input = TransitionInput::at(now);
    if command.action == CaseAction::Enroll {
        if let Some(judge) = &command.assigned_judge {
            input = input
                .with_judge(judge.clone())
                .with_case_number(
                    ctx.case_numbers
                        .allocate(now)
                        .map_err(WorkflowError::CaseNumberExhausted)?,
                );
        }
    }
    let record = next.case.apply_transition(grant, &input)?;

    if let Some(entry) = hearing_entry(&next, caller, command, now)? {
        next.hearings
            .append(entry, now)
            .map_err(|source| WorkflowError::TransactionFailed {
                case_id,
                action: command.action,
                source,
            })?;
    }

    next.version = current.version + 1;
    repo.commit(case_id, current.version, next.clone())
        .map_err(|e| match e {
            RepositoryError::VersionConflict { actual, .. } => WorkflowError::StaleState {
                case_id,
                expected_version: command.expected_version,
                current_version: actual,
                current_status: repo
                    .get(case_id)
                    .map_or(status, |f| f.case.status()),
            },
            RepositoryError::NotFound(id) => WorkflowError::NotFound(id),
            other => WorkflowError::Storage(other.to_string()),
        })?;

    ctx.outbox.push(CaseTransitioned {
        case_id,
        from: record.from,
        to: record.to,
        action: record.action,
        by: record.by,
        at: record.at,
        version: next.version,
    });
    Ok(next)
}

/// Build the ledger entry a hearing action must append.
///
/// - `scheduleHearing`: first appearance if the ledger is empty, otherwise a
///   re-listing after adjournment. Needs a date; an absent room is passed on
///   blank so the ledger rejects it.
/// - `adjourn`: an `adjourned` record carrying the proposed new date, in the
///   same room unless another is given.
/// - `complete`: a verdict record at `now` in the room of the last hearing.
///
/// Every other action leaves the ledger untouched and yields `None`.
fn hearing_entry(
    file: &CaseFile,
    caller: &ActorRef,
    command: &TransitionCommand,
    now: Timestamp,
) -> Result<Option<NewHearingEvent>, WorkflowError> {
    let details = command.hearing.clone().unwrap_or_default();
    let last_room = file.hearings.latest_event().map(|e| e.room.clone());
    let missing = |field| WorkflowError::MissingHearingDetails {
        action: command.action,
        field,
    };

    let (scheduled_at, room, kind, outcome) = match command.action {
        CaseAction::ScheduleHearing => {
            let kind = if file.hearings.is_empty() {
                HearingKind::FirstAppearance
            } else {
                HearingKind::Adjournment
            };
            (
                details.scheduled_at.ok_or_else(|| missing("scheduled_at"))?,
                details.room.unwrap_or_default(),
                kind,
                HearingOutcome::Scheduled,
            )
        }
        CaseAction::Adjourn => (
            details.scheduled_at.ok_or_else(|| missing("scheduled_at"))?,
            details.room.or(last_room).unwrap_or_default(),
            HearingKind::Adjournment,
            HearingOutcome::Adjourned,
        ),
        CaseAction::Complete => (
            now,
            details.room.or(last_room).unwrap_or_default(),
            HearingKind::Verdict,
            HearingOutcome::Completed,
        ),
        _ => return Ok(None),
    };

    Ok(Some(NewHearingEvent {
        case_id: file.id(),
        scheduled_at,
        room,
        kind,
        outcome,
        recorded_by: caller.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCaseRepository;
    use chrono::Duration;
    use docket_core::Role;

    struct Harness {
        repo: InMemoryCaseRepository,
        outbox: Outbox,
        numbers: CaseNumberAllocator,
    }

    impl Harness {
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

        fn run(
            &self,
            role: Role,
            id: CaseId,
            cmd: TransitionCommand,
            now: Timestamp,
        ) -> Result<CaseFile, WorkflowError> {
            execute_transition(&self.repo, self.ctx(), &actor(role), id, &cmd, now)
        }

        fn step(&self, role: Role, id: CaseId, cmd: TransitionCommand) -> CaseFile {
            self.run(role, id, cmd, t0()).unwrap()
        }
    }

    fn actor(role: Role) -> ActorRef {
        ActorRef::new(role, ActorId::new(format!("{role}-9")).unwrap())
    }

    fn t0() -> Timestamp {
        Timestamp::parse("2026-09-14T08:00:00Z").unwrap()
    }

    fn hearing(at: Timestamp, room: Option<&str>) -> Option<HearingDetails> {
        Some(HearingDetails {
            scheduled_at: Some(at),
            room: room.map(str::to_string),
        })
    }

    fn filed(h: &Harness) -> CaseFile {
        file_case(&h.repo, &actor(Role::Citizen), "escroquerie", t0()).unwrap()
    }

    fn enrolled(h: &Harness) -> CaseFile {
        let id = filed(h).id();
        let mut v = 1;
        for (role, action) in [
            (Role::Police, CaseAction::BeginInvestigation),
            (Role::Police, CaseAction::RequestVisa),
            (Role::Commissaire, CaseAction::GrantVisa),
            (Role::Prosecutor, CaseAction::OpenInstruction),
        ] {
            v = h.step(role, id, TransitionCommand::new(action, v)).version;
        }
        let mut enroll = TransitionCommand::new(CaseAction::Enroll, v);
        enroll.assigned_judge = Some(ActorId::new("juge-4").unwrap());
        h.step(Role::Clerk, id, enroll)
    }

    #[test]
    fn filing_stores_version_one() {
        let h = Harness::new();
        let file = filed(&h);
        assert_eq!(file.version, 1);
        assert_eq!(h.repo.get(file.id()), Some(file));
    }

    #[test]
    fn committed_transition_bumps_version_and_emits_event() {
        let h = Harness::new();
        let id = filed(&h).id();
        let file = h.step(Role::Police, id, TransitionCommand::new(CaseAction::BeginInvestigation, 1));
        assert_eq!(file.version, 2);
        assert_eq!(file.case.status(), CaseState::UnderInvestigation);
        let events = h.outbox.drain(10);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 2);
        assert_eq!(events[0].to, CaseState::UnderInvestigation);
    }

    #[test]
    fn replaying_the_same_version_never_advances_twice() {
        let h = Harness::new();
        let id = filed(&h).id();
        let cmd = TransitionCommand::new(CaseAction::BeginInvestigation, 1);
        h.step(Role::Police, id, cmd.clone());
        let err = h.run(Role::Police, id, cmd, t0()).unwrap_err();
        assert!(matches!(err, WorkflowError::StaleState { current_version: 2, .. }));
        assert_eq!(h.repo.get(id).unwrap().case.transition_log().len(), 1);
        assert_eq!(h.outbox.len(), 1);
    }

    #[test]
    fn expected_status_mismatch_is_stale() {
        let h = Harness::new();
        let id = filed(&h).id();
        let mut cmd = TransitionCommand::new(CaseAction::BeginInvestigation, 1);
        cmd.expected_status = Some(CaseState::InCustody);
        assert!(matches!(
            h.run(Role::Police, id, cmd, t0()),
            Err(WorkflowError::StaleState { .. })
        ));
    }

    #[test]
    fn forbidden_leaves_store_untouched() {
        let h = Harness::new();
        let before = filed(&h);
        let err = h
            .run(Role::Lawyer, before.id(), TransitionCommand::new(CaseAction::BeginInvestigation, 1), t0())
            .unwrap_err();
        assert_eq!(err.outcome_label(), "forbidden");
        assert_eq!(h.repo.get(before.id()), Some(before));
        assert!(h.outbox.is_empty());
    }

    #[test]
    fn enroll_allocates_sequential_rg_numbers() {
        let h = Harness::new();
        let a = enrolled(&h);
        let b = enrolled(&h);
        assert_eq!(a.case.case_number().unwrap().to_string(), "RG 2026/00001");
        assert_eq!(b.case.case_number().unwrap().to_string(), "RG 2026/00002");
    }

    #[test]
    fn enroll_without_judge_is_rejected() {
        let h = Harness::new();
        let id = filed(&h).id();
        let mut v = 1;
        for (role, action) in [
            (Role::Police, CaseAction::BeginInvestigation),
            (Role::Police, CaseAction::RequestVisa),
            (Role::Commissaire, CaseAction::GrantVisa),
            (Role::Prosecutor, CaseAction::OpenInstruction),
        ] {
            v = h.step(role, id, TransitionCommand::new(action, v)).version;
        }
        let err = h.run(Role::Clerk, id, TransitionCommand::new(CaseAction::Enroll, v), t0()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Transition(TransitionError::MissingTransitionData { .. })
        ));
    }

    #[test]
    fn schedule_hearing_appends_first_appearance() {
        let h = Harness::new();
        let file = enrolled(&h);
        let mut cmd = TransitionCommand::new(CaseAction::ScheduleHearing, file.version);
        cmd.hearing = hearing(t0().plus(Duration::days(10)), Some("Salle 2"));
        let next = h.step(Role::Clerk, file.id(), cmd);
        assert_eq!(next.case.status(), CaseState::HearingScheduled);
        let latest = next.hearings.latest_event().unwrap();
        assert_eq!(latest.kind, HearingKind::FirstAppearance);
        assert_eq!(latest.outcome, HearingOutcome::Scheduled);
        assert_eq!(latest.room, "Salle 2");
    }

    #[test]
    fn ledger_rejection_rolls_back_the_transition() {
        let h = Harness::new();
        let file = enrolled(&h);
        let events_before = h.outbox.len();
        let mut cmd = TransitionCommand::new(CaseAction::ScheduleHearing, file.version);
        cmd.hearing = hearing(t0().plus(Duration::days(-1)), Some("Salle 2"));
        let err = h.run(Role::Clerk, file.id(), cmd, t0()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::TransactionFailed {
                source: LedgerError::ScheduledInPast { .. },
                ..
            }
        ));
        let stored = h.repo.get(file.id()).unwrap();
        assert_eq!(stored, file);
        assert_eq!(h.outbox.len(), events_before);
    }

    #[test]
    fn missing_room_fails_the_transaction() {
        let h = Harness::new();
        let file = enrolled(&h);
        let mut cmd = TransitionCommand::new(CaseAction::ScheduleHearing, file.version);
        cmd.hearing = hearing(t0().plus(Duration::days(3)), None);
        let err = h.run(Role::Clerk, file.id(), cmd, t0()).unwrap_err();
        assert_eq!(err.outcome_label(), "transaction_failed");
    }

    #[test]
    fn schedule_without_date_is_a_request_error() {
        let h = Harness::new();
        let file = enrolled(&h);
        let err = h
            .run(Role::Clerk, file.id(), TransitionCommand::new(CaseAction::ScheduleHearing, file.version), t0())
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::MissingHearingDetails { field: "scheduled_at", .. }
        ));
    }

    #[test]
    fn adjourn_reschedule_complete_builds_the_ledger() {
        let h = Harness::new();
        let file = enrolled(&h);
        let id = file.id();

        let mut cmd = TransitionCommand::new(CaseAction::ScheduleHearing, file.version);
        cmd.hearing = hearing(t0().plus(Duration::days(7)), Some("Salle 1"));
        let file = h.step(Role::Clerk, id, cmd);

        let mut cmd = TransitionCommand::new(CaseAction::Adjourn, file.version);
        cmd.hearing = hearing(t0().plus(Duration::days(21)), None);
        let file = h.step(Role::Judge, id, cmd);
        let adjourned = file.hearings.latest_event().unwrap();
        assert_eq!(adjourned.outcome, HearingOutcome::Adjourned);
        assert_eq!(adjourned.room, "Salle 1");

        let mut cmd = TransitionCommand::new(CaseAction::ScheduleHearing, file.version);
        cmd.hearing = hearing(t0().plus(Duration::days(21)), Some("Salle 3"));
        let file = h.step(Role::Clerk, id, cmd);
        assert_eq!(file.hearings.latest_event().unwrap().kind, HearingKind::Adjournment);

        let file = h.step(Role::Judge, id, TransitionCommand::new(CaseAction::Complete, file.version));
        let verdict = file.hearings.latest_event().unwrap();
        assert_eq!(verdict.kind, HearingKind::Verdict);
        assert_eq!(verdict.outcome, HearingOutcome::Completed);
        assert_eq!(verdict.room, "Salle 3");

        assert_eq!(file.case.status(), CaseState::Completed);
        assert_eq!(file.hearings.len(), 4);
        assert!(file.hearings.verify_chain().is_ok());
    }

    #[test]
    fn non_hearing_actions_leave_ledger_empty() {
        let h = Harness::new();
        let file = enrolled(&h);
        assert!(file.hearings.is_empty());
    }

    #[test]
    fn only_hearing_actions_produce_ledger_entries() {
        let h = Harness::new();
        let file = enrolled(&h);
        for action in CaseAction::ALL {
            let mut cmd = TransitionCommand::new(action, file.version);
            cmd.hearing = hearing(t0().plus(Duration::days(5)), Some("Salle 4"));
            let entry = hearing_entry(&file, &actor(Role::Clerk), &cmd, t0()).unwrap();
            assert_eq!(entry.is_some(), action.records_hearing(), "{action}");
        }
    }

    #[test]
    fn allocator_restarts_each_year() {
        let alloc = CaseNumberAllocator::new();
        let y1 = Timestamp::parse("2026-12-31T23:00:00Z").unwrap();
        let y2 = Timestamp::parse("2027-01-01T01:00:00Z").unwrap();
        assert_eq!(alloc.allocate(y1).unwrap().sequence(), 1);
        assert_eq!(alloc.allocate(y1).unwrap().sequence(), 2);
        assert_eq!(alloc.allocate(y2).unwrap().sequence(), 1);
    }
}
