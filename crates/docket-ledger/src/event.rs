//! Hearing events and their hash payload.

use serde::{Deserialize, Serialize};

use docket_core::{sha256_hex, ActorRef, CanonicalBytes, CanonicalizationError, CaseId, Timestamp};

/// What kind of sitting an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingKind {
    /// The first hearing set after enrollment.
    FirstAppearance,
    /// A hearing set after, or produced by, an adjournment.
    Adjournment,
    /// The sitting at which judgment was rendered.
    Verdict,
}

impl HearingKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstAppearance => "first_appearance",
            Self::Adjournment => "adjournment",
            Self::Verdict => "verdict",
        }
    }
}

impl std::fmt::Display for HearingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingOutcome {
    /// A hearing is set for `scheduled_at`.
    Scheduled,
    /// The hearing was adjourned; `scheduled_at` is the proposed new date.
    Adjourned,
    /// The hearing took place and judgment was rendered.
    Completed,
    /// The hearing was called off.
    Cancelled,
}

impl HearingOutcome {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Adjourned => "adjourned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `scheduled_at` is a date still ahead (a proposal, not a record
    /// of something that happened).
    pub fn is_forward_looking(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Adjourned)
    }
}

impl std::fmt::Display for HearingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`HearingLedger::append`](crate::HearingLedger::append).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHearingEvent {
    /// Case the hearing belongs to.
    pub case_id: CaseId,
    /// Hearing date (or proposed date for adjournments).
    pub scheduled_at: Timestamp,
    /// Courtroom.
    pub room: String,
    /// Kind of sitting.
    pub kind: HearingKind,
    /// Outcome being recorded.
    pub outcome: HearingOutcome,
    /// Clerk or judge recording the event.
    pub recorded_by: ActorRef,
}

/// A committed ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HearingEvent {
    /// Position in the ledger, starting at 1.
    pub sequence: u64,
    /// Case the hearing belongs to.
    pub case_id: CaseId,
    /// Hearing date (or proposed date for adjournments).
    pub scheduled_at: Timestamp,
    /// Courtroom.
    pub room: String,
    /// Kind of sitting.
    pub kind: HearingKind,
    /// Outcome recorded.
    pub outcome: HearingOutcome,
    /// Who recorded it.
    pub recorded_by: ActorRef,
    /// When it was recorded.
    pub recorded_at: Timestamp,
    /// `event_hash` of the preceding entry, or the genesis hash.
    pub previous_hash: String,
    /// SHA-256 over the canonical JSON of every field above.
    pub event_hash: String,
}

#[derive(Serialize)]
struct HashPayload<'a> {
    sequence: u64,
    case_id: &'a CaseId,
    scheduled_at: &'a Timestamp,
    room: &'a str,
    kind: HearingKind,
    outcome: HearingOutcome,
    recorded_by: &'a ActorRef,
    recorded_at: &'a Timestamp,
    previous_hash: &'a str,
}

impl HearingEvent {
    /// Recompute this event's hash from its fields.
    pub fn compute_hash(&self) -> Result<String, CanonicalizationError> {
        let payload = HashPayload {
            sequence: self.sequence,
            case_id: &self.case_id,
            scheduled_at: &self.scheduled_at,
            room: &self.room,
            kind: self.kind,
            outcome: self.outcome,
            recorded_by: &self.recorded_by,
            recorded_at: &self.recorded_at,
            previous_hash: &self.previous_hash,
        };
        Ok(sha256_hex(&CanonicalBytes::new(&payload)?))
    }
}
