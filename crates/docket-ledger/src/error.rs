//! Ledger errors.

use thiserror::Error;

use docket_core::{CanonicalizationError, CaseId, Timestamp};

/// Reasons an append is refused or a chain fails verification.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The event names another case than the ledger's.
    #[error("event for {actual} cannot be appended to the ledger of {expected}")]
    CaseMismatch {
        /// Ledger owner.
        expected: CaseId,
        /// Case named by the event.
        actual: CaseId,
    },

    /// A scheduled or adjourned hearing proposes a date before it was recorded.
    #[error("hearing date {scheduled_at} is earlier than recording time {recorded_at}")]
    ScheduledInPast {
        /// Proposed hearing date.
        scheduled_at: Timestamp,
        /// When the append was attempted.
        recorded_at: Timestamp,
    },

    /// Every hearing needs a room.
    #[error("hearing room must not be empty")]
    MissingRoom,

    /// Stored events no longer hash to their recorded values.
    #[error("hearing ledger chain broken at sequence {sequence}: {reason}")]
    ChainBroken {
        /// First offending event.
        sequence: u64,
        /// What did not match.
        reason: &'static str,
    },

    /// Hash input could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
