//! # docket-ledger: Hearing Sub-Ledger
//!
//! Append-only record of the hearings attached to a case. Clerks and judges
//! write to it as a side effect of `scheduleHearing`, `adjourn` and
//! `complete`; dashboards read it for "next hearing" and calendar views.
//!
//! Entries are SHA-256 hash-chained over their canonical JSON
//! (`docket_core::CanonicalBytes`), the same way every tamper-evident log in
//! the workspace is built.

pub mod error;
pub mod event;
pub mod ledger;

pub use error::LedgerError;
pub use event::{HearingEvent, HearingKind, HearingOutcome, NewHearingEvent};
pub use ledger::{calendar, HearingLedger};
