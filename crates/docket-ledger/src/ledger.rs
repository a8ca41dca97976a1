//! # Hearing Ledger
//!
//! One append-only ledger per case. Entries are never edited or removed; an
//! adjournment appends an `adjourned` record carrying the proposed new date
//! and leaves the original `scheduled` record untouched.
//!
//! Each entry commits to its predecessor through `previous_hash`, starting
//! from [`GENESIS_HASH`]. [`HearingLedger::verify_chain`] recomputes every
//! hash, so an edited or reordered ledger loaded back from storage is
//! detected.

use serde::{Deserialize, Serialize};

use docket_core::{CaseId, Timestamp, GENESIS_HASH};

use crate::error::LedgerError;
use crate::event::{HearingEvent, NewHearingEvent};

/// The hearing history of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HearingLedger {
    case_id: CaseId,
    events: Vec<HearingEvent>,
}

impl HearingLedger {
    /// An empty ledger for `case_id`.
    pub fn new(case_id: CaseId) -> Self {
        Self {
            case_id,
            events: Vec::new(),
        }
    }

    /// Owning case.
    pub fn case_id(&self) -> CaseId {
        self.case_id
    }

    /// Append an event recorded at `now`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::CaseMismatch`] for an event naming another case.
    /// - [`LedgerError::MissingRoom`] for a blank room.
    /// - [`LedgerError::ScheduledInPast`] when a scheduled or adjourned
    ///   hearing proposes a date before `now`.
    pub fn append(
        &mut self,
        event: NewHearingEvent,
        now: Timestamp,
    ) -> Result<&HearingEvent, LedgerError> {
        if event.case_id != self.case_id {
            return Err(LedgerError::CaseMismatch {
                expected: self.case_id,
                actual: event.case_id,
            });
        }
        let room = event.room.trim();
        if room.is_empty() {
            return Err(LedgerError::MissingRoom);
        }
        if event.outcome.is_forward_looking() && event.scheduled_at < now {
            return Err(LedgerError::ScheduledInPast {
                scheduled_at: event.scheduled_at,
                recorded_at: now,
            });
        }

        let previous_hash = self
            .events
            .last()
            .map_or_else(|| GENESIS_HASH.to_string(), |e| e.event_hash.clone());
        let mut entry = HearingEvent {
            sequence: self.events.len() as u64 + 1,
            case_id: self.case_id,
            scheduled_at: event.scheduled_at,
            room: room.to_string(),
            kind: event.kind,
            outcome: event.outcome,
            recorded_by: event.recorded_by,
            recorded_at: now,
            previous_hash,
            event_hash: String::new(),
        };
        entry.event_hash = entry.compute_hash()?;
        self.events.push(entry);
        let idx = self.events.len() - 1;
        Ok(&self.events[idx])
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[HearingEvent] {
        &self.events
    }

    /// The most recent event.
    pub fn latest_event(&self) -> Option<&HearingEvent> {
        self.events.last()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The pending hearing at or after `now`, if the latest event sets one.
    ///
    /// A later verdict or cancellation supersedes any earlier date, so only
    /// the latest event is considered.
    pub fn next_hearing(&self, now: Timestamp) -> Option<&HearingEvent> {
        self.latest_event()
            .filter(|e| e.outcome.is_forward_looking() && e.scheduled_at >= now)
    }

    /// Events whose `scheduled_at` falls in `[from, to)`, oldest first.
    pub fn between(&self, from: Timestamp, to: Timestamp) -> Vec<&HearingEvent> {
        self.events
            .iter()
            .filter(|e| e.scheduled_at >= from && e.scheduled_at < to)
            .collect()
    }

    /// Recompute the hash chain.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ChainBroken`] naming the first inconsistent entry.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let mut expected_prev = GENESIS_HASH.to_string();
        for (idx, event) in self.events.iter().enumerate() {
            let broken = |reason| LedgerError::ChainBroken {
                sequence: event.sequence,
                reason,
            };
            if event.sequence != idx as u64 + 1 {
                return Err(broken("sequence gap"));
            }
            if event.case_id != self.case_id {
                return Err(broken("foreign case id"));
            }
            if event.previous_hash != expected_prev {
                return Err(broken("previous hash mismatch"));
            }
            if event.compute_hash()? != event.event_hash {
                return Err(broken("event hash mismatch"));
            }
            expected_prev = event.event_hash.clone();
        }
        Ok(())
    }
}

/// Hearings from several ledgers falling in `[from, to)`, ordered by date.
pub fn calendar<'a, I>(ledgers: I, from: Timestamp, to: Timestamp) -> Vec<&'a HearingEvent>
where
    I: IntoIterator<Item = &'a HearingLedger>,
{
    let mut events: Vec<&HearingEvent> = ledgers
        .into_iter()
        .flat_map(|l| l.between(from, to))
        .collect();
    events.sort_by(|a, b| {
        a.scheduled_at
            .cmp(&b.scheduled_at)
            .then_with(|| a.case_id.cmp(&b.case_id))
            .then_with(|| a.sequence.cmp(&b.sequence))
    });
    events
}
