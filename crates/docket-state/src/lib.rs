//! # docket-state: Case Lifecycle State Machine
//!
//! Everything that decides whether a case may move, and what moving does.
//!
//! - **Lifecycle** (`lifecycle.rs`): the 13 case states, the workflow
//!   actions, and the one transition table binding them to allowed roles.
//!
//! - **Authorizer** (`authorize.rs`): `(actor, case, action) → Grant`. The
//!   only producer of the [`Grant`] that [`Case::apply_transition`] demands.
//!
//! - **Case** (`case.rs`): the aggregate. Private status, custody record,
//!   enrollment data, append-only transition log.
//!
//! - **Registry** (`registry.rs`): per-role views of the table.
//!
//! - **Custody** (`custody.rs`): the 48h/96h garde à vue clock and urgency
//!   levels.
//!
//! ## Design
//!
//! The lifecycle uses a validated enum rather than typestate. Cases come out
//! of storage and off the wire with a status only known at runtime, and the
//! authorizer must answer for any `(state, action)` pair, so the table is
//! data and every check is a lookup.

pub mod authorize;
pub mod case;
pub mod custody;
pub mod error;
pub mod lifecycle;
pub mod registry;

// ─── Lifecycle re-exports ───────────────────────────────────────────

pub use lifecycle::{find_edge, CaseAction, CaseState, Transition, TRANSITIONS};

// ─── Case re-exports ────────────────────────────────────────────────

pub use authorize::{authorize, authorize_in_state, Grant};
pub use case::{Case, CustodyRecord, TransitionInput, TransitionRecord, MAX_OFFENCE_LEN};

// ─── Registry / custody re-exports ──────────────────────────────────

pub use custody::{
    custody_watchlist, remaining_custody, remaining_custody_for, CustodyClock, UrgencyLevel,
    WatchlistEntry, BASE_CEILING_HOURS, EXTENDED_CEILING_HOURS,
};
pub use registry::{actions_for, available_actions, can_file, matrix, roles_for, FILING_ROLES};

pub use error::{AuthError, CustodyError, FilingError, TransitionError};
