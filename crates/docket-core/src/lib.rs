#![deny(missing_docs)]

//! # docket-core: Foundational Types for the Docket Engine
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies: only `serde`, `serde_json`,
//! `serde_jcs`, `thiserror`, `chrono`, `uuid`, and `sha2`.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** A [`CaseId`] cannot be
//!    passed where an [`ActorId`] is expected, and an RG [`CaseNumber`] is
//!    validated at construction.
//!
//! 2. **One closed [`Role`] enum.** The nine justice-system roles are the
//!    only roles that exist; unknown role strings are rejected at the serde
//!    and parsing boundaries.
//!
//! 3. **[`CanonicalBytes`] is the sole path to digest computation.** The
//!    hearing ledger's hash chain is computed over canonical JSON only.
//!
//! 4. **Structured errors with `thiserror`**: no `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, GENESIS_HASH};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{ActorId, CaseId, CaseNumber};
pub use role::{ActorRef, Role};
pub use temporal::Timestamp;
