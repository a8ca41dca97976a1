//! # Error Hierarchy
//!
//! Structured error types shared by every crate in the workspace, built with
//! `thiserror`. Each variant carries the rejected input and the expected
//! format so callers can correct the request without guesswork.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitives and closed enums.
///
/// Raised at parsing boundaries (HTTP bodies, CLI arguments, persisted
/// strings). A value that fails here never enters the domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Actor identifier is empty, too long, or contains `:`.
    #[error("invalid actor id: \"{0}\" (expected 1-128 characters without ':')")]
    InvalidActorId(String),

    /// RG case number does not match `RG <year>/<sequence>`.
    #[error("invalid RG case number: \"{0}\" (expected RG <year>/<5-digit sequence>)")]
    InvalidCaseNumber(String),

    /// Role string is not one of the nine recognised roles.
    #[error("unknown role: \"{0}\"")]
    UnknownRole(String),

    /// Case state string is not a recognised lifecycle state.
    #[error("unknown case state: \"{0}\"")]
    UnknownState(String),

    /// Action string is not a recognised workflow action.
    #[error("unknown case action: \"{0}\"")]
    UnknownAction(String),

    /// Offence qualification is empty or too long.
    #[error("invalid offence: {0}")]
    InvalidOffence(String),

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
