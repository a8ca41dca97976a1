//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the case
//! lifecycle. You cannot pass an [`ActorId`] where a [`CaseId`] is expected,
//! and an RG [`CaseNumber`] is only constructible in its registry format.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Opaque identifier of a case (a citizen complaint and everything that
/// follows from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(Uuid);

impl CaseId {
    /// Generate a new random case identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a case identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "case:{}", self.0)
    }
}

/// Identifier of an actor as supplied by the auth context (badge number,
/// bar registration, registry login, ...).
///
/// Validated on construction: 1–128 characters, no `:` (the bearer token
/// separator), no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Maximum accepted length in characters.
    pub const MAX_LEN: usize = 128;

    /// Create a validated actor identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidActorId`] for empty, oversized, or
    /// `:`-containing input.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.chars().count() > Self::MAX_LEN || trimmed.contains(':') {
            return Err(ValidationError::InvalidActorId(s));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The built-in administrator identity used when auth is disabled.
    pub fn admin() -> Self {
        Self("admin".to_string())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorId {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Court registry number (numéro RG) assigned when a case is enrolled.
///
/// Rendered as `RG <year>/<sequence>` with a zero-padded five-digit
/// sequence, e.g. `RG 2026/00042`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseNumber {
    year: i32,
    sequence: u32,
}

impl CaseNumber {
    /// Largest sequence representable in the five-digit registry format.
    pub const MAX_SEQUENCE: u32 = 99_999;

    /// Build an RG number from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCaseNumber`] when the sequence is
    /// zero or exceeds [`Self::MAX_SEQUENCE`], or the year is outside
    /// 1900–9999.
    pub fn new(year: i32, sequence: u32) -> Result<Self, ValidationError> {
        if !(1900..=9999).contains(&year) || sequence == 0 || sequence > Self::MAX_SEQUENCE {
            return Err(ValidationError::InvalidCaseNumber(format!(
                "RG {year}/{sequence:05}"
            )));
        }
        Ok(Self { year, sequence })
    }

    /// Registry year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Sequence within the registry year.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl std::fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RG {}/{:05}", self.year, self.sequence)
    }
}

impl FromStr for CaseNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidCaseNumber(s.to_string());
        let rest = s.strip_prefix("RG ").ok_or_else(invalid)?;
        let (year, seq) = rest.split_once('/').ok_or_else(invalid)?;
        if year.len() != 4 || seq.len() != 5 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let sequence: u32 = seq.parse().map_err(|_| invalid())?;
        Self::new(year, sequence).map_err(|_| invalid())
    }
}

impl TryFrom<String> for CaseNumber {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CaseNumber> for String {
    fn from(n: CaseNumber) -> Self {
        n.to_string()
    }
}
