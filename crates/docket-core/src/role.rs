//! # Actor Roles
//!
//! The closed set of roles that can act on a case. Role strings arrive from
//! bearer tokens, CLI flags, and JSON bodies; all of them are parsed here so
//! an unknown role never reaches the authorizer.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::ActorId;

/// A participant role in the criminal procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Complainant filing a case.
    Citizen,
    /// Judicial police officer (OPJ) running the investigation.
    Police,
    /// Station commander who countersigns custody decisions and reports.
    Commissaire,
    /// Public prosecutor (procureur).
    Prosecutor,
    /// Court clerk (greffier) managing enrollment and the hearing roll.
    Clerk,
    /// Trial judge.
    Judge,
    /// Court bailiff (huissier) serving summonses.
    Bailiff,
    /// Defence counsel.
    Lawyer,
    /// System administrator. Holds no workflow permissions.
    Admin,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 9] = [
        Role::Citizen,
        Role::Police,
        Role::Commissaire,
        Role::Prosecutor,
        Role::Clerk,
        Role::Judge,
        Role::Bailiff,
        Role::Lawyer,
        Role::Admin,
    ];

    /// Returns all roles.
    pub fn all() -> &'static [Role] {
        &Self::ALL
    }

    /// The wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Police => "police",
            Self::Commissaire => "commissaire",
            Self::Prosecutor => "prosecutor",
            Self::Clerk => "clerk",
            Self::Judge => "judge",
            Self::Bailiff => "bailiff",
            Self::Lawyer => "lawyer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == lowered)
            .ok_or_else(|| ValidationError::UnknownRole(s.to_string()))
    }
}

/// An authenticated actor: who they are and in which capacity they act.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    /// Capacity in which the actor acts.
    pub role: Role,
    /// Identity supplied by the auth context.
    pub actor_id: ActorId,
}

impl ActorRef {
    /// Pair a role with an actor identifier.
    pub fn new(role: Role, actor_id: ActorId) -> Self {
        Self { role, actor_id }
    }
}

impl std::fmt::Display for ActorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.role, self.actor_id)
    }
}
