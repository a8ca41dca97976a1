//! # Check Subcommand
//!
//! Runs the authorizer for one `(role, state, action)` triple and reports
//! the decision through the exit code, so shell scripts can branch on it.

use anyhow::Result;
use clap::Args;

use docket_core::Role;
use docket_state::{authorize_in_state, AuthError, CaseAction, CaseState};

use crate::{EXIT_FORBIDDEN, EXIT_INVALID_TRANSITION, EXIT_OK};

/// Arguments for `docket check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Acting role.
    #[arg(long)]
    pub role: Role,

    /// Current case status (e.g. IN_CUSTODY).
    #[arg(long)]
    pub state: CaseState,

    /// Requested action (e.g. extendCustody).
    #[arg(long)]
    pub action: CaseAction,
}

/// Outcome of a check, with its exit code and message.
pub fn decide(role: Role, state: CaseState, action: CaseAction) -> (u8, String) {
    match authorize_in_state(role, state, action) {
        Ok(edge) => (
            EXIT_OK,
            format!("allowed: {} --{}--> {}", edge.from, edge.action, edge.to),
        ),
        Err(e @ AuthError::InvalidTransition { .. }) => (EXIT_INVALID_TRANSITION, e.to_string()),
        Err(e @ AuthError::Forbidden { .. }) => (EXIT_FORBIDDEN, e.to_string()),
    }
}

/// Execute `docket check`.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let (code, message) = decide(args.role, args.state, args.action);
    tracing::info!(role = %args.role, state = %args.state, action = %args.action, code, "authorizer decision");
    println!("{message}");
    Ok(code)
}
