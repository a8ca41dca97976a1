//! # Matrix and Actions Subcommands
//!
//! Print the authorization matrix, or the slice of it one role can use.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use docket_core::Role;
use docket_state::{actions_for, available_actions, matrix, CaseAction, CaseState, FILING_ROLES};

use crate::EXIT_OK;

/// Arguments for `docket matrix`.
#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `docket actions`.
#[derive(Args, Debug)]
pub struct ActionsArgs {
    /// Role to query (citizen, police, commissaire, ...).
    #[arg(long)]
    pub role: Role,

    /// Restrict to actions available in this status.
    #[arg(long)]
    pub state: Option<CaseState>,

    /// Emit JSON instead of one action per line.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ActionsReport {
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<CaseState>,
    can_file: bool,
    actions: Vec<CaseAction>,
}

/// Execute `docket matrix`.
pub fn run_matrix(args: &MatrixArgs) -> Result<u8> {
    println!("{}", render_matrix(args.json)?);
    Ok(EXIT_OK)
}

/// Execute `docket actions`.
pub fn run_actions(args: &ActionsArgs) -> Result<u8> {
    println!("{}", render_actions(args.role, args.state, args.json)?);
    Ok(EXIT_OK)
}

/// Render the matrix as an aligned table or as JSON.
pub fn render_matrix(json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(matrix()).context("serializing matrix");
    }

    let mut out = format!(
        "{:<28} {:<28} {:<28} ROLES\n",
        "FROM", "ACTION", "TO"
    );
    for edge in matrix() {
        let roles: Vec<&str> = edge.allowed_roles.iter().map(Role::as_str).collect();
        out.push_str(&format!(
            "{:<28} {:<28} {:<28} {}\n",
            edge.from.as_str(),
            edge.action.as_str(),
            edge.to.as_str(),
            roles.join(",")
        ));
    }
    let filers: Vec<&str> = FILING_ROLES.iter().map(Role::as_str).collect();
    out.push_str(&format!("\nfiling: {}", filers.join(",")));
    Ok(out)
}

/// Render what `role` may do, optionally restricted to `state`.
pub fn render_actions(role: Role, state: Option<CaseState>, json: bool) -> Result<String> {
    let actions = match state {
        Some(s) => available_actions(role, s),
        None => actions_for(role),
    };
    tracing::debug!(%role, count = actions.len(), "actions resolved");

    if json {
        let report = ActionsReport {
            role,
            state,
            can_file: docket_state::can_file(role),
            actions,
        };
        return serde_json::to_string_pretty(&report).context("serializing actions");
    }

    if actions.is_empty() {
        return Ok(format!("{role}: no actions"));
    }
    Ok(actions
        .iter()
        .map(CaseAction::as_str)
        .collect::<Vec<_>>()
        .join("\n"))
}
