//! # docket-cli: CLI Tool for the Docket Engine
//!
//! Provides the `docket` command-line interface for clerks, integrators and
//! CI pipelines that need the lifecycle rules without running the server.
//!
//! ## Subcommands
//!
//! - `docket matrix`: print the authorization matrix.
//! - `docket actions`: what a role may do, overall or in one status.
//! - `docket check`: run the authorizer for one `(role, state, action)`.
//! - `docket custody`: compute a custody clock.
//!
//! ```bash
//! docket check --role commissaire --state PENDING_SUPERVISOR_VISA --action grantVisa
//! docket custody --start 2026-05-04T22:00:00Z --extended --json
//! ```

pub mod check;
pub mod custody;
pub mod matrix;

/// Exit code: command succeeded / action allowed.
pub const EXIT_OK: u8 = 0;
/// Exit code: no edge for `(state, action)`.
pub const EXIT_INVALID_TRANSITION: u8 = 2;
/// Exit code: edge exists but the role may not fire it.
pub const EXIT_FORBIDDEN: u8 = 3;
