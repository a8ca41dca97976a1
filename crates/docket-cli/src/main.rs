//! # docket CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docket_cli::check::{run_check, CheckArgs};
use docket_cli::custody::{run_custody, CustodyArgs};
use docket_cli::matrix::{run_actions, run_matrix, ActionsArgs, MatrixArgs};

/// Docket CLI
///
/// Inspect the judicial case lifecycle: who may do what in which status,
/// and how much custody time remains.
#[derive(Parser, Debug)]
#[command(name = "docket", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the authorization matrix.
    Matrix(MatrixArgs),

    /// List the actions available to a role.
    Actions(ActionsArgs),

    /// Check whether a role may fire an action in a status.
    Check(CheckArgs),

    /// Compute the custody clock for a detention start.
    Custody(CustodyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("docket CLI starting");

    let result = match cli.command {
        Commands::Matrix(args) => run_matrix(&args),
        Commands::Actions(args) => run_actions(&args),
        Commands::Check(args) => run_check(&args),
        Commands::Custody(args) => run_custody(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
