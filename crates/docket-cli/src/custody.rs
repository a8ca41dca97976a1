//! # Custody Subcommand
//!
//! Computes the garde à vue clock for a detention start, using the same
//! deadline tracker as the API.

use anyhow::{Context, Result};
use clap::Args;

use docket_core::Timestamp;
use docket_state::{remaining_custody, CustodyClock, CustodyRecord};

use crate::EXIT_OK;

/// Arguments for `docket custody`.
#[derive(Args, Debug)]
pub struct CustodyArgs {
    /// Custody start, RFC 3339 (e.g. 2026-05-04T22:00:00Z).
    #[arg(long)]
    pub start: String,

    /// The measure was renewed once (96h ceiling).
    #[arg(long)]
    pub extended: bool,

    /// Evaluate at this instant instead of now.
    #[arg(long)]
    pub now: Option<String>,

    /// Emit JSON instead of a summary line.
    #[arg(long)]
    pub json: bool,
}

/// Compute the clock from raw arguments.
pub fn compute(start: &str, extended: bool, now: Option<&str>) -> Result<CustodyClock> {
    let custody_start = Timestamp::parse(start).context("invalid --start")?;
    let now = match now {
        Some(raw) => Timestamp::parse(raw).context("invalid --now")?,
        None => Timestamp::now(),
    };
    let record = CustodyRecord {
        custody_start,
        extended,
    };
    Ok(remaining_custody(&record, now))
}

/// One-line human summary.
pub fn summarize(clock: &CustodyClock) -> String {
    let remaining = clock.remaining_seconds;
    let sign = if remaining < 0 { "-" } else { "" };
    let abs = remaining.unsigned_abs();
    format!(
        "{level}: {sign}{h}h{m:02}m remaining of {ceiling}h (deadline {deadline})",
        level = clock.level.as_str().to_uppercase(),
        h = abs / 3600,
        m = (abs % 3600) / 60,
        ceiling = clock.ceiling_hours,
        deadline = clock.deadline,
    )
}

/// Execute `docket custody`.
pub fn run_custody(args: &CustodyArgs) -> Result<u8> {
    let clock = compute(&args.start, args.extended, args.now.as_deref())?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&clock).context("serializing custody clock")?
        );
    } else {
        println!("{}", summarize(&clock));
    }
    Ok(EXIT_OK)
}
