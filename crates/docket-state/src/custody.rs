//! # Custody Deadline Tracker
//!
//! Pure computation of the garde à vue clock: elapsed and remaining time
//! against the legal ceiling, and the urgency level a dashboard should show.
//! No timers run anywhere; callers pass `now`.
//!
//! | Remaining            | Level      |
//! |----------------------|------------|
//! | ≤ 0                  | `Overrun`  |
//! | < 6h                 | `Critical` |
//! | 6h ≤ r < 18h         | `Warning`  |
//! | ≥ 18h                | `Normal`   |
//!
//! An overrun is reported with a negative remaining time. It is a level, not
//! an error: the clock keeps answering after the deadline.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use docket_core::{CaseId, Timestamp};

use crate::case::{Case, CustodyRecord};
use crate::error::CustodyError;

/// Ceiling of an ordinary custody measure.
pub const BASE_CEILING_HOURS: i64 = 48;

/// Ceiling once the commissaire has renewed the measure.
pub const EXTENDED_CEILING_HOURS: i64 = 96;

/// Below this many hours remaining the level is `Critical`.
pub const CRITICAL_THRESHOLD_HOURS: i64 = 6;

/// Below this many hours remaining the level is at least `Warning`.
pub const WARNING_THRESHOLD_HOURS: i64 = 18;

const SECONDS_PER_HOUR: i64 = 3600;

/// Escalation level of a custody clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    /// More than 18 hours left.
    Normal,
    /// Between 6 and 18 hours left.
    Warning,
    /// Less than 6 hours left.
    Critical,
    /// Deadline reached or passed.
    Overrun,
}

impl UrgencyLevel {
    /// Classify a remaining duration given in seconds.
    pub fn from_remaining_seconds(remaining: i64) -> Self {
        if remaining <= 0 {
            Self::Overrun
        } else if remaining < CRITICAL_THRESHOLD_HOURS * SECONDS_PER_HOUR {
            Self::Critical
        } else if remaining < WARNING_THRESHOLD_HOURS * SECONDS_PER_HOUR {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Overrun => "overrun",
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a custody clock at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyClock {
    /// When custody began.
    pub started_at: Timestamp,
    /// When the ceiling is reached.
    pub deadline: Timestamp,
    /// Applicable ceiling, 48 or 96.
    pub ceiling_hours: i64,
    /// Whether the measure was renewed.
    pub extended: bool,
    /// Seconds since custody began. Never negative.
    pub elapsed_seconds: i64,
    /// Seconds until the deadline. Negative once overrun.
    pub remaining_seconds: i64,
    /// Escalation level.
    pub level: UrgencyLevel,
}

impl CustodyClock {
    /// Whole hours elapsed.
    pub fn elapsed_hours(&self) -> i64 {
        self.elapsed_seconds / SECONDS_PER_HOUR
    }

    /// Whole hours remaining, truncated toward zero.
    pub fn remaining_hours(&self) -> i64 {
        self.remaining_seconds / SECONDS_PER_HOUR
    }

    /// Whether the deadline has been reached.
    pub fn is_overrun(&self) -> bool {
        self.level == UrgencyLevel::Overrun
    }
}

/// Compute the clock for a custody record at `now`.
///
/// A `now` earlier than the custody start (clock skew between recording
/// hosts) counts as zero elapsed.
pub fn remaining_custody(custody: &CustodyRecord, now: Timestamp) -> CustodyClock {
    let ceiling_hours = if custody.extended {
        EXTENDED_CEILING_HOURS
    } else {
        BASE_CEILING_HOURS
    };
    let elapsed_seconds = now.seconds_since(&custody.custody_start).max(0);
    let remaining_seconds = ceiling_hours * SECONDS_PER_HOUR - elapsed_seconds;
    CustodyClock {
        started_at: custody.custody_start,
        deadline: custody.custody_start.plus(Duration::hours(ceiling_hours)),
        ceiling_hours,
        extended: custody.extended,
        elapsed_seconds,
        remaining_seconds,
        level: UrgencyLevel::from_remaining_seconds(remaining_seconds),
    }
}

/// Compute the clock for a case.
///
/// # Errors
///
/// [`CustodyError::NotInCustody`] when the case has no custody record.
pub fn remaining_custody_for(case: &Case, now: Timestamp) -> Result<CustodyClock, CustodyError> {
    case.custody()
        .map(|c| remaining_custody(c, now))
        .ok_or(CustodyError::NotInCustody {
            case_id: case.id(),
            status: case.status(),
        })
}

/// A row of the custody dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchlistEntry {
    /// The detaining case.
    pub case_id: CaseId,
    /// Offence under investigation.
    pub offence: String,
    /// Clock at the time of the query.
    pub clock: CustodyClock,
}

/// Every in-custody case among `cases`, most urgent first.
///
/// Ordered by remaining time ascending, ties broken by case id.
pub fn custody_watchlist<'a, I>(cases: I, now: Timestamp) -> Vec<WatchlistEntry>
where
    I: IntoIterator<Item = &'a Case>,
{
    let mut entries: Vec<WatchlistEntry> = cases
        .into_iter()
        .filter_map(|case| {
            case.custody().map(|c| WatchlistEntry {
                case_id: case.id(),
                offence: case.offence().to_string(),
                clock: remaining_custody(c, now),
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.clock
            .remaining_seconds
            .cmp(&b.clock.remaining_seconds)
            .then_with(|| a.case_id.cmp(&b.case_id))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Timestamp {
        Timestamp::parse("2026-05-04T22:00:00Z").unwrap()
    }

    fn record(extended: bool) -> CustodyRecord {
        CustodyRecord {
            custody_start: start(),
            extended,
        }
    }

    fn at_hours(h: i64) -> Timestamp {
        start().plus(Duration::hours(h))
    }

    #[test]
    fn fresh_custody_is_normal_with_48h_left() {
        let clock = remaining_custody(&record(false), start());
        assert_eq!(clock.elapsed_seconds, 0);
        assert_eq!(clock.remaining_hours(), 48);
        assert_eq!(clock.level, UrgencyLevel::Normal);
        assert_eq!(clock.deadline, at_hours(48));
    }

    #[test]
    fn thresholds_follow_the_table() {
        let r = record(false);
        assert_eq!(remaining_custody(&r, at_hours(30)).level, UrgencyLevel::Normal); // 18h left
        assert_eq!(remaining_custody(&r, at_hours(31)).level, UrgencyLevel::Warning); // 17h left
        assert_eq!(remaining_custody(&r, at_hours(42)).level, UrgencyLevel::Warning); // 6h left
        assert_eq!(remaining_custody(&r, at_hours(43)).level, UrgencyLevel::Critical); // 5h left
        assert_eq!(remaining_custody(&r, at_hours(48)).level, UrgencyLevel::Overrun);
    }

    #[test]
    fn one_hour_before_deadline_is_critical() {
        let now = Timestamp::parse("2026-05-06T21:00:00Z").unwrap();
        let clock = remaining_custody(&record(false), now);
        assert_eq!(clock.elapsed_hours(), 47);
        assert_eq!(clock.remaining_hours(), 1);
        assert_eq!(clock.level, UrgencyLevel::Critical);
        assert!(!clock.is_overrun());
    }

    #[test]
    fn overrun_reports_negative_remaining() {
        let clock = remaining_custody(&record(false), at_hours(50));
        assert_eq!(clock.level, UrgencyLevel::Overrun);
        assert_eq!(clock.remaining_seconds, -2 * 3600);
        assert_eq!(clock.remaining_hours(), -2);
        assert!(clock.is_overrun());
    }

    #[test]
    fn extension_moves_ceiling_to_96h() {
        let clock = remaining_custody(&record(true), at_hours(50));
        assert_eq!(clock.ceiling_hours, 96);
        assert_eq!(clock.remaining_hours(), 46);
        assert_eq!(clock.level, UrgencyLevel::Normal);
        assert_eq!(clock.deadline, at_hours(96));
    }

    #[test]
    fn now_before_start_counts_as_zero_elapsed() {
        let clock = remaining_custody(&record(false), start().plus(Duration::minutes(-10)));
        assert_eq!(clock.elapsed_seconds, 0);
        assert_eq!(clock.remaining_hours(), 48);
    }

    #[test]
    fn level_boundary_is_exact_to_the_second() {
        let r = record(false);
        let just_before = start().plus(Duration::seconds(48 * 3600 - 1));
        assert_eq!(remaining_custody(&r, just_before).level, UrgencyLevel::Critical);
        assert_eq!(remaining_custody(&r, just_before).remaining_seconds, 1);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(UrgencyLevel::Normal < UrgencyLevel::Warning);
        assert!(UrgencyLevel::Critical < UrgencyLevel::Overrun);
    }
}
