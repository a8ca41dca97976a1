//! # API Route Modules
//!
//! - `cases`: filing, listing, reading and transitioning cases; per-case
//!   available actions and hearing ledger.
//! - `custody`: per-case custody clock and the cross-case watchlist.
//! - `hearings`: the hearing calendar across cases.
//! - `matrix`: the authorization matrix as data.
//! - `events`: outbox drain for the external notifier.

use axum::Router;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use docket_core::Timestamp;

use crate::state::AppState;

pub mod cases;
pub mod custody;
pub mod events;
pub mod hearings;
pub mod matrix;

/// Every versioned route.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(cases::router())
        .merge(custody::router())
        .merge(hearings::router())
        .merge(matrix::router())
        .merge(events::router())
}

/// Pagination parameters for list endpoints.
#[derive(Debug, Deserialize, Default, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (default: 100, max: 1000).
    pub limit: Option<usize>,
    /// Number of items to skip (default: 0).
    pub offset: Option<usize>,
}

impl PaginationParams {
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIMIT: usize = 1000;

    pub(crate) fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    pub(crate) fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Apply to a full result set.
    pub(crate) fn page<T>(&self, all: Vec<T>) -> Vec<T> {
        all.into_iter()
            .skip(self.effective_offset())
            .take(self.effective_limit())
            .collect()
    }
}

/// Optional evaluation instant for time-dependent reads. Defaults to now.
#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AtQuery {
    /// RFC 3339 instant to evaluate at.
    #[param(value_type = Option<String>)]
    pub at: Option<Timestamp>,
}

impl AtQuery {
    pub(crate) fn instant(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}
