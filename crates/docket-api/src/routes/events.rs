//! # Event Outbox API
//!
//! The boundary to the external notifier: each call removes and returns the
//! oldest pending `CaseTransitioned` events. Admin only.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use docket_core::Role;

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::events::CaseTransitioned;
use crate::extractors::extract_query;
use crate::state::AppState;

const DEFAULT_BATCH: usize = 100;
const MAX_BATCH: usize = 1000;

/// Batch size for a drain.
#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DrainQuery {
    /// Maximum events to return (default 100, max 1000).
    pub max: Option<usize>,
}

/// Drained events.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrainResponse {
    pub events: Vec<CaseTransitioned>,
    /// Events still pending after this drain.
    pub remaining: usize,
}

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/events", get(drain_events))
}

/// GET /v1/events: Drain pending domain events.
#[utoipa::path(
    get,
    path = "/v1/events",
    params(DrainQuery),
    responses(
        (status = 200, description = "Oldest pending events", body = DrainResponse),
        (status = 403, description = "Caller is not admin", body = crate::error::ErrorBody),
    ),
    tag = "events"
)]
pub async fn drain_events(
    State(state): State<AppState>,
    caller: CallerIdentity,
    query: Result<Query<DrainQuery>, QueryRejection>,
) -> Result<Json<DrainResponse>, AppError> {
    require_role(&caller, &[Role::Admin])?;
    let max = extract_query(query)?
        .max
        .unwrap_or(DEFAULT_BATCH)
        .min(MAX_BATCH);
    let events = state.outbox.drain(max);
    tracing::debug!(count = events.len(), "outbox drained");
    Ok(Json(DrainResponse {
        events,
        remaining: state.outbox.len(),
    }))
}
