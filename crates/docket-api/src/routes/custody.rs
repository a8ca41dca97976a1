//! # Custody API
//!
//! Read-only views over the garde à vue clock. Both endpoints accept an
//! optional `?at=` instant so a dashboard can preview the board at a later
//! time; without it the clock is evaluated at request time.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use docket_core::{CaseId, Timestamp};
use docket_state::{custody_watchlist, remaining_custody_for, CustodyClock, WatchlistEntry};

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::routes::cases::load;
use crate::routes::AtQuery;
use crate::state::AppState;

/// Custody clock of one case.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustodyResponse {
    #[schema(value_type = String)]
    pub case_id: CaseId,
    #[schema(value_type = Object)]
    pub clock: CustodyClock,
}

/// Every detained case, most urgent first.
#[derive(Debug, Serialize, ToSchema)]
pub struct WatchlistResponse {
    #[schema(value_type = String)]
    pub generated_at: Timestamp,
    /// Entries whose deadline has passed.
    pub overruns: usize,
    #[schema(value_type = Vec<Object>)]
    pub entries: Vec<WatchlistEntry>,
}

/// Build the custody router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/cases/{id}/custody", get(case_custody))
        .route("/v1/custody/watchlist", get(watchlist))
}

/// GET /v1/cases/{id}/custody: Remaining custody time for one case.
#[utoipa::path(
    get,
    path = "/v1/cases/{id}/custody",
    params(("id" = Uuid, Path, description = "Case ID"), AtQuery),
    responses(
        (status = 200, description = "Custody clock", body = CustodyResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorBody),
        (status = 409, description = "Case is not in custody", body = crate::error::ErrorBody),
    ),
    tag = "custody"
)]
pub async fn case_custody(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<AtQuery>, QueryRejection>,
) -> Result<Json<CustodyResponse>, AppError> {
    let at = extract_query(query)?.instant();
    let file = load(&state, id)?;
    let clock = remaining_custody_for(&file.case, at)?;
    Ok(Json(CustodyResponse {
        case_id: file.id(),
        clock,
    }))
}

/// GET /v1/custody/watchlist: Custody dashboard.
///
/// Also publishes the `docket_custody_overruns` gauge.
#[utoipa::path(
    get,
    path = "/v1/custody/watchlist",
    params(AtQuery),
    responses(
        (status = 200, description = "Detained cases, most urgent first", body = WatchlistResponse),
    ),
    tag = "custody"
)]
pub async fn watchlist(
    State(state): State<AppState>,
    query: Result<Query<AtQuery>, QueryRejection>,
) -> Result<Json<WatchlistResponse>, AppError> {
    let at = extract_query(query)?.instant();
    let files = state.cases.list();
    let entries = custody_watchlist(files.iter().map(|f| &f.case), at);
    let overruns = entries.iter().filter(|e| e.clock.is_overrun()).count();

    metrics::gauge!("docket_custody_overruns").set(overruns as f64);
    if overruns > 0 {
        tracing::warn!(overruns, "custody deadlines overrun");
    }

    Ok(Json(WatchlistResponse {
        generated_at: at,
        overruns,
        entries,
    }))
}
