//! # Hearing Calendar API
//!
//! Cross-case view of the hearing sub-ledgers for a time window.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use docket_core::Timestamp;
use docket_ledger::{calendar, HearingEvent};

use crate::error::AppError;
use crate::extractors::{extract_validated_query, Validate};
use crate::state::AppState;

/// Longest window the calendar serves.
const MAX_WINDOW_DAYS: i64 = 366;

/// Calendar window, half-open `[from, to)`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    #[param(value_type = String)]
    pub from: Timestamp,
    #[param(value_type = String)]
    pub to: Timestamp,
}

impl Validate for CalendarQuery {
    fn validate(&self) -> Result<(), String> {
        if self.from >= self.to {
            return Err("`from` must be earlier than `to`".to_string());
        }
        if self.to.seconds_since(&self.from) > MAX_WINDOW_DAYS * 86_400 {
            return Err(format!("window must not exceed {MAX_WINDOW_DAYS} days"));
        }
        Ok(())
    }
}

/// Hearings in a window across all cases.
#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarResponse {
    #[schema(value_type = String)]
    pub from: Timestamp,
    #[schema(value_type = String)]
    pub to: Timestamp,
    /// Ordered by date, then case, then ledger sequence.
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<HearingEvent>,
}

/// Build the hearings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/hearings", get(hearing_calendar))
}

/// GET /v1/hearings?from=&to=: Hearing calendar.
#[utoipa::path(
    get,
    path = "/v1/hearings",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Hearings in the window", body = CalendarResponse),
        (status = 400, description = "Missing or malformed bounds", body = crate::error::ErrorBody),
        (status = 422, description = "Empty or oversized window", body = crate::error::ErrorBody),
    ),
    tag = "hearings"
)]
pub async fn hearing_calendar(
    State(state): State<AppState>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<CalendarResponse>, AppError> {
    let window = extract_validated_query(query)?;
    let files = state.cases.list();
    let events = calendar(files.iter().map(|f| &f.hearings), window.from, window.to)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(CalendarResponse {
        from: window.from,
        to: window.to,
        events,
    }))
}
