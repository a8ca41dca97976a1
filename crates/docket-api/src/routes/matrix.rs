//! # Authorization Matrix API
//!
//! Publishes the transition table so clients can render controls without
//! hard-coding role rules.

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use docket_core::Role;
use docket_state::{matrix, CaseAction, CaseState, Transition, FILING_ROLES};

use crate::state::AppState;

/// One edge of the lifecycle and who may walk it.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatrixRow {
    #[schema(value_type = String)]
    pub from: CaseState,
    #[schema(value_type = String)]
    pub action: CaseAction,
    #[schema(value_type = String)]
    pub to: CaseState,
    #[schema(value_type = Vec<String>)]
    pub allowed_roles: Vec<Role>,
}

impl From<&Transition> for MatrixRow {
    fn from(t: &Transition) -> Self {
        Self {
            from: t.from,
            action: t.action,
            to: t.to,
            allowed_roles: t.allowed_roles.to_vec(),
        }
    }
}

/// The full table plus who may file.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatrixResponse {
    #[schema(value_type = Vec<String>)]
    pub filing_roles: Vec<Role>,
    pub transitions: Vec<MatrixRow>,
}

/// Build the matrix router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/matrix", get(get_matrix))
}

/// GET /v1/matrix: The authorization matrix.
#[utoipa::path(
    get,
    path = "/v1/matrix",
    responses(
        (status = 200, description = "Transition table", body = MatrixResponse),
    ),
    tag = "matrix"
)]
pub async fn get_matrix() -> Json<MatrixResponse> {
    Json(MatrixResponse {
        filing_roles: FILING_ROLES.to_vec(),
        transitions: matrix().iter().map(MatrixRow::from).collect(),
    })
}
