//! # Case API
//!
//! Filing, reading and transitioning cases. Every mutation goes through
//! [`crate::orchestration`]; handlers only translate HTTP to commands and
//! case files back to JSON.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use docket_core::{ActorId, ActorRef, CaseId, CaseNumber, Role, Timestamp};
use docket_ledger::HearingEvent;
use docket_state::{
    available_actions, remaining_custody, CaseAction, CaseState, CustodyClock, CustodyRecord,
    TransitionRecord,
};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, extract_validated_json, Validate};
use crate::orchestration::{execute_transition, file_case, HearingDetails, TransitionCommand};
use crate::repository::CaseFile;
use crate::routes::PaginationParams;
use crate::state::AppState;

/// Longest accepted courtroom name.
const MAX_ROOM_LEN: usize = 128;

// ─── DTOs ────────────────────────────────────────────────────────────

/// Request to file a complaint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FileCaseRequest {
    /// Offence description, 1..=500 characters after trimming.
    pub offence: String,
}

/// Hearing data for `scheduleHearing` / `adjourn`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HearingRequest {
    #[schema(value_type = Option<String>)]
    pub scheduled_at: Option<Timestamp>,
    pub room: Option<String>,
}

/// Request to move a case along one edge of the lifecycle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// camelCase action name, e.g. `grantVisa`.
    #[schema(value_type = String)]
    pub action: CaseAction,
    /// Case version the caller last read.
    pub expected_version: u64,
    /// Case status the caller last read.
    #[schema(value_type = Option<String>)]
    pub expected_status: Option<CaseState>,
    pub hearing: Option<HearingRequest>,
    /// Judge to assign at `enroll`.
    #[schema(value_type = Option<String>)]
    pub assigned_judge: Option<ActorId>,
}

impl Validate for TransitionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.expected_version == 0 {
            return Err("expected_version must be at least 1".to_string());
        }
        if let Some(room) = self.hearing.as_ref().and_then(|h| h.room.as_ref()) {
            if room.len() > MAX_ROOM_LEN {
                return Err(format!("hearing room must not exceed {MAX_ROOM_LEN} characters"));
            }
        }
        Ok(())
    }
}

impl TransitionRequest {
    fn into_command(self) -> TransitionCommand {
        TransitionCommand {
            action: self.action,
            expected_version: self.expected_version,
            expected_status: self.expected_status,
            hearing: self.hearing.map(|h| HearingDetails {
                scheduled_at: h.scheduled_at,
                room: h.room,
            }),
            assigned_judge: self.assigned_judge,
        }
    }
}

/// Filter for the case list.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCasesQuery {
    /// Only cases in this status (SCREAMING_SNAKE_CASE).
    #[param(value_type = Option<String>)]
    pub status: Option<CaseState>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// A case as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct CaseResponse {
    #[schema(value_type = String)]
    pub id: CaseId,
    #[schema(value_type = String)]
    pub status: CaseState,
    /// Optimistic-concurrency version; send it back as `expected_version`.
    pub version: u64,
    pub offence: String,
    #[schema(value_type = String)]
    pub filed_at: Timestamp,
    #[schema(value_type = Object)]
    pub filed_by: ActorRef,
    #[schema(value_type = Option<String>)]
    pub assigned_judge: Option<ActorId>,
    /// RG number, e.g. `RG 2026/00042`.
    #[schema(value_type = Option<String>)]
    pub case_number: Option<CaseNumber>,
    #[schema(value_type = Option<Object>)]
    pub custody: Option<CustodyRecord>,
    /// Custody clock at response time.
    #[schema(value_type = Option<Object>)]
    pub custody_clock: Option<CustodyClock>,
    #[schema(value_type = Option<Object>)]
    pub next_hearing: Option<HearingEvent>,
    #[schema(value_type = Vec<Object>)]
    pub transition_log: Vec<TransitionRecord>,
}

impl CaseResponse {
    pub(crate) fn from_file(file: &CaseFile, now: Timestamp) -> Self {
        let case = &file.case;
        Self {
            id: case.id(),
            status: case.status(),
            version: file.version,
            offence: case.offence().to_string(),
            filed_at: case.filed_at(),
            filed_by: case.filed_by().clone(),
            assigned_judge: case.assigned_judge().cloned(),
            case_number: case.case_number(),
            custody: case.custody().copied(),
            custody_clock: case.custody().map(|c| remaining_custody(c, now)),
            next_hearing: file.hearings.next_hearing(now).cloned(),
            transition_log: case.transition_log().to_vec(),
        }
    }
}

/// Actions the caller may take on a case right now.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableActionsResponse {
    #[schema(value_type = String)]
    pub case_id: CaseId,
    #[schema(value_type = String)]
    pub status: CaseState,
    pub version: u64,
    #[schema(value_type = String)]
    pub role: Role,
    #[schema(value_type = Vec<String>)]
    pub actions: Vec<CaseAction>,
}

/// A case's hearing ledger.
#[derive(Debug, Serialize, ToSchema)]
pub struct HearingLedgerResponse {
    #[schema(value_type = String)]
    pub case_id: CaseId,
    /// Whether the hash chain verifies.
    pub chain_valid: bool,
    #[schema(value_type = Option<Object>)]
    pub next_hearing: Option<HearingEvent>,
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<HearingEvent>,
}

// ─── Router ──────────────────────────────────────────────────────────

/// Build the cases router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/cases", get(list_cases).post(create_case))
        .route("/v1/cases/{id}", get(get_case))
        .route("/v1/cases/{id}/transition", post(transition_case))
        .route("/v1/cases/{id}/actions", get(case_actions))
        .route("/v1/cases/{id}/hearings", get(case_hearings))
}

pub(crate) fn load(state: &AppState, id: Uuid) -> Result<CaseFile, AppError> {
    let case_id = CaseId::from_uuid(id);
    state
        .cases
        .get(case_id)
        .ok_or_else(|| AppError::NotFound(format!("{case_id} not found")))
}

// ─── Handlers ────────────────────────────────────────────────────────

/// POST /v1/cases: File a complaint. Citizens and police only.
#[utoipa::path(
    post,
    path = "/v1/cases",
    request_body = FileCaseRequest,
    responses(
        (status = 201, description = "Case filed", body = CaseResponse),
        (status = 403, description = "Role cannot file", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid offence", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub async fn create_case(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<FileCaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CaseResponse>), AppError> {
    let req = extract_json(body)?;
    let now = Timestamp::now();
    let file = file_case(state.cases.as_ref(), &caller.actor(), &req.offence, now)?;
    Ok((StatusCode::CREATED, Json(CaseResponse::from_file(&file, now))))
}

/// GET /v1/cases: List cases, optionally by status.
#[utoipa::path(
    get,
    path = "/v1/cases",
    params(ListCasesQuery),
    responses(
        (status = 200, description = "Cases ordered by filing time", body = Vec<CaseResponse>),
        (status = 400, description = "Unknown status", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub async fn list_cases(
    State(state): State<AppState>,
    query: Result<Query<ListCasesQuery>, QueryRejection>,
) -> Result<Json<Vec<CaseResponse>>, AppError> {
    let query = extract_query(query)?;
    let now = Timestamp::now();
    let matching: Vec<CaseFile> = state
        .cases
        .list()
        .into_iter()
        .filter(|f| query.status.map_or(true, |s| f.case.status() == s))
        .collect();
    let page = PaginationParams {
        limit: query.limit,
        offset: query.offset,
    }
    .page(matching);
    Ok(Json(
        page.iter().map(|f| CaseResponse::from_file(f, now)).collect(),
    ))
}

/// GET /v1/cases/{id}: Get a case.
#[utoipa::path(
    get,
    path = "/v1/cases/{id}",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case found", body = CaseResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseResponse>, AppError> {
    let file = load(&state, id)?;
    Ok(Json(CaseResponse::from_file(&file, Timestamp::now())))
}

/// POST /v1/cases/{id}/transition: Apply one lifecycle action.
///
/// The status change, any hearing-ledger entry and the version bump commit
/// together or not at all.
#[utoipa::path(
    post,
    path = "/v1/cases/{id}/transition",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition committed", body = CaseResponse),
        (status = 400, description = "Malformed request or unknown action", body = crate::error::ErrorBody),
        (status = 403, description = "Role not permitted for this action", body = crate::error::ErrorBody),
        (status = 404, description = "Case not found", body = crate::error::ErrorBody),
        (status = 409, description = "Invalid transition, stale state, or custody already extended", body = crate::error::ErrorBody),
        (status = 422, description = "Missing data or hearing ledger rejected the entry", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub async fn transition_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: CallerIdentity,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<CaseResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let now = Timestamp::now();
    let file = execute_transition(
        state.cases.as_ref(),
        state.transition_context(),
        &caller.actor(),
        CaseId::from_uuid(id),
        &req.into_command(),
        now,
    )?;
    Ok(Json(CaseResponse::from_file(&file, now)))
}

/// GET /v1/cases/{id}/actions: Actions the caller's role may take now.
#[utoipa::path(
    get,
    path = "/v1/cases/{id}/actions",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Available actions", body = AvailableActionsResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub async fn case_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    caller: CallerIdentity,
) -> Result<Json<AvailableActionsResponse>, AppError> {
    let file = load(&state, id)?;
    let status = file.case.status();
    Ok(Json(AvailableActionsResponse {
        case_id: file.id(),
        status,
        version: file.version,
        role: caller.role,
        actions: available_actions(caller.role, status),
    }))
}

/// GET /v1/cases/{id}/hearings: The case's hearing ledger, oldest first.
#[utoipa::path(
    get,
    path = "/v1/cases/{id}/hearings",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Hearing ledger", body = HearingLedgerResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub async fn case_hearings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HearingLedgerResponse>, AppError> {
    let file = load(&state, id)?;
    let chain_valid = match file.hearings.verify_chain() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(case_id = %file.id(), error = %e, "hearing ledger failed verification");
            false
        }
    };
    Ok(Json(HearingLedgerResponse {
        case_id: file.id(),
        chain_valid,
        next_hearing: file.hearings.next_hearing(Timestamp::now()).cloned(),
        events: file.hearings.events().to_vec(),
    }))
}
