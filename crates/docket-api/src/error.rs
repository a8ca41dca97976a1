//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps workflow errors from docket-state and docket-ledger to HTTP status
//! codes and machine-readable codes. Clients branch on the code:
//!
//! | Code                       | Status | Client reaction                  |
//! |----------------------------|--------|----------------------------------|
//! | `INVALID_TRANSITION`       | 409    | refresh the case and re-render   |
//! | `FORBIDDEN`                | 403    | hide the control for this role   |
//! | `STALE_STATE`              | 409    | refetch, then decide again       |
//! | `TRANSACTION_FAILED`       | 422    | fix the hearing data, resubmit   |
//! | `NOT_IN_CUSTODY`           | 409    | the case has no running clock    |
//! | `CUSTODY_ALREADY_EXTENDED` | 409    | the single renewal is used up    |
//!
//! Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use docket_state::{AuthError, CustodyError, FilingError, TransitionError};

use crate::orchestration::WorkflowError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "STALE_STATE", "FORBIDDEN").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Role not allowed (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No such edge from the case's current status (409).
    #[error("{message}")]
    InvalidTransition {
        message: String,
        details: serde_json::Value,
    },

    /// The caller's view of the case is out of date (409).
    #[error("stale state: {message}")]
    StaleState {
        message: String,
        details: serde_json::Value,
    },

    /// The hearing ledger refused the entry; nothing was written (422).
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Custody query on a case without a running clock (409).
    #[error("{0}")]
    NotInCustody(String),

    /// Second custody renewal (409).
    #[error("{0}")]
    CustodyAlreadyExtended(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    pub(crate) fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            Self::StaleState { .. } => (StatusCode::CONFLICT, "STALE_STATE"),
            Self::TransactionFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, "TRANSACTION_FAILED"),
            Self::NotInCustody(_) => (StatusCode::CONFLICT, "NOT_IN_CUSTODY"),
            Self::CustodyAlreadyExtended(_) => (StatusCode::CONFLICT, "CUSTODY_ALREADY_EXTENDED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match self {
            Self::InvalidTransition { details, .. } | Self::StaleState { details, .. } => {
                Some(details)
            }
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<docket_core::ValidationError> for AppError {
    fn from(err: docket_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::InvalidTransition { state, action } => Self::InvalidTransition {
                details: serde_json::json!({
                    "status": state,
                    "action": action,
                }),
                message: err.to_string(),
            },
            AuthError::Forbidden { .. } => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match &err {
            TransitionError::InvalidTransition { from, action } => Self::InvalidTransition {
                details: serde_json::json!({
                    "status": from,
                    "action": action,
                }),
                message: err.to_string(),
            },
            TransitionError::CustodyAlreadyExtended { .. } => {
                Self::CustodyAlreadyExtended(err.to_string())
            }
            TransitionError::MissingTransitionData { .. } => Self::Validation(err.to_string()),
            TransitionError::GrantMismatch { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<CustodyError> for AppError {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::NotInCustody { .. } => Self::NotInCustody(err.to_string()),
        }
    }
}

impl From<FilingError> for AppError {
    fn from(err: FilingError) -> Self {
        match &err {
            FilingError::RoleCannotFile { .. } => Self::Forbidden(err.to_string()),
            FilingError::Invalid(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound(id) => Self::NotFound(format!("{id} not found")),
            WorkflowError::Auth(e) => e.into(),
            WorkflowError::Transition(e) => e.into(),
            WorkflowError::Filing(e) => e.into(),
            WorkflowError::StaleState {
                case_id,
                expected_version,
                current_version,
                current_status,
            } => Self::StaleState {
                message: format!(
                    "{case_id} is at version {current_version}, request expected {expected_version}"
                ),
                details: serde_json::json!({
                    "current_version": current_version,
                    "current_status": current_status,
                }),
            },
            e @ WorkflowError::MissingHearingDetails { .. } => Self::Validation(e.to_string()),
            e @ WorkflowError::TransactionFailed { .. } => Self::TransactionFailed(e.to_string()),
            WorkflowError::CaseNumberExhausted(e) => Self::Internal(e.to_string()),
            WorkflowError::Storage(msg) => Self::Internal(msg),
        }
    }
}
