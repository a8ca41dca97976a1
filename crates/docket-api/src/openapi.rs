//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Bearer token `{role}:{actor_id}:{secret}`. Secret set via AUTH_TOKEN.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the docket API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docket API",
        version = "0.1.0",
        description = "Judicial case lifecycle and custody-deadline engine.\n\nProvides:\n- **Case filing** and role-authorized lifecycle transitions with optimistic concurrency\n- **Hearing sub-ledger** appended atomically with hearing transitions\n- **Custody clock** per case and a watchlist ordered by urgency\n- **Hearing calendar** across cases\n- **Authorization matrix** as data\n- **Event outbox** for the notifier\n\nAll `/v1/*` endpoints require `Authorization: Bearer <token>` when AUTH_TOKEN is set. Health probes and `/metrics` are unauthenticated.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::cases::create_case,
        crate::routes::cases::list_cases,
        crate::routes::cases::get_case,
        crate::routes::cases::transition_case,
        crate::routes::cases::case_actions,
        crate::routes::cases::case_hearings,
        crate::routes::custody::case_custody,
        crate::routes::custody::watchlist,
        crate::routes::hearings::hearing_calendar,
        crate::routes::matrix::get_matrix,
        crate::routes::events::drain_events,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::cases::FileCaseRequest,
        crate::routes::cases::HearingRequest,
        crate::routes::cases::TransitionRequest,
        crate::routes::cases::CaseResponse,
        crate::routes::cases::AvailableActionsResponse,
        crate::routes::cases::HearingLedgerResponse,
        crate::routes::custody::CustodyResponse,
        crate::routes::custody::WatchlistResponse,
        crate::routes::hearings::CalendarResponse,
        crate::routes::matrix::MatrixRow,
        crate::routes::matrix::MatrixResponse,
        crate::routes::events::DrainResponse,
        crate::events::CaseTransitioned,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "cases", description = "Filing, reading and transitioning cases"),
        (name = "custody", description = "Garde à vue clock and watchlist"),
        (name = "hearings", description = "Hearing calendar across cases"),
        (name = "matrix", description = "Authorization matrix"),
        (name = "events", description = "Domain event outbox"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_has_every_case_path() {
        let spec = ApiDoc::openapi();
        for path in [
            "/v1/cases",
            "/v1/cases/{id}",
            "/v1/cases/{id}/transition",
            "/v1/cases/{id}/actions",
            "/v1/cases/{id}/hearings",
            "/v1/cases/{id}/custody",
            "/v1/custody/watchlist",
            "/v1/hearings",
            "/v1/matrix",
            "/v1/events",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn spec_has_security_scheme() {
        let spec = ApiDoc::openapi();
        let components = spec.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("ErrorBody"));
    }

    #[test]
    fn spec_serializes() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Docket API"));
    }
}
