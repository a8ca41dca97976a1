//! # docket-api: Axum API Service
//!
//! HTTP surface of the docket engine. Route handlers translate requests into
//! orchestration commands; the orchestration layer authorizes, applies the
//! transition, appends to the hearing ledger and commits atomically.
//!
//! ## API Surface
//!
//! | Prefix                   | Module                 | Concern                  |
//! |--------------------------|------------------------|--------------------------|
//! | `/v1/cases/*`            | [`routes::cases`]      | filing, transitions      |
//! | `/v1/cases/{id}/custody` | [`routes::custody`]    | custody clock            |
//! | `/v1/custody/watchlist`  | [`routes::custody`]    | custody dashboard        |
//! | `/v1/hearings`           | [`routes::hearings`]   | hearing calendar         |
//! | `/v1/matrix`             | [`routes::matrix`]     | authorization matrix     |
//! | `/v1/events`             | [`routes::events`]     | notifier outbox          |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod auth;
pub mod error;
pub mod events;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod orchestration;
pub mod repository;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the auth
/// middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let metrics_on = state.config.metrics_enabled;

    let mut api = routes::router()
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(from_fn(auth::auth_middleware));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", get(render_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics: Prometheus scrape endpoint.
///
/// Renders the installed recorder when there is one, otherwise the
/// in-process request counters.
async fn render_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let body = match &state.prometheus {
        Some(handle) => handle.render(),
        None => metrics.render_text(),
    };
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the repository answers reads.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let cases = state.cases.list().len();
    tracing::debug!(cases, "readiness check");
    (StatusCode::OK, "ready")
}
