//! # Request Metrics
//!
//! In-process request and error counters, plus the same counts recorded
//! through the `metrics` facade (`docket_http_requests_total{method,status}`)
//! so an installed Prometheus recorder picks them up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Shared metrics state.
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return current request count.
    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Return current error count.
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Prometheus text exposition of the in-process counters, used by
    /// `/metrics` when no recorder is installed.
    pub fn render_text(&self) -> String {
        format!(
            "# TYPE docket_api_requests counter\ndocket_api_requests {}\n\
             # TYPE docket_api_errors counter\ndocket_api_errors {}\n",
            self.requests(),
            self.errors()
        )
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        if status.is_server_error() || status.is_client_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }
    ::metrics::counter!(
        "docket_http_requests_total",
        "method" => method.clone(),
        "status" => status.as_u16().to_string(),
    )
    .increment(1);
    ::metrics::histogram!("docket_http_request_duration_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());

    response
}
