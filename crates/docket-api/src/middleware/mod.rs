//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`metrics`]: in-process request and error counters.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly.

pub mod metrics;
