//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! AppState holds:
//! - **Cases**: the [`CaseRepository`] holding case files (case, hearing
//!   ledger, version).
//! - **Outbox**: committed-transition events waiting for the notifier.
//! - **Case numbers**: the RG allocator used at enrollment.
//! - **Prometheus handle**: present when a recorder was installed at startup.

use std::str::FromStr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::events::{Outbox, DEFAULT_OUTBOX_CAPACITY};
use crate::orchestration::{CaseNumberAllocator, TransitionContext};
use crate::repository::{CaseRepository, InMemoryCaseRepository};

// -- Configuration ------------------------------------------------------------

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    pub log_format: LogFormat,
    /// Install the Prometheus recorder and count requests.
    pub metrics_enabled: bool,
    /// Undelivered events kept before the oldest are dropped.
    pub outbox_capacity: usize,
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// | Variable          | Default | Meaning                          |
    /// |-------------------|---------|----------------------------------|
    /// | `PORT`            | 8080    | listen port                      |
    /// | `AUTH_TOKEN`      | unset   | unset disables authentication    |
    /// | `LOG_FORMAT`      | text    | `text` or `json`                 |
    /// | `METRICS_ENABLED` | true    | anything but `false` enables     |
    /// | `OUTBOX_CAPACITY` | 10000   | pending events kept, at least 1  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid PORT, using default");
                defaults.port
            }),
            None => defaults.port,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "invalid LOG_FORMAT, using text");
                LogFormat::Text
            }),
            None => defaults.log_format,
        };

        let metrics_enabled = lookup("METRICS_ENABLED")
            .map(|v| v.trim().to_lowercase() != "false")
            .unwrap_or(defaults.metrics_enabled);

        let outbox_capacity = match lookup("OUTBOX_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = %raw, "invalid OUTBOX_CAPACITY, using default");
                    defaults.outbox_capacity
                }
            },
            None => defaults.outbox_capacity,
        };

        Self {
            port,
            auth_token: lookup("AUTH_TOKEN").filter(|t| !t.is_empty()),
            log_format,
            metrics_enabled,
            outbox_capacity,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("outbox_capacity", &self.outbox_capacity)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            log_format: LogFormat::Text,
            metrics_enabled: true,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cases: Arc<dyn CaseRepository>,
    pub outbox: Outbox,
    pub case_numbers: CaseNumberAllocator,
    /// Render handle of the installed Prometheus recorder.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// State with default configuration and an empty in-memory repository.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// State with the given configuration and an empty in-memory repository.
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_repository(config, Arc::new(InMemoryCaseRepository::new()))
    }

    /// State over an existing repository.
    pub fn with_repository(config: AppConfig, cases: Arc<dyn CaseRepository>) -> Self {
        Self {
            outbox: Outbox::with_capacity(config.outbox_capacity),
            config,
            cases,
            case_numbers: CaseNumberAllocator::new(),
            prometheus: None,
        }
    }

    /// Attach a Prometheus render handle for `/metrics`.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Collaborators passed to `execute_transition`.
    pub fn transition_context(&self) -> TransitionContext<'_> {
        TransitionContext {
            outbox: &self.outbox,
            case_numbers: &self.case_numbers,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("pending_events", &self.outbox.len())
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}
