//! # Authentication Middleware
//!
//! Bearer token middleware producing a [`CallerIdentity`].
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{actor_id}:{secret}    docket actor
//! Bearer {secret}                      legacy format (treated as admin)
//! ```
//!
//! The role is one of the nine docket roles (`citizen`, `police`, ...). The
//! secret is compared in constant time against `AUTH_TOKEN`.
//!
//! Authentication only establishes *who* is calling. Whether that role may
//! perform an action in the case's current status is decided by
//! `docket_state::authorize` inside the orchestration layer.
//!
//! When auth is disabled the token is still read for its role and actor so
//! that local development can act as any role; a request without a header
//! runs as admin.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use docket_core::{ActorId, ActorRef, Role};

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller, available to all route handlers via
/// Axum's `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub role: Role,
    pub actor_id: ActorId,
}

impl CallerIdentity {
    /// The identity used when auth is disabled or the legacy secret is sent.
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            actor_id: ActorId::admin(),
        }
    }

    /// The caller as a docket actor reference.
    pub fn actor(&self) -> ActorRef {
        ActorRef::new(self.role, self.actor_id.clone())
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present.
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller holds one of `allowed`.
/// Returns 403 Forbidden otherwise.
pub fn require_role(caller: &CallerIdentity, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&caller.role) {
        Ok(())
    } else {
        let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        Err(AppError::Forbidden(format!(
            "role '{}' not permitted, requires one of [{}]",
            caller.role,
            names.join(", ")
        )))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// When lengths differ, performs a dummy comparison so timing does not reveal
/// the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Split `{role}:{actor_id}:{secret}` into identity and secret.
fn split_token(provided: &str) -> Result<(CallerIdentity, &str), String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();
    let [role_str, actor_str, secret] = parts.as_slice() else {
        return Err("invalid token format, expected {role}:{actor_id}:{secret} or {secret}".into());
    };
    let role: Role = role_str.parse().map_err(|e| format!("{e}"))?;
    let actor_id = ActorId::new(*actor_str).map_err(|e| format!("{e}"))?;
    Ok((CallerIdentity { role, actor_id }, *secret))
}

/// Parse and verify a bearer token against the expected secret.
///
/// Legacy tokens (just the secret) are treated as admin.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    if !provided.contains(':') {
        return if constant_time_token_eq(provided, expected_secret) {
            Ok(CallerIdentity::admin())
        } else {
            Err("invalid bearer token".into())
        };
    }

    let (identity, secret) = split_token(provided)?;
    if !constant_time_token_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }
    Ok(identity)
}

/// Read the identity from a token without checking the secret.
///
/// Only used when auth is disabled.
fn unverified_identity(provided: &str) -> Result<CallerIdentity, String> {
    if !provided.contains(':') {
        return Ok(CallerIdentity::admin());
    }
    split_token(provided).map(|(identity, _)| identity)
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Extract and validate the Bearer token from the Authorization header.
///
/// Parses the token into a [`CallerIdentity`] and injects it into request
/// extensions for downstream handlers.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let identity = match (expected_token, auth_header) {
        (Some(expected), Some(value)) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, &expected) {
                Ok(identity) => identity,
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    return unauthorized_response(&msg);
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                return unauthorized_response("authorization header must use Bearer scheme");
            }
        },
        (Some(_), None) => {
            tracing::warn!("authentication failed: missing authorization header");
            return unauthorized_response("missing authorization header");
        }
        (None, Some(value)) => match value.strip_prefix("Bearer ").map(unverified_identity) {
            Some(Ok(identity)) => identity,
            Some(Err(msg)) => return unauthorized_response(&msg),
            None => CallerIdentity::admin(),
        },
        (None, None) => CallerIdentity::admin(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("abc", "abd"));
        assert!(!constant_time_token_eq("abc", "abcd"));
    }

    #[test]
    fn legacy_secret_is_admin() {
        let id = parse_bearer_token("s3cret", "s3cret").unwrap();
        assert_eq!(id, CallerIdentity::admin());
        assert!(parse_bearer_token("wrong", "s3cret").is_err());
    }

    #[test]
    fn role_token_parses() {
        let id = parse_bearer_token("clerk:greffe-2:s3cret", "s3cret").unwrap();
        assert_eq!(id.role, Role::Clerk);
        assert_eq!(id.actor_id.as_str(), "greffe-2");
        assert_eq!(id.actor().to_string(), "clerk:greffe-2");
    }

    #[test]
    fn secret_may_contain_colons() {
        let id = parse_bearer_token("judge:j-1:a:b:c", "a:b:c").unwrap();
        assert_eq!(id.role, Role::Judge);
    }

    #[test]
    fn role_token_with_wrong_secret_rejected() {
        assert_eq!(
            parse_bearer_token("judge:j-1:nope", "s3cret"),
            Err("invalid bearer token".into())
        );
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(parse_bearer_token("sheriff:s-1:s3cret", "s3cret").is_err());
    }

    #[test]
    fn empty_actor_rejected() {
        assert!(parse_bearer_token("police::s3cret", "s3cret").is_err());
    }

    #[test]
    fn two_part_token_rejected() {
        assert!(parse_bearer_token("police:s3cret", "s3cret").is_err());
    }

    #[test]
    fn unverified_identity_reads_role() {
        let id = unverified_identity("police:opj-7:anything").unwrap();
        assert_eq!(id.role, Role::Police);
        assert_eq!(unverified_identity("whatever").unwrap(), CallerIdentity::admin());
    }

    #[test]
    fn require_role_lists_allowed() {
        let caller = CallerIdentity {
            role: Role::Lawyer,
            actor_id: ActorId::new("av-1").unwrap(),
        };
        assert!(require_role(&caller, &[Role::Lawyer]).is_ok());
        let err = require_role(&caller, &[Role::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg.contains("admin")));
    }

    #[test]
    fn auth_config_debug_redacts() {
        let cfg = AuthConfig {
            token: Some("top-secret".into()),
        };
        assert!(!format!("{cfg:?}").contains("top-secret"));
    }
}
