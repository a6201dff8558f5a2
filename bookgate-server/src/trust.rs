//! Trust boundary between the gateway and the services
//!
//! Both services act on headers set upstream. When a gateway secret is
//! configured every protected request must carry it in `X-Gateway-Secret`;
//! otherwise the headers are trusted as-is.

use crate::api::{GATEWAY_SECRET_HEADER, USER_EMAIL_HEADER, USER_ROLE_HEADER};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use tracing::warn;

/// Read a header as UTF-8, treating invalid bytes as absent
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Compare secrets without short-circuiting on the first differing byte
fn secrets_match(expected: &[u8], presented: &[u8]) -> bool {
    if expected.len() != presented.len() {
        return false;
    }
    expected
        .iter()
        .zip(presented)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Middleware rejecting requests that lack the configured gateway secret
pub async fn require_gateway_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.gateway_secret.as_deref() else {
        return next.run(request).await;
    };

    let presented = header_str(request.headers(), GATEWAY_SECRET_HEADER)
        .map(|presented| secrets_match(expected.as_bytes(), presented.as_bytes()));

    match presented {
        Some(true) => next.run(request).await,
        Some(false) => {
            warn!(path = %request.uri().path(), "Rejected request with wrong gateway secret");
            ApiError::Unauthorized("Invalid gateway secret".to_string()).into_response()
        }
        None => {
            warn!(path = %request.uri().path(), "Rejected request without gateway secret");
            ApiError::Unauthorized("Missing gateway secret".to_string()).into_response()
        }
    }
}

/// Caller identity as stamped by the gateway on `X-User-Email` / `X-User-Role`.
///
/// Used for logging only; the resource API performs no checks of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedIdentity {
    /// Value of `X-User-Email`
    pub email: Option<String>,
    /// Value of `X-User-Role`
    pub role: Option<String>,
}

impl TrustedIdentity {
    /// Read the identity headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            email: header_str(headers, USER_EMAIL_HEADER).map(str::to_string),
            role: header_str(headers, USER_ROLE_HEADER).map(str::to_string),
        }
    }

    /// Email for log fields, empty when absent
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    /// Role for log fields, empty when absent
    pub fn role_or_empty(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TrustedIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
