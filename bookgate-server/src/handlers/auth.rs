//! Auth decision handler (`ANY /auth`)
//!
//! The gateway calls this endpoint before forwarding a request. Bodies are
//! plain text; the identity headers on 200 and 403 responses are copied by
//! the gateway onto the forwarded request.

use crate::api::{FORWARDED_EMAIL_HEADER, REQUIRED_ROLE_HEADER, USER_EMAIL_HEADER, USER_ROLE_HEADER};
use crate::state::AppState;
use crate::trust::header_str;
use axum::{
    extract::State,
    http::{header::InvalidHeaderValue, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bookgate_core::{decide, GateError, Identity, RoleRequirement, Verdict};
use std::time::Instant;
use tracing::{debug, error, Instrument};

/// Build the `X-User-Email` / `X-User-Role` response headers
fn identity_headers(identity: &Identity) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_EMAIL_HEADER, HeaderValue::from_str(&identity.email)?);
    headers.insert(USER_ROLE_HEADER, HeaderValue::from_str(&identity.role)?);
    Ok(headers)
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

fn verdict_response(verdict: &Verdict) -> Response {
    let headers = match identity_headers(verdict.identity()) {
        Ok(headers) => headers,
        Err(e) => {
            error!(error = %e, role = %verdict.identity().role, "Role is not a valid header value");
            return internal_error();
        }
    };

    match verdict {
        Verdict::Allow { .. } => (StatusCode::OK, headers).into_response(),
        Verdict::Forbidden { required, .. } => (
            StatusCode::FORBIDDEN,
            headers,
            format!("Forbidden - Required role: {}", required),
        )
            .into_response(),
    }
}

/// Decide whether the forwarded caller may pass the gateway
pub async fn authorize(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();

    let email = header_str(&headers, FORWARDED_EMAIL_HEADER);
    let requirement = RoleRequirement::from_header(header_str(&headers, REQUIRED_ROLE_HEADER));

    let span = crate::tracing::auth_decision_span(
        email.unwrap_or_default(),
        &requirement.to_string(),
    );

    let result = decide(&*state.store, email, &requirement)
        .instrument(span.clone())
        .await;

    let (outcome, response) = match result {
        Ok(verdict) => {
            debug!(
                parent: &span,
                email = %verdict.identity().email,
                role = %verdict.identity().role,
                "Auth decision: {}",
                verdict.label()
            );
            (verdict.label(), verdict_response(&verdict))
        }
        Err(GateError::MissingEmail) => (
            "unauthorized",
            (StatusCode::UNAUTHORIZED, "Unauthorized - No email provided").into_response(),
        ),
        Err(GateError::Store(e)) => {
            error!(parent: &span, error = %e, "Database error");
            ("error", internal_error())
        }
    };

    crate::tracing::record_outcome(&span, outcome, response.status().is_server_error());
    crate::metrics::record_decision(outcome, start.elapsed().as_secs_f64());

    response
}
