//! Error types for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookgate_core::StoreError;
use serde::Serialize;
use std::fmt;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Unauthorized (401)
    Unauthorized(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),

    /// Store failure. Only `message` reaches the client.
    Store {
        /// Client-facing message
        message: &'static str,
        /// Underlying failure, logged server-side
        source: StoreError,
    },

    /// Request body is not the expected JSON
    SerializationError(serde_json::Error),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// Wrap a store failure behind a generic client message
    pub fn store(message: &'static str, source: StoreError) -> Self {
        ApiError::Store { message, source }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SerializationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::Store { message, source } => write!(f, "{}: {}", message, source),
            ApiError::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(msg) | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::Store { message, source } => {
                tracing::error!(error = %source, "{}", message);
                crate::metrics::record_store_error(message);
                message.to_string()
            }
            ApiError::SerializationError(e) => {
                tracing::info!(error = %e, "Invalid input");
                "Invalid input".to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Unauthorized("Missing gateway secret".to_string());
        assert_eq!(format!("{}", err), "Unauthorized: Missing gateway secret");

        let err = ApiError::ServiceUnavailable("Store unreachable".to_string());
        assert_eq!(format!("{}", err), "Service unavailable: Store unreachable");

        let err = ApiError::store(
            "Failed to add book",
            StoreError::Unavailable("closed".to_string()),
        );
        assert_eq!(
            format!("{}", err),
            "Failed to add book: Store unavailable: closed"
        );
    }

    #[test]
    fn test_api_error_from_serde_error() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let api_err: ApiError = serde_err.into();
        assert!(matches!(api_err, ApiError::SerializationError(_)));
        assert_eq!(api_err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_error_hides_detail() {
        let err = ApiError::store(
            "Failed to fetch books",
            StoreError::Decode("relation \"books\" does not exist".to_string()),
        );
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"error": "Failed to fetch books"}));
    }

    #[tokio::test]
    async fn test_serialization_error_response() {
        let serde_err = serde_json::from_str::<String>("{bad json}").unwrap_err();
        let response = ApiError::SerializationError(serde_err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid input");
    }

    #[tokio::test]
    async fn test_unauthorized_response() {
        let response = ApiError::Unauthorized("Invalid gateway secret".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid gateway secret");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Unauthorized("x".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::ServiceUnavailable("x".to_string()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::store("Failed to add book", StoreError::Unavailable("x".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
