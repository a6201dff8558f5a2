//! API request and response types

use serde::{Deserialize, Serialize};

/// Header carrying the email authenticated by the OAuth proxy
pub const FORWARDED_EMAIL_HEADER: &str = "x-forwarded-email";

/// Header carrying the role the gateway requires for the route
pub const REQUIRED_ROLE_HEADER: &str = "x-required-role";

/// Header stamped with the caller's email for downstream services
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Header stamped with the caller's role for downstream services
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Header carrying the shared secret between gateway and services
pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

/// Confirmation body for successful writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

impl MessageResponse {
    /// Create a message body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: HealthStatus,

    /// Service name
    pub service: String,

    /// Service version
    pub version: String,

    /// Uptime in seconds
    pub uptime_seconds: u64,

    /// Store backend in use
    pub store: String,
}

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
    /// Service cannot reach its store
    Unhealthy,
}
