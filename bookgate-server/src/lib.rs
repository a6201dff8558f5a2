//! bookgate HTTP services
//!
//! Two axum services over one store:
//! - the auth decision service answers `/auth` for the gateway and stamps
//!   `X-User-Email` / `X-User-Role`;
//! - the resource API serves `/books` and `/users/role`.

pub mod api;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;
pub mod tracing;
pub mod trust;

pub use api::{HealthResponse, HealthStatus, MessageResponse};
pub use error::{ApiError, ApiResult};
pub use routes::{api_router, auth_router};
pub use server::{run, Service};
pub use state::AppState;
pub use trust::TrustedIdentity;
