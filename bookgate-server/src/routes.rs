//! Routers for the two services

use crate::handlers;
use crate::state::AppState;
use crate::trust::require_gateway_secret;
use axum::{
    middleware,
    routing::{any, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Health and metrics routes, never behind the gateway secret
fn operational_routes() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(handlers::health_live))
        .route("/health/ready", get(handlers::health_ready))
        .route("/metrics", get(handlers::metrics))
}

/// Router of the auth decision service
pub fn auth_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/auth", any(handlers::authorize))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_gateway_secret,
        ));

    Router::new()
        .merge(gated)
        .merge(operational_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Router of the resource API service
pub fn api_router(state: AppState) -> Router {
    let gated = Router::new()
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route("/users/role", put(handlers::update_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_gateway_secret,
        ));

    Router::new()
        .merge(gated)
        .merge(operational_routes())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
