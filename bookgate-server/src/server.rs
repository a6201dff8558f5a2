//! Process startup and graceful shutdown shared by both binaries

use crate::routes::{api_router, auth_router};
use crate::state::AppState;
use anyhow::Context;
use bookgate_core::{bootstrap, store, Settings, Store};
use tracing::{info, warn};

/// Which of the two services this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Auth decision service
    Auth,
    /// Resource API service
    Api,
}

impl Service {
    /// Name used in logs, health output and telemetry
    pub fn name(self) -> &'static str {
        match self {
            Service::Auth => "bookgate-auth",
            Service::Api => "bookgate-api",
        }
    }

    fn bind_address(self, settings: &Settings) -> &str {
        match self {
            Service::Auth => &settings.auth.bind_address,
            Service::Api => &settings.api.bind_address,
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal, shutting down gracefully...");
}

/// Bind `address`, which may name a host (`localhost:4000`) as well as an IP
pub async fn bind(address: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    let local = listener
        .local_addr()
        .with_context(|| format!("Failed to read local address of {}", address))?;
    info!("Listening on {}", local);
    Ok(listener)
}

/// Run `service` until a shutdown signal arrives.
///
/// The auth service connects eagerly and bootstraps the users table; any
/// failure there aborts startup before the listener binds. The API service
/// opens its pool lazily.
pub async fn run(service: Service, settings: Settings) -> anyhow::Result<()> {
    info!("Starting {} v{}", service.name(), env!("CARGO_PKG_VERSION"));

    let lazy = service == Service::Api;
    let store = store::open(&settings.database, lazy)
        .await
        .context("Database connection error")?;

    if service == Service::Auth {
        bootstrap(&*store, &settings.bootstrap_admin_email)
            .await
            .context("Failed to bootstrap users table")?;
    }

    if settings.gateway_secret.is_none() {
        warn!("No gateway secret configured, trusting identity headers from any caller");
    }

    let state = AppState::new(store.clone(), service.name())
        .with_gateway_secret(settings.gateway_secret.clone());

    let app = match service {
        Service::Auth => auth_router(state),
        Service::Api => api_router(state),
    };

    let listener = bind(service.bind_address(&settings)).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Closing store");
    store.close().await;

    info!("{} shutdown complete", service.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_names() {
        assert_eq!(Service::Auth.name(), "bookgate-auth");
        assert_eq!(Service::Api.name(), "bookgate-api");
    }

    #[test]
    fn test_bind_address_per_service() {
        let settings = Settings::default();
        assert_eq!(Service::Auth.bind_address(&settings), "0.0.0.0:4000");
        assert_eq!(Service::Api.bind_address(&settings), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_auth_startup_fails_on_bad_store_url() {
        let mut settings = Settings::default();
        settings.database.url = "sqlite://nope".to_string();

        let err = run(Service::Auth, settings).await.unwrap_err();
        assert!(err.to_string().contains("Database connection error"));
    }

    #[tokio::test]
    async fn test_invalid_bind_address() {
        let mut settings = Settings::default();
        settings.database.url = "memory:".to_string();
        settings.api.bind_address = "not-an-address".to_string();

        let err = run(Service::Api, settings).await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind not-an-address"));
    }

    #[tokio::test]
    async fn test_bind_accepts_hostname() {
        let listener = bind("localhost:0").await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }
}
