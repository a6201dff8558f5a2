//! Application state

use bookgate_core::Store;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend for users and books
    pub store: Arc<dyn Store>,

    /// Name reported by health checks
    pub service: &'static str,

    /// Secret the gateway must present, if configured
    pub gateway_secret: Option<Arc<str>>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state trusting every caller
    pub fn new(store: Arc<dyn Store>, service: &'static str) -> Self {
        Self {
            store,
            service,
            gateway_secret: None,
            start_time: Instant::now(),
        }
    }

    /// Require `secret` in `X-Gateway-Secret` on protected routes
    pub fn with_gateway_secret(mut self, secret: Option<String>) -> Self {
        self.gateway_secret = secret.map(Arc::from);
        self
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
