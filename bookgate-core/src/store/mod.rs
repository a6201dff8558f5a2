//! Storage backends for users and books
//!
//! Handlers never hold a global connection. A [`Store`] is opened once at
//! startup with [`open`], shared through application state, and closed on
//! shutdown.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::DatabaseSettings;
use crate::error::{Result, StoreError};
use crate::types::{Book, EnsuredUser, NewBook};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// URL prefix selecting the in-memory backend
pub const MEMORY_URL_PREFIX: &str = "memory:";

/// Operations on the `users` table
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Return the user's role, inserting the row with `default_role` if the
    /// email is unseen. Must be atomic: concurrent calls for one email leave
    /// exactly one row and all observe the same role.
    async fn ensure_user(&self, email: &str, default_role: &str) -> Result<EnsuredUser>;

    /// Set the role of an existing user, returning the number of rows changed.
    /// A missing email is not an error.
    async fn update_role(&self, email: &str, role: &str) -> Result<u64>;

    /// Create the `users` table if it does not exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert or overwrite `email` with `role`
    async fn force_role(&self, email: &str, role: &str) -> Result<()>;
}

/// Operations on the pre-existing `books` table
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every decodable book. Rows that fail to decode are skipped.
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// Insert a book
    async fn create_book(&self, book: &NewBook) -> Result<()>;
}

/// A complete backend with lifecycle hooks
#[async_trait]
pub trait Store: UserStore + BookStore {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Release connections. Further calls fail.
    async fn close(&self);
}

/// Open the backend selected by `settings.url`.
///
/// `lazy` defers connecting until the first query, which lets a service
/// start while the database is still coming up.
pub async fn open(settings: &DatabaseSettings, lazy: bool) -> Result<Arc<dyn Store>> {
    if settings.url.starts_with(MEMORY_URL_PREFIX) {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if !settings.url.starts_with("postgres://") && !settings.url.starts_with("postgresql://") {
        return Err(StoreError::InvalidUrl(redact_url(&settings.url)));
    }

    let store = if lazy {
        PgStore::connect_lazy(&settings.url, settings.max_connections)?
    } else {
        PgStore::connect(&settings.url, settings.max_connections).await?
    };

    info!(
        url = %redact_url(&settings.url),
        max_connections = settings.max_connections,
        lazy,
        "Using PostgreSQL store"
    );

    Ok(Arc::new(store))
}

/// Strip the password from a connection URL before it reaches a log line
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
