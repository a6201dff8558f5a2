//! bookgate core - role resolution and storage for the bookgate services
//!
//! This crate holds everything the auth decision service, the resource API
//! and the operator CLI share: the data model, the gate decision, the store
//! backends and configuration loading.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod gate;
pub mod store;
pub mod types;

pub use bootstrap::bootstrap;
pub use config::{DatabaseSettings, Settings};
pub use error::{ConfigError, GateError, Result, StoreError};
pub use gate::{decide, Identity, RoleRequirement, Verdict};
pub use store::{BookStore, MemoryStore, PgStore, Store, UserStore};
pub use types::{Book, EnsuredUser, NewBook, RoleUpdate, User, ADMIN_ROLE, DEFAULT_ROLE};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
