//! Error types for bookgate

use thiserror::Error;

/// Errors raised by a [`Store`](crate::store::Store) backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database driver reported a failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row could not be decoded into its model type
    #[error("Row decode error: {0}")]
    Decode(String),

    /// The store URL could not be understood
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// The store is closed or otherwise unusable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while deciding an auth request
#[derive(Error, Debug)]
pub enum GateError {
    /// No forwarded email was supplied
    #[error("No email provided")]
    MissingEmail,

    /// The role lookup failed
    #[error("Role lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while loading [`Settings`](crate::config::Settings)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Settings`](crate::config::Settings)
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// An override carried an unusable value
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting or environment variable name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_error_from_store_error() {
        let err: GateError = StoreError::Unavailable("closed".to_string()).into();
        assert!(matches!(err, GateError::Store(_)));
        assert_eq!(
            err.to_string(),
            "Role lookup failed: Store unavailable: closed"
        );
    }

    #[test]
    fn test_missing_email_display() {
        assert_eq!(GateError::MissingEmail.to_string(), "No email provided");
    }

    #[test]
    fn test_config_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: "DATABASE_MAX_CONNECTIONS".to_string(),
            value: "lots".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for DATABASE_MAX_CONNECTIONS: lots"
        );
    }
}
