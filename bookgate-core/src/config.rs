//! Service configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables.
//!
//! ```toml
//! bootstrap_admin_email = "admin@example.com"
//! gateway_secret = "change-me"
//!
//! [database]
//! url = "postgres://postgres:mysecretpassword@db:5432/postgres?sslmode=disable"
//! max_connections = 10
//!
//! [auth]
//! bind_address = "0.0.0.0:4000"
//!
//! [api]
//! bind_address = "0.0.0.0:8080"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "BOOKGATE_CONFIG";

/// Complete settings for both services and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Database connection
    pub database: DatabaseSettings,
    /// Auth decision service listener
    pub auth: ListenerSettings,
    /// Resource API service listener
    pub api: ListenerSettings,
    /// Email forced to the admin role at startup
    pub bootstrap_admin_email: String,
    /// Shared secret expected in `X-Gateway-Secret`. `None` trusts every caller.
    pub gateway_secret: Option<String>,
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `postgres://...` URL, or `memory:` for the in-memory store
    pub url: String,
    /// Pool size
    pub max_connections: u32,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerSettings {
    /// Socket address to bind
    pub bind_address: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            url: "postgres://postgres:mysecretpassword@db:5432/postgres?sslmode=disable"
                .to_string(),
            max_connections: 10,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database: DatabaseSettings::default(),
            auth: ListenerSettings {
                bind_address: "0.0.0.0:4000".to_string(),
            },
            api: ListenerSettings {
                bind_address: "0.0.0.0:8080".to_string(),
            },
            bootstrap_admin_email: "admin@example.com".to_string(),
            gateway_secret: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Load settings the way the binaries do: defaults, then `path` (or the
    /// file named by `BOOKGATE_CONFIG`), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from `lookup`, keyed by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(raw) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "DATABASE_MAX_CONNECTIONS".to_string(),
                        value: raw,
                    })
                }
            };
        }
        if let Some(addr) = lookup("AUTH_BIND_ADDRESS") {
            self.auth.bind_address = addr;
        }
        if let Some(addr) = lookup("API_BIND_ADDRESS") {
            self.api.bind_address = addr;
        }
        if let Some(email) = lookup("BOOTSTRAP_ADMIN_EMAIL") {
            self.bootstrap_admin_email = email;
        }
        if let Some(secret) = lookup("GATEWAY_SHARED_SECRET") {
            self.gateway_secret = Some(secret).filter(|s| !s.is_empty());
        }

        self.validate()
    }

    /// Reject settings no service could run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "database.url".to_string(),
                value: String::new(),
            });
        }
        if self.bootstrap_admin_email.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "bootstrap_admin_email".to_string(),
                value: String::new(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_deployment() {
        let settings = Settings::default();
        assert_eq!(settings.auth.bind_address, "0.0.0.0:4000");
        assert_eq!(settings.api.bind_address, "0.0.0.0:8080");
        assert_eq!(settings.bootstrap_admin_email, "admin@example.com");
        assert!(settings.database.url.contains("@db:5432/postgres"));
        assert!(settings.gateway_secret.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            gateway_secret = "s3cret"

            [database]
            url = "memory:"
            "#,
        )
        .unwrap();

        assert_eq!(settings.database.url, "memory:");
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.gateway_secret.as_deref(), Some("s3cret"));
        assert_eq!(settings.api.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml("database = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "bootstrap_admin_email = \"root@example.com\"").unwrap();
        writeln!(file, "[auth]").unwrap();
        writeln!(file, "bind_address = \"127.0.0.1:4001\"").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.bootstrap_admin_email, "root@example.com");
        assert_eq!(settings.auth.bind_address, "127.0.0.1:4001");
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_file(Path::new("/nonexistent/bookgate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(lookup_from(&[
                ("DATABASE_URL", "memory:"),
                ("DATABASE_MAX_CONNECTIONS", "3"),
                ("API_BIND_ADDRESS", "127.0.0.1:9090"),
                ("GATEWAY_SHARED_SECRET", "abc"),
            ]))
            .unwrap();

        assert_eq!(settings.database.url, "memory:");
        assert_eq!(settings.database.max_connections, 3);
        assert_eq!(settings.api.bind_address, "127.0.0.1:9090");
        assert_eq!(settings.gateway_secret.as_deref(), Some("abc"));
        assert_eq!(settings.auth.bind_address, "0.0.0.0:4000");
    }

    #[test]
    fn test_empty_secret_disables_check() {
        let mut settings = Settings {
            gateway_secret: Some("old".to_string()),
            ..Settings::default()
        };
        settings
            .apply_overrides(lookup_from(&[("GATEWAY_SHARED_SECRET", "")]))
            .unwrap();
        assert!(settings.gateway_secret.is_none());
    }

    #[test]
    fn test_bad_pool_size() {
        for raw in ["0", "-1", "ten"] {
            let mut settings = Settings::default();
            let err = settings
                .apply_overrides(lookup_from(&[("DATABASE_MAX_CONNECTIONS", raw)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        }
    }

    #[test]
    fn test_empty_admin_email_rejected() {
        let mut settings = Settings::default();
        let err = settings
            .apply_overrides(lookup_from(&[("BOOTSTRAP_ADMIN_EMAIL", "")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
