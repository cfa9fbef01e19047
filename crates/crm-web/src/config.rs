//! Configuration loaded from environment variables.

use std::collections::BTreeMap;
use std::env;
use std::net::SocketAddr;

use crm_core::session::{FLAG_AUTHENTICATED, FLAG_EMAIL, FLAG_LOGIN_TIME, FLAG_ROLE};

/// CRM web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Persisted session flags the server starts with.
    pub session_flags: BTreeMap<String, String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CRM_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:crm.db?mode=rwc` |
    /// | `CRM_STATIC_DIR` | Static asset directory | `static` |
    /// | `CRM_USER_ROLE` | Role of the signed-in user | (anonymous) |
    /// | `CRM_USER_EMAIL` | Email of the signed-in user | - |
    /// | `CRM_LOGIN_TIME` | RFC 3339 sign-in time | - |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("CRM_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = lookup("SQLITE_PATH")
            .unwrap_or_else(|| "sqlite:crm.db?mode=rwc".to_string());

        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidDatabaseUrl(database_url));
        }

        let static_dir = lookup("CRM_STATIC_DIR").unwrap_or_else(|| "static".to_string());

        let mut session_flags = BTreeMap::new();
        if let Some(role) = lookup("CRM_USER_ROLE") {
            session_flags.insert(FLAG_AUTHENTICATED.to_string(), "true".to_string());
            session_flags.insert(FLAG_ROLE.to_string(), role);
        }
        for (var, flag) in [("CRM_USER_EMAIL", FLAG_EMAIL), ("CRM_LOGIN_TIME", FLAG_LOGIN_TIME)] {
            if let Some(value) = lookup(var) {
                session_flags.insert(flag.to_string(), value);
            }
        }

        Ok(Self {
            addr,
            database_url,
            static_dir,
            session_flags,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CRM_ADDR format")]
    InvalidAddr,

    #[error("SQLITE_PATH must be a sqlite: URL, got {0}")]
    InvalidDatabaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8788");
        assert_eq!(config.database_url, "sqlite:crm.db?mode=rwc");
        assert_eq!(config.static_dir, "static");
        assert!(config.session_flags.is_empty());
    }

    #[test]
    fn test_session_flags() {
        let config = Config::from_lookup(lookup(&[
            ("CRM_USER_ROLE", "manager"),
            ("CRM_USER_EMAIL", "dana@roofco.com"),
        ]))
        .unwrap();
        assert_eq!(config.session_flags.get(FLAG_AUTHENTICATED).unwrap(), "true");
        assert_eq!(config.session_flags.get(FLAG_ROLE).unwrap(), "manager");
        assert_eq!(config.session_flags.get(FLAG_EMAIL).unwrap(), "dana@roofco.com");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CRM_ADDR", "0.0.0.0:9000"),
            ("SQLITE_PATH", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("CRM_ADDR", "nope")])),
            Err(ConfigError::InvalidAddr)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("SQLITE_PATH", "postgres://x")])),
            Err(ConfigError::InvalidDatabaseUrl(_))
        ));
    }
}
