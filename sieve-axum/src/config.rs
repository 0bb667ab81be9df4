//! Server configuration.

use sieve_query::QueryResult;
use sieve_query::env::EnvSource;

use crate::request::FilterLimits;

/// Settings for the HTTP server, usually read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `SIEVE_HOST` | `0.0.0.0` |
/// | `PORT` | `3000` |
/// | `DATABASE_URL` | unset |
/// | `SIEVE_TABLE` | `users` |
/// | `SIEVE_MAX_BODY_BYTES` | `65536` |
/// | `SIEVE_MAX_FILTER_DEPTH` | `8` |
/// | `SIEVE_MAX_FILTER_CONDITIONS` | `100` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// PostgreSQL URL. Without one the server runs on seed data.
    pub database_url: Option<String>,
    /// Table (and entity) to filter.
    pub table: String,
    /// Transport limits.
    pub limits: FilterLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            table: "users".to_string(),
            limits: FilterLimits::default(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration, falling back to defaults for unset variables.
    pub fn from_env(env: &impl EnvSource) -> QueryResult<Self> {
        let defaults = Self::default();
        let limits = FilterLimits {
            max_body_bytes: env
                .parse("SIEVE_MAX_BODY_BYTES")?
                .unwrap_or(defaults.limits.max_body_bytes),
            max_depth: env
                .parse("SIEVE_MAX_FILTER_DEPTH")?
                .unwrap_or(defaults.limits.max_depth),
            max_conditions: env
                .parse("SIEVE_MAX_FILTER_CONDITIONS")?
                .unwrap_or(defaults.limits.max_conditions),
        };

        Ok(Self {
            host: env.get_or("SIEVE_HOST", &defaults.host),
            port: env.parse("PORT")?.unwrap_or(defaults.port),
            database_url: env.get_non_empty("DATABASE_URL"),
            table: env.get_or("SIEVE_TABLE", &defaults.table),
            limits,
        })
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sieve_query::MapEnvSource;
    use sieve_query::ErrorCode;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_env(&MapEnvSource::new()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let env = MapEnvSource::new()
            .set("SIEVE_HOST", "127.0.0.1")
            .set("PORT", "8080")
            .set("DATABASE_URL", "postgres://localhost/app")
            .set("SIEVE_TABLE", "accounts")
            .set("SIEVE_MAX_FILTER_DEPTH", "3");
        let config = ServerConfig::from_env(&env).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(config.table, "accounts");
        assert_eq!(config.limits.max_depth, 3);
        assert_eq!(config.limits.max_conditions, 100);
    }

    #[test]
    fn test_invalid_port() {
        let env = MapEnvSource::new().set("PORT", "eighty");
        let err = ServerConfig::from_env(&env).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }
}
