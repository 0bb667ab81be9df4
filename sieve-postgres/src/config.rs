//! PostgreSQL connection configuration.

use std::fmt;
use std::time::Duration;

use sieve_query::env::EnvSource;

use crate::error::{PgError, PgResult};

/// Environment variable holding the database URL.
pub const DATABASE_URL: &str = "DATABASE_URL";

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// PostgreSQL connection configuration.
#[derive(Clone)]
pub struct PgConfig {
    /// Host.
    pub host: String,
    /// Port (default: 5432).
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username.
    pub user: String,
    /// Password.
    pub password: Option<String>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Server-side statement timeout.
    pub statement_timeout: Option<Duration>,
    /// Application name (shown in pg_stat_activity).
    pub application_name: Option<String>,
}

impl PgConfig {
    /// Create a configuration from a database URL.
    ///
    /// Supported query parameters: `sslmode` (`disable` or `prefer`; the
    /// executor connects without TLS), `connect_timeout` (seconds),
    /// `statement_timeout` (milliseconds) and `application_name`.
    pub fn from_url(url: &str) -> PgResult<Self> {
        let parsed =
            url::Url::parse(url).map_err(|e| PgError::config(format!("invalid database URL: {}", e)))?;

        if parsed.scheme() != "postgresql" && parsed.scheme() != "postgres" {
            return Err(PgError::config(format!(
                "invalid scheme: expected 'postgresql' or 'postgres', got '{}'",
                parsed.scheme()
            )));
        }

        let mut builder = PgConfigBuilder::new()
            .host(
                parsed
                    .host_str()
                    .ok_or_else(|| PgError::config("missing host in URL"))?,
            )
            .port(parsed.port().unwrap_or(DEFAULT_PORT))
            .database(parsed.path().trim_start_matches('/'));

        if !parsed.username().is_empty() {
            builder = builder.user(parsed.username());
        }
        if let Some(password) = parsed.password() {
            builder = builder.password(password);
        }

        for (key, value) in parsed.query_pairs() {
            builder = match key.as_ref() {
                "sslmode" => match value.as_ref() {
                    "disable" | "prefer" => builder,
                    other => {
                        return Err(PgError::config(format!(
                            "unsupported sslmode '{}': TLS connections are not available",
                            other
                        )));
                    }
                },
                "connect_timeout" => {
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| PgError::config("invalid connect_timeout"))?;
                    builder.connect_timeout(Duration::from_secs(secs))
                }
                "statement_timeout" => {
                    let ms: u64 = value
                        .parse()
                        .map_err(|_| PgError::config("invalid statement_timeout"))?;
                    builder.statement_timeout(Duration::from_millis(ms))
                }
                "application_name" => builder.application_name(value.as_ref()),
                _ => builder,
            };
        }

        builder.build()
    }

    /// Create a configuration from `DATABASE_URL`.
    pub fn from_env(env: &impl EnvSource) -> PgResult<Self> {
        let url = env
            .get_non_empty(DATABASE_URL)
            .ok_or_else(|| PgError::config(format!("{} is not set", DATABASE_URL)))?;
        Self::from_url(&url)
    }

    /// Create a builder for configuration.
    pub fn builder() -> PgConfigBuilder {
        PgConfigBuilder::new()
    }

    /// Convert to tokio-postgres config.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&self.user)
            .connect_timeout(self.connect_timeout);

        if let Some(ref password) = self.password {
            config.password(password);
        }
        if let Some(ref app_name) = self.application_name {
            config.application_name(app_name);
        }
        if let Some(timeout) = self.statement_timeout {
            config.options(format!("-c statement_timeout={}", timeout.as_millis()));
        }

        config
    }
}

impl fmt::Debug for PgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .field("application_name", &self.application_name)
            .finish()
    }
}

/// Builder for PostgreSQL configuration.
#[derive(Debug, Default)]
pub struct PgConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    connect_timeout: Option<Duration>,
    statement_timeout: Option<Duration>,
    application_name: Option<String>,
}

impl PgConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the username.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the statement timeout.
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Set the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PgResult<PgConfig> {
        let database = self
            .database
            .filter(|db| !db.is_empty())
            .ok_or_else(|| PgError::config("database name is required"))?;

        Ok(PgConfig {
            host: self.host.unwrap_or_else(|| "localhost".to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            database,
            user: self.user.unwrap_or_else(|| "postgres".to_string()),
            password: self.password,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            statement_timeout: self.statement_timeout,
            application_name: self.application_name,
        })
    }
}
