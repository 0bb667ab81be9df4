//! Connection pool for PostgreSQL.

use std::sync::Arc;
use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use sieve_query::env::EnvSource;
use tokio_postgres::NoTls;
use tracing::{debug, info, warn};

use crate::config::PgConfig;
use crate::error::{PgError, PgResult};

/// A connection pool for PostgreSQL.
#[derive(Clone)]
pub struct PgPool {
    inner: Pool,
    config: Arc<PgConfig>,
}

impl PgPool {
    /// Create a new connection pool from configuration.
    ///
    /// Connections are opened lazily, so this succeeds even when the
    /// database is unreachable.
    pub fn new(config: PgConfig) -> PgResult<Self> {
        Self::with_pool_config(config, PoolConfig::default())
    }

    /// Create a new connection pool with custom pool configuration.
    pub fn with_pool_config(config: PgConfig, pool_config: PoolConfig) -> PgResult<Self> {
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(config.to_pg_config(), NoTls, mgr_config);

        let pool = Pool::builder(mgr)
            .max_size(pool_config.max_connections)
            .wait_timeout(pool_config.connection_timeout)
            .create_timeout(pool_config.connection_timeout)
            .recycle_timeout(pool_config.recycle_timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| PgError::config(format!("failed to create pool: {}", e)))?;

        info!(
            host = %config.host,
            port = %config.port,
            database = %config.database,
            max_connections = %pool_config.max_connections,
            "PostgreSQL connection pool created"
        );

        Ok(Self {
            inner: pool,
            config: Arc::new(config),
        })
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> PgResult<Object> {
        debug!("Acquiring connection from pool");
        Ok(self.inner.get().await?)
    }

    /// Get the current pool status.
    pub fn status(&self) -> PoolStatus {
        let status = self.inner.status();
        PoolStatus {
            available: status.available,
            size: status.size,
            max_size: status.max_size,
            waiting: status.waiting,
        }
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &PgConfig {
        &self.config
    }

    /// Check that a connection can be acquired and answers `SELECT 1`.
    pub async fn is_healthy(&self) -> bool {
        match self.inner.get().await {
            Ok(client) => match client.query_one("SELECT 1", &[]).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "PostgreSQL health check query failed");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "PostgreSQL health check could not acquire a connection");
                false
            }
        }
    }

    /// Close the pool and all connections.
    pub fn close(&self) {
        self.inner.close();
        info!("PostgreSQL connection pool closed");
    }

    /// Create a builder for configuring the pool.
    pub fn builder() -> PgPoolBuilder {
        PgPoolBuilder::new()
    }
}

/// Pool status information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of available (idle) connections.
    pub available: usize,
    /// Current total size of the pool.
    pub size: usize,
    /// Maximum size of the pool.
    pub max_size: usize,
    /// Number of tasks waiting for a connection.
    pub waiting: usize,
}

/// Configuration for the connection pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: usize,
    /// Maximum time to wait for (or create) a connection.
    pub connection_timeout: Option<Duration>,
    /// Maximum time spent recycling an idle connection.
    pub recycle_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout: Some(Duration::from_secs(30)),
            recycle_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl PoolConfig {
    /// Read overrides from `SIEVE_PG_MAX_CONNECTIONS` and
    /// `SIEVE_PG_CONNECT_TIMEOUT_SECS`.
    pub fn from_env(env: &impl EnvSource) -> PgResult<Self> {
        let mut config = Self::default();
        let invalid = |e: sieve_query::QueryError| PgError::config(e.message);

        if let Some(n) = env
            .parse::<usize>("SIEVE_PG_MAX_CONNECTIONS")
            .map_err(invalid)?
        {
            if n == 0 {
                return Err(PgError::config(
                    "SIEVE_PG_MAX_CONNECTIONS must be at least 1",
                ));
            }
            config.max_connections = n;
        }
        if let Some(secs) = env
            .parse::<u64>("SIEVE_PG_CONNECT_TIMEOUT_SECS")
            .map_err(invalid)?
        {
            config.connection_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Builder for creating a connection pool.
#[derive(Debug, Default)]
pub struct PgPoolBuilder {
    config: Option<PgConfig>,
    url: Option<String>,
    pool_config: PoolConfig,
}

impl PgPoolBuilder {
    /// Create a new pool builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: PgConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the pool settings wholesale.
    pub fn pool_config(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: usize) -> Self {
        self.pool_config.max_connections = n;
        self
    }

    /// Set the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.pool_config.connection_timeout = Some(timeout);
        self
    }

    /// Set the recycle timeout.
    pub fn recycle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_config.recycle_timeout = Some(timeout);
        self
    }

    /// Build the connection pool.
    pub fn build(self) -> PgResult<PgPool> {
        let config = match (self.config, self.url) {
            (Some(config), _) => config,
            (None, Some(url)) => PgConfig::from_url(&url)?,
            (None, None) => return Err(PgError::config("no database URL or config provided")),
        };

        PgPool::with_pool_config(config, self.pool_config)
    }
}

impl std::fmt::Debug for PgPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPool")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}
