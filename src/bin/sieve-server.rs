//! Sieve server - HTTP filtering over the demo `users` entity.
//!
//! With `DATABASE_URL` set, filters run against PostgreSQL. Without it the
//! server answers from the in-memory seed rows, where only the structured
//! compiler can execute.

use std::sync::Arc;

use sieve::http::{AppState, ServerConfig, router, serve};
use sieve::postgres::{PgExecutor, PgPool, PoolConfig};
use sieve::query::{FilterService, MemoryExecutor, QueryExecutor, StdEnvSource};
use sieve::users;
use tracing::{error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    sieve::query::init_logging();

    if let Err(e) = run().await {
        error!(error = %e, "Sieve server failed");
        eprintln!("sieve-server: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = ServerConfig::from_env(&StdEnvSource)?;

    let executor: Arc<dyn QueryExecutor> = match &config.database_url {
        Some(url) => {
            let pool = PgPool::builder()
                .url(url.as_str())
                .pool_config(PoolConfig::from_env(&StdEnvSource)?)
                .build()?;
            if !pool.is_healthy().await {
                warn!("PostgreSQL is not reachable yet; requests will fail until it is");
            }
            Arc::new(PgExecutor::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; serving seed rows from memory");
            Arc::new(MemoryExecutor::new().with_table(config.table.as_str(), users::sample_users()))
        }
    };

    let service = FilterService::new(
        users::registry()?,
        executor,
        users::service_config(&config.table),
    );

    info!(
        table = %config.table,
        max_depth = config.limits.max_depth,
        max_conditions = config.limits.max_conditions,
        "Starting sieve server"
    );
    serve(&config, router(AppState::new(service, config.limits))).await?;
    Ok(())
}
