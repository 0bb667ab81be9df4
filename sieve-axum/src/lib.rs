//! Axum HTTP surface for sieve.
//!
//! Exposes a [`FilterService`](sieve_query::FilterService) over HTTP:
//!
//! - `POST /filter` takes a JSON filter, optionally with `"config": "sql"`
//! - `GET /filter?filter=<URI-encoded JSON>` takes the same payload
//! - `GET /` and `GET /test-db` report liveness and store connectivity
//!
//! Filter responses use the envelope
//! `{"isError": bool, "body": {"message": ..., "data": ...}}`. Caller
//! mistakes answer 400, execution failures 500.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sieve_axum::{AppState, ServerConfig, router, serve};
//! use sieve_query::prelude::*;
//! use sieve_query::StdEnvSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env(&StdEnvSource)?;
//!     let executor: Arc<dyn QueryExecutor> = Arc::new(executor);
//!     let service = FilterService::new(registry, executor, ServiceConfig::new(&config.table));
//!
//!     serve(&config, router(AppState::new(service, config.limits))).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod request;
pub mod routes;

use axum::Router;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::{ApiError, Envelope, EnvelopeBody};
pub use request::{FilterLimits, FilterParams, FilterRequest};
pub use routes::{AppState, SharedService, router};

/// Bind `config`'s address and serve `app` until Ctrl-C.
pub async fn serve(config: &ServerConfig, app: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %listener.local_addr()?, "Sieve server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Sieve server shutting down");
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ApiError, AppState, Envelope, FilterLimits, FilterRequest, ServerConfig, router, serve,
    };
    pub use sieve_query::prelude::*;
}
