//! Routes and shared router state.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use http::StatusCode;
use serde_json::json;
use sieve_query::{FilterService, QueryExecutor, Record};
use tracing::{debug, error};

use crate::error::{ApiError, Envelope};
use crate::request::{FilterLimits, FilterParams, FilterRequest};

/// A filter service over any executor.
pub type SharedService = FilterService<Arc<dyn QueryExecutor>>;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    service: Arc<SharedService>,
    limits: FilterLimits,
    success_message: Arc<str>,
}

impl AppState {
    /// Create state for `service`. The success message is derived from the
    /// entity name, so a `users` entity answers "Users filtered successfully".
    pub fn new(service: SharedService, limits: FilterLimits) -> Self {
        let success_message = format!("{} filtered successfully", capitalize(&service.config().entity));
        Self {
            service: Arc::new(service),
            limits,
            success_message: success_message.into(),
        }
    }

    /// Override the message returned with successful results.
    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into().into();
        self
    }

    /// The filter service.
    pub fn service(&self) -> &SharedService {
        &self.service
    }

    /// Transport limits.
    pub fn limits(&self) -> &FilterLimits {
        &self.limits
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("entity", &self.service.config().entity)
            .field("limits", &self.limits)
            .field("success_message", &self.success_message)
            .finish()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the router.
///
/// - `POST /filter` with a JSON filter body
/// - `GET /filter?filter=<URI-encoded JSON>`
/// - the same two under `/<entity>/filter`
/// - `GET /` liveness
/// - `GET /test-db` executor connectivity
pub fn router(state: AppState) -> Router {
    let body_limit = state.limits.max_body_bytes;
    let scoped = format!("/{}/filter", state.service.config().entity);
    Router::new()
        .route("/", get(root))
        .route("/test-db", get(test_db))
        .route("/filter", get(filter_get).post(filter_post))
        .route(&scoped, get(filter_get).post(filter_post))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "API is running" }))
}

async fn test_db(State(state): State<AppState>) -> Response {
    match state.service.ping().await {
        Ok(()) => Json(json!({ "message": "Database connection successful" })).into_response(),
        Err(e) => {
            error!(error = %e, "Database connection error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database connection failed" })),
            )
                .into_response()
        }
    }
}

async fn filter_post(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Envelope<Vec<Record>>>, ApiError> {
    let body = body?;
    debug!(bytes = body.len(), "POST /filter");
    let request = FilterRequest::from_json(&body)?;
    run(&state, request).await
}

async fn filter_get(
    State(state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Envelope<Vec<Record>>>, ApiError> {
    let Query(params) = params?;
    debug!("GET /filter");
    run(&state, params.into_request()?).await
}

async fn run(state: &AppState, request: FilterRequest) -> Result<Json<Envelope<Vec<Record>>>, ApiError> {
    let (filter, mode) = request.into_parts(&state.limits)?;
    let rows = state.service.filter(&filter, mode).await?;
    Ok(Json(Envelope::success(state.success_message.as_ref(), rows)))
}
