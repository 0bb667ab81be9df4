//! HTTP errors and the response envelope.

use axum::Json;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use sieve_query::QueryError;
use thiserror::Error;
use tracing::{debug, warn};

/// Response wrapper shared by every filter route.
///
/// ```json
/// { "isError": false, "body": { "message": "...", "data": [...] } }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the request failed.
    pub is_error: bool,
    /// Message and payload.
    pub body: EnvelopeBody<T>,
}

/// Body of an [`Envelope`].
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeBody<T> {
    /// Human readable outcome.
    pub message: String,
    /// Error code, on failures raised by the filter core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Payload, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A successful response carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            is_error: false,
            body: EnvelopeBody {
                message: message.into(),
                code: None,
                data: Some(data),
            },
        }
    }
}

/// An error answered with the failure envelope.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    code: Option<String>,
    message: String,
}

impl ApiError {
    /// Create an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// 400 for a payload that could not be read as a filter.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 for anything the caller cannot fix.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        debug!(details = %err.display_full(), "Filter core error");
        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            code: Some(err.code.code()),
            message: err.message,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, message = %self.message, "Request failed");
        }
        let envelope = Envelope::<()> {
            is_error: true,
            body: EnvelopeBody {
                message: self.message,
                code: self.code,
                data: None,
            },
        };
        (self.status, Json(envelope)).into_response()
    }
}
