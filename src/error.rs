//! Error types for the cache and its collaborators
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Storage Error ==
/// Failures of the persistent key-value backend.
///
/// The cache never surfaces these to its callers: reads degrade to an absent
/// view and writes become no-ops.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend is disabled or cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Writing the record would exceed the backend quota
    #[error("Quota exceeded writing {key}: needs {needed} bytes, limit {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Filesystem failure in a persisted backend
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted table could not be serialized
    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

// == Codec Error ==
/// Decode failure on a well-formed record envelope.
///
/// Records with too few segments are not errors; they read back as absent.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The payload of an `object` record is not valid JSON
    #[error("Invalid JSON payload: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

// == Remote Error ==
/// Failures of the remote search/scrape API.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Remote returned status {0}")]
    Status(u16),

    /// Response carried no usable object or list body
    #[error("Empty response body from {0}")]
    EmptyBody(String),

    /// The request was rejected before being sent
    #[error("Invalid remote request: {0}")]
    InvalidRequest(String),
}

// == Api Error ==
/// Error type for the HTTP facade.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP facade.
pub type Result<T> = std::result::Result<T, ApiError>;
