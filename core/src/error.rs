//! Error types for the API client.
//!
//! # Design
//! The client never wraps or rewrites a failure: whatever the transport (or a
//! caller-supplied interceptor) produces is what the caller receives. The
//! variants therefore mirror what a transport can report, plus the two local
//! failures the client itself can hit while building a request.

use thiserror::Error;

/// Result alias used by every client and transport operation.
pub type Response<R, E = ApiError> = Result<R, E>;

/// Errors surfaced by `ApiClient` methods.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The connection could not be established or was dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// The request did not complete within its timeout.
    #[error("request timeout")]
    Timeout,

    /// The request's cancellation token was signaled.
    #[error("request cancelled")]
    Cancelled,

    /// The transport could not be built or rejected the request shape.
    #[error("client build error: {0}")]
    Build(String),

    /// The request body or query could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response data could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_builder() {
            ApiError::Build(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ApiError::Other(err.to_string())
        }
    }
}
