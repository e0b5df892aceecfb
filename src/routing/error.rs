//! Relay error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure surfaced to the inbound caller.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The pool is empty, holds no healthy instance, or every candidate
    /// failed within one pass.
    #[error("no backends available")]
    NoBackends,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::NoBackends => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

/// Failure of one forward attempt. Handled locally by the relay loop.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("forward timed out")]
    Timeout,
    #[error("failed to build request: {0}")]
    Build(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read upstream body: {0}")]
    Body(#[from] axum::Error),
    #[error("upstream body is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
