//! Error types for the sidecar client

use sidecar_core::dto::error::{ErrorKind, ErrorResponse};
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the sidecar client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Failure class reported by the sidecar, when the body carried one
        kind: Option<ErrorKind>,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            kind: None,
            message: message.into(),
        }
    }

    /// Create an API error from a raw error body
    ///
    /// Bodies in the sidecar's JSON error format keep their kind; anything
    /// else is carried verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(response) => Self::ApiError {
                status,
                kind: Some(response.kind),
                message: response.error,
            },
            Err(_) => Self::api_error(status, body),
        }
    }

    /// Failure class reported by the sidecar
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ApiError { kind, .. } => *kind,
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
            || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the workload was submitted but did not converge in time
    pub fn is_deadline_exceeded(&self) -> bool {
        self.kind() == Some(ErrorKind::DeadlineExceeded)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
