//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sidecar_core::dto::error::{ErrorKind, ErrorResponse};

use crate::repository::ClusterError;
use crate::service::workload_service::WorkloadError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    /// Refused by the API server; carries its status when it is a client error
    Rejected { status: StatusCode, message: String },
    ConvergenceFailed(String),
    DeadlineExceeded(String),
    Decode(String),
    Unavailable(String),
    InternalError(String),
}

impl ApiError {
    fn parts(self) -> (StatusCode, ErrorKind, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorKind::NotFound, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorKind::Conflict, msg),
            ApiError::Invalid(msg) => (StatusCode::BAD_REQUEST, ErrorKind::Invalid, msg),
            ApiError::Rejected { status, message } => (status, ErrorKind::Rejected, message),
            ApiError::ConvergenceFailed(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::ConvergenceFailed,
                msg,
            ),
            ApiError::DeadlineExceeded(msg) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::DeadlineExceeded,
                msg,
            ),
            ApiError::Decode(msg) => (StatusCode::BAD_REQUEST, ErrorKind::Decode, msg),
            ApiError::Unavailable(msg) => {
                tracing::error!("Cluster unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, ErrorKind::Unavailable, msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Internal, msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, error) = self.parts();
        (status, Json(ErrorResponse { error, kind })).into_response()
    }
}

impl From<ClusterError> for ApiError {
    fn from(err: ClusterError) -> Self {
        let message = err.to_string();
        match err {
            ClusterError::NotFound { .. } => ApiError::NotFound(message),
            ClusterError::Conflict(_) => ApiError::Conflict(message),
            ClusterError::Invalid(_) => ApiError::Invalid(message),
            ClusterError::Api { code, .. } => {
                let status = StatusCode::from_u16(code)
                    .ok()
                    .filter(StatusCode::is_client_error)
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::Rejected { status, message }
            }
            ClusterError::Connection(_) => ApiError::Unavailable(message),
        }
    }
}

impl From<WorkloadError> for ApiError {
    fn from(err: WorkloadError) -> Self {
        let message = err.to_string();
        match err {
            WorkloadError::NotFound(_) => ApiError::NotFound(message),
            WorkloadError::Submission(inner) | WorkloadError::Cluster(inner) => inner.into(),
            WorkloadError::Convergence { .. } => ApiError::ConvergenceFailed(message),
            WorkloadError::DeadlineExceeded { .. } => ApiError::DeadlineExceeded(message),
            WorkloadError::Decode(_) => ApiError::Decode(message),
            WorkloadError::InvalidRequest(_) => ApiError::Invalid(message),
            WorkloadError::Connection(_) => ApiError::Unavailable(message),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
