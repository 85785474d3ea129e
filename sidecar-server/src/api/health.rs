//! Health Check API Handler
//!
//! Liveness endpoint for the kubelet. Does not touch the cluster.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
