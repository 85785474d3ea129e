//! Job API Handlers
//!
//! HTTP endpoints for Jobs.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sidecar_core::domain::workload::{WorkloadHandle, WorkloadKind, WorkloadSummary};
use sidecar_core::dto::workload::{CreateWorkload, DeleteQuery, NamespaceQuery};

use crate::api::error::ApiResult;
use crate::api::workload;
use crate::service::workload_service::WorkloadManager;

/// GET /job
/// List Jobs in the namespace
pub async fn list_jobs(
    State(manager): State<WorkloadManager>,
    Query(query): Query<NamespaceQuery>,
) -> ApiResult<Json<Vec<WorkloadSummary>>> {
    workload::list(&manager, WorkloadKind::Job, query).await
}

/// GET /job/{name}
/// Get one Job with its current status
pub async fn get_job(
    State(manager): State<WorkloadManager>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> ApiResult<Json<WorkloadSummary>> {
    workload::get(&manager, WorkloadKind::Job, name, query).await
}

/// POST /job
/// Submit a Job, optionally waiting for it to converge
pub async fn create_job(
    State(manager): State<WorkloadManager>,
    Json(req): Json<CreateWorkload>,
) -> ApiResult<(StatusCode, Json<WorkloadHandle>)> {
    workload::create(&manager, WorkloadKind::Job, req).await
}

/// DELETE /job/{name}
/// Delete a Job
pub async fn delete_job(
    State(manager): State<WorkloadManager>,
    Path(name): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    workload::delete(&manager, WorkloadKind::Job, name, query).await
}
