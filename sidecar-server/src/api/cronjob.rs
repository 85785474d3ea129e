//! CronJob API Handlers
//!
//! HTTP endpoints for CronJobs. Convergence means the CronJob reports at
//! least one active Job.

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

/// GET /cronjob
/// List CronJobs in the namespace
pub async fn list_cron_jobs(
    State(manager): State<WorkloadManager>,
    Query(query): Query<NamespaceQuery>,
) -> ApiResult<Json<Vec<WorkloadSummary>>> {
    workload::list(&manager, WorkloadKind::CronJob, query).await
}

/// GET /cronjob/{name}
/// Get one CronJob with its current status
pub async fn get_cron_job(
    State(manager): State<WorkloadManager>,
    Path(name): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> ApiResult<Json<WorkloadSummary>> {
    workload::get(&manager, WorkloadKind::CronJob, name, query).await
}

/// POST /cronjob
/// Submit a CronJob, optionally waiting for it to converge
///
/// The stored object always carries `concurrencyPolicy: Replace`.
pub async fn create_cron_job(
    State(manager): State<WorkloadManager>,
    Json(req): Json<CreateWorkload>,
) -> ApiResult<(StatusCode, Json<WorkloadHandle>)> {
    workload::create(&manager, WorkloadKind::CronJob, req).await
}

/// DELETE /cronjob/{name}
/// Delete a CronJob
pub async fn delete_cron_job(
    State(manager): State<WorkloadManager>,
    Path(name): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    workload::delete(&manager, WorkloadKind::CronJob, name, query).await
}
