//! Workload request handling
//!
//! Shared bodies of the Job and CronJob endpoints. The per-kind modules are
//! thin wrappers that fix the kind.

use axum::{Json, http::StatusCode};
use sidecar_core::domain::workload::{WorkloadHandle, WorkloadKind, WorkloadSummary};
use sidecar_core::dto::workload::{CreateWorkload, DeleteQuery, NamespaceQuery};

use crate::api::error::ApiResult;
use crate::service::template;
use crate::service::workload_service::{WorkloadError, WorkloadManager};

pub(crate) async fn list(
    manager: &WorkloadManager,
    kind: WorkloadKind,
    query: NamespaceQuery,
) -> ApiResult<Json<Vec<WorkloadSummary>>> {
    let manager = manager.scoped(query.namespace.as_deref());
    tracing::debug!("Listing {}s in {}", kind, manager.namespace());

    let workloads = manager.list(kind).await?;
    Ok(Json(workloads))
}

pub(crate) async fn get(
    manager: &WorkloadManager,
    kind: WorkloadKind,
    name: String,
    query: NamespaceQuery,
) -> ApiResult<Json<WorkloadSummary>> {
    let manager = manager.scoped(query.namespace.as_deref());
    tracing::debug!("Getting {} {}/{}", kind, manager.namespace(), name);

    let summary = manager.get(kind, &name).await?;
    Ok(Json(summary))
}

pub(crate) async fn create(
    manager: &WorkloadManager,
    kind: WorkloadKind,
    req: CreateWorkload,
) -> ApiResult<(StatusCode, Json<WorkloadHandle>)> {
    let manager = manager.scoped(req.namespace.as_deref());
    let workload = template::decode(kind, &req.template).map_err(WorkloadError::Decode)?;

    tracing::info!(
        "Creating {} {}/{} (wait: {})",
        kind,
        manager.namespace(),
        workload.name().unwrap_or_default(),
        req.wait
    );

    let handle = manager.create(workload, req.wait).await?;
    Ok((StatusCode::CREATED, Json(handle)))
}

pub(crate) async fn delete(
    manager: &WorkloadManager,
    kind: WorkloadKind,
    name: String,
    query: DeleteQuery,
) -> ApiResult<StatusCode> {
    let manager = manager.scoped(query.namespace.as_deref());
    tracing::info!("Deleting {} {}/{}", kind, manager.namespace(), name);

    manager.delete(kind, &name, query.wait).await?;
    Ok(StatusCode::NO_CONTENT)
}
