//! ConfigMap API Handlers
//!
//! Value lookup and change notifications over server-sent events.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use sidecar_core::dto::config_map::{ConfigValue, ConfigValueQuery, WatchQuery};
use std::collections::HashSet;
use tokio_stream::wrappers::ReceiverStream;

use crate::api::error::ApiResult;
use crate::service::workload_service::WorkloadManager;

/// GET /configmap/{key}
/// Read one value of a ConfigMap
///
/// Query parameters:
/// - `name` (optional): ConfigMap to read, the configured one when absent
/// - `namespace` (optional)
pub async fn get_config_value(
    State(manager): State<WorkloadManager>,
    Path(key): Path<String>,
    Query(query): Query<ConfigValueQuery>,
) -> ApiResult<Json<ConfigValue>> {
    let manager = manager.scoped(query.namespace.as_deref());
    tracing::debug!("Reading ConfigMap key {} in {}", key, manager.namespace());

    let value = manager
        .get_config_value(query.name.as_deref(), &key)
        .await?;
    Ok(Json(value))
}

/// GET /watch/configmap
/// Stream updates of the named ConfigMaps as `configmap` events
///
/// The watch ends when the client disconnects.
pub async fn watch_config_maps(
    State(manager): State<WorkloadManager>,
    Query(query): Query<WatchQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let manager = manager.scoped(query.namespace.as_deref());
    let names: HashSet<String> = query.name_list().into_iter().collect();
    tracing::info!("Watching ConfigMaps {:?} in {}", names, manager.namespace());

    let changes = manager.watch_config_maps(names).await?;
    let events = ReceiverStream::new(changes)
        .map(|change| Event::default().event("configmap").json_data(change));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
