//! Repository Module
//!
//! Access to the Kubernetes API for the three resource kinds the sidecar
//! touches: Jobs, CronJobs (read/write) and ConfigMaps (read/watch).
//!
//! Every call is a single round-trip; nothing is cached and nothing is retried
//! at this layer.

pub mod kubernetes;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::ConfigMap;
use sidecar_core::domain::config_map::ConfigMapChange;
use sidecar_core::domain::workload::{WorkloadKind, WorkloadStatus};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::mpsc;

pub use kubernetes::KubeRepository;

/// Errors surfaced by the cluster API
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("rejected as invalid: {0}")]
    Invalid(String),

    #[error("API error (status {code}): {message}")]
    Api { code: u16, message: String },

    #[error("cannot reach the cluster: {0}")]
    Connection(String),
}

impl ClusterError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A Job or CronJob object as stored by the API server
#[derive(Debug, Clone)]
pub enum Workload {
    Job(Job),
    CronJob(CronJob),
}

impl Workload {
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::Job(_) => WorkloadKind::Job,
            Workload::CronJob(_) => WorkloadKind::CronJob,
        }
    }

    pub fn name(&self) -> Option<&str> {
        let meta = match self {
            Workload::Job(job) => &job.metadata,
            Workload::CronJob(cron) => &cron.metadata,
        };
        meta.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        let meta = match self {
            Workload::Job(job) => &mut job.metadata,
            Workload::CronJob(cron) => &mut cron.metadata,
        };
        meta.namespace = Some(namespace.to_string());
    }

    /// Status projection; missing counters read as zero
    pub fn status(&self) -> WorkloadStatus {
        match self {
            Workload::Job(job) => {
                let status = job.status.as_ref();
                WorkloadStatus::Job {
                    active: status.and_then(|s| s.active).unwrap_or(0),
                    succeeded: status.and_then(|s| s.succeeded).unwrap_or(0),
                    failed: status.and_then(|s| s.failed).unwrap_or(0),
                }
            }
            Workload::CronJob(cron) => {
                let status = cron.status.as_ref();
                WorkloadStatus::CronJob {
                    active: status
                        .and_then(|s| s.active.as_ref())
                        .map(|refs| {
                            refs.iter()
                                .map(|r| r.name.clone().unwrap_or_default())
                                .collect()
                        })
                        .unwrap_or_default(),
                    last_schedule_time: status
                        .and_then(|s| s.last_schedule_time.as_ref())
                        .map(|t| t.0),
                }
            }
        }
    }
}

/// Namespace-scoped access to the cluster API
#[async_trait]
pub trait ClusterRepository: Send + Sync {
    /// Fetches one workload
    async fn get(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<Workload, ClusterError>;

    /// Lists workloads of a kind in backend order
    async fn list(&self, namespace: &str, kind: WorkloadKind)
    -> Result<Vec<Workload>, ClusterError>;

    /// Submits a workload and returns the object as accepted by the API server
    async fn create(&self, namespace: &str, workload: Workload) -> Result<Workload, ClusterError>;

    /// Deletes a workload; dependents are removed in the background
    async fn delete(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<(), ClusterError>;

    /// Reads one key of a ConfigMap; a missing map or key is `NotFound`
    async fn get_config_value(
        &self,
        namespace: &str,
        config_map: &str,
        key: &str,
    ) -> Result<String, ClusterError>;

    /// Streams updates of the named ConfigMaps until the receiver is dropped
    async fn watch_config_maps(
        &self,
        namespace: &str,
        names: HashSet<String>,
    ) -> Result<mpsc::Receiver<ConfigMapChange>, ClusterError>;
}

/// Turns an updated ConfigMap into a change event if it is one of `names`
pub fn config_map_change(names: &HashSet<String>, config_map: ConfigMap) -> Option<ConfigMapChange> {
    let name = config_map.metadata.name?;
    if !names.contains(&name) {
        return None;
    }

    Some(ConfigMapChange {
        name,
        data: config_map.data.unwrap_or_default(),
    })
}
