//! Workload Service
//!
//! Lifecycle of Jobs and CronJobs: submit, optionally wait for convergence,
//! read, list and delete. One manager serves both kinds; each kind brings its
//! own convergence check and default timing.
//!
//! The manager keeps no state between calls beyond its namespace and the
//! shared repository handle.

use sidecar_core::domain::config_map::ConfigMapChange;
use sidecar_core::domain::workload::{
    PollOutcome, PollTiming, WorkloadHandle, WorkloadKind, WorkloadSummary,
};
use sidecar_core::dto::config_map::ConfigValue;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::repository::{ClusterError, ClusterRepository, Workload};
use crate::service::poller::{PollError, poll_until};
use crate::service::template;

/// Workload service errors
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("{0}")]
    NotFound(String),

    /// The API server refused a create or delete outright
    #[error("submission rejected: {0}")]
    Submission(ClusterError),

    /// The workload reported a terminal failure while being waited on
    #[error("{handle} failed: {reason}")]
    Convergence {
        handle: WorkloadHandle,
        reason: String,
    },

    /// The wait window elapsed; the workload was submitted but its outcome is unknown
    #[error("{handle} did not converge within {deadline:?}")]
    DeadlineExceeded {
        handle: WorkloadHandle,
        deadline: Duration,
    },

    #[error("invalid workload document: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Cluster(ClusterError),
}

impl From<ClusterError> for WorkloadError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::NotFound { .. } => WorkloadError::NotFound(err.to_string()),
            ClusterError::Connection(_) => WorkloadError::Connection(err.to_string()),
            other => WorkloadError::Cluster(other),
        }
    }
}

impl WorkloadError {
    /// Classifies a failed create/delete call
    fn submission(err: ClusterError) -> Self {
        match err {
            ClusterError::Conflict(_) | ClusterError::Invalid(_) | ClusterError::Api { .. } => {
                WorkloadError::Submission(err)
            }
            other => other.into(),
        }
    }
}

/// Convergence check of a freshly read workload
///
/// A Job converges once the scheduler has picked it up (`active > 0`) or it
/// already finished (`succeeded > 0`); a `Failed` condition is terminal.
/// A CronJob converges once it reports an active instance.
pub fn convergence(workload: &Workload) -> PollOutcome {
    match workload {
        Workload::Job(job) => {
            let Some(status) = job.status.as_ref() else {
                return PollOutcome::Pending;
            };

            if status.active.unwrap_or(0) > 0 || status.succeeded.unwrap_or(0) > 0 {
                return PollOutcome::Converged;
            }

            let failed = status
                .conditions
                .iter()
                .flatten()
                .find(|c| c.type_ == "Failed" && c.status == "True");

            match failed {
                Some(condition) => PollOutcome::Failed(
                    [condition.reason.as_deref(), condition.message.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(": "),
                ),
                None => PollOutcome::Pending,
            }
        }
        Workload::CronJob(cron) => {
            let active = cron
                .status
                .as_ref()
                .and_then(|s| s.active.as_ref())
                .is_some_and(|refs| !refs.is_empty());

            if active {
                PollOutcome::Converged
            } else {
                PollOutcome::Pending
            }
        }
    }
}

/// Job and CronJob manager bound to one namespace
#[derive(Clone)]
pub struct WorkloadManager {
    repository: Arc<dyn ClusterRepository>,
    namespace: String,
    config_map: String,
}

impl WorkloadManager {
    /// Creates a manager
    ///
    /// # Arguments
    /// * `repository` - Shared cluster access
    /// * `namespace` - Namespace used by every call
    /// * `config_map` - ConfigMap read by value lookups that do not name one
    pub fn new(
        repository: Arc<dyn ClusterRepository>,
        namespace: impl Into<String>,
        config_map: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            namespace: namespace.into(),
            config_map: config_map.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The same manager bound to `namespace`, or this one when it is absent or blank
    pub fn scoped(&self, namespace: Option<&str>) -> Self {
        match namespace.map(str::trim).filter(|ns| !ns.is_empty()) {
            Some(ns) if ns != self.namespace => Self {
                namespace: ns.to_string(),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    fn handle(&self, kind: WorkloadKind, name: &str) -> WorkloadHandle {
        WorkloadHandle::new(kind, self.namespace.clone(), name)
    }

    fn summarize(&self, workload: &Workload) -> WorkloadSummary {
        WorkloadSummary {
            handle: self.handle(workload.kind(), workload.name().unwrap_or_default()),
            status: workload.status(),
        }
    }

    /// Submits a workload, then waits for convergence if asked to
    ///
    /// Without `wait`, success only means the API server accepted the object.
    pub async fn create(
        &self,
        workload: Workload,
        wait: bool,
    ) -> Result<WorkloadHandle, WorkloadError> {
        let kind = workload.kind();
        let workload = template::prepare(workload, &self.namespace);

        let created = self
            .repository
            .create(&self.namespace, workload)
            .await
            .map_err(WorkloadError::submission)?;

        let name = created.name().ok_or_else(|| {
            WorkloadError::InvalidRequest("created object has no name".to_string())
        })?;
        let handle = self.handle(kind, name);

        info!("{} accepted", handle);

        if wait {
            self.wait_for_convergence(&handle, kind.default_timing()).await?;
        }

        Ok(handle)
    }

    /// Waits until `handle` converges according to its kind
    pub async fn wait_for_convergence(
        &self,
        handle: &WorkloadHandle,
        timing: PollTiming,
    ) -> Result<(), WorkloadError> {
        debug!(
            "Waiting for {} (interval {:?}, deadline {:?})",
            handle, timing.interval, timing.deadline
        );

        let repository = &self.repository;
        let result = poll_until(timing, move || async move {
            let workload = repository
                .get(&handle.namespace, handle.kind, &handle.name)
                .await?;
            Ok::<_, ClusterError>(convergence(&workload))
        })
        .await;

        finish_wait(handle, timing, result)?;
        info!("{} converged", handle);
        Ok(())
    }

    /// Fetches one workload with its current status
    pub async fn get(
        &self,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<WorkloadSummary, WorkloadError> {
        require_name(name)?;
        let workload = self.repository.get(&self.namespace, kind, name).await?;
        Ok(self.summarize(&workload))
    }

    /// Lists workloads of a kind in backend order
    pub async fn list(&self, kind: WorkloadKind) -> Result<Vec<WorkloadSummary>, WorkloadError> {
        let workloads = self.repository.list(&self.namespace, kind).await?;
        Ok(workloads.iter().map(|w| self.summarize(w)).collect())
    }

    /// Deletes a workload; dependents are collected in the background
    ///
    /// With `wait`, returns once the object itself is gone from the API server.
    pub async fn delete(
        &self,
        kind: WorkloadKind,
        name: &str,
        wait: bool,
    ) -> Result<(), WorkloadError> {
        require_name(name)?;
        let handle = self.handle(kind, name);

        self.repository
            .delete(&self.namespace, kind, name)
            .await
            .map_err(|e| match e {
                ClusterError::NotFound { .. } => e.into(),
                other => WorkloadError::submission(other),
            })?;

        info!("{} deletion accepted", handle);

        if wait {
            self.wait_for_removal(&handle, kind.default_timing()).await?;
            info!("{} removed", handle);
        }

        Ok(())
    }

    async fn wait_for_removal(
        &self,
        handle: &WorkloadHandle,
        timing: PollTiming,
    ) -> Result<(), WorkloadError> {
        let repository = &self.repository;
        let result = poll_until(timing, move || async move {
            match repository
                .get(&handle.namespace, handle.kind, &handle.name)
                .await
            {
                Ok(_) => Ok(PollOutcome::Pending),
                Err(e) if e.is_not_found() => Ok(PollOutcome::Converged),
                Err(e) => Err(e),
            }
        })
        .await;

        finish_wait(handle, timing, result)
    }

    /// Reads one ConfigMap value; a missing key is `NotFound`, never empty
    pub async fn get_config_value(
        &self,
        config_map: Option<&str>,
        key: &str,
    ) -> Result<ConfigValue, WorkloadError> {
        require_name(key)?;
        let name = config_map
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.config_map.as_str());

        let value = self
            .repository
            .get_config_value(&self.namespace, name, key)
            .await?;

        Ok(ConfigValue {
            namespace: self.namespace.clone(),
            name: name.to_string(),
            key: key.to_string(),
            value,
        })
    }

    /// Subscribes to updates of the named ConfigMaps
    pub async fn watch_config_maps(
        &self,
        names: HashSet<String>,
    ) -> Result<mpsc::Receiver<ConfigMapChange>, WorkloadError> {
        if names.is_empty() {
            return Err(WorkloadError::InvalidRequest(
                "at least one ConfigMap name is required".to_string(),
            ));
        }

        Ok(self
            .repository
            .watch_config_maps(&self.namespace, names)
            .await?)
    }
}

/// Maps the end of a wait onto the service error taxonomy
fn finish_wait(
    handle: &WorkloadHandle,
    timing: PollTiming,
    result: Result<(), PollError<ClusterError>>,
) -> Result<(), WorkloadError> {
    match result {
        Ok(()) => Ok(()),
        Err(PollError::DeadlineExceeded { elapsed }) => {
            warn!("{} still pending after {:?}", handle, elapsed);
            Err(WorkloadError::DeadlineExceeded {
                handle: handle.clone(),
                deadline: timing.deadline,
            })
        }
        Err(PollError::Failed(reason)) => {
            warn!("{} failed: {}", handle, reason);
            Err(WorkloadError::Convergence {
                handle: handle.clone(),
                reason,
            })
        }
        Err(PollError::Check(e)) => Err(e.into()),
    }
}

fn require_name(name: &str) -> Result<(), WorkloadError> {
    if name.trim().is_empty() {
        return Err(WorkloadError::InvalidRequest(
            "name must not be empty".to_string(),
        ));
    }
    Ok(())
}
