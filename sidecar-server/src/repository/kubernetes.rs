//! Kubernetes repository
//!
//! `ClusterRepository` backed by kube-rs. The `Client` is built once at
//! startup and cloned into every call; clones share the same connection pool.

use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::runtime::WatchStreamExt;
use kube::runtime::watcher::{self, Event};
use kube::{Client, Config};
use sidecar_core::domain::config_map::ConfigMapChange;
use sidecar_core::domain::workload::WorkloadKind;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{ClusterError, ClusterRepository, Workload, config_map_change};

/// Buffered ConfigMap changes per watcher before the watch task waits on the consumer
const WATCH_BUFFER: usize = 16;

/// kube-rs implementation of the cluster repository
#[derive(Clone)]
pub struct KubeRepository {
    client: Client,
    /// Same cluster without a read timeout; idle watches would trip it
    watch_client: Client,
}

impl KubeRepository {
    /// Connects to the cluster and checks that the API server answers
    ///
    /// Uses the given kubeconfig files, merged in order, when present;
    /// otherwise infers the configuration (in-cluster service account, then
    /// `~/.kube/config`).
    pub async fn connect(
        kubeconfig: &[PathBuf],
        timeout: Option<Duration>,
    ) -> Result<Self, ClusterError> {
        let config = if kubeconfig.is_empty() {
            Config::infer().await.map_err(|e| {
                ClusterError::Connection(format!("failed to infer kube config: {}", e))
            })?
        } else {
            Config::from_custom_kubeconfig(
                load_kubeconfig(kubeconfig)?,
                &KubeConfigOptions::default(),
            )
            .await
            .map_err(|e| ClusterError::Connection(format!("failed to load kubeconfig: {}", e)))?
        };

        let mut watch_config = config.clone();
        watch_config.read_timeout = None;

        let mut config = config;
        if let Some(timeout) = timeout {
            config.connect_timeout = Some(timeout);
            config.read_timeout = Some(timeout);
            config.write_timeout = Some(timeout);
            watch_config.connect_timeout = Some(timeout);
        }

        let client = Client::try_from(config)
            .map_err(|e| ClusterError::Connection(format!("failed to create client: {}", e)))?;
        let watch_client = Client::try_from(watch_config)
            .map_err(|e| ClusterError::Connection(format!("failed to create client: {}", e)))?;

        let version = client
            .apiserver_version()
            .await
            .map_err(|e| ClusterError::Connection(format!("API server unreachable: {}", e)))?;
        info!(
            "Connected to Kubernetes API server {}.{}",
            version.major, version.minor
        );

        Ok(Self {
            client,
            watch_client,
        })
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn cron_jobs(&self, namespace: &str) -> Api<CronJob> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterRepository for KubeRepository {
    async fn get(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<Workload, ClusterError> {
        let result = match kind {
            WorkloadKind::Job => self.jobs(namespace).get(name).await.map(Workload::Job),
            WorkloadKind::CronJob => self
                .cron_jobs(namespace)
                .get(name)
                .await
                .map(Workload::CronJob),
        };
        result.map_err(|e| translate(e, kind.as_str(), name))
    }

    async fn list(
        &self,
        namespace: &str,
        kind: WorkloadKind,
    ) -> Result<Vec<Workload>, ClusterError> {
        let params = ListParams::default();
        let result = match kind {
            WorkloadKind::Job => self
                .jobs(namespace)
                .list(&params)
                .await
                .map(|list| list.items.into_iter().map(Workload::Job).collect()),
            WorkloadKind::CronJob => self
                .cron_jobs(namespace)
                .list(&params)
                .await
                .map(|list| list.items.into_iter().map(Workload::CronJob).collect()),
        };
        result.map_err(|e| translate(e, kind.as_str(), namespace))
    }

    async fn create(&self, namespace: &str, workload: Workload) -> Result<Workload, ClusterError> {
        let kind = workload.kind();
        let name = workload.name().unwrap_or_default().to_string();
        let params = PostParams::default();

        let result = match workload {
            Workload::Job(job) => self
                .jobs(namespace)
                .create(&params, &job)
                .await
                .map(Workload::Job),
            Workload::CronJob(cron) => self
                .cron_jobs(namespace)
                .create(&params, &cron)
                .await
                .map(Workload::CronJob),
        };
        result.map_err(|e| translate(e, kind.as_str(), &name))
    }

    async fn delete(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<(), ClusterError> {
        let params = DeleteParams::background();
        let result = match kind {
            WorkloadKind::Job => self.jobs(namespace).delete(name, &params).await.map(|_| ()),
            WorkloadKind::CronJob => self
                .cron_jobs(namespace)
                .delete(name, &params)
                .await
                .map(|_| ()),
        };
        result.map_err(|e| translate(e, kind.as_str(), name))
    }

    async fn get_config_value(
        &self,
        namespace: &str,
        config_map: &str,
        key: &str,
    ) -> Result<String, ClusterError> {
        let map = self
            .config_maps(namespace)
            .get(config_map)
            .await
            .map_err(|e| translate(e, "ConfigMap", config_map))?;

        map.data
            .and_then(|mut data| data.remove(key))
            .ok_or_else(|| ClusterError::not_found("ConfigMap key", format!("{}/{}", config_map, key)))
    }

    async fn watch_config_maps(
        &self,
        namespace: &str,
        names: HashSet<String>,
    ) -> Result<mpsc::Receiver<ConfigMapChange>, ClusterError> {
        let api: Api<ConfigMap> = Api::namespaced(self.watch_client.clone(), namespace);
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        let namespace = namespace.to_string();

        tokio::spawn(async move {
            let stream = watcher::watcher(api, watcher::Config::default()).default_backoff();
            let mut stream = std::pin::pin!(stream);

            info!(%namespace, names = ?names, "ConfigMap watch started");

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    event = stream.next() => match event {
                        // Creation or update of a live object
                        Some(Ok(Event::Apply(config_map))) => {
                            if let Some(change) = config_map_change(&names, config_map) {
                                debug!(name = %change.name, "ConfigMap changed");
                                if tx.send(change).await.is_err() {
                                    break;
                                }
                            }
                        }
                        // Initial listing and deletions are not changes
                        Some(Ok(_)) => {}
                        Some(Err(e)) => warn!(error = %e, "ConfigMap watch error, retrying"),
                        None => break,
                    },
                }
            }

            info!(%namespace, "ConfigMap watch stopped");
        });

        Ok(rx)
    }
}

/// Reads and merges kubeconfig files; the first file wins on name clashes
/// and supplies the current context
fn load_kubeconfig(paths: &[PathBuf]) -> Result<Kubeconfig, ClusterError> {
    let mut merged: Option<Kubeconfig> = None;

    for path in paths {
        let next = Kubeconfig::read_from(path).map_err(|e| {
            ClusterError::Connection(format!(
                "failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;

        merged = Some(match merged {
            Some(current) => current.merge(next).map_err(|e| {
                ClusterError::Connection(format!(
                    "failed to merge kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?,
            None => next,
        });
    }

    merged.ok_or_else(|| ClusterError::Connection("no kubeconfig file given".to_string()))
}

/// Maps a kube-rs error onto the repository taxonomy
fn translate(err: kube::Error, kind: &str, name: &str) -> ClusterError {
    match err {
        kube::Error::Api(response) => match response.code {
            404 => ClusterError::not_found(kind, name),
            409 => ClusterError::Conflict(response.message),
            400 | 422 => ClusterError::Invalid(response.message),
            code => ClusterError::Api {
                code,
                message: response.message,
            },
        },
        kube::Error::SerdeError(e) => ClusterError::Api {
            code: 500,
            message: format!("malformed API response: {}", e),
        },
        other => ClusterError::Connection(other.to_string()),
    }
}
