//! In-memory repository for tests
//!
//! Stores workloads and ConfigMaps in maps and lets a test script the
//! status a workload reports on successive reads.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{CronJobStatus, JobStatus};
use sidecar_core::domain::config_map::ConfigMapChange;
use sidecar_core::domain::workload::WorkloadKind;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use super::{ClusterError, ClusterRepository, Workload};

type Key = (String, WorkloadKind, String);

/// Status reported by one scripted read
#[derive(Debug, Clone)]
pub enum ScriptedStatus {
    Job(JobStatus),
    CronJob(CronJobStatus),
}

#[derive(Default)]
pub struct InMemoryRepository {
    workloads: Mutex<HashMap<Key, Workload>>,
    scripts: Mutex<HashMap<Key, VecDeque<ScriptedStatus>>>,
    config_maps: Mutex<HashMap<(String, String), BTreeMap<String, String>>>,
    watchers: Mutex<Vec<(String, HashSet<String>, mpsc::Sender<ConfigMapChange>)>>,
    /// Remaining reads after a delete during which the object is still visible
    lingering: Mutex<HashMap<Key, usize>>,
    gets: AtomicUsize,
    unreachable: Mutex<bool>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses returned by successive `get`s; the last one sticks
    pub fn script(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
        statuses: Vec<ScriptedStatus>,
    ) {
        self.scripts
            .lock()
            .unwrap()
            .insert(key(namespace, kind, name), statuses.into());
    }

    /// Keeps a deleted object visible for `reads` more `get`s
    pub fn linger_after_delete(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
        reads: usize,
    ) {
        self.lingering
            .lock()
            .unwrap()
            .insert(key(namespace, kind, name), reads);
    }

    pub fn stored(&self, namespace: &str, kind: WorkloadKind, name: &str) -> Option<Workload> {
        self.workloads
            .lock()
            .unwrap()
            .get(&key(namespace, kind, name))
            .cloned()
    }

    /// Sets a ConfigMap value and notifies matching watchers
    pub fn set_config_value(&self, namespace: &str, config_map: &str, key: &str, value: &str) {
        let data = {
            let mut maps = self.config_maps.lock().unwrap();
            let data = maps
                .entry((namespace.to_string(), config_map.to_string()))
                .or_default();
            data.insert(key.to_string(), value.to_string());
            data.clone()
        };

        let mut watchers = self.watchers.lock().unwrap();
        watchers.retain(|(watched_namespace, names, tx)| {
            if watched_namespace != namespace || !names.contains(config_map) {
                return !tx.is_closed();
            }
            tx.try_send(ConfigMapChange {
                name: config_map.to_string(),
                data: data.clone(),
            })
            .is_ok()
        });
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), ClusterError> {
        if *self.unreachable.lock().unwrap() {
            return Err(ClusterError::Connection("connection refused".to_string()));
        }
        Ok(())
    }
}

fn key(namespace: &str, kind: WorkloadKind, name: &str) -> Key {
    (namespace.to_string(), kind, name.to_string())
}

fn apply_status(workload: &mut Workload, status: ScriptedStatus) {
    match (workload, status) {
        (Workload::Job(job), ScriptedStatus::Job(status)) => job.status = Some(status),
        (Workload::CronJob(cron), ScriptedStatus::CronJob(status)) => cron.status = Some(status),
        _ => panic!("scripted status does not match the workload kind"),
    }
}

#[async_trait]
impl ClusterRepository for InMemoryRepository {
    async fn get(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<Workload, ClusterError> {
        self.check_reachable()?;
        self.gets.fetch_add(1, Ordering::SeqCst);
        let key = key(namespace, kind, name);

        {
            let mut lingering = self.lingering.lock().unwrap();
            if let Some(reads) = lingering.get_mut(&key) {
                if *reads > 0 && !self.workloads.lock().unwrap().contains_key(&key) {
                    *reads -= 1;
                    let mut workload = match kind {
                        WorkloadKind::Job => Workload::Job(Default::default()),
                        WorkloadKind::CronJob => Workload::CronJob(Default::default()),
                    };
                    match &mut workload {
                        Workload::Job(job) => job.metadata.name = Some(name.to_string()),
                        Workload::CronJob(cron) => cron.metadata.name = Some(name.to_string()),
                    }
                    return Ok(workload);
                }
            }
        }

        let mut workloads = self.workloads.lock().unwrap();
        let workload = workloads
            .get_mut(&key)
            .ok_or_else(|| ClusterError::not_found(kind.as_str(), name))?;

        let mut scripts = self.scripts.lock().unwrap();
        if let Some(script) = scripts.get_mut(&key) {
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            if let Some(status) = next {
                apply_status(workload, status);
            }
        }

        Ok(workload.clone())
    }

    async fn list(
        &self,
        namespace: &str,
        kind: WorkloadKind,
    ) -> Result<Vec<Workload>, ClusterError> {
        self.check_reachable()?;
        let workloads = self.workloads.lock().unwrap();
        let mut items: Vec<_> = workloads
            .iter()
            .filter(|((ns, k, _), _)| ns == namespace && *k == kind)
            .map(|((_, _, name), workload)| (name.clone(), workload.clone()))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(items.into_iter().map(|(_, workload)| workload).collect())
    }

    async fn create(&self, namespace: &str, workload: Workload) -> Result<Workload, ClusterError> {
        self.check_reachable()?;
        let name = workload
            .name()
            .ok_or_else(|| ClusterError::Invalid("metadata.name: Required value".to_string()))?
            .to_string();

        let mut workloads = self.workloads.lock().unwrap();
        let key = key(namespace, workload.kind(), &name);
        if workloads.contains_key(&key) {
            return Err(ClusterError::Conflict(format!(
                "{} \"{}\" already exists",
                workload.kind(),
                name
            )));
        }
        workloads.insert(key, workload.clone());
        Ok(workload)
    }

    async fn delete(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<(), ClusterError> {
        self.check_reachable()?;
        self.workloads
            .lock()
            .unwrap()
            .remove(&key(namespace, kind, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found(kind.as_str(), name))
    }

    async fn get_config_value(
        &self,
        namespace: &str,
        config_map: &str,
        key: &str,
    ) -> Result<String, ClusterError> {
        self.check_reachable()?;
        let maps = self.config_maps.lock().unwrap();
        let data = maps
            .get(&(namespace.to_string(), config_map.to_string()))
            .ok_or_else(|| ClusterError::not_found("ConfigMap", config_map))?;
        data.get(key)
            .cloned()
            .ok_or_else(|| ClusterError::not_found("ConfigMap key", format!("{}/{}", config_map, key)))
    }

    async fn watch_config_maps(
        &self,
        namespace: &str,
        names: HashSet<String>,
    ) -> Result<mpsc::Receiver<ConfigMapChange>, ClusterError> {
        self.check_reachable()?;
        let (tx, rx) = mpsc::channel(16);
        self.watchers
            .lock()
            .unwrap()
            .push((namespace.to_string(), names, tx));
        Ok(rx)
    }
}
