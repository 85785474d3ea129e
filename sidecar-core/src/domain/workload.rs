//! Workload domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The closed set of batch workload kinds the sidecar manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Job,
    CronJob,
}

impl WorkloadKind {
    /// Kubernetes kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Job => "Job",
            WorkloadKind::CronJob => "CronJob",
        }
    }

    /// Lowercase path segment used by the RPC surface (`/job`, `/cronjob`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            WorkloadKind::Job => "job",
            WorkloadKind::CronJob => "cronjob",
        }
    }

    /// Default convergence wait for this kind
    pub fn default_timing(&self) -> PollTiming {
        match self {
            WorkloadKind::Job => PollTiming::new(Duration::from_secs(5), Duration::from_secs(60)),
            WorkloadKind::CronJob => {
                PollTiming::new(Duration::from_secs(5), Duration::from_secs(120))
            }
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval and overall deadline of a convergence wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Sleep between two checks
    pub interval: Duration,
    /// Total wall-clock budget measured from the first check
    pub deadline: Duration,
}

impl PollTiming {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

/// Identifies a workload in the cluster
///
/// `(namespace, kind, name)` is unique among live resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadHandle {
    pub name: String,
    pub namespace: String,
    pub kind: WorkloadKind,
}

impl WorkloadHandle {
    pub fn new(kind: WorkloadKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind,
        }
    }
}

impl fmt::Display for WorkloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Status projection read fresh from the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    Job {
        active: i32,
        succeeded: i32,
        failed: i32,
    },
    CronJob {
        /// Names of the Jobs currently spawned by the CronJob, in reported order
        active: Vec<String>,
        last_schedule_time: Option<DateTime<Utc>>,
    },
}

/// A workload handle together with its current status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    #[serde(flatten)]
    pub handle: WorkloadHandle,
    pub status: WorkloadStatus,
}

/// Result of one convergence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending,
    Converged,
    Failed(String),
}
