//! Workload DTOs

use serde::{Deserialize, Serialize};

/// Request to submit a Job or CronJob
///
/// `template` is the serialized Kubernetes document (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub template: String,
    /// Wait for the workload to converge before answering
    #[serde(default)]
    pub wait: bool,
}

/// Namespace addressing shared by read operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Query parameters of a delete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Wait until the resource is gone from the API server
    #[serde(default)]
    pub wait: bool,
}
