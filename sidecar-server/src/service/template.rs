//! Workload templates
//!
//! Decoding of caller-supplied documents and the adjustments applied before
//! submission.

use k8s_openapi::api::batch::v1::{CronJob, Job};
use sidecar_core::domain::workload::WorkloadKind;

use crate::repository::Workload;

/// The only concurrency policy a submitted CronJob may carry
pub const CRON_CONCURRENCY_POLICY: &str = "Replace";

/// Decodes a JSON template into a workload of the requested kind
///
/// The document must carry `metadata.name`; a `kind` field, when present,
/// must agree with the requested kind.
pub fn decode(kind: WorkloadKind, template: &str) -> Result<Workload, String> {
    let value: serde_json::Value =
        serde_json::from_str(template).map_err(|e| format!("malformed document: {}", e))?;

    if let Some(declared) = value.get("kind").and_then(|k| k.as_str()) {
        if declared != kind.as_str() {
            return Err(format!(
                "document declares kind '{}', expected '{}'",
                declared, kind
            ));
        }
    }

    let workload = match kind {
        WorkloadKind::Job => serde_json::from_value::<Job>(value).map(Workload::Job),
        WorkloadKind::CronJob => serde_json::from_value::<CronJob>(value).map(Workload::CronJob),
    }
    .map_err(|e| format!("not a valid {}: {}", kind, e))?;

    if workload.name().is_none() {
        return Err("metadata.name is required".to_string());
    }

    Ok(workload)
}

/// Applies the submission policy: target namespace, and for CronJobs the
/// `Replace` concurrency policy regardless of what the document said
pub fn prepare(mut workload: Workload, namespace: &str) -> Workload {
    workload.set_namespace(namespace);

    if let Workload::CronJob(cron) = &mut workload {
        let spec = cron.spec.get_or_insert_with(Default::default);
        spec.concurrency_policy = Some(CRON_CONCURRENCY_POLICY.to_string());
    }

    workload
}
