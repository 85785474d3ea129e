//! Job and CronJob endpoints

use crate::SidecarClient;
use crate::error::{ClientError, Result};
use sidecar_core::domain::workload::{WorkloadHandle, WorkloadKind, WorkloadSummary};
use sidecar_core::dto::workload::{CreateWorkload, DeleteQuery, NamespaceQuery};

impl SidecarClient {
    // =============================================================================
    // Workload Management
    // =============================================================================

    /// List workloads of a kind
    ///
    /// # Arguments
    /// * `kind` - Job or CronJob
    /// * `namespace` - Overrides the sidecar's namespace when set
    pub async fn list_workloads(
        &self,
        kind: WorkloadKind,
        namespace: Option<&str>,
    ) -> Result<Vec<WorkloadSummary>> {
        let url = self.url(kind.path_segment());
        let response = self
            .client
            .get(&url)
            .query(&namespace_query(namespace))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get one workload with its current status
    pub async fn get_workload(
        &self,
        kind: WorkloadKind,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<WorkloadSummary> {
        let url = self.workload_url(kind, name)?;
        let response = self
            .client
            .get(&url)
            .query(&namespace_query(namespace))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Submit a workload
    ///
    /// # Arguments
    /// * `kind` - Job or CronJob
    /// * `req` - The serialized document plus namespace and wait flag
    ///
    /// # Returns
    /// The handle of the accepted workload. With `wait`, the call returns only
    /// once the workload converged; a deadline error means it was submitted
    /// but its outcome is unknown.
    pub async fn create_workload(
        &self,
        kind: WorkloadKind,
        req: CreateWorkload,
    ) -> Result<WorkloadHandle> {
        let url = self.url(kind.path_segment());
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Delete a workload
    pub async fn delete_workload(
        &self,
        kind: WorkloadKind,
        name: &str,
        query: DeleteQuery,
    ) -> Result<()> {
        let url = self.workload_url(kind, name)?;
        let response = self.client.delete(&url).query(&query).send().await?;

        self.handle_empty_response(response).await
    }

    fn workload_url(&self, kind: WorkloadKind, name: &str) -> Result<String> {
        if name.is_empty() || name.contains('/') {
            return Err(ClientError::InvalidRequest(format!(
                "invalid {} name '{}'",
                kind, name
            )));
        }
        Ok(self.url(&format!("{}/{}", kind.path_segment(), name)))
    }
}

fn namespace_query(namespace: Option<&str>) -> NamespaceQuery {
    NamespaceQuery {
        namespace: namespace.map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_url() {
        let client = SidecarClient::new("http://localhost:50051");
        assert_eq!(
            client.workload_url(WorkloadKind::CronJob, "nightly-report").unwrap(),
            "http://localhost:50051/cronjob/nightly-report"
        );
        assert_eq!(
            client.workload_url(WorkloadKind::Job, "batch-7").unwrap(),
            "http://localhost:50051/job/batch-7"
        );
    }

    #[test]
    fn test_collection_words_address_single_workloads() {
        let client = SidecarClient::new("http://localhost:50051");
        assert_eq!(client.url(WorkloadKind::Job.path_segment()), "http://localhost:50051/job");
        assert_eq!(
            client.workload_url(WorkloadKind::Job, "list").unwrap(),
            "http://localhost:50051/job/list"
        );
        assert_eq!(
            client.workload_url(WorkloadKind::CronJob, "create").unwrap(),
            "http://localhost:50051/cronjob/create"
        );
    }

    #[test]
    fn test_workload_url_rejects_bad_names() {
        let client = SidecarClient::new("http://localhost:50051");
        assert!(client.workload_url(WorkloadKind::Job, "").is_err());
        assert!(client.workload_url(WorkloadKind::Job, "a/b").is_err());
    }
}
