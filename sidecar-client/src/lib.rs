//! Sidecar HTTP Client
//!
//! A typed HTTP client for the workload sidecar's RPC surface.
//!
//! # Example
//!
//! ```no_run
//! use sidecar_client::SidecarClient;
//! use sidecar_core::domain::workload::WorkloadKind;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SidecarClient::new("http://localhost:50051");
//!
//!     for cron_job in client.list_workloads(WorkloadKind::CronJob, None).await? {
//!         println!("{}", cron_job.handle);
//!     }
//!     Ok(())
//! }
//! ```

mod config_map;
pub mod error;
mod workload;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the sidecar API
///
/// Workload methods take the kind as a parameter; Jobs and CronJobs share
/// the same operations.
#[derive(Debug, Clone)]
pub struct SidecarClient {
    /// Base URL of the sidecar (e.g., "http://localhost:50051")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SidecarClient {
    /// Create a new sidecar client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the sidecar API (e.g., "http://localhost:50051")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new sidecar client with a custom HTTP client
    ///
    /// Waiting creates can take up to two minutes; a custom client's timeout
    /// must allow for that.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the sidecar
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::debug!("Sidecar answered {}: {}", status, body);
        ClientError::from_body(status, &body)
    }
}
