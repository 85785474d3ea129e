//! Configuration module
//!
//! CLI settings shared by every command.

use sidecar_client::SidecarClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the sidecar service
    pub sidecar_url: String,

    /// Namespace override sent with every request
    pub namespace: Option<String>,
}

impl Config {
    pub fn client(&self) -> SidecarClient {
        SidecarClient::new(&self.sidecar_url)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}
