//! ConfigMap endpoints

use crate::SidecarClient;
use crate::error::{ClientError, Result};
use sidecar_core::dto::config_map::{ConfigValue, ConfigValueQuery};

impl SidecarClient {
    /// Read one ConfigMap value
    ///
    /// # Arguments
    /// * `key` - Key inside the ConfigMap
    /// * `query` - ConfigMap name and namespace; the sidecar's defaults when unset
    ///
    /// A missing key is a not-found error, never an empty value.
    pub async fn get_config_value(&self, key: &str, query: ConfigValueQuery) -> Result<ConfigValue> {
        if key.is_empty() || key.contains('/') {
            return Err(ClientError::InvalidRequest(format!("invalid key '{}'", key)));
        }

        let url = self.url(&format!("configmap/{}", key));
        let response = self.client.get(&url).query(&query).send().await?;

        self.handle_response(response).await
    }
}
