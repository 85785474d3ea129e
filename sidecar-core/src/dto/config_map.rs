//! ConfigMap DTOs

use serde::{Deserialize, Serialize};

/// Query parameters of a ConfigMap value lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigValueQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// ConfigMap to read; the server's configured ConfigMap when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single ConfigMap value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    pub namespace: String,
    pub name: String,
    pub key: String,
    pub value: String,
}

/// Query parameters of a ConfigMap watch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Comma separated ConfigMap names
    pub names: String,
}

impl WatchQuery {
    /// ConfigMap names listed in the query, blanks dropped
    pub fn name_list(&self) -> Vec<String> {
        self.names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }
}
