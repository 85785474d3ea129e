//! ConfigMap domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A change observed on a watched ConfigMap
///
/// Delivered once per update of a ConfigMap whose name the watcher asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapChange {
    pub name: String,
    pub data: BTreeMap<String, String>,
}
