//! Server configuration
//!
//! Read once at startup from the environment. Nothing here is reloadable:
//! a change requires a restart.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:50051";
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_CONFIG_MAP: &str = "sidecar-config";
const DEFAULT_KUBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

/// Sidecar server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the RPC surface listens on
    pub bind_addr: SocketAddr,

    /// Namespace used when a request does not name one
    pub namespace: String,

    /// Explicit kubeconfig files, merged in order; inferred when empty
    pub kubeconfig: Vec<PathBuf>,

    /// ConfigMap read by value lookups that do not name one
    pub config_map: String,

    /// Per-call timeout of the Kubernetes client (`None` keeps kube defaults)
    pub kube_timeout: Option<Duration>,

    /// Upper bound on a single inbound request, waits included
    pub request_timeout: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SIDECAR_BIND_ADDR (optional, default: 0.0.0.0:50051)
    /// - SIDECAR_PORT (optional, overrides the port of the bind address)
    /// - K8S_NAMESPACE (optional, default: default)
    /// - KUBECONFIG (optional, path list separated like PATH)
    /// - SIDECAR_CONFIGMAP (optional, default: sidecar-config)
    /// - SIDECAR_KUBE_TIMEOUT (optional, seconds, 0 disables, default: 10)
    /// - SIDECAR_REQUEST_TIMEOUT (optional, seconds, default: 180)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind = var("SIDECAR_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let mut bind_addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow::anyhow!("SIDECAR_BIND_ADDR '{}' is invalid: {}", bind, e))?;

        if let Some(port) = var("SIDECAR_PORT") {
            let port = port
                .trim_start_matches(':')
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("SIDECAR_PORT '{}' is invalid: {}", port, e))?;
            bind_addr.set_port(port);
        }

        let kube_timeout_secs = parse_secs(var("SIDECAR_KUBE_TIMEOUT"), DEFAULT_KUBE_TIMEOUT_SECS)
            .map_err(|e| anyhow::anyhow!("SIDECAR_KUBE_TIMEOUT is invalid: {}", e))?;
        let request_timeout_secs =
            parse_secs(var("SIDECAR_REQUEST_TIMEOUT"), DEFAULT_REQUEST_TIMEOUT_SECS)
                .map_err(|e| anyhow::anyhow!("SIDECAR_REQUEST_TIMEOUT is invalid: {}", e))?;

        Ok(Self {
            bind_addr,
            namespace: var("K8S_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            kubeconfig: var("KUBECONFIG")
                .map(|paths| {
                    std::env::split_paths(&paths)
                        .filter(|path| !path.as_os_str().is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            config_map: var("SIDECAR_CONFIGMAP").unwrap_or_else(|| DEFAULT_CONFIG_MAP.to_string()),
            kube_timeout: (kube_timeout_secs > 0).then(|| Duration::from_secs(kube_timeout_secs)),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.is_empty() {
            anyhow::bail!("namespace cannot be empty");
        }

        if self.config_map.is_empty() {
            anyhow::bail!("config_map cannot be empty");
        }

        // Waits must fit in a request: the longest default window is the CronJob's 120s
        if self.request_timeout < Duration::from_secs(120) {
            anyhow::bail!("request_timeout must be at least 120 seconds");
        }

        Ok(())
    }
}

fn parse_secs(value: Option<String>, default: u64) -> Result<u64, std::num::ParseIntError> {
    value.map_or(Ok(default), |s| s.trim().parse::<u64>())
}
