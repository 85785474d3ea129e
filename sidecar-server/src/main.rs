use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod repository;
pub mod service;

use config::Config;
use repository::KubeRepository;
use service::workload_service::WorkloadManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidecar_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting workload sidecar...");

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        "Namespace: {}, ConfigMap: {}",
        config.namespace,
        config.config_map
    );

    // Build the cluster client once; every request shares it
    let repository = KubeRepository::connect(&config.kubeconfig, config.kube_timeout)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

    let manager = WorkloadManager::new(
        Arc::new(repository),
        config.namespace.clone(),
        config.config_map.clone(),
    );

    // Build router with all API endpoints
    let app = api::create_router(manager, config.request_timeout);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind_addr, e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
