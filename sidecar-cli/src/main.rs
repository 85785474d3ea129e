//! Sidecar CLI
//!
//! Command-line interface for the workload sidecar.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "sidecar")]
#[command(about = "Batch workload sidecar CLI", long_about = None)]
struct Cli {
    /// Sidecar URL
    #[arg(long, env = "SIDECAR_URL", default_value = "http://localhost:50051")]
    url: String,

    /// Namespace to address instead of the sidecar's own
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        sidecar_url: cli.url,
        namespace: cli.namespace,
    };

    handle_command(cli.command, &config).await
}
