//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod config_map;
mod workload;

pub use config_map::ConfigCommands;
pub use workload::WorkloadCommands;

use anyhow::Result;
use clap::Subcommand;
use sidecar_core::domain::workload::WorkloadKind;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job management
    Job {
        #[command(subcommand)]
        command: WorkloadCommands,
    },
    /// CronJob management
    #[command(name = "cronjob")]
    CronJob {
        #[command(subcommand)]
        command: WorkloadCommands,
    },
    /// ConfigMap values
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => {
            workload::handle_workload_command(WorkloadKind::Job, command, config).await
        }
        Commands::CronJob { command } => {
            workload::handle_workload_command(WorkloadKind::CronJob, command, config).await
        }
        Commands::Config { command } => config_map::handle_config_command(command, config).await,
    }
}
