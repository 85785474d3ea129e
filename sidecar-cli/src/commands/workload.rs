//! Workload command handlers
//!
//! The same subcommands drive Jobs and CronJobs; the kind is fixed by the
//! parent command.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use sidecar_client::SidecarClient;
use sidecar_core::domain::workload::{WorkloadKind, WorkloadStatus, WorkloadSummary};
use sidecar_core::dto::workload::{CreateWorkload, DeleteQuery};
use std::path::Path;

use crate::config::Config;

/// Job / CronJob subcommands
#[derive(Subcommand)]
pub enum WorkloadCommands {
    /// List workloads in the namespace
    List,
    /// Show one workload and its status
    Get {
        /// Workload name
        name: String,
    },
    /// Submit a workload from a JSON document
    Create {
        /// Path to the Job or CronJob document
        #[arg(short, long)]
        file: String,

        /// Wait until the workload converges
        #[arg(short, long)]
        wait: bool,
    },
    /// Delete a workload
    Delete {
        /// Workload name
        name: String,

        /// Wait until the workload is gone
        #[arg(short, long)]
        wait: bool,
    },
}

/// Handle workload commands
///
/// # Arguments
/// * `kind` - Job or CronJob
/// * `command` - The subcommand to execute
/// * `config` - The CLI configuration
pub async fn handle_workload_command(
    kind: WorkloadKind,
    command: WorkloadCommands,
    config: &Config,
) -> Result<()> {
    let client = config.client();

    match command {
        WorkloadCommands::List => list_workloads(&client, kind, config).await,
        WorkloadCommands::Get { name } => get_workload(&client, kind, &name, config).await,
        WorkloadCommands::Create { file, wait } => {
            create_workload(&client, kind, Path::new(&file), wait, config).await
        }
        WorkloadCommands::Delete { name, wait } => {
            delete_workload(&client, kind, &name, wait, config).await
        }
    }
}

async fn list_workloads(client: &SidecarClient, kind: WorkloadKind, config: &Config) -> Result<()> {
    let workloads = client.list_workloads(kind, config.namespace()).await?;

    if workloads.is_empty() {
        println!("{}", format!("No {}s found.", kind).yellow());
    } else {
        println!(
            "{}",
            format!("Found {} {}(s):", workloads.len(), kind).bold()
        );
        println!();
        for workload in &workloads {
            print_summary(workload);
        }
    }

    Ok(())
}

async fn get_workload(
    client: &SidecarClient,
    kind: WorkloadKind,
    name: &str,
    config: &Config,
) -> Result<()> {
    let summary = client
        .get_workload(kind, name, config.namespace())
        .await
        .map_err(|e| {
            if e.is_not_found() {
                anyhow::anyhow!("{} '{}' not found", kind, name)
            } else {
                e.into()
            }
        })?;

    print_summary(&summary);
    Ok(())
}

/// Submit a workload document
///
/// The document is sent as-is; the sidecar decodes it and reports decode
/// errors.
async fn create_workload(
    client: &SidecarClient,
    kind: WorkloadKind,
    file: &Path,
    wait: bool,
    config: &Config,
) -> Result<()> {
    let template = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    // Catch local typos before a round-trip
    serde_json::from_str::<serde_json::Value>(&template)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    if wait {
        println!("{}", format!("Submitting {} and waiting...", kind).dimmed());
    }

    let req = CreateWorkload {
        namespace: config.namespace.clone(),
        template,
        wait,
    };

    match client.create_workload(kind, req).await {
        Ok(handle) => {
            let state = if wait { "converged" } else { "created" };
            println!("{} {} {}", "✓".green(), handle.to_string().bold(), state);
            Ok(())
        }
        Err(e) if e.is_deadline_exceeded() => {
            println!(
                "{} {} was submitted but did not converge in time",
                "!".yellow(),
                kind
            );
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete_workload(
    client: &SidecarClient,
    kind: WorkloadKind,
    name: &str,
    wait: bool,
    config: &Config,
) -> Result<()> {
    let query = DeleteQuery {
        namespace: config.namespace.clone(),
        wait,
    };
    client.delete_workload(kind, name, query).await?;

    let state = if wait { "removed" } else { "deletion requested" };
    println!("{} {} {} {}", "✓".green(), kind, name.bold(), state);
    Ok(())
}

fn print_summary(summary: &WorkloadSummary) {
    println!("  {} {}", "▸".cyan(), summary.handle.to_string().bold());

    match &summary.status {
        WorkloadStatus::Job {
            active,
            succeeded,
            failed,
        } => {
            println!("    Active:       {}", colorize_count(*active, |s| s.cyan()));
            println!("    Succeeded:    {}", colorize_count(*succeeded, |s| s.green()));
            println!("    Failed:       {}", colorize_count(*failed, |s| s.red()));
        }
        WorkloadStatus::CronJob {
            active,
            last_schedule_time,
        } => {
            if active.is_empty() {
                println!("    Active:       {}", "none".dimmed());
            } else {
                println!("    Active:       {}", active.join(", ").cyan());
            }
            let last = last_schedule_time
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string());
            println!("    Last run:     {}", last.dimmed());
        }
    }
    println!();
}

fn colorize_count(count: i32, color: impl Fn(&str) -> ColoredString) -> ColoredString {
    let text = count.to_string();
    if count > 0 {
        color(&text)
    } else {
        text.dimmed()
    }
}
