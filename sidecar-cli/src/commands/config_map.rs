//! ConfigMap command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use sidecar_core::dto::config_map::ConfigValueQuery;

use crate::config::Config;

/// ConfigMap subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one value of a ConfigMap
    Get {
        /// Key inside the ConfigMap
        key: String,

        /// ConfigMap name; the sidecar's configured one when omitted
        #[arg(long)]
        name: Option<String>,

        /// Print the bare value only
        #[arg(short, long)]
        raw: bool,
    },
}

/// Handle ConfigMap commands
pub async fn handle_config_command(command: ConfigCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        ConfigCommands::Get { key, name, raw } => {
            let query = ConfigValueQuery {
                namespace: config.namespace.clone(),
                name,
            };
            let value = client.get_config_value(&key, query).await?;

            if raw {
                println!("{}", value.value);
            } else {
                println!(
                    "{} {}/{} {}",
                    "▸".cyan(),
                    value.namespace.dimmed(),
                    value.name.bold(),
                    value.key.bold()
                );
                println!("    {}", value.value);
            }
            Ok(())
        }
    }
}
