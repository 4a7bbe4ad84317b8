//! Hyperion Bridge Operator CLI
//!
//! - `hyperion-cli checkpoint`   -> valset checkpoint digest for validators to sign
//! - `hyperion-cli batch-digest` -> batch digest for validators to sign
//! - `hyperion-cli devnet`       -> in-process bridge walkthrough from a config file

mod config;
mod devnet;
mod digest;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;

use crate::config::DevnetConfig;

#[derive(Parser)]
#[command(name = "hyperion-cli")]
#[command(about = "Operator tooling for the Hyperion bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the checkpoint of a validator set
    Checkpoint {
        /// Valset JSON file
        #[arg(long)]
        valset: PathBuf,

        /// Hyperion ID: 32-byte hex or a short ASCII name
        #[arg(long)]
        hyperion_id: String,
    },

    /// Compute the digest of a transaction batch
    BatchDigest {
        /// Batch JSON file
        #[arg(long)]
        batch: PathBuf,

        /// Hyperion ID: 32-byte hex or a short ASCII name
        #[arg(long)]
        hyperion_id: String,
    },

    /// Deploy the bridge on an in-process chain and replay the bridge flows
    Devnet {
        /// Configuration file (defaults to hyperion.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Checkpoint {
            valset,
            hyperion_id,
        } => {
            let hyperion_id = digest::parse_hyperion_id(&hyperion_id)?;
            let output = digest::checkpoint_from_file(&valset, &hyperion_id)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::BatchDigest { batch, hyperion_id } => {
            let hyperion_id = digest::parse_hyperion_id(&hyperion_id)?;
            let output = digest::batch_digest_from_file(&batch, &hyperion_id)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Devnet { config } => {
            let config = DevnetConfig::load(config.as_deref())?;
            tracing::info!(
                validators = config.validators.len(),
                power_threshold = config.power_threshold,
                "Configuration loaded"
            );

            let report = devnet::run(&config)?;
            tracing::info!(
                bridge = %report.bridge,
                events = report.events.len(),
                "Devnet run complete"
            );
            for line in &report.events {
                println!("{line}");
            }
            println!("{}", serde_json::to_string_pretty(&report.state)?);
        }
    }

    Ok(())
}

/// Initialize tracing with `RUST_LOG` taking precedence over the default filter
fn init_logging(json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyperion=debug,hyperion_cli=debug"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    }
}
