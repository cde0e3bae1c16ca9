//! Underwrite CLI
//!
//! Runs simulation jobs against configuration bundles and stored
//! applications, printing JSON reports on stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use underwrite_cli::commands;
use underwrite_cli::config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "underwrite")]
#[command(about = "Trace, replay and compare underwriting decisions")]
#[command(version)]
struct Cli {
    /// Tree to route with when a bundle holds several (overrides config)
    #[arg(long, global = true)]
    tree: Option<String>,

    /// Emit logs as JSON (overrides config)
    #[arg(long, global = true)]
    json_logs: bool,

    /// Evaluate batches sequentially (overrides config)
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one application with optional what-if overrides
    Trace {
        /// Configuration bundle
        #[arg(long)]
        config: PathBuf,

        /// Application snapshot (JSON)
        #[arg(long)]
        application: PathBuf,

        /// Attribute override, name=value (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,
    },

    /// Re-evaluate stored applications and compare with their outcomes
    Replay {
        /// Configuration bundle
        #[arg(long)]
        config: PathBuf,

        /// Application snapshots (JSON array or .jsonl)
        #[arg(long)]
        applications: PathBuf,
    },

    /// Compare two configurations over the same applications
    Impact {
        /// Current configuration bundle
        #[arg(long)]
        old: PathBuf,

        /// Candidate configuration bundle
        #[arg(long)]
        new: PathBuf,

        /// Application snapshots (JSON array or .jsonl)
        #[arg(long)]
        applications: PathBuf,
    },

    /// Show the routing path for one application without executing
    Route {
        /// Configuration bundle
        #[arg(long)]
        config: PathBuf,

        /// Application snapshot (JSON)
        #[arg(long)]
        application: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut settings = CliConfig::load()?;
    if cli.json_logs {
        settings.log_format = LogFormat::Json;
    }
    if cli.sequential {
        settings.parallel = false;
    }
    if let Some(tree) = cli.tree {
        settings.tree_id = Some(tree);
    }

    // Initialize tracing
    init_tracing(settings.log_format)?;
    info!("Loaded configuration: {:?}", settings);

    let stdout = std::io::stdout().lock();
    match cli.command {
        Command::Trace {
            config,
            application,
            overrides,
        } => {
            let output = commands::trace(&config, &application, &overrides, &settings)?;
            commands::write_json(stdout, &output)
        }
        Command::Replay {
            config,
            applications,
        } => {
            let report = commands::replay(&config, &applications, &settings)?;
            commands::write_json(stdout, &report)
        }
        Command::Impact {
            old,
            new,
            applications,
        } => {
            let report = commands::impact(&old, &new, &applications, &settings)?;
            commands::write_json(stdout, &report)
        }
        Command::Route {
            config,
            application,
        } => {
            let routing = commands::route(&config, &application, &settings)?;
            commands::write_json(stdout, &routing)
        }
    }
}

/// Initialize tracing subscriber. Logs go to stderr so stdout stays JSON.
fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "underwrite_cli=info,underwrite_sdk=info,underwrite_runtime=warn".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
