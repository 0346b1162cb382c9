//! Dasa - Persona Process Supervisor and Task Dispatcher
//!
//! Main entry point for the Dasa CLI.

use clap::{CommandFactory, Parser, Subcommand};
use dasa::config::DasaConfig;
use dasa::dispatch::{Command, Dispatcher};
use dasa::status::StatusReporter;
use dasa::supervisor::Supervisor;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Dasa - persona process supervisor and task dispatcher
#[derive(Parser, Debug)]
#[command(name = "dasa")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/dasa/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize the Dasa workspace
    Init,

    /// Boot the live orchestration dashboard
    Up {
        /// Refresh interval in milliseconds
        #[arg(long)]
        refresh: Option<u64>,
    },

    /// Spawn a specific persona's worker
    Run {
        /// Persona id (e.g. patih)
        id: String,
    },

    /// Print a one-shot status snapshot
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Terminate a running persona's worker
    Stop {
        /// Persona id
        id: String,
    },

    /// List the configured personas
    Roles,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = dasa::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    // Single process-exit point; the dispatcher decides the code.
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> dasa::Result<()> {
    // No subcommand: print usage and succeed, like `dasa help`.
    let Some(command) = cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| dasa::DasaError::Other(format!("Failed to print usage: {}", e)))?;
        return Ok(());
    };

    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(DasaConfig::default_path);

    let config = if config_path.exists() {
        DasaConfig::load(&config_path)?
    } else if matches!(&command, Commands::Init) || cli.config.is_none() {
        // No config yet is fine: init will create it, and everything else
        // runs on built-in defaults.
        DasaConfig::new()
    } else {
        return Err(dasa::DasaError::Config(format!(
            "Config file not found: {}",
            config_path.display()
        )));
    };

    let roster = Arc::new(config.build_roster()?);
    tracing::info!(personas = roster.len(), "Roster loaded");

    let supervisor = Arc::new(
        Supervisor::new(Arc::clone(&roster))
            .with_grace(config.grace_period())
            .with_log_dir(config.logs_dir()),
    );
    let reporter = StatusReporter::new(Arc::clone(&roster), Arc::clone(&supervisor));
    let dispatcher = Dispatcher::new(config, config_path, roster, supervisor, reporter);

    dispatcher.dispatch(map_command(command)).await
}

fn map_command(command: Commands) -> Command {
    match command {
        Commands::Init => Command::Init,
        Commands::Up { refresh } => Command::Up {
            refresh_ms: refresh,
        },
        Commands::Run { id } => Command::Run { role_id: id },
        Commands::Status { json } => Command::Status { json },
        Commands::Stop { id } => Command::Stop { role_id: id },
        Commands::Roles => Command::Roles,
    }
}
