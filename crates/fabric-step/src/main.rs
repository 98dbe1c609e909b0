//! `fabric-step`: run fabric (fab) tasks as a build step and manage its global settings.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

mod commands;

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use commands::validate::ValidateArgs;

#[derive(Parser)]
#[command(name = "fabric-step")]
#[command(about = fabric_invoker::DISPLAY_NAME)]
#[command(version)]
struct Cli {
    /// Global settings file
    #[arg(long, global = true, env = "FABRIC_STEP_SETTINGS")]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a fabric task
    Run(RunArgs),

    /// Check job fields
    Validate(ValidateArgs),

    /// Show or change global settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    // Logs go to stderr; stdout carries fabric's own output
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings_path = cli
        .settings
        .unwrap_or_else(fabric_config::SettingsStore::default_path);

    smol::block_on(async {
        let ok = match cli.command {
            Commands::Run(args) => commands::run::run(&settings_path, args).await?,
            Commands::Validate(args) => commands::validate::run(args)?,
            Commands::Config { command } => commands::config::run(&settings_path, command)?,
        };
        Ok::<_, anyhow::Error>(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    })
}
