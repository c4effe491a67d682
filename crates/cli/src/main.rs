//! Opsdesk CLI - Command-line front end for the authorization kernel
//!
//! Usage:
//!   opsdesk policy roles                                  - List roles and ranks
//!   opsdesk policy check --role <role> [--permission <p>] - Show or test a role's permissions
//!   opsdesk policy can-edit --role <r> --creator <id> --caller <id>
//!   opsdesk demo                                          - Run the reference scenarios in memory

use clap::{Parser, Subcommand};
use cli::commands::{DemoCommand, PolicyCommand};
use cli::OutputOptions;
use shared::KernelConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "opsdesk")]
#[command(about = "Opsdesk - Multi-tenant authorization and approval kernel")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kernel configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Role table inspection
    Policy(PolicyCommand),
    /// Run the reference scenarios against in-memory stores
    Demo(DemoCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => KernelConfig::from_file(path)?,
        None => KernelConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "configuration loaded");
    let output = OutputOptions { json: cli.json };

    match cli.command {
        Commands::Policy(cmd) => cmd.run(output),
        Commands::Demo(cmd) => cmd.run(config, output),
    }
}
