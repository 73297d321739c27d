use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "rehearse", about = "Sales role-play scoring and practice server")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the user and project files
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a conversation and print its metrics
    Analyze(commands::analyze::AnalyzeArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Replace PII in text with placeholders
    Redact(commands::redact::RedactArgs),
    /// Run the rehearse server
    ///
    /// Without `storage.path` in the config, session results live in a
    /// bounded in-memory store meant for development and are lost on exit.
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, config_path),
        Commands::Config(args) => commands::config::run(args, config_path),
        Commands::Redact(args) => commands::redact::run(args, config_path),
        Commands::Serve(args) => commands::serve::run(args, config_path).await,
    }
}
