//! CLI entry point for the linkfile tool.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod app_config;
mod cli;
mod commands;
mod terminal;

use app_config::load_file_config;
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let config = load_file_config(args.config.as_deref())?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => config.verbosity.map_or("info", |v| v.log_level()),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, ?config, "CLI arguments parsed");

    match &args.command {
        Command::Download(download) => commands::run_download_command(download, &config).await,
        Command::Delete(delete) => commands::run_delete_command(delete, &config),
        Command::Normalize(target) => commands::run_normalize_command(target, &config),
        Command::Check(target) => commands::run_check_command(target, &config),
        Command::Classify(classify) => commands::run_classify_command(classify),
    }
}
