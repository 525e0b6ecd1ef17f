use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use syncq::cli::args::{Cli, Commands};
use syncq::cli::commands;
use syncq::config::Config;
use syncq::error::SyncError;
use syncq::logging;
use syncq::remote::HttpRemoteClient;
use syncq::sync::{SqliteQueue, SyncCoordinator, SyncOptions};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load()?,
    };
    logging::init(&config.logging.level);

    let store = Arc::new(SqliteQueue::new()?);
    let remote = Arc::new(HttpRemoteClient::from_config(&config.api)?);
    let coordinator = SyncCoordinator::new(store.clone(), remote, SyncOptions::from(&config.sync));

    let output = match cli.command {
        Commands::Enqueue(args) => commands::enqueue(store.as_ref(), args, format)?,
        Commands::Run => commands::run(&coordinator, format).await?,
        Commands::Status => commands::status(&coordinator.get_queue_stats()?, format)?,
        Commands::List { status, limit } => {
            commands::list(store.as_ref(), status, limit, format)?
        },
        Commands::Show { id } => commands::show(store.as_ref(), &id, format)?,
        Commands::Retry { id } => commands::retry(&coordinator, &id, format).await?,
        Commands::Reset { id } => commands::reset(store.as_ref(), &id, format)?,
        Commands::Clear => commands::clear(&coordinator, format)?,
        Commands::Watch { interval } => {
            if !config.sync.auto_sync {
                return Err(SyncError::Config(
                    "auto-sync is disabled (sync.auto_sync / ENABLE_AUTO_SYNC)".to_string(),
                )
                .into());
            }
            let interval = interval.map_or_else(|| config.sync.interval(), Duration::from_secs);
            if interval.is_zero() {
                return Err(
                    SyncError::Config("interval must be at least 1 second".to_string()).into(),
                );
            }
            commands::watch(&coordinator, interval, format).await?
        },
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

