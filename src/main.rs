use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    auto_sync, print_groups, ClearCommand, ConfigCommand, ExportCommand, HistoryCommand,
    ImportCommand, LogCommand, RemoveCommand, SyncCommand,
};
use gymlog::config::Config;
use gymlog::store::LocalStore;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(version)]
#[command(about = "Track which muscle group you trained each day", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the muscle group trained on a day
    Log(LogCommand),

    /// Remove the entry for a day
    Remove(RemoveCommand),

    /// Show logged workouts, newest first
    History(HistoryCommand),

    /// List the muscle groups
    Groups,

    /// Export the log to a JSON backup file
    Export(ExportCommand),

    /// Replace the log with a JSON backup file
    Import(ImportCommand),

    /// Delete all logged workouts from this device
    Clear(ClearCommand),

    /// Sync with the remote store
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymlog=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    // Commands that never touch the log
    match &command {
        Commands::Groups => {
            print_groups();
            return Ok(());
        }
        Commands::Config(cmd) => return cmd.run(&config),
        _ => {}
    }

    let store = LocalStore::init(&config.database_path(), &config.fallback_path()).await;

    if is_read_command(&command) {
        auto_sync::pull_if_newer(&config, &store).await;
    }

    execute_command(&command, &store, &config).await?;

    if is_write_command(&command) {
        auto_sync::push(&config, &store).await;
    }

    Ok(())
}

async fn execute_command(
    command: &Commands,
    store: &LocalStore,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Log(cmd) => cmd.run(store).await?,
        Commands::Remove(cmd) => cmd.run(store).await?,
        Commands::History(cmd) => cmd.run(store).await?,
        Commands::Export(cmd) => cmd.run(store).await?,
        Commands::Import(cmd) => cmd.run(store).await?,
        Commands::Clear(cmd) => cmd.run(store).await?,
        Commands::Sync(cmd) => cmd.run(store, config).await?,
        Commands::Groups => print_groups(),
        Commands::Config(cmd) => cmd.run(config)?,
    }
    Ok(())
}

/// Returns true if the command reads the log and should see a newer remote copy.
fn is_read_command(cmd: &Commands) -> bool {
    matches!(cmd, Commands::History(_) | Commands::Export(_))
}

/// Returns true if the command changes the log and should push afterwards.
fn is_write_command(cmd: &Commands) -> bool {
    matches!(
        cmd,
        Commands::Log(_) | Commands::Remove(_) | Commands::Import(_) | Commands::Clear(_)
    )
}
