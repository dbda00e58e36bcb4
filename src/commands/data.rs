//! Backup and reset commands.

use chrono::Local;
use clap::Args;
use std::path::{Path, PathBuf};

use gymlog::store::LocalStore;

/// Export the workout log to a JSON backup file
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output file ("-" for stdout), defaults to gym-log-backup-<today>.json
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl ExportCommand {
    pub async fn run(&self, store: &LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        let json = store.export_data().await?;

        let path = self.output.clone().unwrap_or_else(default_export_filename);
        if path == Path::new("-") {
            println!("{}", json);
            return Ok(());
        }

        std::fs::write(&path, json)
            .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        println!("Exported workout log to {}", path.display());
        Ok(())
    }
}

/// Replace the workout log with the contents of a backup file
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Backup file produced by `gymlog export`
    pub file: PathBuf,
}

impl ImportCommand {
    pub async fn run(&self, store: &LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(&self.file)
            .map_err(|e| format!("Failed to read '{}': {}", self.file.display(), e))?;

        match store.import_data(&contents).await {
            Ok(count) => {
                println!("Imported {} workout(s) from {}", count, self.file.display());
                Ok(())
            }
            Err(e) => Err(format!(
                "Import failed: {}. Your existing log was not changed.",
                e
            )
            .into()),
        }
    }
}

/// Delete all logged workouts from this device
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Confirm the deletion; it cannot be undone
    #[arg(long)]
    pub yes: bool,
}

impl ClearCommand {
    pub async fn run(&self, store: &LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        if !self.yes {
            return Err("This deletes every logged workout and cannot be undone. \
                        Consider `gymlog export` first, then re-run with --yes."
                .into());
        }

        store.clear_all_data().await;
        println!("All workout data cleared.");
        Ok(())
    }
}

/// Backup filename for today's date.
pub fn default_export_filename() -> PathBuf {
    PathBuf::from(format!(
        "gym-log-backup-{}.json",
        Local::now().date_naive().format("%Y-%m-%d")
    ))
}
