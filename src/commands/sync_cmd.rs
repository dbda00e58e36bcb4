//! Sync CLI commands for mirroring the log to the remote store.

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Args, Subcommand};

use gymlog::config::Config;
use gymlog::store::LocalStore;
use gymlog::sync::{CloudSync, RemoteError, RestRemote};

/// Sync with the remote store
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum SyncSubcommand {
    /// Upload the local log, replacing the remote copy
    Push,
    /// Replace the local log with the remote copy
    Pull {
        /// Pull even if the remote copy is not newer
        #[arg(long)]
        force: bool,
    },
    /// Show sync configuration and remote status
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        store: &LocalStore,
        config: &Config,
    ) -> Result<(), SyncCommandError> {
        match &self.command {
            Some(SyncSubcommand::Push) => self.push(store, config).await,
            Some(SyncSubcommand::Pull { force }) => self.pull(store, config, *force).await,
            None | Some(SyncSubcommand::Status) => self.status(store, config).await,
        }
    }

    async fn push(&self, store: &LocalStore, config: &Config) -> Result<(), SyncCommandError> {
        let remote = RestRemote::from_config(&config.remote)?;
        let sync = CloudSync::new(store, Box::new(remote));

        println!("Pushing to {}...", config.remote.url.as_deref().unwrap_or(""));
        if !sync.sync_to_cloud().await {
            return Err(SyncCommandError::Failed("push"));
        }

        let count = store.load_log().await.len();
        println!("✓ pushed {} workout(s)", count);
        Ok(())
    }

    async fn pull(
        &self,
        store: &LocalStore,
        config: &Config,
        force: bool,
    ) -> Result<(), SyncCommandError> {
        let remote = RestRemote::from_config(&config.remote)?;
        let sync = CloudSync::new(store, Box::new(remote));

        if !force && !sync.should_sync_from_cloud().await {
            println!("Local log is up to date. Use --force to overwrite it anyway.");
            return Ok(());
        }

        match sync.sync_from_cloud().await {
            Some(log) => {
                store.save_log(&log).await;
                println!("✓ pulled {} workout(s)", log.len());
                Ok(())
            }
            None => Err(SyncCommandError::Failed("pull")),
        }
    }

    async fn status(&self, store: &LocalStore, config: &Config) -> Result<(), SyncCommandError> {
        println!("Sync Status");
        println!("===========");
        println!();
        println!("Local storage: {}", store.backend_names().join(" -> "));
        println!(
            "Last local change: {}",
            format_millis(store.last_updated().await)
        );
        println!();

        let remote = match RestRemote::from_config(&config.remote) {
            Ok(remote) => remote,
            Err(RemoteError::NotConfigured) => {
                println!("Remote: Not configured");
                println!();
                println!("To enable sync, add to your config file:");
                println!();
                println!("  remote:");
                println!("    url: \"https://your-project.supabase.co\"");
                println!("    api_key: \"your-anon-key\"");
                println!("    auto_sync: false");
                println!();
                println!("Or set environment variables:");
                println!("  GYMLOG_REMOTE_URL");
                println!("  GYMLOG_REMOTE_API_KEY");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let sync = CloudSync::new(store, Box::new(remote));
        println!("Remote:    {}", config.remote.url.as_deref().unwrap_or(""));
        println!("Table:     {}", config.remote.table);
        println!("User ID:   {}", sync.get_or_create_user_id());
        println!(
            "Auto-sync: {}",
            if config.remote.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!();

        let status = sync.get_sync_status().await;
        if !status.has_cloud_data {
            println!("Cloud data: none (or remote unreachable)");
            return Ok(());
        }

        if let Some(at) = status.last_cloud_sync {
            println!("Cloud data: last updated {}", format_time(at));
        }
        if status.conflict_detected {
            println!("⚠ Cloud copy is newer than this device. Run `gymlog sync pull` to use it.");
        } else {
            println!("✓ This device is up to date");
        }
        Ok(())
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_millis(millis: i64) -> String {
    if millis <= 0 {
        return "never".to_string();
    }
    match Utc.timestamp_millis_opt(millis).single() {
        Some(at) => format_time(at),
        None => "unknown".to_string(),
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    Remote(RemoteError),
    Failed(&'static str),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::Remote(e) => write!(f, "{}", e),
            SyncCommandError::Failed(op) => write!(
                f,
                "Sync {} failed; the remote store may be unreachable (run with RUST_LOG=gymlog=debug for details)",
                op
            ),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::Remote(e) => Some(e),
            SyncCommandError::Failed(_) => None,
        }
    }
}

impl From<RemoteError> for SyncCommandError {
    fn from(e: RemoteError) -> Self {
        SyncCommandError::Remote(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis_never() {
        assert_eq!(format_millis(0), "never");
    }

    #[test]
    fn test_format_millis_shape() {
        let formatted = format_millis(1_700_000_000_000);
        assert_eq!(formatted.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_not_configured_message() {
        let err = SyncCommandError::from(RemoteError::NotConfigured);
        assert!(err.to_string().contains("GYMLOG_REMOTE_URL"));
    }
}
