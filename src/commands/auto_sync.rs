//! Auto-sync around CLI commands.
//!
//! When `remote.auto_sync` is enabled, a newer remote copy is pulled before
//! read commands and the local log is pushed after write commands. Failures
//! only print a notice; the CLI keeps working offline.

use gymlog::config::Config;
use gymlog::store::LocalStore;
use gymlog::sync::{CloudSync, RestRemote};

fn auto_sync_client<'a>(config: &Config, store: &'a LocalStore) -> Option<CloudSync<'a>> {
    if !config.remote.auto_sync || !config.remote.is_configured() {
        return None;
    }
    let remote = RestRemote::from_config(&config.remote).ok()?;
    Some(CloudSync::new(store, Box::new(remote)))
}

/// Replaces the local log with the remote copy if the remote is newer.
pub async fn pull_if_newer(config: &Config, store: &LocalStore) {
    let Some(sync) = auto_sync_client(config, store) else {
        return;
    };

    if !sync.should_sync_from_cloud().await {
        return;
    }
    if let Some(log) = sync.sync_from_cloud().await {
        store.save_log(&log).await;
        eprintln!("Auto-sync: pulled newer log from remote");
    }
}

/// Pushes the local log after a successful write.
pub async fn push(config: &Config, store: &LocalStore) {
    let Some(sync) = auto_sync_client(config, store) else {
        return;
    };

    if !sync.sync_to_cloud().await {
        eprintln!("Auto-sync: push failed, run `gymlog sync push` to retry");
    }
}
