//! Best-effort mirroring of the workout log to a remote store.
//!
//! The remote holds one record per anonymous installation identifier. There
//! is no merge: callers compare timestamps with [`CloudSync::should_sync_from_cloud`]
//! and decide which side wins. Every operation turns failures into `false` or
//! `None` and logs them.

mod remote;
mod rest;

pub use remote::{RemoteBackend, RemoteError, RemoteRecord};
pub use rest::RestRemote;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::models::WorkoutLog;
use crate::store::LocalStore;

/// Fallback store entry holding the anonymous identifier.
pub const USER_ID_KEY: &str = "gym_user_id";

/// Snapshot of the remote state for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatus {
    pub has_cloud_data: bool,
    pub last_cloud_sync: Option<DateTime<Utc>>,
    pub conflict_detected: bool,
}

/// Sync service binding a local store to a remote backend.
pub struct CloudSync<'a> {
    store: &'a LocalStore,
    remote: Box<dyn RemoteBackend>,
    user_id: OnceLock<String>,
}

impl<'a> CloudSync<'a> {
    pub fn new(store: &'a LocalStore, remote: Box<dyn RemoteBackend>) -> Self {
        Self {
            store,
            remote,
            user_id: OnceLock::new(),
        }
    }

    /// Returns the installation's identifier, minting and storing one on
    /// first use.
    pub fn get_or_create_user_id(&self) -> String {
        self.user_id
            .get_or_init(|| match self.store.kv().get(USER_ID_KEY) {
                Ok(Some(id)) if !id.is_empty() => id,
                Ok(_) => self.mint_user_id(),
                Err(e) => {
                    tracing::warn!("Could not read stored user id: {}", e);
                    self.mint_user_id()
                }
            })
            .clone()
    }

    fn mint_user_id(&self) -> String {
        let id = format!("user_{}", Uuid::new_v4().simple());
        if let Err(e) = self.store.kv().set(USER_ID_KEY, &id) {
            tracing::warn!("Could not persist user id: {}", e);
        }
        tracing::info!("Created anonymous user id {}", id);
        id
    }

    /// Uploads the local log, replacing the remote copy.
    ///
    /// On success the local record is stamped with the upload time so the
    /// freshly written remote copy does not read as newer.
    pub async fn sync_to_cloud(&self) -> bool {
        let user_id = self.get_or_create_user_id();
        let log = self.store.load_log().await;
        let record = RemoteRecord {
            user_id,
            data: log,
            last_updated: Utc::now(),
        };

        match self.remote.upsert(&record).await {
            Ok(()) => {
                self.store
                    .save_log_at(&record.data, record.last_updated.timestamp_millis())
                    .await;
                true
            }
            Err(e) => {
                tracing::error!("Cloud sync failed: {}", e);
                false
            }
        }
    }

    /// Fetches the remote log, or `None` if absent or unreachable.
    pub async fn sync_from_cloud(&self) -> Option<WorkoutLog> {
        self.fetch_record().await.map(|record| record.data)
    }

    /// True only when the remote copy is strictly newer than the local one.
    pub async fn should_sync_from_cloud(&self) -> bool {
        match self.fetch_record().await {
            Some(record) => self.is_newer_than_local(&record).await,
            None => false,
        }
    }

    pub async fn get_sync_status(&self) -> SyncStatus {
        match self.fetch_record().await {
            Some(record) => SyncStatus {
                has_cloud_data: true,
                last_cloud_sync: Some(record.last_updated),
                conflict_detected: self.is_newer_than_local(&record).await,
            },
            None => SyncStatus::default(),
        }
    }

    async fn is_newer_than_local(&self, record: &RemoteRecord) -> bool {
        record.last_updated.timestamp_millis() > self.store.last_updated().await
    }

    async fn fetch_record(&self) -> Option<RemoteRecord> {
        let user_id = self.get_or_create_user_id();
        match self.remote.fetch(&user_id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                tracing::debug!("No remote record for {}", user_id);
                None
            }
            Err(e) => {
                tracing::error!("Cloud load failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MuscleGroup;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// In-memory remote; `offline` makes every call fail.
    #[derive(Clone, Default)]
    struct MemoryRemote {
        rows: Arc<Mutex<HashMap<String, RemoteRecord>>>,
        offline: bool,
    }

    impl MemoryRemote {
        fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        fn insert(&self, record: RemoteRecord) {
            self.rows
                .lock()
                .unwrap()
                .insert(record.user_id.clone(), record);
        }

        fn get(&self, user_id: &str) -> Option<RemoteRecord> {
            self.rows.lock().unwrap().get(user_id).cloned()
        }
    }

    #[async_trait]
    impl RemoteBackend for MemoryRemote {
        async fn upsert(&self, record: &RemoteRecord) -> Result<(), RemoteError> {
            if self.offline {
                return Err(RemoteError::HttpError("connection refused".to_string()));
            }
            self.insert(record.clone());
            Ok(())
        }

        async fn fetch(&self, user_id: &str) -> Result<Option<RemoteRecord>, RemoteError> {
            if self.offline {
                return Err(RemoteError::HttpError("connection refused".to_string()));
            }
            Ok(self.get(user_id))
        }
    }

    async fn setup() -> (LocalStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::init(
            &temp_dir.path().join("gymlog.db"),
            &temp_dir.path().join("fallback.json"),
        )
        .await;
        (store, temp_dir)
    }

    fn millis(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ts).unwrap()
    }

    fn record_for(user_id: &str, last_updated: i64) -> RemoteRecord {
        let mut data = WorkoutLog::new();
        data.record("2024-02-02", MuscleGroup::ChestTriceps);
        RemoteRecord {
            user_id: user_id.to_string(),
            data,
            last_updated: millis(last_updated),
        }
    }

    #[tokio::test]
    async fn test_user_id_is_created_once_and_persisted() {
        let (store, _temp) = setup().await;
        let sync = CloudSync::new(&store, Box::new(MemoryRemote::default()));

        let id = sync.get_or_create_user_id();
        assert!(id.starts_with("user_"));
        assert_eq!(sync.get_or_create_user_id(), id);
        assert_eq!(store.kv().get(USER_ID_KEY).unwrap(), Some(id.clone()));

        // A fresh service picks up the stored id
        let again = CloudSync::new(&store, Box::new(MemoryRemote::default()));
        assert_eq!(again.get_or_create_user_id(), id);
    }

    #[tokio::test]
    async fn test_user_ids_differ_between_installations() {
        let (store_a, _temp_a) = setup().await;
        let (store_b, _temp_b) = setup().await;

        let a = CloudSync::new(&store_a, Box::new(MemoryRemote::default()));
        let b = CloudSync::new(&store_b, Box::new(MemoryRemote::default()));

        assert_ne!(a.get_or_create_user_id(), b.get_or_create_user_id());
    }

    #[tokio::test]
    async fn test_sync_to_cloud_uploads_local_log() {
        let (store, _temp) = setup().await;
        let mut log = WorkoutLog::new();
        log.record("2024-01-01", MuscleGroup::Legs);
        store.save_log(&log).await;

        let remote = MemoryRemote::default();
        let sync = CloudSync::new(&store, Box::new(remote.clone()));

        assert!(sync.sync_to_cloud().await);

        let row = remote.get(&sync.get_or_create_user_id()).unwrap();
        assert_eq!(row.data, log);
        assert_eq!(
            store.last_updated().await,
            row.last_updated.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_no_conflict_right_after_push() {
        let (store, _temp) = setup().await;
        store.save_log(&WorkoutLog::new()).await;
        let sync = CloudSync::new(&store, Box::new(MemoryRemote::default()));

        assert!(sync.sync_to_cloud().await);
        assert!(!sync.should_sync_from_cloud().await);
    }

    #[tokio::test]
    async fn test_sync_to_cloud_offline_returns_false() {
        let (store, _temp) = setup().await;
        store.save_log_at(&WorkoutLog::new(), 5).await;
        let sync = CloudSync::new(&store, Box::new(MemoryRemote::offline()));

        assert!(!sync.sync_to_cloud().await);
        assert_eq!(store.last_updated().await, 5);
    }

    #[tokio::test]
    async fn test_sync_from_cloud_returns_remote_log() {
        let (store, _temp) = setup().await;
        let remote = MemoryRemote::default();
        let sync = CloudSync::new(&store, Box::new(remote.clone()));
        let record = record_for(&sync.get_or_create_user_id(), 1_000);
        remote.insert(record.clone());

        assert_eq!(sync.sync_from_cloud().await, Some(record.data));
    }

    #[tokio::test]
    async fn test_sync_from_cloud_absent_or_offline_is_none() {
        let (store, _temp) = setup().await;

        let empty = CloudSync::new(&store, Box::new(MemoryRemote::default()));
        assert_eq!(empty.sync_from_cloud().await, None);

        let offline = CloudSync::new(&store, Box::new(MemoryRemote::offline()));
        assert_eq!(offline.sync_from_cloud().await, None);
    }

    #[tokio::test]
    async fn test_should_sync_only_when_remote_strictly_newer() {
        let (store, _temp) = setup().await;
        let t = 1_700_000_000_000;
        store.save_log_at(&WorkoutLog::new(), t).await;

        let remote = MemoryRemote::default();
        let sync = CloudSync::new(&store, Box::new(remote.clone()));
        let user_id = sync.get_or_create_user_id();

        remote.insert(record_for(&user_id, t + 1));
        assert!(sync.should_sync_from_cloud().await);

        remote.insert(record_for(&user_id, t - 1));
        assert!(!sync.should_sync_from_cloud().await);

        remote.insert(record_for(&user_id, t));
        assert!(!sync.should_sync_from_cloud().await);
    }

    #[tokio::test]
    async fn test_should_sync_false_without_remote_record() {
        let (store, _temp) = setup().await;
        let sync = CloudSync::new(&store, Box::new(MemoryRemote::default()));
        assert!(!sync.should_sync_from_cloud().await);

        let offline = CloudSync::new(&store, Box::new(MemoryRemote::offline()));
        assert!(!offline.should_sync_from_cloud().await);
    }

    #[tokio::test]
    async fn test_sync_status_with_newer_remote() {
        let (store, _temp) = setup().await;
        store.save_log_at(&WorkoutLog::new(), 100).await;

        let remote = MemoryRemote::default();
        let sync = CloudSync::new(&store, Box::new(remote.clone()));
        remote.insert(record_for(&sync.get_or_create_user_id(), 200));

        let status = sync.get_sync_status().await;
        assert_eq!(
            status,
            SyncStatus {
                has_cloud_data: true,
                last_cloud_sync: Some(millis(200)),
                conflict_detected: true,
            }
        );
    }

    #[tokio::test]
    async fn test_sync_status_offline_is_default() {
        let (store, _temp) = setup().await;
        let sync = CloudSync::new(&store, Box::new(MemoryRemote::offline()));

        assert_eq!(sync.get_sync_status().await, SyncStatus::default());
    }
}
