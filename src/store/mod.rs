//! Local persistence for the workout log.
//!
//! The log lives in the first of a ranked list of backends that can hold it:
//! the durable SQLite database when it opens, and a plain key/value file
//! otherwise. Every operation degrades instead of failing; backend errors are
//! logged and the next backend is tried.

mod error;
mod kv;
mod sqlite;

pub use error::{ImportError, StoreError};
pub use kv::{KvBackend, KvStore};
pub use sqlite::{init_db, SqliteBackend};

use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;

use crate::models::{ExportEnvelope, WorkoutLog};

/// Record key of the workout log, in both the database and the fallback store.
pub const LOG_KEY: &str = "gymLog";
/// Fallback store entry holding the log's last-updated epoch milliseconds.
pub const LAST_UPDATED_KEY: &str = "gymLog_lastUpdated";

/// The persisted form of the log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLog {
    pub data: WorkoutLog,
    /// Milliseconds since the Unix epoch.
    pub last_updated: i64,
}

/// One place the log can be stored.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Short name for log messages.
    fn name(&self) -> &'static str;

    /// Returns `Ok(None)` when the backend holds no log.
    async fn read(&self) -> Result<Option<StoredLog>, StoreError>;

    async fn write(&self, record: &StoredLog) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// The local persistence layer.
pub struct LocalStore {
    backends: Vec<Box<dyn LogBackend>>,
    kv: KvStore,
}

impl LocalStore {
    /// Opens the durable database at `db_path`, falling back to the key/value
    /// file at `fallback_path` alone if the database is unavailable.
    pub async fn init(db_path: &Path, fallback_path: &Path) -> Self {
        let kv = KvStore::new(fallback_path);
        let mut backends: Vec<Box<dyn LogBackend>> = Vec::with_capacity(2);

        match SqliteBackend::open(db_path).await {
            Ok(backend) => backends.push(Box::new(backend)),
            Err(e) => {
                tracing::warn!(
                    "Database {} unavailable, using fallback store: {}",
                    db_path.display(),
                    e
                );
            }
        }
        backends.push(Box::new(KvBackend::new(kv.clone())));

        Self { backends, kv }
    }

    /// Builds a store over an explicit backend ranking.
    pub fn with_backends(backends: Vec<Box<dyn LogBackend>>, kv: KvStore) -> Self {
        Self { backends, kv }
    }

    /// Names of the active backends, in the order they are tried.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// The fallback key/value store, also used for small scalar settings.
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Persists `log` stamped with the current time.
    pub async fn save_log(&self, log: &WorkoutLog) {
        self.save_log_at(log, Utc::now().timestamp_millis()).await
    }

    /// Persists `log` with an explicit last-updated timestamp.
    ///
    /// Written to the first backend that accepts it. If none does, the write
    /// is dropped and only logged.
    pub async fn save_log_at(&self, log: &WorkoutLog, last_updated: i64) {
        let record = StoredLog {
            data: log.clone(),
            last_updated,
        };

        for backend in &self.backends {
            match backend.write(&record).await {
                Ok(()) => {
                    tracing::debug!("Saved {} workout(s) to {}", log.len(), backend.name());
                    return;
                }
                Err(e) => tracing::warn!("Save to {} failed: {}", backend.name(), e),
            }
        }

        tracing::error!("All storage backends failed; workout log not saved");
    }

    /// Loads the log, or an empty one if no backend has a readable copy.
    pub async fn load_log(&self) -> WorkoutLog {
        self.load_record()
            .await
            .map(|record| record.data)
            .unwrap_or_default()
    }

    /// Last-updated timestamp of the log `load_log` returns, 0 if none.
    pub async fn last_updated(&self) -> i64 {
        self.load_record()
            .await
            .map(|record| record.last_updated)
            .unwrap_or(0)
    }

    async fn load_record(&self) -> Option<StoredLog> {
        for backend in &self.backends {
            match backend.read().await {
                Ok(Some(record)) => return Some(record),
                Ok(None) => {}
                Err(e) => tracing::warn!("Load from {} failed: {}", backend.name(), e),
            }
        }
        None
    }

    /// Serializes the current log into a pretty-printed export envelope.
    pub async fn export_data(&self) -> Result<String, serde_json::Error> {
        let log = self.load_log().await;
        ExportEnvelope::new(log, Utc::now()).to_json()
    }

    /// Replaces the log with the `workouts` of an export file.
    ///
    /// Returns the number of imported entries. On error nothing is written.
    pub async fn import_data(&self, json: &str) -> Result<usize, ImportError> {
        let log = parse_import(json).inspect_err(|e| tracing::warn!("Import failed: {}", e))?;

        self.save_log(&log).await;
        Ok(log.len())
    }

    /// Clears the log from every backend. Irreversible.
    pub async fn clear_all_data(&self) {
        for backend in &self.backends {
            if let Err(e) = backend.clear().await {
                tracing::warn!("Clear of {} failed: {}", backend.name(), e);
            }
        }
    }
}

fn parse_import(json: &str) -> Result<WorkoutLog, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(ImportError::InvalidJson)?;

    match value.get("workouts") {
        Some(workouts) if workouts.is_object() => {
            serde_json::from_value(workouts.clone()).map_err(ImportError::InvalidWorkouts)
        }
        _ => Err(ImportError::MissingWorkouts),
    }
}
