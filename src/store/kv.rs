//! Synchronous key/value fallback store.
//!
//! A flat JSON object of string entries kept in a single file. Every call
//! reads or rewrites the whole file, so there is no in-memory state to go
//! stale between processes.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{LogBackend, StoreError, StoredLog, LAST_UPDATED_KEY, LOG_KEY};
use crate::models::WorkoutLog;

type Entries = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
}

impl KvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    /// Writes several entries with a single file rewrite.
    pub fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StoreError::MalformedData(_, e)) => {
                tracing::warn!(
                    "Fallback store {} is corrupt, starting over: {}",
                    self.path.display(),
                    e
                );
                Entries::new()
            }
            Err(e) => return Err(e),
        };
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        self.write_entries(&entries)
    }

    pub fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.write_entries(&entries)
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StoreError::MalformedData(self.path.display().to_string(), e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StoreError::IoError(self.path.clone(), e)),
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::IoError(parent.to_path_buf(), e))?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(StoreError::SerializeError)?;
        fs::write(&self.path, json).map_err(|e| StoreError::IoError(self.path.clone(), e))
    }
}

/// Log backend over the fallback store, using the `gymLog` and
/// `gymLog_lastUpdated` entries.
pub struct KvBackend {
    kv: KvStore,
}

impl KvBackend {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl LogBackend for KvBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn read(&self) -> Result<Option<StoredLog>, StoreError> {
        let raw = match self.kv.get(LOG_KEY)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let data: WorkoutLog = serde_json::from_str(&raw)
            .map_err(|e| StoreError::MalformedData(LOG_KEY.to_string(), e))?;
        let last_updated = self
            .kv
            .get(LAST_UPDATED_KEY)?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);

        Ok(Some(StoredLog { data, last_updated }))
    }

    async fn write(&self, record: &StoredLog) -> Result<(), StoreError> {
        let data = serde_json::to_string(&record.data).map_err(StoreError::SerializeError)?;
        let last_updated = record.last_updated.to_string();
        self.kv.set_many(&[
            (LOG_KEY, data.as_str()),
            (LAST_UPDATED_KEY, last_updated.as_str()),
        ])
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(&[LOG_KEY, LAST_UPDATED_KEY])
    }
}
