use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::WorkoutLog;

/// One row of the remote table: the whole log for one anonymous user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub user_id: String,
    pub data: WorkoutLog,
    pub last_updated: DateTime<Utc>,
}

/// A network store holding at most one record per user identifier.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Inserts the record, replacing any existing row for the same user.
    async fn upsert(&self, record: &RemoteRecord) -> Result<(), RemoteError>;

    /// Returns `Ok(None)` when the user has no row.
    async fn fetch(&self, user_id: &str) -> Result<Option<RemoteRecord>, RemoteError>;
}

/// Errors that can occur talking to the remote store.
#[derive(Debug)]
pub enum RemoteError {
    /// Remote URL is not configured
    NotConfigured,
    /// Request could not be sent or the response not read
    HttpError(String),
    /// Server answered with a non-success status
    ServerError { status: u16, body: String },
    /// Response body did not have the expected shape
    DecodeError(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::NotConfigured => write!(
                f,
                "Remote sync not configured. Add remote.url to config or set GYMLOG_REMOTE_URL."
            ),
            RemoteError::HttpError(e) => write!(f, "HTTP error: {}", e),
            RemoteError::ServerError { status, body } => {
                write!(f, "Server returned status {}: {}", status, body)
            }
            RemoteError::DecodeError(e) => write!(f, "Unexpected response: {}", e),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::DecodeError(e.to_string())
        } else {
            RemoteError::HttpError(e.to_string())
        }
    }
}
