use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use super::{LogBackend, StoreError, StoredLog, LOG_KEY};
use crate::models::WorkoutLog;

/// Open the durable database and run migrations.
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| StoreError::IoError(parent.to_path_buf(), e))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Durable backend: one row in the `records` table keyed by `"gymLog"`.
pub struct SqliteBackend {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    data: String,
    last_updated: i64,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database at `path`, creating it if needed.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        init_db(path).await.map(Self::new)
    }
}

#[async_trait]
impl LogBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn read(&self) -> Result<Option<StoredLog>, StoreError> {
        let row: Option<RecordRow> =
            sqlx::query_as("SELECT data, last_updated FROM records WHERE id = ?")
                .bind(LOG_KEY)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let data: WorkoutLog = serde_json::from_str(&row.data)
                    .map_err(|e| StoreError::MalformedData("records.data".to_string(), e))?;
                Ok(Some(StoredLog {
                    data,
                    last_updated: row.last_updated,
                }))
            }
            None => Ok(None),
        }
    }

    async fn write(&self, record: &StoredLog) -> Result<(), StoreError> {
        let data = serde_json::to_string(&record.data).map_err(StoreError::SerializeError)?;

        sqlx::query(
            r#"
            INSERT INTO records (id, data, last_updated)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data, last_updated = excluded.last_updated
            "#,
        )
        .bind(LOG_KEY)
        .bind(&data)
        .bind(record.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM records")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
