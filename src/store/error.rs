use std::io;
use std::path::PathBuf;

/// Errors raised by individual storage backends.
///
/// These never escape [`LocalStore`](super::LocalStore); they are logged and
/// the next backend is tried.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// SQLite error from the durable database.
    DatabaseError(sqlx::Error),
    /// Migration of the durable database failed.
    MigrateError(sqlx::migrate::MigrateError),
    /// Stored content could not be parsed.
    MalformedData(String, serde_json::Error),
    /// Serializing a record failed.
    SerializeError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StoreError::DatabaseError(e) => write!(f, "Database error: {}", e),
            StoreError::MigrateError(e) => write!(f, "Database migration failed: {}", e),
            StoreError::MalformedData(what, e) => {
                write!(f, "Malformed data in {}: {}", what, e)
            }
            StoreError::SerializeError(e) => write!(f, "Failed to serialize record: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(_, e) => Some(e),
            StoreError::DatabaseError(e) => Some(e),
            StoreError::MigrateError(e) => Some(e),
            StoreError::MalformedData(_, e) => Some(e),
            StoreError::SerializeError(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrateError(e)
    }
}

/// Reasons an import was rejected. The stored log is untouched in every case.
#[derive(Debug)]
pub enum ImportError {
    /// Input is not valid JSON.
    InvalidJson(serde_json::Error),
    /// Input has no `workouts` object.
    MissingWorkouts,
    /// `workouts` is an object but its entries are not date → key strings.
    InvalidWorkouts(serde_json::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::InvalidJson(e) => write!(f, "File is not valid JSON: {}", e),
            ImportError::MissingWorkouts => {
                write!(f, "File does not contain a 'workouts' object")
            }
            ImportError::InvalidWorkouts(e) => write!(f, "Invalid workout entries: {}", e),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::InvalidJson(e) | ImportError::InvalidWorkouts(e) => Some(e),
            ImportError::MissingWorkouts => None,
        }
    }
}
