use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::WorkoutLog;

/// Current export file format version.
pub const EXPORT_VERSION: u32 = 1;

/// Snapshot wrapper written to backup files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: u32,
    pub export_date: String,
    pub workouts: WorkoutLog,
    pub total_workouts: usize,
}

impl ExportEnvelope {
    pub fn new(workouts: WorkoutLog, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION,
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_workouts: workouts.len(),
            workouts,
        }
    }

    /// Pretty-printed JSON, as written to disk.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
