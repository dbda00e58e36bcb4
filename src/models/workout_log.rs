use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::MuscleGroup;

/// Mapping from a `YYYY-MM-DD` date to the muscle group key trained that day.
///
/// The log is always persisted as a whole; there is no per-entry storage API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutLog(BTreeMap<String, String>);

impl WorkoutLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: &str) -> Option<&str> {
        self.0.get(date).map(String::as_str)
    }

    /// Records `group` for `date`, replacing any previous entry.
    pub fn record(&mut self, date: impl Into<String>, group: MuscleGroup) {
        self.0.insert(date.into(), group.key().to_string());
    }

    pub fn remove(&mut self, date: &str) -> Option<String> {
        self.0.remove(date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries ordered newest date first.
    pub fn entries_desc(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .rev()
            .map(|(date, key)| (date.as_str(), key.as_str()))
    }
}
