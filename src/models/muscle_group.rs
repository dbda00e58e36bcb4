use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of training categories a day can be logged under.
///
/// Only the key is ever persisted; labels are for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    BackBicepsShoulders,
    ChestTriceps,
    Legs,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 3] = [
        MuscleGroup::BackBicepsShoulders,
        MuscleGroup::ChestTriceps,
        MuscleGroup::Legs,
    ];

    /// Stable key stored in the workout log.
    pub fn key(&self) -> &'static str {
        match self {
            MuscleGroup::BackBicepsShoulders => "back_biceps_shoulders",
            MuscleGroup::ChestTriceps => "chest_triceps",
            MuscleGroup::Legs => "legs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::BackBicepsShoulders => "Back, Biceps & Shoulders",
            MuscleGroup::ChestTriceps => "Chest & Triceps",
            MuscleGroup::Legs => "Legs",
        }
    }

    /// Looks up the display label for a stored key, if it is a known group.
    pub fn label_for_key(key: &str) -> Option<&'static str> {
        Self::ALL
            .iter()
            .find(|group| group.key() == key)
            .map(|group| group.label())
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "back_biceps_shoulders" => Ok(MuscleGroup::BackBicepsShoulders),
            "chest_triceps" => Ok(MuscleGroup::ChestTriceps),
            "legs" => Ok(MuscleGroup::Legs),
            _ => Err(format!(
                "Invalid muscle group '{}'. Valid options: back_biceps_shoulders, chest_triceps, legs",
                s
            )),
        }
    }
}
