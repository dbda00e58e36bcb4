mod export;
mod muscle_group;
mod workout_log;

pub use export::{ExportEnvelope, EXPORT_VERSION};
pub use muscle_group::MuscleGroup;
pub use workout_log::WorkoutLog;
