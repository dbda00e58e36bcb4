use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::str::FromStr;

use gymlog::models::{MuscleGroup, WorkoutLog};
use gymlog::store::LocalStore;

#[derive(Debug, Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Record the muscle group trained on a day
#[derive(Debug, Args)]
pub struct LogCommand {
    /// Muscle group (back_biceps_shoulders, chest_triceps, legs)
    pub group: String,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,
}

impl LogCommand {
    pub async fn run(&self, store: &LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        let group = MuscleGroup::from_str(&self.group)?;
        let date = resolve_date(self.date.as_deref())?;

        let mut log = store.load_log().await;
        let previous = log.get(&date).map(str::to_string);
        log.record(date.clone(), group);
        store.save_log(&log).await;

        match previous {
            Some(prev) if prev != group.key() => println!(
                "Logged {} on {} (was {})",
                group.label(),
                date,
                display_label(&prev)
            ),
            _ => println!("Logged {} on {}", group.label(), date),
        }
        Ok(())
    }
}

/// Remove the entry for a day
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Date (YYYY-MM-DD)
    #[arg(long, short)]
    pub date: String,
}

impl RemoveCommand {
    pub async fn run(&self, store: &LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        let date = resolve_date(Some(self.date.as_str()))?;

        let mut log = store.load_log().await;
        match log.remove(&date) {
            Some(key) => {
                store.save_log(&log).await;
                println!("Removed {} on {}", display_label(&key), date);
                Ok(())
            }
            None => Err(format!("No workout logged on {}", date).into()),
        }
    }
}

/// Show logged workouts, newest first
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl HistoryCommand {
    pub async fn run(&self, store: &LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        let log = store.load_log().await;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&history_json(&log))?);
            }
            OutputFormat::Text => {
                if log.is_empty() {
                    println!("No workouts logged yet.");
                    return Ok(());
                }

                println!("Workout History");
                println!("===============\n");
                for (date, key) in log.entries_desc() {
                    println!("{}  {}", date, display_label(key));
                }
                println!();
                println!("{} workout(s)", log.len());
            }
        }
        Ok(())
    }
}

/// Prints the available muscle groups.
pub fn print_groups() {
    for group in MuscleGroup::ALL {
        println!("{:<24} {}", group.key(), group.label());
    }
}

/// Parses a `YYYY-MM-DD` date, defaulting to today, and returns it normalized.
pub fn resolve_date(date: Option<&str>) -> Result<String, String> {
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", s))?,
        None => Local::now().date_naive(),
    };
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Label for a stored key; unknown keys are shown as-is.
fn display_label(key: &str) -> &str {
    MuscleGroup::label_for_key(key).unwrap_or(key)
}

fn history_json(log: &WorkoutLog) -> serde_json::Value {
    log.entries_desc()
        .map(|(date, key)| {
            serde_json::json!({
                "date": date,
                "group": key,
                "label": display_label(key),
            })
        })
        .collect()
}
