use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::from_row::json_column;
use super::{FromSqliteRow, WorkoutPlan};

/// Saved progress of a session that was ended early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSnapshot {
    pub plan: WorkoutPlan,
    pub exercise_index: usize,
    pub set_number: u32,
    pub started_at: DateTime<Utc>,
    pub paused_at: DateTime<Utc>,
    pub calories_accrued: f64,
}

impl PendingSnapshot {
    /// Check that the saved position still points into the saved plan.
    pub fn validate(&self) -> Result<(), String> {
        let exercise = self.plan.exercises.get(self.exercise_index).ok_or_else(|| {
            format!(
                "exercise index {} is outside a plan of {} exercises",
                self.exercise_index,
                self.plan.exercises.len()
            )
        })?;

        if self.set_number < 1 || self.set_number > exercise.sets {
            return Err(format!(
                "set {} is outside 1..={} for {}",
                self.set_number, exercise.sets, exercise.name
            ));
        }

        Ok(())
    }
}

impl FromSqliteRow for PendingSnapshot {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            plan: json_column(row, "plan")?,
            exercise_index: row.get("exercise_index")?,
            set_number: row.get("set_number")?,
            started_at: row.get("started_at")?,
            paused_at: row.get("paused_at")?,
            calories_accrued: row.get("calories_accrued")?,
        })
    }
}
