use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::catalog;
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::schedule::validate_targets;
use crate::models::{
    CreatePlanExercise, Day, DaySchedule, FromSqliteRow, PlanExercise, UpdatePlanExercise,
    WeekEntry, WorkoutPlan,
};

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: DbPool,
}

impl ScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The configured day, or an empty day if nothing was ever saved for it.
    pub async fn get_day(&self, user_id: &str, day: Day) -> Result<DaySchedule> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            load_day(&conn, &user_id, day)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn get_week(&self, user_id: &str) -> Result<Vec<WeekEntry>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            Day::ALL
                .into_iter()
                .map(|day| {
                    Ok(WeekEntry {
                        day,
                        schedule: load_day(&conn, &user_id, day)?,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn set_muscle(&self, user_id: &str, day: Day, muscle: &str) -> Result<DaySchedule> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let muscle = muscle.trim().to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO schedule_days (user_id, day, muscle) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, day) DO UPDATE SET muscle = excluded.muscle",
                params![user_id, day.as_str(), muscle],
            )?;
            load_day(&conn, &user_id, day)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Append an exercise to the end of the day's list.
    pub async fn add_exercise(
        &self,
        user_id: &str,
        day: Day,
        input: CreatePlanExercise,
    ) -> Result<PlanExercise> {
        catalog::ensure_known(&input.name)?;
        validate_targets(input.sets, input.reps).map_err(AppError::Validation)?;

        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let exercise = PlanExercise {
                id: Uuid::new_v4().to_string(),
                name: input.name,
                sets: input.sets,
                reps: input.reps,
                rest_seconds: input.rest_seconds,
            };
            insert_exercise(&conn, &user_id, day, &exercise)?;
            Ok(exercise)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn update_exercise(
        &self,
        user_id: &str,
        id: &str,
        input: UpdatePlanExercise,
    ) -> Result<PlanExercise> {
        validate_targets(input.sets, input.reps).map_err(AppError::Validation)?;

        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let updated = conn.execute(
                "UPDATE schedule_exercises SET sets = ?1, reps = ?2, rest_seconds = ?3
                 WHERE id = ?4 AND user_id = ?5",
                params![input.sets, input.reps, input.rest_seconds, id, user_id],
            )?;
            if updated == 0 {
                return Err(AppError::NotFound("Exercise not found".to_string()));
            }

            let mut stmt = conn.prepare(
                "SELECT id, name, sets, reps, rest_seconds FROM schedule_exercises
                 WHERE id = ?1 AND user_id = ?2",
            )?;
            stmt.query_row(params![id, user_id], PlanExercise::from_row)
                .optional()?
                .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn remove_exercise(&self, user_id: &str, id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let removed = conn.execute(
                "DELETE FROM schedule_exercises WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Remove every exercise of the day. The muscle label is kept.
    pub async fn clear_day(&self, user_id: &str, day: Day) -> Result<usize> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let removed = conn.execute(
                "DELETE FROM schedule_exercises WHERE user_id = ?1 AND day = ?2",
                params![user_id, day.as_str()],
            )?;
            Ok(removed)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Overwrite the given days in one transaction. Days not listed are
    /// left as they are.
    pub async fn replace_week(&self, user_id: &str, days: Vec<(Day, DaySchedule)>) -> Result<()> {
        for (_, schedule) in &days {
            for exercise in &schedule.exercises {
                catalog::ensure_known(&exercise.name)?;
                validate_targets(exercise.sets, exercise.reps).map_err(AppError::Validation)?;
            }
        }

        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            for (day, schedule) in &days {
                tx.execute(
                    "INSERT INTO schedule_days (user_id, day, muscle) VALUES (?1, ?2, ?3)
                     ON CONFLICT(user_id, day) DO UPDATE SET muscle = excluded.muscle",
                    params![user_id, day.as_str(), schedule.muscle],
                )?;
                tx.execute(
                    "DELETE FROM schedule_exercises WHERE user_id = ?1 AND day = ?2",
                    params![user_id, day.as_str()],
                )?;
                for exercise in &schedule.exercises {
                    insert_exercise(&tx, &user_id, *day, exercise)?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Freeze the day into a runnable plan. The label is the muscle focus,
    /// or the weekday name when no focus is set.
    pub async fn plan_for_day(&self, user_id: &str, day: Day) -> Result<WorkoutPlan> {
        let schedule = self.get_day(user_id, day).await?;
        let label = if schedule.muscle.is_empty() {
            day.display_name().to_string()
        } else {
            schedule.muscle.clone()
        };

        Ok(WorkoutPlan {
            label,
            exercises: catalog::resolve_all(&schedule.exercises)?,
        })
    }
}

fn load_day(conn: &rusqlite::Connection, user_id: &str, day: Day) -> Result<DaySchedule> {
    let muscle: Option<String> = conn
        .query_row(
            "SELECT muscle FROM schedule_days WHERE user_id = ?1 AND day = ?2",
            params![user_id, day.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    let mut stmt = conn.prepare(
        "SELECT id, name, sets, reps, rest_seconds FROM schedule_exercises
         WHERE user_id = ?1 AND day = ?2 ORDER BY position",
    )?;
    let exercises = stmt
        .query_map(params![user_id, day.as_str()], PlanExercise::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(DaySchedule {
        muscle: muscle.unwrap_or_default(),
        exercises,
    })
}

fn insert_exercise(
    conn: &rusqlite::Connection,
    user_id: &str,
    day: Day,
    exercise: &PlanExercise,
) -> rusqlite::Result<()> {
    let position: i64 = conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM schedule_exercises
         WHERE user_id = ?1 AND day = ?2",
        params![user_id, day.as_str()],
        |row| row.get(0),
    )?;
    conn.execute(
        "INSERT INTO schedule_exercises (id, user_id, day, position, name, sets, reps, rest_seconds)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            exercise.id,
            user_id,
            day.as_str(),
            position,
            exercise.name,
            exercise.sets,
            exercise.reps,
            exercise.rest_seconds,
        ],
    )?;
    Ok(())
}
