use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use crate::db::DbPool;
use crate::engine::HistoryStore;
use crate::error::{AppError, Result};
use crate::models::{CompletedWorkoutRecord, FromSqliteRow, WeeklySummary};

#[derive(Clone)]
pub struct HistoryRepository {
    pool: DbPool,
}

impl HistoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, record: &CompletedWorkoutRecord) -> Result<()> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let record = record.clone();
        let exercises = serde_json::to_string(&record.exercises)?;
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workout_history
                 (id, user_id, label, plan_label, completed_at, total_duration_seconds, calories_burned, exercises, partial)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id,
                    user_id,
                    record.label,
                    record.plan_label,
                    record.completed_at,
                    record.total_duration_seconds as i64,
                    record.calories_burned,
                    exercises,
                    record.partial,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// All records of the user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<CompletedWorkoutRecord>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_history WHERE user_id = ?1 ORDER BY completed_at DESC",
            )?;
            let records = stmt
                .query_map([&user_id], CompletedWorkoutRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletedWorkoutRecord>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_history WHERE user_id = ?1 AND completed_at > ?2
                 ORDER BY completed_at DESC",
            )?;
            let records = stmt
                .query_map(params![user_id, since], CompletedWorkoutRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn latest_completed_at(&self, user_id: &str) -> Result<Option<DateTime<Utc>>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let latest: Option<DateTime<Utc>> = conn.query_row(
                "SELECT MAX(completed_at) FROM workout_history WHERE user_id = ?1",
                [&user_id],
                |row| row.get(0),
            )?;
            Ok(latest)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn clear(&self, user_id: &str) -> Result<usize> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let removed =
                conn.execute("DELETE FROM workout_history WHERE user_id = ?1", [&user_id])?;
            Ok(removed)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn summary(&self, user_id: &str, now: DateTime<Utc>) -> Result<WeeklySummary> {
        let recent = self.find_since(user_id, now - Duration::days(7)).await?;
        let mut summary = WeeklySummary::from_records(&recent, now);
        // The window only covers a week; the last workout may be older.
        if summary.days_since_last_workout.is_none() {
            summary.days_since_last_workout = self
                .latest_completed_at(user_id)
                .await?
                .map(|last| (now - last).num_days());
        }
        Ok(summary)
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, user_id: &str, record: &CompletedWorkoutRecord) -> Result<()> {
        self.create(user_id, record).await
    }
}
