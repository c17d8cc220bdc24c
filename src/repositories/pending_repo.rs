use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::db::DbPool;
use crate::engine::PendingStore;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, PendingSnapshot};

#[derive(Clone)]
pub struct PendingRepository {
    pool: DbPool,
}

impl PendingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<PendingSnapshot>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM pending_workouts WHERE user_id = ?1")?;
            let snapshot = stmt
                .query_row([&user_id], PendingSnapshot::from_row)
                .optional()?;
            Ok(snapshot)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Store the snapshot, overwriting any earlier one.
    pub async fn upsert(&self, user_id: &str, snapshot: &PendingSnapshot) -> Result<()> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let snapshot = snapshot.clone();
        let plan = serde_json::to_string(&snapshot.plan)?;
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT OR REPLACE INTO pending_workouts
                 (user_id, plan, exercise_index, set_number, started_at, paused_at, calories_accrued)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user_id,
                    plan,
                    snapshot.exercise_index as i64,
                    snapshot.set_number,
                    snapshot.started_at,
                    snapshot.paused_at,
                    snapshot.calories_accrued,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn take_by_user(&self, user_id: &str) -> Result<Option<PendingSnapshot>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            let snapshot = tx
                .query_row(
                    "SELECT * FROM pending_workouts WHERE user_id = ?1",
                    [&user_id],
                    PendingSnapshot::from_row,
                )
                .optional()?;
            if snapshot.is_some() {
                tx.execute("DELETE FROM pending_workouts WHERE user_id = ?1", [&user_id])?;
            }
            tx.commit()?;
            Ok(snapshot)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn delete_by_user(&self, user_id: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let removed =
                conn.execute("DELETE FROM pending_workouts WHERE user_id = ?1", [&user_id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl PendingStore for PendingRepository {
    async fn load(&self, user_id: &str) -> Result<Option<PendingSnapshot>> {
        self.find_by_user(user_id).await
    }

    async fn save(&self, user_id: &str, snapshot: &PendingSnapshot) -> Result<()> {
        self.upsert(user_id, snapshot).await
    }

    async fn take(&self, user_id: &str) -> Result<Option<PendingSnapshot>> {
        self.take_by_user(user_id).await
    }

    async fn clear(&self, user_id: &str) -> Result<bool> {
        self.delete_by_user(user_id).await
    }
}
