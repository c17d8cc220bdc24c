use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{FromSqliteRow, StoredRecommendation};
use crate::recommendation::Recommendation;

#[derive(Clone)]
pub struct RecommendationRepository {
    pool: DbPool,
}

impl RecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        recommendation: &Recommendation,
    ) -> Result<StoredRecommendation> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let stored = StoredRecommendation {
            id: Uuid::new_v4().to_string(),
            workout: recommendation.workout.clone(),
            duration: recommendation.duration,
            intensity: recommendation.intensity.clone(),
            reason: recommendation.reason.clone(),
            created_at: Utc::now(),
        };

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO recommendations (id, user_id, workout, duration, intensity, reason, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    stored.id,
                    user_id,
                    stored.workout,
                    stored.duration,
                    stored.intensity,
                    stored.reason,
                    stored.created_at,
                ],
            )?;
            Ok(stored)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_latest(&self, user_id: &str) -> Result<Option<StoredRecommendation>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT * FROM recommendations WHERE user_id = ?1
                 ORDER BY created_at DESC LIMIT 1",
            )?;
            let latest = stmt
                .query_row([&user_id], StoredRecommendation::from_row)
                .optional()?;
            Ok(latest)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
