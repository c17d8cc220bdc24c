use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize)]
pub struct StoredRecommendation {
    pub id: String,
    pub workout: String,
    pub duration: u32,
    pub intensity: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for StoredRecommendation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout: row.get("workout")?,
            duration: row.get("duration")?,
            intensity: row.get("intensity")?,
            reason: row.get("reason")?,
            created_at: row.get("created_at")?,
        })
    }
}
