use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{CompletedWorkoutRecord, WeeklySummary};
use crate::repositories::HistoryRepository;

#[derive(Clone)]
pub struct HistoryState {
    pub history_repo: HistoryRepository,
}

pub async fn list(
    State(state): State<HistoryState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<CompletedWorkoutRecord>>> {
    let records = state.history_repo.find_by_user(&auth_user.id).await?;
    Ok(Json(records))
}

pub async fn summary(
    State(state): State<HistoryState>,
    auth_user: AuthUser,
) -> Result<Json<WeeklySummary>> {
    let summary = state.history_repo.summary(&auth_user.id, Utc::now()).await?;
    Ok(Json(summary))
}

pub async fn clear(State(state): State<HistoryState>, auth_user: AuthUser) -> Result<Json<Value>> {
    let removed = state.history_repo.clear(&auth_user.id).await?;
    tracing::info!(user_id = %auth_user.id, removed, "Workout history cleared");
    Ok(Json(json!({ "removed": removed })))
}
