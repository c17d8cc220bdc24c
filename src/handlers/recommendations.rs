use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::StoredRecommendation;
use crate::recommendation::{ChatMessage, RecommendationClient, WeekPlan, WeekPreferences};
use crate::repositories::{HistoryRepository, RecommendationRepository, ScheduleRepository};

#[derive(Clone)]
pub struct RecommendationsState {
    pub client: RecommendationClient,
    pub history_repo: HistoryRepository,
    pub schedule_repo: ScheduleRepository,
    pub recommendation_repo: RecommendationRepository,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateWeekRequest {
    pub days_per_week: u32,
    pub goal: String,
    /// Write the generated week into the schedule.
    #[serde(default)]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateWeekResponse {
    pub plan: WeekPlan,
    pub applied: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn recommend(
    State(state): State<RecommendationsState>,
    auth_user: AuthUser,
    Json(input): Json<RecommendRequest>,
) -> Result<Json<StoredRecommendation>> {
    // Stored newest first; the service expects chronological order.
    let history: Vec<String> = state
        .history_repo
        .find_by_user(&auth_user.id)
        .await?
        .into_iter()
        .rev()
        .map(|record| record.plan_label)
        .collect();

    let recommendation = state
        .client
        .recommend_workout(&history, input.level.as_deref())
        .await?;
    let stored = state
        .recommendation_repo
        .create(&auth_user.id, &recommendation)
        .await?;
    Ok(Json(stored))
}

pub async fn latest(
    State(state): State<RecommendationsState>,
    auth_user: AuthUser,
) -> Result<Json<StoredRecommendation>> {
    state
        .recommendation_repo
        .find_latest(&auth_user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No recommendation yet".to_string()))
}

pub async fn generate_week(
    State(state): State<RecommendationsState>,
    auth_user: AuthUser,
    Json(input): Json<GenerateWeekRequest>,
) -> Result<Json<GenerateWeekResponse>> {
    let preferences = WeekPreferences {
        days_per_week: input.days_per_week,
        goal: input.goal,
    };
    let plan = state.client.generate_week(&preferences).await?;

    if input.apply {
        state
            .schedule_repo
            .replace_week(&auth_user.id, plan.clone().into_schedule())
            .await?;
        tracing::info!(user_id = %auth_user.id, days = plan.schedule.len(), "Generated week applied to schedule");
    }

    Ok(Json(GenerateWeekResponse {
        plan,
        applied: input.apply,
    }))
}

pub async fn chat(
    State(state): State<RecommendationsState>,
    _auth_user: AuthUser,
    Json(input): Json<ChatRequest>,
) -> Result<Json<ChatReply>> {
    let reply = state.client.chat(&input.message, &input.history).await?;
    Ok(Json(ChatReply { reply }))
}
