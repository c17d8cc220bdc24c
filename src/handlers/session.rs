//! Active session and pending workout endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::schedule::parse_day;
use crate::catalog;
use crate::engine::{CommandOutcome, SessionEngine, SessionView};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Day, PendingSnapshot};
use crate::repositories::ScheduleRepository;

#[derive(Clone)]
pub struct WorkoutState {
    pub engine: SessionEngine,
    pub schedule_repo: ScheduleRepository,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    /// Defaults to today.
    pub day: Option<String>,
    /// Caller confirmed that a saved pending workout may be discarded.
    #[serde(rename = "override", default)]
    pub discard_pending: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuickStartRequest {
    pub exercise: String,
    #[serde(rename = "override", default)]
    pub discard_pending: bool,
}

pub async fn current(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<SessionView>> {
    state
        .engine
        .current(&auth_user.id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No active session".to_string()))
}

pub async fn start(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
    Json(input): Json<StartRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let day = match input.day.as_deref() {
        Some(raw) => parse_day(raw)?,
        None => Day::from(Utc::now().weekday()),
    };

    let plan = state.schedule_repo.plan_for_day(&auth_user.id, day).await?;
    let view = state
        .engine
        .start(&auth_user.id, plan, input.discard_pending)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn quick_start(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
    Json(input): Json<QuickStartRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let plan = catalog::quick_start_plan(&input.exercise)?;
    let view = state
        .engine
        .start(&auth_user.id, plan, input.discard_pending)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn finish_set(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<CommandOutcome>> {
    Ok(Json(state.engine.finish_set(&auth_user.id).await?))
}

pub async fn skip_exercise(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<CommandOutcome>> {
    Ok(Json(state.engine.skip_exercise(&auth_user.id).await?))
}

pub async fn skip_phase(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<CommandOutcome>> {
    Ok(Json(state.engine.skip_phase(&auth_user.id).await?))
}

pub async fn end_early(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<CommandOutcome>> {
    Ok(Json(state.engine.end_early(&auth_user.id).await?))
}

pub async fn retry_save(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<CommandOutcome>> {
    Ok(Json(state.engine.retry_save(&auth_user.id).await?))
}

pub async fn abandon(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<CommandOutcome>> {
    Ok(Json(state.engine.abandon(&auth_user.id).await?))
}

pub async fn pending(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<PendingSnapshot>> {
    state
        .engine
        .pending(&auth_user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No pending workout".to_string()))
}

pub async fn resume(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<(StatusCode, Json<SessionView>)> {
    let view = state.engine.resume(&auth_user.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn discard_pending(
    State(state): State<WorkoutState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let discarded = state.engine.discard_pending(&auth_user.id).await?;
    Ok(Json(json!({ "discarded": discarded })))
}
