use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    CreatePlanExercise, Day, DaySchedule, PlanExercise, UpdateMuscle, UpdatePlanExercise,
    WeekEntry,
};
use crate::repositories::ScheduleRepository;

#[derive(Clone)]
pub struct ScheduleState {
    pub schedule_repo: ScheduleRepository,
}

pub(crate) fn parse_day(raw: &str) -> Result<Day> {
    Day::parse(raw).ok_or_else(|| AppError::BadRequest(format!("Unknown day: {}", raw)))
}

pub async fn week(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<WeekEntry>>> {
    let week = state.schedule_repo.get_week(&auth_user.id).await?;
    Ok(Json(week))
}

pub async fn show_day(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
    Path(day): Path<String>,
) -> Result<Json<DaySchedule>> {
    let day = parse_day(&day)?;
    let schedule = state.schedule_repo.get_day(&auth_user.id, day).await?;
    Ok(Json(schedule))
}

pub async fn set_muscle(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
    Path(day): Path<String>,
    Json(input): Json<UpdateMuscle>,
) -> Result<Json<DaySchedule>> {
    let day = parse_day(&day)?;
    let schedule = state
        .schedule_repo
        .set_muscle(&auth_user.id, day, &input.muscle)
        .await?;
    Ok(Json(schedule))
}

pub async fn add_exercise(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
    Path(day): Path<String>,
    Json(input): Json<CreatePlanExercise>,
) -> Result<(StatusCode, Json<PlanExercise>)> {
    let day = parse_day(&day)?;
    let exercise = state
        .schedule_repo
        .add_exercise(&auth_user.id, day, input)
        .await?;
    tracing::debug!(user_id = %auth_user.id, day = day.as_str(), exercise = %exercise.name, "Exercise added to schedule");
    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn update_exercise(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdatePlanExercise>,
) -> Result<Json<PlanExercise>> {
    let exercise = state
        .schedule_repo
        .update_exercise(&auth_user.id, &id, input)
        .await?;
    Ok(Json(exercise))
}

pub async fn remove_exercise(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if !state.schedule_repo.remove_exercise(&auth_user.id, &id).await? {
        return Err(AppError::NotFound("Exercise not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_day(
    State(state): State<ScheduleState>,
    auth_user: AuthUser,
    Path(day): Path<String>,
) -> Result<Json<Value>> {
    let day = parse_day(&day)?;
    let removed = state.schedule_repo.clear_day(&auth_user.id, day).await?;
    Ok(Json(json!({ "removed": removed })))
}
