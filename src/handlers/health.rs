use axum::{extract::State, Json};
use serde::Serialize;

use crate::engine::SessionEngine;
use crate::version::GIT_VERSION;

#[derive(Clone)]
pub struct HealthState {
    pub engine: SessionEngine,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    git_version: &'static str,
    active_sessions: usize,
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        git_version: GIT_VERSION,
        active_sessions: state.engine.active_count().await,
    })
}
