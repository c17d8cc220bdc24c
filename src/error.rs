use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Workout plan has no exercises")]
    EmptyPlan,

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("A workout session is already running")]
    SessionActive,

    #[error("An unfinished workout exists; discard it or confirm the override")]
    PendingWorkoutExists,

    #[error("Recommendation service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::EmptyPlan
            | AppError::UnknownExercise(_) => StatusCode::BAD_REQUEST,
            AppError::SessionActive | AppError::PendingWorkoutExists => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Text shown to the client. Server-side failures are logged in full
    /// and reported generically.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Pool(_) => {
                tracing::error!("{:?}", self);
                "Database error".to_string()
            }
            AppError::Serialization(_) | AppError::Internal(_) => {
                tracing::error!("{:?}", self);
                "Internal error".to_string()
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Validation(msg) => {
                msg.clone()
            }
            AppError::Upstream(msg) => {
                tracing::warn!("Recommendation service error: {}", msg);
                self.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
