#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use fitpulse::db::{create_memory_pool, DbPool};
use fitpulse::engine::{SessionEngine, SessionTiming};
use fitpulse::handlers::{health, history, recommendations, schedule, session};
use fitpulse::migrations::run_migrations_for_tests;
use fitpulse::models::CreatePlanExercise;
use fitpulse::models::Day;
use fitpulse::recommendation::RecommendationClient;
use fitpulse::repositories::{
    HistoryRepository, PendingRepository, RecommendationRepository, ScheduleRepository,
};

pub const USER: &str = "user-1";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub struct TestApp {
    pub router: Router,
    pub engine: SessionEngine,
}

pub fn create_test_app(pool: DbPool) -> Router {
    // Nothing listens on the discard port; recommendation calls fail fast.
    create_test_app_with_recommender(pool, "http://127.0.0.1:9").router
}

pub fn create_test_app_with_recommender(pool: DbPool, recommender_url: &str) -> TestApp {
    let schedule_repo = ScheduleRepository::new(pool.clone());
    let history_repo = HistoryRepository::new(pool.clone());
    let pending_repo = PendingRepository::new(pool.clone());
    let recommendation_repo = RecommendationRepository::new(pool.clone());

    let engine = SessionEngine::new(
        Arc::new(history_repo.clone()),
        Arc::new(pending_repo),
        SessionTiming::default(),
    );
    let client = RecommendationClient::new(recommender_url, Duration::from_secs(5))
        .expect("Failed to build recommendation client");

    let router = fitpulse::routes::create_router(
        health::HealthState {
            engine: engine.clone(),
        },
        schedule::ScheduleState {
            schedule_repo: schedule_repo.clone(),
        },
        history::HistoryState {
            history_repo: history_repo.clone(),
        },
        session::WorkoutState {
            engine: engine.clone(),
            schedule_repo: schedule_repo.clone(),
        },
        recommendations::RecommendationsState {
            client,
            history_repo,
            schedule_repo,
            recommendation_repo,
        },
    );

    TestApp { router, engine }
}

/// Send a JSON request as `user` and return the status with the parsed body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn create_test_exercise(
    pool: &DbPool,
    user_id: &str,
    day: Day,
    name: &str,
    sets: u32,
) -> fitpulse::models::PlanExercise {
    let schedule_repo = ScheduleRepository::new(pool.clone());
    schedule_repo
        .add_exercise(
            user_id,
            day,
            CreatePlanExercise {
                name: name.to_string(),
                sets,
                reps: 10,
                rest_seconds: 30,
            },
        )
        .await
        .unwrap()
}
