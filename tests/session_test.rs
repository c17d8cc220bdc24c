mod common;

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Utc};
use common::{send, USER};
use fitpulse::models::Day;
use serde_json::json;

#[tokio::test]
async fn test_session_routes_require_user_header() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, _) = send(&app, Method::POST, "/session/end", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_no_session_is_not_found() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, _) = send(&app, Method::GET, "/session", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/pending", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_empty_day_is_rejected() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(
        &app,
        Method::POST,
        "/session/start",
        Some(USER),
        Some(json!({ "day": "sunday" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Workout plan has no exercises");
}

#[tokio::test]
async fn test_start_scheduled_day() {
    let pool = common::setup_test_db();
    common::create_test_exercise(&pool, USER, Day::Monday, "Push-ups", 2).await;
    let app = common::create_test_app(pool);

    let (status, body) = send(
        &app,
        Method::POST,
        "/session/start",
        Some(USER),
        Some(json!({ "day": "monday" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "running");
    assert_eq!(body["plan_label"], "Monday");
    assert_eq!(body["exercise_name"], "Push-ups");
    assert_eq!(body["phase"], "PREP");
    assert_eq!(body["remaining_seconds"], 10);
    assert_eq!(body["set_number"], 1);
    assert_eq!(body["total_sets"], 2);

    let (status, body) = send(&app, Method::GET, "/session", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercise_name"], "Push-ups");

    let (status, _) = send(
        &app,
        Method::POST,
        "/session/start",
        Some(USER),
        Some(json!({ "day": "monday" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_start_defaults_to_today_and_uses_muscle_label() {
    let pool = common::setup_test_db();
    let today = Day::from(Utc::now().weekday());
    common::create_test_exercise(&pool, USER, today, "Bench Press", 3).await;
    fitpulse::repositories::ScheduleRepository::new(pool.clone())
        .set_muscle(USER, today, "Chest")
        .await
        .unwrap();
    let app = common::create_test_app(pool);

    let (status, body) = send(&app, Method::POST, "/session/start", Some(USER), Some(json!({}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["plan_label"], "Chest");
}

#[tokio::test]
async fn test_quick_start_unknown_exercise() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, _) = send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Burpees" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_early_then_resume() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Squats" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["plan_label"], "Quick Start: Squats");
    assert_eq!(body["total_sets"], 3);

    let (status, body) = send(&app, Method::POST, "/session/end", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "paused");
    assert_eq!(body["data"]["exercise_index"], 0);
    assert_eq!(body["data"]["set_number"], 1);
    assert_eq!(body["data"]["calories_accrued"], 0.0);

    // A second end has nothing to act on
    let (status, body) = send(&app, Method::POST, "/session/end", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "inactive");

    let (status, body) = send(&app, Method::GET, "/pending", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["label"], "Quick Start: Squats");

    let (status, body) = send(&app, Method::POST, "/pending/resume", Some(USER), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phase"], "PREP");
    assert_eq!(body["remaining_seconds"], 10);

    let (status, _) = send(&app, Method::GET, "/pending", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_over_pending_needs_override() {
    let app = common::create_test_app(common::setup_test_db());

    send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Plank" })),
    )
    .await;
    send(&app, Method::POST, "/session/end", Some(USER), None).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Cycling" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Cycling", "override": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["exercise_name"], "Cycling");

    let (status, _) = send(&app, Method::GET, "/pending", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_discard_pending() {
    let app = common::create_test_app(common::setup_test_db());

    send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Lunges" })),
    )
    .await;
    send(&app, Method::POST, "/session/end", Some(USER), None).await;

    let (status, body) = send(&app, Method::DELETE, "/pending", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["discarded"], true);

    let (_, body) = send(&app, Method::DELETE, "/pending", Some(USER), None).await;
    assert_eq!(body["discarded"], false);

    let (status, _) = send(&app, Method::POST, "/pending/resume", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_finish_set_outside_work_is_ignored() {
    let app = common::create_test_app(common::setup_test_db());

    send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Crunches" })),
    )
    .await;

    let (status, body) = send(&app, Method::POST, "/session/finish-set", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(body["data"]["phase"], "PREP");
}

#[tokio::test]
async fn test_abandon_session() {
    let app = common::create_test_app(common::setup_test_db());

    send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Crunches" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/session", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "abandoned");

    let (status, _) = send(&app, Method::GET, "/session", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/pending", Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_active_sessions() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
    assert!(body["git_version"].as_str().is_some());

    send(
        &app,
        Method::POST,
        "/session/quick-start",
        Some(USER),
        Some(json!({ "exercise": "Running" })),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(body["active_sessions"], 1);
}
