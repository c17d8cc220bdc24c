mod common;

use axum::http::{Method, StatusCode};
use common::{send, USER};
use fitpulse::models::Day;
use serde_json::json;

#[tokio::test]
async fn test_schedule_requires_user_header() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(&app, Method::GET, "/schedule", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_week_lists_every_day() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(&app, Method::GET, "/schedule", Some(USER), None).await;

    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["day"], "monday");
    assert_eq!(days[6]["day"], "sunday");
    assert_eq!(days[0]["muscle"], "");
    assert!(days[0]["exercises"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_exercise_appends_to_day() {
    let app = common::create_test_app(common::setup_test_db());

    for name in ["Squats", "Lunges"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/schedule/monday/exercises",
            Some(USER),
            Some(json!({ "name": name, "sets": 3, "reps": 10, "rest_seconds": 60 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], name);
        assert!(!body["id"].as_str().unwrap().is_empty());
    }

    let (status, body) = send(&app, Method::GET, "/schedule/Monday", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    let exercises = body["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0]["name"], "Squats");
    assert_eq!(exercises[1]["name"], "Lunges");
}

#[tokio::test]
async fn test_add_unknown_exercise_is_rejected() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(
        &app,
        Method::POST,
        "/schedule/monday/exercises",
        Some(USER),
        Some(json!({ "name": "Burpees", "sets": 3, "reps": 10, "rest_seconds": 60 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown exercise: Burpees");
}

#[tokio::test]
async fn test_add_exercise_with_zero_sets_is_rejected() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, _) = send(
        &app,
        Method::POST,
        "/schedule/monday/exercises",
        Some(USER),
        Some(json!({ "name": "Squats", "sets": 0, "reps": 10, "rest_seconds": 60 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_day_is_bad_request() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(&app, Method::GET, "/schedule/funday", Some(USER), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown day: funday");
}

#[tokio::test]
async fn test_update_and_remove_exercise() {
    let pool = common::setup_test_db();
    let exercise = common::create_test_exercise(&pool, USER, Day::Tuesday, "Plank", 2).await;
    let app = common::create_test_app(pool);

    let uri = format!("/schedule/exercises/{}", exercise.id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(USER),
        Some(json!({ "sets": 4, "reps": 1, "rest_seconds": 45 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sets"], 4);
    assert_eq!(body["rest_seconds"], 45);
    assert_eq!(body["name"], "Plank");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(USER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(USER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_cannot_edit_each_others_exercises() {
    let pool = common::setup_test_db();
    let exercise = common::create_test_exercise(&pool, USER, Day::Tuesday, "Plank", 2).await;
    let app = common::create_test_app(pool);

    let uri = format!("/schedule/exercises/{}", exercise.id);
    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some("intruder"),
        Some(json!({ "sets": 9, "reps": 9, "rest_seconds": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/schedule/tuesday", Some("intruder"), None).await;
    assert!(body["exercises"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_day_keeps_muscle_label() {
    let pool = common::setup_test_db();
    common::create_test_exercise(&pool, USER, Day::Friday, "Deadlifts", 5).await;
    common::create_test_exercise(&pool, USER, Day::Friday, "Leg Press", 3).await;
    let app = common::create_test_app(pool);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/schedule/friday/muscle",
        Some(USER),
        Some(json!({ "muscle": "Legs" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["muscle"], "Legs");

    let (status, body) = send(&app, Method::DELETE, "/schedule/friday", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, body) = send(&app, Method::GET, "/schedule/friday", Some(USER), None).await;
    assert_eq!(body["muscle"], "Legs");
    assert!(body["exercises"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_lists_exercises() {
    let app = common::create_test_app(common::setup_test_db());

    let (status, body) = send(&app, Method::GET, "/catalog", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let catalog = body.as_array().unwrap();
    assert_eq!(catalog.len(), 16);
    assert_eq!(catalog[0]["name"], "Push-ups");
    assert_eq!(catalog[0]["calories_per_set"], 5.0);
}
