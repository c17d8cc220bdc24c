use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{catalog, health, history, recommendations, schedule, session};

pub fn create_router(
    health_state: health::HealthState,
    schedule_state: schedule::ScheduleState,
    history_state: history::HistoryState,
    workout_state: session::WorkoutState,
    recommendations_state: recommendations::RecommendationsState,
) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .with_state(health_state)
        // Catalog
        .route("/catalog", get(catalog::list))
        // Schedule routes
        .route("/schedule", get(schedule::week))
        .route(
            "/schedule/{day}",
            get(schedule::show_day).delete(schedule::clear_day),
        )
        .route("/schedule/{day}/muscle", put(schedule::set_muscle))
        .route("/schedule/{day}/exercises", post(schedule::add_exercise))
        .route(
            "/schedule/exercises/{id}",
            put(schedule::update_exercise).delete(schedule::remove_exercise),
        )
        .with_state(schedule_state)
        // History routes
        .route("/history", get(history::list).delete(history::clear))
        .route("/history/summary", get(history::summary))
        .with_state(history_state)
        // Session routes
        .route("/session", get(session::current).delete(session::abandon))
        .route("/session/start", post(session::start))
        .route("/session/quick-start", post(session::quick_start))
        .route("/session/finish-set", post(session::finish_set))
        .route("/session/skip-exercise", post(session::skip_exercise))
        .route("/session/skip-phase", post(session::skip_phase))
        .route("/session/end", post(session::end_early))
        .route("/session/retry-save", post(session::retry_save))
        .route(
            "/pending",
            get(session::pending).delete(session::discard_pending),
        )
        .route("/pending/resume", post(session::resume))
        .with_state(workout_state)
        // Recommendation routes
        .route("/recommendations/workout", post(recommendations::recommend))
        .route("/recommendations/latest", get(recommendations::latest))
        .route("/recommendations/week", post(recommendations::generate_week))
        .route("/chat", post(recommendations::chat))
        .with_state(recommendations_state)
}
