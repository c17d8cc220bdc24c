use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitpulse::config::Config;
use fitpulse::db;
use fitpulse::engine::SessionEngine;
use fitpulse::handlers::{health, history, recommendations, schedule, session};
use fitpulse::migrations::run_migrations;
use fitpulse::recommendation::RecommendationClient;
use fitpulse::repositories::{
    HistoryRepository, PendingRepository, RecommendationRepository, ScheduleRepository,
};
use fitpulse::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitpulse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database: {}", config.database_url);
    let pool = db::create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    // Create repositories
    let schedule_repo = ScheduleRepository::new(pool.clone());
    let history_repo = HistoryRepository::new(pool.clone());
    let pending_repo = PendingRepository::new(pool.clone());
    let recommendation_repo = RecommendationRepository::new(pool.clone());

    let engine = SessionEngine::new(
        Arc::new(history_repo.clone()),
        Arc::new(pending_repo),
        config.timing,
    );
    tracing::info!(
        prep_seconds = config.timing.prep_seconds,
        work_floor_seconds = config.timing.work_floor_seconds,
        settle_delay_ms = config.timing.settle_delay.as_millis() as u64,
        "Session engine ready"
    );

    let client = RecommendationClient::new(&config.recommender_url, config.recommender_timeout)?;
    tracing::info!("Recommendation service at {}", config.recommender_url);

    // Create handler states
    let health_state = health::HealthState {
        engine: engine.clone(),
    };
    let schedule_state = schedule::ScheduleState {
        schedule_repo: schedule_repo.clone(),
    };
    let history_state = history::HistoryState {
        history_repo: history_repo.clone(),
    };
    let workout_state = session::WorkoutState {
        engine,
        schedule_repo: schedule_repo.clone(),
    };
    let recommendations_state = recommendations::RecommendationsState {
        client,
        history_repo,
        schedule_repo,
        recommendation_repo,
    };

    let app = routes::create_router(
        health_state,
        schedule_state,
        history_state,
        workout_state,
        recommendations_state,
    );

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
