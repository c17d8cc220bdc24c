use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::SessionTiming;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub recommender_url: String,
    pub recommender_timeout: Duration,
    pub timing: SessionTiming,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = SessionTiming::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:fitpulse.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3000),
            recommender_url: env::var("RECOMMENDER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string()),
            recommender_timeout: Duration::from_secs(parse_or("RECOMMENDER_TIMEOUT_SECS", 30)),
            timing: SessionTiming {
                prep_seconds: parse_or("PREP_SECONDS", defaults.prep_seconds),
                work_floor_seconds: parse_or("WORK_FLOOR_SECONDS", defaults.work_floor_seconds),
                settle_delay: Duration::from_millis(parse_or(
                    "SETTLE_DELAY_MS",
                    defaults.settle_delay.as_millis() as u64,
                )),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
