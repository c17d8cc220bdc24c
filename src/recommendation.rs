//! Client for the external AI recommendation service.
//!
//! Everything the service returns is treated as untrusted input and checked
//! before it reaches storage or the session engine.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::error::{AppError, Result};
use crate::models::schedule::validate_targets;
use crate::models::{Day, DaySchedule, PlanExercise};

pub const MIN_DAYS_PER_WEEK: u32 = 3;
pub const MAX_DAYS_PER_WEEK: u32 = 6;

#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct RecommendRequest<'a> {
    history: Vec<HistoryEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub workout: String,
    /// Suggested length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Recommendation {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.workout.trim().is_empty() {
            return Err("recommendation has no workout name".to_string());
        }
        if self.duration == 0 {
            return Err("recommendation has no duration".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekPreferences {
    pub days_per_week: u32,
    pub goal: String,
}

impl WeekPreferences {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(MIN_DAYS_PER_WEEK..=MAX_DAYS_PER_WEEK).contains(&self.days_per_week) {
            return Err(format!(
                "days_per_week must be between {} and {}",
                MIN_DAYS_PER_WEEK, MAX_DAYS_PER_WEEK
            ));
        }
        if self.goal.trim().is_empty() {
            return Err("goal is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(alias = "rest_seconds")]
    pub rest: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDay {
    #[serde(default)]
    pub muscle: String,
    #[serde(default)]
    pub exercises: Vec<GeneratedExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub schedule: BTreeMap<String, GeneratedDay>,
}

impl WeekPlan {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.schedule.is_empty() {
            return Err("generated week has no training days".to_string());
        }

        for (key, day) in &self.schedule {
            Day::parse(key).ok_or_else(|| format!("unknown weekday '{}'", key))?;
            if day.exercises.is_empty() {
                return Err(format!("{} has no exercises", key));
            }
            for exercise in &day.exercises {
                if catalog::find(&exercise.name).is_none() {
                    return Err(format!("unknown exercise '{}' on {}", exercise.name, key));
                }
                validate_targets(exercise.sets, exercise.reps)
                    .map_err(|e| format!("{} on {}: {}", exercise.name, key, e))?;
            }
        }
        Ok(())
    }

    /// Convert into schedule days with fresh exercise ids. Call `validate`
    /// first; days that do not parse are skipped.
    pub fn into_schedule(self) -> Vec<(Day, DaySchedule)> {
        self.schedule
            .into_iter()
            .filter_map(|(key, day)| {
                let weekday = Day::parse(&key)?;
                let exercises = day
                    .exercises
                    .into_iter()
                    .map(|exercise| PlanExercise {
                        id: Uuid::new_v4().to_string(),
                        name: exercise.name,
                        sets: exercise.sets,
                        reps: exercise.reps,
                        rest_seconds: exercise.rest,
                    })
                    .collect();
                Some((
                    weekday,
                    DaySchedule {
                        muscle: day.muscle,
                        exercises,
                    },
                ))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Clone)]
pub struct RecommendationClient {
    client: Client,
    base_url: String,
}

impl RecommendationClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask for the next workout given past plan labels.
    /// Ask for the next workout. `history` holds plan labels oldest first;
    /// the service reads the tail as the most recent sessions.
    pub async fn recommend_workout(
        &self,
        history: &[String],
        level: Option<&str>,
    ) -> Result<Recommendation> {
        if history.is_empty() {
            return Err(AppError::BadRequest(
                "Complete a workout before asking for a recommendation".to_string(),
            ));
        }

        let recommendation: Recommendation = self
            .post(
                "/recommend-workout",
                &RecommendRequest {
                    history: history
                        .iter()
                        .map(|name| HistoryEntry { name })
                        .collect(),
                    level,
                },
            )
            .await?;
        recommendation.validate().map_err(AppError::Upstream)?;

        tracing::info!(
            workout = %recommendation.workout,
            duration = recommendation.duration,
            "Received workout recommendation"
        );
        Ok(recommendation)
    }

    pub async fn generate_week(&self, preferences: &WeekPreferences) -> Result<WeekPlan> {
        preferences.validate().map_err(AppError::BadRequest)?;

        let plan: WeekPlan = self.post("/generate-week", preferences).await?;
        plan.validate().map_err(AppError::Upstream)?;

        tracing::info!(days = plan.schedule.len(), goal = %preferences.goal, "Generated weekly plan");
        Ok(plan)
    }

    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String> {
        if message.trim().is_empty() {
            return Err(AppError::BadRequest("Message is empty".to_string()));
        }

        let response: ChatResponse = self.post("/chat", &ChatRequest { message, history }).await?;
        if response.reply.trim().is_empty() {
            return Err(AppError::Upstream("empty chat reply".to_string()));
        }
        Ok(response.reply)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(upstream_status(status, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed reply from {}: {}", path, e)))
    }
}

fn upstream_status(status: StatusCode, message: String) -> AppError {
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        message
    };
    AppError::Upstream(format!("{} ({})", message, status.as_u16()))
}
