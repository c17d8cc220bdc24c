//! Static exercise reference data and the single place where plan entries
//! are joined with it.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{EnrichedExercise, PlanExercise, WorkoutPlan};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSpec {
    pub name: &'static str,
    pub calories_per_set: f64,
    /// Nominal work duration in seconds.
    pub nominal_duration: u32,
    pub image: &'static str,
}

const fn spec(
    name: &'static str,
    calories_per_set: f64,
    nominal_duration: u32,
    image: &'static str,
) -> ExerciseSpec {
    ExerciseSpec {
        name,
        calories_per_set,
        nominal_duration,
        image,
    }
}

pub const CATALOG: &[ExerciseSpec] = &[
    spec("Push-ups", 5.0, 45, "push.png"),
    spec("Pull-ups", 7.0, 50, "pull.png"),
    spec("Squats", 8.0, 60, "squats.png"),
    spec("Deadlifts", 12.0, 60, "deadlifts.png"),
    spec("Bench Press", 6.0, 50, "bench.png"),
    spec("Overhead Press", 5.0, 45, "overhead.png"),
    spec("Bicep Curls", 3.0, 40, "curls.png"),
    spec("Tricep Dips", 4.0, 40, "tricep.png"),
    spec("Lunges", 6.0, 60, "lunges.png"),
    spec("Plank", 2.0, 60, "plank.png"),
    spec("Crunches", 3.0, 45, "crunches.png"),
    spec("Leg Press", 9.0, 60, "leg.png"),
    spec("Running", 15.0, 300, "run.png"),
    spec("Cycling", 13.0, 300, "cyc.png"),
    spec("Battle rope", 15.0, 60, "rope.png"),
    spec("Box Jump", 13.0, 60, "box.png"),
];

pub const QUICK_START_SETS: u32 = 3;
pub const QUICK_START_REPS: u32 = 10;
pub const QUICK_START_REST_SECONDS: u32 = 60;

pub fn all() -> &'static [ExerciseSpec] {
    CATALOG
}

pub fn find(name: &str) -> Option<&'static ExerciseSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Outcome of joining one plan entry with the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(EnrichedExercise),
    Unknown(String),
}

pub fn resolve(exercise: &PlanExercise) -> Resolution {
    match find(&exercise.name) {
        Some(spec) => Resolution::Found(EnrichedExercise {
            id: exercise.id.clone(),
            name: exercise.name.clone(),
            sets: exercise.sets,
            reps: exercise.reps,
            rest_seconds: exercise.rest_seconds,
            calories_per_set: spec.calories_per_set,
            nominal_duration: spec.nominal_duration,
            image: spec.image.to_string(),
        }),
        None => Resolution::Unknown(exercise.name.clone()),
    }
}

/// Resolve every entry, failing on the first name the catalog does not know.
pub fn resolve_all(exercises: &[PlanExercise]) -> Result<Vec<EnrichedExercise>> {
    exercises
        .iter()
        .map(|exercise| match resolve(exercise) {
            Resolution::Found(enriched) => Ok(enriched),
            Resolution::Unknown(name) => {
                tracing::error!("Plan exercise {} has no catalog entry", name);
                Err(AppError::UnknownExercise(name))
            }
        })
        .collect()
}

/// Fail with `UnknownExercise` unless the catalog knows `name`.
pub fn ensure_known(name: &str) -> Result<&'static ExerciseSpec> {
    find(name).ok_or_else(|| {
        tracing::warn!("Rejected unknown exercise name: {}", name);
        AppError::UnknownExercise(name.to_string())
    })
}

/// Single-exercise plan with the fixed quick-start targets.
pub fn quick_start_plan(name: &str) -> Result<WorkoutPlan> {
    ensure_known(name)?;

    let entry = PlanExercise {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        sets: QUICK_START_SETS,
        reps: QUICK_START_REPS,
        rest_seconds: QUICK_START_REST_SECONDS,
    };

    Ok(WorkoutPlan {
        label: format!("Quick Start: {}", name),
        exercises: resolve_all(&[entry])?,
    })
}
