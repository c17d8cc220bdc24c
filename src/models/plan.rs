use serde::{Deserialize, Serialize};

/// A plan exercise joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedExercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    pub calories_per_set: f64,
    pub nominal_duration: u32,
    pub image: String,
}

/// The frozen exercise list a session runs through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub label: String,
    pub exercises: Vec<EnrichedExercise>,
}

impl WorkoutPlan {
    pub fn is_startable(&self) -> bool {
        !self.exercises.is_empty()
    }
}
