//! Calorie and duration figures for finished and paused sessions.
//!
//! Sums are kept unrounded; callers round once when a value is persisted.

use chrono::{DateTime, Utc};

use crate::models::WorkoutPlan;

/// Calories for a session that ran every set of every exercise.
pub fn completed_calories(plan: &WorkoutPlan) -> f64 {
    plan.exercises
        .iter()
        .map(|exercise| f64::from(exercise.sets) * exercise.calories_per_set)
        .sum()
}

/// Calories credited when a session stops at `(exercise_index, set_number)`.
///
/// Exercises before `exercise_index` count in full; the exercise in progress
/// counts only the sets finished before `set_number`.
pub fn partial_calories(plan: &WorkoutPlan, exercise_index: usize, set_number: u32) -> f64 {
    let finished: f64 = plan
        .exercises
        .iter()
        .take(exercise_index)
        .map(|exercise| f64::from(exercise.sets) * exercise.calories_per_set)
        .sum();

    let in_progress = plan
        .exercises
        .get(exercise_index)
        .map(|exercise| f64::from(set_number.saturating_sub(1)) * exercise.calories_per_set)
        .unwrap_or(0.0);

    finished + in_progress
}

pub fn round_calories(calories: f64) -> f64 {
    calories.round().max(0.0)
}

/// Whole seconds between `started_at` and `now`, never negative.
pub fn duration_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - started_at).num_milliseconds().max(0);
    (millis as f64 / 1000.0).round() as u64
}

pub fn record_label(completed_at: DateTime<Utc>) -> String {
    format!("Workout - {}", completed_at.format("%b %-d, %Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrichedExercise;
    use chrono::{Duration, TimeZone};

    fn exercise(name: &str, sets: u32, calories_per_set: f64) -> EnrichedExercise {
        EnrichedExercise {
            id: name.to_string(),
            name: name.to_string(),
            sets,
            reps: 10,
            rest_seconds: 30,
            calories_per_set,
            nominal_duration: 45,
            image: String::new(),
        }
    }

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            label: "Mixed".to_string(),
            exercises: vec![
                exercise("Push-ups", 2, 5.0),
                exercise("Squats", 3, 8.0),
                exercise("Plank", 2, 2.5),
            ],
        }
    }

    #[test]
    fn test_completed_calories_sums_every_set() {
        // 2*5 + 3*8 + 2*2.5
        assert_eq!(completed_calories(&plan()), 39.0);
    }

    #[test]
    fn test_partial_calories_at_first_set_is_zero() {
        assert_eq!(partial_calories(&plan(), 0, 1), 0.0);
    }

    #[test]
    fn test_partial_calories_credits_finished_sets_only() {
        assert_eq!(partial_calories(&plan(), 0, 2), 5.0);
        // Push-ups complete, one set of squats done
        assert_eq!(partial_calories(&plan(), 1, 2), 18.0);
        // Push-ups and squats complete, one plank set done
        assert_eq!(partial_calories(&plan(), 2, 2), 36.5);
    }

    #[test]
    fn test_partial_calories_rounds_only_at_the_end() {
        let plan = WorkoutPlan {
            label: "Fractions".to_string(),
            exercises: vec![exercise("A", 1, 0.4), exercise("B", 1, 0.4), exercise("C", 2, 0.4)],
        };
        let raw = partial_calories(&plan, 2, 2);
        assert!((raw - 1.2).abs() < 1e-9);
        assert_eq!(round_calories(raw), 1.0);

        // Rounding each term first would give 0
        let per_term: f64 = [0.4_f64, 0.4, 0.4].iter().map(|c| c.round()).sum();
        assert_eq!(per_term, 0.0);
    }

    #[test]
    fn test_duration_rounds_to_whole_seconds() {
        let start = Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap();
        assert_eq!(duration_seconds(start, start + Duration::milliseconds(90_400)), 90);
        assert_eq!(duration_seconds(start, start + Duration::milliseconds(90_600)), 91);
    }

    #[test]
    fn test_duration_never_negative() {
        let start = Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap();
        assert_eq!(duration_seconds(start, start - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_record_label_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 18, 30, 0).unwrap();
        assert_eq!(record_label(at), "Workout - Mar 7, 2026");
    }
}
