use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accounting;
use crate::error::{AppError, Result};
use crate::models::{CompletedWorkoutRecord, EnrichedExercise, PendingSnapshot, WorkoutPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Prep,
    Work,
    Rest,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prep => "PREP",
            Phase::Work => "WORK",
            Phase::Rest => "REST",
        }
    }
}

/// Countdown lengths that are product settings rather than structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub prep_seconds: u32,
    pub work_floor_seconds: u32,
    /// Pause between a phase hitting zero and the next phase starting.
    pub settle_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            prep_seconds: 10,
            work_floor_seconds: 30,
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl SessionTiming {
    pub fn work_seconds(&self, exercise: &EnrichedExercise) -> u32 {
        exercise.nominal_duration.max(self.work_floor_seconds)
    }
}

/// Result of one second elapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Counting,
    PhaseComplete,
}

/// What follows a finished phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter {
        exercise_index: usize,
        set_number: u32,
        phase: Phase,
        remaining_seconds: u32,
    },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    Advanced,
    /// There is no next exercise; the caller must end the session early.
    EndEarly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    plan: WorkoutPlan,
    exercise_index: usize,
    set_number: u32,
    phase: Phase,
    remaining_seconds: u32,
    started_at: DateTime<Utc>,
}

impl SessionState {
    pub fn start(plan: WorkoutPlan, started_at: DateTime<Utc>, timing: &SessionTiming) -> Result<Self> {
        if !plan.is_startable() {
            return Err(AppError::EmptyPlan);
        }
        if let Some(bad) = plan.exercises.iter().find(|e| e.sets == 0) {
            return Err(AppError::Validation(format!("{} has no sets", bad.name)));
        }

        Ok(Self {
            plan,
            exercise_index: 0,
            set_number: 1,
            phase: Phase::Prep,
            remaining_seconds: timing.prep_seconds,
            started_at,
        })
    }

    /// Rebuild a session from a snapshot. Always re-enters a fresh PREP.
    pub fn resume(snapshot: PendingSnapshot, timing: &SessionTiming) -> Result<Self> {
        snapshot.validate().map_err(AppError::Validation)?;

        Ok(Self {
            plan: snapshot.plan,
            exercise_index: snapshot.exercise_index,
            set_number: snapshot.set_number,
            phase: Phase::Prep,
            remaining_seconds: timing.prep_seconds,
            started_at: snapshot.started_at,
        })
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Countdown value shown to the user; never below 1.
    pub fn display_seconds(&self) -> u32 {
        self.remaining_seconds.max(1)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_exercise(&self) -> &EnrichedExercise {
        // exercise_index is kept in bounds by every constructor and transition
        &self.plan.exercises[self.exercise_index]
    }

    pub fn phase_total_seconds(&self, timing: &SessionTiming) -> u32 {
        match self.phase {
            Phase::Prep => timing.prep_seconds,
            Phase::Work => timing.work_seconds(self.current_exercise()),
            Phase::Rest => self.current_exercise().rest_seconds,
        }
    }

    pub fn tick(&mut self) -> Tick {
        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            Tick::PhaseComplete
        } else {
            self.remaining_seconds -= 1;
            Tick::Counting
        }
    }

    pub fn next_transition(&self, timing: &SessionTiming) -> Transition {
        let exercise = self.current_exercise();

        match self.phase {
            Phase::Prep => Transition::Enter {
                exercise_index: self.exercise_index,
                set_number: self.set_number,
                phase: Phase::Work,
                remaining_seconds: timing.work_seconds(exercise),
            },
            Phase::Work => Transition::Enter {
                exercise_index: self.exercise_index,
                set_number: self.set_number,
                phase: Phase::Rest,
                remaining_seconds: exercise.rest_seconds,
            },
            Phase::Rest if self.set_number < exercise.sets => Transition::Enter {
                exercise_index: self.exercise_index,
                set_number: self.set_number + 1,
                phase: Phase::Prep,
                remaining_seconds: timing.prep_seconds,
            },
            Phase::Rest if self.exercise_index + 1 < self.plan.exercises.len() => {
                Transition::Enter {
                    exercise_index: self.exercise_index + 1,
                    set_number: 1,
                    phase: Phase::Prep,
                    remaining_seconds: timing.prep_seconds,
                }
            }
            Phase::Rest => Transition::Complete,
        }
    }

    /// Apply an `Enter` transition. `Complete` leaves the state untouched.
    pub fn apply(&mut self, transition: Transition) {
        if let Transition::Enter {
            exercise_index,
            set_number,
            phase,
            remaining_seconds,
        } = transition
        {
            self.exercise_index = exercise_index;
            self.set_number = set_number;
            self.phase = phase;
            self.remaining_seconds = remaining_seconds;
        }
    }

    /// Zero the WORK countdown so the next tick moves to REST.
    pub fn finish_set_early(&mut self) -> bool {
        if self.phase != Phase::Work {
            return false;
        }
        self.remaining_seconds = 0;
        true
    }

    /// Zero a PREP or REST countdown.
    pub fn skip_phase(&mut self) -> bool {
        if self.phase == Phase::Work {
            return false;
        }
        self.remaining_seconds = 0;
        true
    }

    /// Jump to PREP of the next exercise, dropping the current one's
    /// remaining sets.
    pub fn skip_exercise(&mut self, timing: &SessionTiming) -> SkipOutcome {
        if self.exercise_index + 1 >= self.plan.exercises.len() {
            return SkipOutcome::EndEarly;
        }

        self.apply(Transition::Enter {
            exercise_index: self.exercise_index + 1,
            set_number: 1,
            phase: Phase::Prep,
            remaining_seconds: timing.prep_seconds,
        });
        SkipOutcome::Advanced
    }

    pub fn calories_so_far(&self) -> f64 {
        accounting::partial_calories(&self.plan, self.exercise_index, self.set_number)
    }

    pub fn snapshot(&self, paused_at: DateTime<Utc>) -> PendingSnapshot {
        PendingSnapshot {
            plan: self.plan.clone(),
            exercise_index: self.exercise_index,
            set_number: self.set_number,
            started_at: self.started_at,
            paused_at,
            calories_accrued: accounting::round_calories(self.calories_so_far()),
        }
    }

    pub fn completed_record(&self, completed_at: DateTime<Utc>) -> CompletedWorkoutRecord {
        CompletedWorkoutRecord {
            id: Uuid::new_v4().to_string(),
            label: accounting::record_label(completed_at),
            plan_label: self.plan.label.clone(),
            completed_at,
            total_duration_seconds: accounting::duration_seconds(self.started_at, completed_at),
            calories_burned: accounting::round_calories(accounting::completed_calories(&self.plan)),
            exercises: self.plan.exercises.clone(),
            partial: false,
        }
    }
}
