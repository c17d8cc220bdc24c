pub mod from_row;
pub mod history;
pub mod pending;
pub mod plan;
pub mod recommendation;
pub mod schedule;

pub use from_row::FromSqliteRow;
pub use history::{CompletedWorkoutRecord, DayMinutes, WeeklySummary};
pub use pending::PendingSnapshot;
pub use plan::{EnrichedExercise, WorkoutPlan};
pub use recommendation::StoredRecommendation;
pub use schedule::{
    CreatePlanExercise, Day, DaySchedule, PlanExercise, UpdateMuscle, UpdatePlanExercise,
    WeekEntry,
};
