use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Day::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s))
    }
}

impl From<chrono::Weekday> for Day {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Day::Monday,
            chrono::Weekday::Tue => Day::Tuesday,
            chrono::Weekday::Wed => Day::Wednesday,
            chrono::Weekday::Thu => Day::Thursday,
            chrono::Weekday::Fri => Day::Friday,
            chrono::Weekday::Sat => Day::Saturday,
            chrono::Weekday::Sun => Day::Sunday,
        }
    }
}

/// One exercise entry of a schedule day, as the user configured it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
}

impl FromSqliteRow for PlanExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            rest_seconds: row.get("rest_seconds")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub muscle: String,
    pub exercises: Vec<PlanExercise>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekEntry {
    pub day: Day,
    #[serde(flatten)]
    pub schedule: DaySchedule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanExercise {
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMuscle {
    pub muscle: String,
}

/// Reject set/rep targets the session engine cannot run.
pub fn validate_targets(sets: u32, reps: u32) -> Result<(), String> {
    if sets < 1 {
        return Err("sets must be at least 1".to_string());
    }
    if reps < 1 {
        return Err("reps must be at least 1".to_string());
    }
    Ok(())
}
