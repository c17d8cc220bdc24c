use chrono::{DateTime, Datelike, Duration, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::from_row::json_column;
use super::{Day, EnrichedExercise, FromSqliteRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedWorkoutRecord {
    pub id: String,
    pub label: String,
    pub plan_label: String,
    pub completed_at: DateTime<Utc>,
    pub total_duration_seconds: u64,
    pub calories_burned: f64,
    pub exercises: Vec<EnrichedExercise>,
    pub partial: bool,
}

impl FromSqliteRow for CompletedWorkoutRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            label: row.get("label")?,
            plan_label: row.get("plan_label")?,
            completed_at: row.get("completed_at")?,
            total_duration_seconds: row.get("total_duration_seconds")?,
            calories_burned: row.get("calories_burned")?,
            exercises: json_column(row, "exercises")?,
            partial: row.get("partial")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMinutes {
    pub day: Day,
    pub minutes: u64,
}

/// Dashboard figures over the trailing seven days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub workouts: usize,
    pub calories: f64,
    pub average_minutes: u64,
    /// Seven entries, oldest weekday first, ending with today.
    pub minutes_by_weekday: Vec<DayMinutes>,
    pub days_since_last_workout: Option<i64>,
}

impl WeeklySummary {
    pub fn from_records(records: &[CompletedWorkoutRecord], now: DateTime<Utc>) -> Self {
        let window_start = now - Duration::days(7);
        let recent: Vec<&CompletedWorkoutRecord> = records
            .iter()
            .filter(|r| r.completed_at > window_start)
            .collect();

        let calories = recent.iter().map(|r| r.calories_burned).sum();
        let total_seconds: u64 = recent.iter().map(|r| r.total_duration_seconds).sum();
        let average_minutes = if recent.is_empty() {
            0
        } else {
            (total_seconds as f64 / (60.0 * recent.len() as f64)).round() as u64
        };

        let minutes_by_weekday = (0..7)
            .rev()
            .map(|offset| {
                let weekday = (now - Duration::days(offset)).weekday();
                let minutes = recent
                    .iter()
                    .filter(|r| r.completed_at.weekday() == weekday)
                    .map(|r| (r.total_duration_seconds as f64 / 60.0).round() as u64)
                    .sum();
                DayMinutes {
                    day: weekday.into(),
                    minutes,
                }
            })
            .collect::<Vec<_>>();

        let days_since_last_workout = records
            .iter()
            .map(|r| r.completed_at)
            .max()
            .map(|last| (now - last).num_days());

        Self {
            workouts: recent.len(),
            calories,
            average_minutes,
            minutes_by_weekday,
            days_since_last_workout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(completed_at: DateTime<Utc>, seconds: u64, calories: f64) -> CompletedWorkoutRecord {
        CompletedWorkoutRecord {
            id: "r".to_string(),
            label: "Workout".to_string(),
            plan_label: "Chest".to_string(),
            completed_at,
            total_duration_seconds: seconds,
            calories_burned: calories,
            exercises: Vec::new(),
            partial: false,
        }
    }

    #[test]
    fn test_summary_of_empty_history() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let summary = WeeklySummary::from_records(&[], now);

        assert_eq!(summary.workouts, 0);
        assert_eq!(summary.calories, 0.0);
        assert_eq!(summary.average_minutes, 0);
        assert_eq!(summary.days_since_last_workout, None);
        assert_eq!(summary.minutes_by_weekday.len(), 7);
        assert!(summary.minutes_by_weekday.iter().all(|d| d.minutes == 0));
    }

    #[test]
    fn test_summary_ignores_records_older_than_a_week() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let records = vec![
            record(now - Duration::days(1), 1800, 120.0),
            record(now - Duration::days(3), 3600, 200.0),
            record(now - Duration::days(9), 3600, 500.0),
        ];

        let summary = WeeklySummary::from_records(&records, now);

        assert_eq!(summary.workouts, 2);
        assert_eq!(summary.calories, 320.0);
        // (1800 + 3600) / (60 * 2) = 45
        assert_eq!(summary.average_minutes, 45);
        assert_eq!(summary.days_since_last_workout, Some(1));
    }

    #[test]
    fn test_summary_buckets_minutes_by_weekday_ending_today() {
        // 2026-10-17 is a Saturday
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let records = vec![
            record(now - Duration::hours(2), 600, 10.0),
            record(now - Duration::days(1), 1200, 10.0),
        ];

        let summary = WeeklySummary::from_records(&records, now);
        let last = summary.minutes_by_weekday.last().unwrap();
        let previous = &summary.minutes_by_weekday[5];

        assert_eq!(last.day, Day::Saturday);
        assert_eq!(last.minutes, 10);
        assert_eq!(previous.day, Day::Friday);
        assert_eq!(previous.minutes, 20);
        assert_eq!(summary.minutes_by_weekday[0].day, Day::Sunday);
    }
}
