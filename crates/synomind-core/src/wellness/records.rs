//! Wellness domain records and request payloads. Synthetic records use the same types.

use crate::degraded::DataSource;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub mood_score: u8,
    pub mood_tags: Vec<String>,
    pub activity_tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub ai_suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepRecord {
    pub id: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub quality: u8,
    #[serde(default)]
    pub disruptions: u32,
    #[serde(default)]
    pub notes: String,
}

impl SleepRecord {
    pub fn hours(&self) -> f64 {
        (self.end_time - self.start_time).num_minutes() as f64 / 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessGoal {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub target_date: DateTime<Utc>,
    /// Percent complete, 0-100.
    #[serde(default)]
    pub progress: u8,
}

/// Incoming mood log. Fields are optional so missing ones can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodLogRequest {
    pub mood_score: Option<i64>,
    pub mood_tags: Option<Vec<String>>,
    pub activity_tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub energy_level: Option<i64>,
    #[serde(default)]
    pub stress_level: Option<i64>,
    #[serde(default)]
    pub weather: Option<String>,
}

/// A mood log that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidMoodLog {
    pub mood_score: u8,
    pub mood_tags: Vec<String>,
    pub activity_tags: Vec<String>,
    pub notes: String,
    pub weather: Option<String>,
}

impl MoodLogRequest {
    pub fn validate(self) -> CoreResult<ValidMoodLog> {
        let score = self.mood_score.ok_or_else(|| missing("moodScore"))?;
        let mood_tags = self.mood_tags.ok_or_else(|| missing("moodTags"))?;
        let activity_tags = self.activity_tags.ok_or_else(|| missing("activityTags"))?;

        if !(1..=10).contains(&score) {
            return Err(CoreError::validation("Mood score must be between 1 and 10"));
        }
        if let Some(energy) = self.energy_level {
            if !(1..=5).contains(&energy) {
                return Err(CoreError::validation("Energy level must be between 1 and 5"));
            }
        }
        if let Some(stress) = self.stress_level {
            if !(1..=5).contains(&stress) {
                return Err(CoreError::validation("Stress level must be between 1 and 5"));
            }
        }
        if let Some(hours) = self.sleep_hours {
            if !(0.0..=24.0).contains(&hours) {
                return Err(CoreError::validation("Sleep hours must be between 0 and 24"));
            }
        }

        Ok(ValidMoodLog {
            mood_score: score as u8,
            mood_tags: clean_tags(mood_tags),
            activity_tags: clean_tags(activity_tags),
            notes: self.notes.unwrap_or_default(),
            weather: self.weather.filter(|w| !w.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLogRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub quality: Option<i64>,
    #[serde(default)]
    pub disruptions: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SleepLogRequest {
    /// Validated record with `id` still unassigned (0).
    pub fn validate(self) -> CoreResult<SleepRecord> {
        let start_time = self.start_time.ok_or_else(|| missing("startTime"))?;
        let end_time = self.end_time.ok_or_else(|| missing("endTime"))?;
        let quality = self.quality.ok_or_else(|| missing("quality"))?;

        if start_time >= end_time {
            return Err(CoreError::validation("Sleep start time must be before end time"));
        }
        if !(1..=5).contains(&quality) {
            return Err(CoreError::validation("Sleep quality must be between 1 and 5"));
        }
        Ok(SleepRecord {
            id: 0,
            start_time,
            end_time,
            quality: quality as u8,
            disruptions: self.disruptions.unwrap_or(0),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    /// RFC 3339 timestamp or plain `YYYY-MM-DD`.
    pub target_date: Option<String>,
}

impl GoalRequest {
    /// Validated goal with `id` still unassigned (0) and zero progress.
    pub fn validate(self) -> CoreResult<WellnessGoal> {
        let title = non_blank(self.title).ok_or_else(|| missing("title"))?;
        let category = non_blank(self.category).ok_or_else(|| missing("category"))?;
        let raw_date = non_blank(self.target_date).ok_or_else(|| missing("targetDate"))?;
        let target_date = parse_target_date(&raw_date)
            .ok_or_else(|| CoreError::validation(format!("Invalid target date: {}", raw_date)))?;
        Ok(WellnessGoal {
            id: 0,
            title,
            category,
            target_date,
            progress: 0,
        })
    }
}

fn parse_target_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn missing(field: &str) -> CoreError {
    CoreError::validation(format!("Missing required field: {}", field))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTrends {
    /// Rounded to one decimal; 0 for an empty history.
    pub average_mood: f64,
}

impl MoodTrends {
    pub fn from_entries(entries: &[MoodEntry]) -> Self {
        Self { average_mood: average(entries.iter().map(|e| e.mood_score as f64)) }
    }
}

pub(crate) fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64 * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodLogged {
    pub mood_id: u64,
    pub recommendations: Vec<String>,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodHistory {
    pub data: Vec<MoodEntry>,
    pub trends: MoodTrends,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLogged {
    pub sleep_id: u64,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepHistory {
    pub data: Vec<SleepRecord>,
    pub average_quality: f64,
    pub average_hours: f64,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalList {
    pub goals: Vec<WellnessGoal>,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCreated {
    pub goal_id: u64,
    pub source: DataSource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    pub category: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub title: String,
    pub progress: u8,
}

/// Snapshot handed to SynoMind as prompt user data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessContext {
    pub recent_moods: Vec<MoodEntry>,
    pub average_mood: f64,
    pub sleep_quality: f64,
    pub goals: Vec<GoalProgress>,
    pub source: DataSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_log_reports_missing_field_by_name() {
        let err = MoodLogRequest { mood_score: Some(5), ..Default::default() }
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: moodTags");
    }

    #[test]
    fn mood_score_range_is_enforced() {
        let req = MoodLogRequest {
            mood_score: Some(11),
            mood_tags: Some(vec!["happy".into()]),
            activity_tags: Some(vec![]),
            ..Default::default()
        };
        assert!(req.validate().unwrap_err().is_validation());
    }

    #[test]
    fn stress_level_range_is_enforced() {
        let req = MoodLogRequest {
            mood_score: Some(6),
            mood_tags: Some(vec!["calm".into()]),
            activity_tags: Some(vec!["reading".into()]),
            stress_level: Some(0),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().to_string(), "Stress level must be between 1 and 5");
    }

    #[test]
    fn sleep_must_end_after_it_starts() {
        let now = Utc::now();
        let req = SleepLogRequest {
            start_time: Some(now),
            end_time: Some(now - chrono::Duration::hours(7)),
            quality: Some(4),
            ..Default::default()
        };
        assert!(req.validate().unwrap_err().is_validation());
    }

    #[test]
    fn goal_accepts_plain_date() {
        let goal = GoalRequest {
            title: Some("Cycle to work".into()),
            category: Some("fitness".into()),
            target_date: Some("2025-09-01".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(goal.target_date.date_naive(), NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average([7.0, 8.0, 8.0].into_iter()), 7.7);
        assert_eq!(average(std::iter::empty()), 0.0);
    }
}
