//! Fallback Data Synthesizer.
//!
//! Produces wellness records with the same fields and ranges as live ones, so callers never
//! branch on where the data came from.

use crate::degraded::DataSource;
use crate::wellness::records::{
    average, GoalProgress, MoodEntry, SleepRecord, WellnessContext, WellnessGoal,
};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Longest synthetic history handed out in one response.
pub const MAX_SYNTHETIC_DAYS: u32 = 90;

/// Synthetic ids live far above anything the store hands out and are never persisted.
const SYNTHETIC_ID_BASE: u64 = 9_000_000_000;
static NEXT_SYNTHETIC_ID: AtomicU64 = AtomicU64::new(SYNTHETIC_ID_BASE);

const MOOD_TAG_PAIRS: [[&str; 2]; 5] = [
    ["happy", "energetic"],
    ["calm", "relaxed"],
    ["tired", "stressed"],
    ["focused", "productive"],
    ["anxious", "worried"],
];

const ACTIVITY_TAG_PAIRS: [[&str; 2]; 5] = [
    ["work", "meeting"],
    ["exercise", "outdoors"],
    ["relaxing", "socializing"],
    ["learning", "reading"],
    ["cooking", "cleaning"],
];

const WEATHER: [&str; 3] = ["sunny", "cloudy", "rainy"];

const DEFAULT_RECOMMENDATIONS: [&str; 3] = [
    "Take a short walk outside to boost your mood and energy levels.",
    "Try a 5-minute meditation to center yourself and reduce stress.",
    "Connect with a friend or family member - social connections improve wellbeing.",
];

const GENERAL_SUGGESTIONS: [&str; 3] = [
    "Start your day with a glass of water and a moment of mindfulness.",
    "Aim for at least 7-8 hours of sleep each night for optimal health.",
    "Take short breaks every hour to stretch and reset your focus.",
];
const EXERCISE_SUGGESTIONS: [&str; 3] = [
    "Even a 10-minute walk can boost your mood and energy levels.",
    "Mix cardio and strength training for a well-rounded fitness routine.",
    "Find activities you enjoy - you're more likely to stick with them.",
];
const NUTRITION_SUGGESTIONS: [&str; 3] = [
    "Eat a colorful variety of fruits and vegetables daily.",
    "Stay hydrated by drinking water throughout the day.",
    "Practice mindful eating by savoring each bite and avoiding distractions.",
];
const MENTAL_SUGGESTIONS: [&str; 3] = [
    "Practice deep breathing when feeling stressed or overwhelmed.",
    "Schedule regular screen-free time to reduce digital fatigue.",
    "Connect with friends or family members regularly for social well-being.",
];

/// Static suggestion table. Unknown categories resolve to `general`.
pub fn suggestions_for(category: &str) -> (&'static str, &'static [&'static str]) {
    match category.trim().to_ascii_lowercase().as_str() {
        "exercise" => ("exercise", &EXERCISE_SUGGESTIONS),
        "nutrition" => ("nutrition", &NUTRITION_SUGGESTIONS),
        "mental" => ("mental", &MENTAL_SUGGESTIONS),
        _ => ("general", &GENERAL_SUGGESTIONS),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Unique within the process lifetime.
    pub fn next_id(&self) -> u64 {
        NEXT_SYNTHETIC_ID.fetch_add(1, Ordering::Relaxed)
    }

    /// Id handed back for a mood log that could not be persisted.
    pub fn mood_log_id(&self) -> u64 {
        self.next_id()
    }

    pub fn default_recommendations(&self) -> Vec<String> {
        DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
    }

    pub fn mood_history(&self, days: u32) -> Vec<MoodEntry> {
        self.mood_history_at(Utc::now(), days)
    }

    /// Exactly `days` entries (capped), one per day, newest first starting at `now`.
    pub fn mood_history_at(&self, now: DateTime<Utc>, days: u32) -> Vec<MoodEntry> {
        let mut rng = rand::thread_rng();
        (0..days.min(MAX_SYNTHETIC_DAYS))
            .map(|i| MoodEntry {
                id: self.next_id(),
                timestamp: now - Duration::days(i as i64),
                mood_score: rng.gen_range(3..=9),
                mood_tags: pick_pair(&mut rng, &MOOD_TAG_PAIRS),
                activity_tags: pick_pair(&mut rng, &ACTIVITY_TAG_PAIRS),
                notes: String::new(),
                weather: WEATHER.choose(&mut rng).map(|w| w.to_string()),
                ai_suggestion: None,
            })
            .collect()
    }

    pub fn sleep_history(&self, days: u32) -> Vec<SleepRecord> {
        self.sleep_history_at(Utc::now(), days)
    }

    /// One night per day, newest first; each night ends on its day and lasts 6-9 hours.
    pub fn sleep_history_at(&self, now: DateTime<Utc>, days: u32) -> Vec<SleepRecord> {
        let mut rng = rand::thread_rng();
        (0..days.min(MAX_SYNTHETIC_DAYS))
            .map(|i| {
                let end_time = now - Duration::days(i as i64);
                let minutes = rng.gen_range(6 * 60..=9 * 60);
                SleepRecord {
                    id: self.next_id(),
                    start_time: end_time - Duration::minutes(minutes),
                    end_time,
                    quality: rng.gen_range(2..=5),
                    disruptions: rng.gen_range(0..=3),
                    notes: String::new(),
                }
            })
            .collect()
    }

    pub fn goals(&self) -> Vec<WellnessGoal> {
        let now = Utc::now();
        vec![
            WellnessGoal {
                id: self.next_id(),
                title: "Meditate daily".to_string(),
                category: "mental health".to_string(),
                target_date: now + Duration::days(30),
                progress: 40,
            },
            WellnessGoal {
                id: self.next_id(),
                title: "Run 5km".to_string(),
                category: "fitness".to_string(),
                target_date: now + Duration::days(60),
                progress: 25,
            },
        ]
    }

    pub fn context(&self, source: DataSource) -> WellnessContext {
        let recent_moods = self.mood_history(5);
        let sleep = self.sleep_history(7);
        WellnessContext {
            average_mood: average(recent_moods.iter().map(|m| m.mood_score as f64)),
            sleep_quality: average(sleep.iter().map(|s| s.quality as f64)),
            recent_moods,
            goals: self
                .goals()
                .into_iter()
                .map(|g| GoalProgress { title: g.title, progress: g.progress })
                .collect(),
            source,
        }
    }
}

fn pick_pair<R: Rng>(rng: &mut R, pairs: &[[&str; 2]]) -> Vec<String> {
    pairs
        .choose(rng)
        .map(|pair| pair.iter().map(|t| t.to_string()).collect())
        .unwrap_or_else(|| vec!["neutral".to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mood_history_matches_requested_days() {
        let synth = FallbackSynthesizer::new();
        let now = Utc::now();
        let entries = synth.mood_history_at(now, 10);
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].timestamp, now);
        for pair in entries.windows(2) {
            assert_eq!(pair[0].timestamp - pair[1].timestamp, Duration::days(1));
        }
        for e in &entries {
            assert!((1..=10).contains(&e.mood_score));
            assert!(!e.mood_tags.is_empty());
            assert!(!e.activity_tags.is_empty());
        }
    }

    #[test]
    fn history_is_capped() {
        let synth = FallbackSynthesizer::new();
        assert_eq!(synth.mood_history(365).len(), MAX_SYNTHETIC_DAYS as usize);
        assert!(synth.mood_history(0).is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let synth = FallbackSynthesizer::new();
        let ids: HashSet<u64> = synth.mood_history(50).iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn sleep_nights_are_well_formed() {
        for night in FallbackSynthesizer::new().sleep_history(14) {
            assert!(night.start_time < night.end_time);
            assert!((6.0..=9.0).contains(&night.hours()));
            assert!((1..=5).contains(&night.quality));
        }
    }

    #[test]
    fn unknown_suggestion_category_is_general() {
        let (name, items) = suggestions_for("astrology");
        assert_eq!(name, "general");
        assert_eq!(items.len(), 3);
        assert_eq!(suggestions_for("Mental").0, "mental");
    }
}
