//! Wellness Service: mood, sleep and goal tracking with SynoMind recommendations.
//!
//! Every read and write goes through [`DegradedMode::run`], so each operation answers with the
//! same payload shape whether the store is live, globally degraded, or failing for one request.
//! Validation always runs first and is never swallowed by the fallback.

pub mod records;
pub mod store;

use crate::conversation::GenerationRequest;
use crate::degraded::{DataSource, DegradedMode};
use crate::error::CoreResult;
use crate::generation::GenerationAdapter;
use crate::synth::{suggestions_for, FallbackSynthesizer};
use chrono::{Duration, Utc};
use records::{
    average, GoalCreated, GoalList, GoalProgress, GoalRequest, MoodEntry, MoodHistory, MoodLogRequest,
    MoodLogged, MoodTrends, SleepHistory, SleepLogRequest, SleepLogged, SleepRecord, Suggestions,
    ValidMoodLog, WellnessContext, WellnessGoal,
};
use std::sync::Arc;
use store::WellnessStore;

pub const DEFAULT_HISTORY_DAYS: u32 = 7;
pub const DEFAULT_HISTORY_LIMIT: usize = 30;
/// Longest look-back a live history query honours; larger `days` values are clamped.
pub const MAX_HISTORY_DAYS: u32 = 365;
const MAX_RECOMMENDATIONS: usize = 3;
const CONTEXT_MOODS: usize = 5;

const COACH_PROMPT: &str = "You are a wellness coach providing short, helpful recommendations.";

pub struct WellnessService {
    store: Arc<dyn WellnessStore>,
    degraded: Arc<DegradedMode>,
    generator: Arc<GenerationAdapter>,
    synth: FallbackSynthesizer,
}

impl WellnessService {
    pub fn new(
        store: Arc<dyn WellnessStore>,
        degraded: Arc<DegradedMode>,
        generator: Arc<GenerationAdapter>,
    ) -> Self {
        Self {
            store,
            degraded,
            generator,
            synth: FallbackSynthesizer::new(),
        }
    }

    pub async fn log_mood(&self, user: &str, request: MoodLogRequest) -> CoreResult<MoodLogged> {
        let mood = request.validate()?;

        let ai_recommendations = if self.degraded.is_degraded() {
            None
        } else {
            self.recommend(&mood).await
        };
        let recommendations = ai_recommendations
            .clone()
            .unwrap_or_else(|| self.synth.default_recommendations());

        let synth = self.synth;
        let logged = self
            .degraded
            .run(
                "wellness.mood.log",
                || async move {
                    let entry = MoodEntry {
                        id: self.store.next_id().await?,
                        timestamp: Utc::now(),
                        mood_score: mood.mood_score,
                        mood_tags: mood.mood_tags,
                        activity_tags: mood.activity_tags,
                        notes: mood.notes,
                        weather: mood.weather,
                        ai_suggestion: ai_recommendations.map(|r| r.join("\n")),
                    };
                    self.store.insert_mood(user, &entry).await?;
                    Ok(entry.id)
                },
                || synth.mood_log_id(),
            )
            .await;

        tracing::info!(target: "synomind::wellness", user, mood_id = logged.value, source = logged.source.as_str(), "mood logged");
        Ok(MoodLogged {
            mood_id: logged.value,
            recommendations,
            source: logged.source,
        })
    }

    /// Three activity suggestions from the generation backend, or `None` when it failed.
    async fn recommend(&self, mood: &ValidMoodLog) -> Option<Vec<String>> {
        let feeling = if mood.mood_tags.is_empty() {
            "neutral".to_string()
        } else {
            mood.mood_tags.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        };
        let weather = mood.weather.as_deref().unwrap_or("sunny");
        let message = format!(
            "Suggest three wellness activities for someone feeling {} on a {} day. \
             Keep each suggestion to 1-2 sentences.",
            feeling, weather
        );
        let result = self
            .generator
            .generate(&GenerationRequest::new(COACH_PROMPT, Vec::new(), message))
            .await;
        if result.failed {
            return None;
        }
        let items = parse_recommendations(&result.text);
        (!items.is_empty()).then_some(items)
    }

    pub async fn mood_history(&self, user: &str, days: u32, limit: usize) -> MoodHistory {
        let days = days.min(MAX_HISTORY_DAYS);
        let now = Utc::now();
        let synth = self.synth;
        let history = self
            .degraded
            .run(
                "wellness.mood.history",
                || self.store.query_moods(user, now - Duration::days(days as i64), now, limit),
                || {
                    let mut entries = synth.mood_history_at(now, days);
                    entries.truncate(limit);
                    entries
                },
            )
            .await;
        MoodHistory {
            trends: MoodTrends::from_entries(&history.value),
            data: history.value,
            source: history.source,
        }
    }

    pub async fn log_sleep(&self, user: &str, request: SleepLogRequest) -> CoreResult<SleepLogged> {
        let record = request.validate()?;
        let synth = self.synth;
        let logged = self
            .degraded
            .run(
                "wellness.sleep.log",
                || async move {
                    let record = SleepRecord {
                        id: self.store.next_id().await?,
                        ..record
                    };
                    self.store.insert_sleep(user, &record).await?;
                    Ok(record.id)
                },
                || synth.next_id(),
            )
            .await;
        tracing::info!(target: "synomind::wellness", user, sleep_id = logged.value, source = logged.source.as_str(), "sleep logged");
        Ok(SleepLogged {
            sleep_id: logged.value,
            source: logged.source,
        })
    }

    pub async fn sleep_history(&self, user: &str, days: u32) -> SleepHistory {
        let days = days.min(MAX_HISTORY_DAYS);
        let now = Utc::now();
        let synth = self.synth;
        let history = self
            .degraded
            .run(
                "wellness.sleep.history",
                || self.store.query_sleep(user, now - Duration::days(days as i64), now),
                || synth.sleep_history_at(now, days),
            )
            .await;
        SleepHistory {
            average_quality: average(history.value.iter().map(|s| s.quality as f64)),
            average_hours: average(history.value.iter().map(|s| s.hours())),
            data: history.value,
            source: history.source,
        }
    }

    pub async fn goals(&self, user: &str) -> GoalList {
        let synth = self.synth;
        let goals = self
            .degraded
            .run("wellness.goals.list", || self.store.list_goals(user), || synth.goals())
            .await;
        GoalList {
            goals: goals.value,
            source: goals.source,
        }
    }

    pub async fn create_goal(&self, user: &str, request: GoalRequest) -> CoreResult<GoalCreated> {
        let goal = request.validate()?;
        let synth = self.synth;
        let created = self
            .degraded
            .run(
                "wellness.goals.create",
                || async move {
                    let goal = WellnessGoal {
                        id: self.store.next_id().await?,
                        ..goal
                    };
                    self.store.insert_goal(user, &goal).await?;
                    Ok(goal.id)
                },
                || synth.next_id(),
            )
            .await;
        tracing::info!(target: "synomind::wellness", user, goal_id = created.value, source = created.source.as_str(), "goal created");
        Ok(GoalCreated {
            goal_id: created.value,
            source: created.source,
        })
    }

    pub fn suggestions(&self, category: &str) -> Suggestions {
        let (name, items) = suggestions_for(category);
        Suggestions {
            category: name.to_string(),
            suggestions: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Recent moods, sleep quality and goal progress for SynoMind prompts.
    pub async fn context(&self, user: &str) -> WellnessContext {
        let now = Utc::now();
        let synth = self.synth;
        let context = self
            .degraded
            .run(
                "wellness.context",
                || async move {
                    let week_ago = now - Duration::days(DEFAULT_HISTORY_DAYS as i64);
                    let recent_moods = self.store.query_moods(user, week_ago, now, CONTEXT_MOODS).await?;
                    let sleep = self.store.query_sleep(user, week_ago, now).await?;
                    let goals = self.store.list_goals(user).await?;
                    Ok(WellnessContext {
                        average_mood: MoodTrends::from_entries(&recent_moods).average_mood,
                        sleep_quality: average(sleep.iter().map(|s| s.quality as f64)),
                        recent_moods,
                        goals: goals
                            .into_iter()
                            .map(|g| GoalProgress { title: g.title, progress: g.progress })
                            .collect(),
                        source: DataSource::Live,
                    })
                },
                || synth.context(DataSource::Synthetic),
            )
            .await;
        WellnessContext {
            source: context.source,
            ..context.value
        }
    }
}

/// Splits generated text into at most three suggestions, dropping list numbering and bullets.
pub fn parse_recommendations(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    for bullet in ['-', '*', '•'] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim();
        }
    }
    // "1." or "2)" followed by whitespace; "2.5 hours" and "10 minutes" stay intact.
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return after.trim();
            }
        }
    }
    line
}
