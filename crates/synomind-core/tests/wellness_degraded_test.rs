use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use synomind_core::generation::{RemoteBackend, RemoteSettings};
use synomind_core::{
    CoreError, CoreResult, DataSource, DegradedMode, GenerationAdapter, GoalRequest, MoodEntry,
    MoodLogRequest, SledWellnessStore, SleepLogRequest, SleepRecord, WellnessGoal,
    WellnessService, WellnessStore, FALLBACK_REPLY,
};

/// Remote backend without a key: every generation is the apology, no network involved.
fn offline_generator() -> Arc<GenerationAdapter> {
    Arc::new(GenerationAdapter::Remote(RemoteBackend::new(RemoteSettings {
        api_url: "http://127.0.0.1:9".to_string(),
        model: "claude-3-5-sonnet-20241022".to_string(),
        timeout: Duration::from_secs(1),
        max_tokens: 150,
        api_key: None,
    }).unwrap()))
}

struct BrokenStore;

#[async_trait]
impl WellnessStore for BrokenStore {
    async fn next_id(&self) -> CoreResult<u64> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn insert_mood(&self, _user: &str, _entry: &MoodEntry) -> CoreResult<()> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn query_moods(
        &self,
        _user: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _limit: usize,
    ) -> CoreResult<Vec<MoodEntry>> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn insert_sleep(&self, _user: &str, _record: &SleepRecord) -> CoreResult<()> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn query_sleep(
        &self,
        _user: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> CoreResult<Vec<SleepRecord>> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn insert_goal(&self, _user: &str, _goal: &WellnessGoal) -> CoreResult<()> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn list_goals(&self, _user: &str) -> CoreResult<Vec<WellnessGoal>> {
        Err(CoreError::Store("connection refused".into()))
    }
    async fn ping(&self) -> CoreResult<()> {
        Err(CoreError::Store("connection refused".into()))
    }
}

fn mood_request(score: i64) -> MoodLogRequest {
    MoodLogRequest {
        mood_score: Some(score),
        mood_tags: Some(vec!["calm".into(), "focused".into()]),
        activity_tags: Some(vec!["reading".into()]),
        ..Default::default()
    }
}

#[tokio::test]
async fn degraded_mood_history_has_requested_days() {
    let degraded = Arc::new(DegradedMode::new());
    degraded.enable("store probe timed out");
    let service = WellnessService::new(
        Arc::new(SledWellnessStore::temporary().unwrap()),
        degraded,
        offline_generator(),
    );

    let history = service.mood_history("demo-user", 10, 30).await;
    assert_eq!(history.source, DataSource::Synthetic);
    assert_eq!(history.data.len(), 10);
    for entry in &history.data {
        assert!((1..=10).contains(&entry.mood_score));
        assert!(!entry.mood_tags.is_empty());
    }
    for pair in history.data.windows(2) {
        assert!(pair[0].timestamp > pair[1].timestamp);
    }
    assert!(history.trends.average_mood >= 1.0);
}

#[tokio::test]
async fn validation_wins_over_degraded_mode() {
    let degraded = Arc::new(DegradedMode::new());
    degraded.enable("configured");
    let service = WellnessService::new(Arc::new(BrokenStore), degraded, offline_generator());

    let err = service.log_mood("demo-user", mood_request(0)).await.unwrap_err();
    assert!(err.is_validation());

    let err = service
        .log_sleep("demo-user", SleepLogRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required field: startTime");
}

#[tokio::test]
async fn broken_store_degrades_single_request() {
    let degraded = Arc::new(DegradedMode::new());
    let service = WellnessService::new(Arc::new(BrokenStore), degraded.clone(), offline_generator());

    let logged = service.log_mood("demo-user", mood_request(7)).await.unwrap();
    assert_eq!(logged.source, DataSource::LocalDegrade);
    assert_eq!(logged.recommendations.len(), 3);
    assert!(!logged.recommendations.iter().any(|r| r == FALLBACK_REPLY));

    let history = service.mood_history("demo-user", 4, 30).await;
    assert_eq!(history.source, DataSource::LocalDegrade);
    assert_eq!(history.data.len(), 4);

    let goals = service.goals("demo-user").await;
    assert_eq!(goals.source, DataSource::LocalDegrade);
    assert!(!goals.goals.is_empty());

    assert!(!degraded.is_degraded());
}

#[tokio::test]
async fn live_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledWellnessStore::open_path(dir.path()).unwrap());
    let service = WellnessService::new(store, Arc::new(DegradedMode::new()), offline_generator());

    let first = service.log_mood("alice", mood_request(6)).await.unwrap();
    let second = service.log_mood("alice", mood_request(9)).await.unwrap();
    assert_eq!(first.source, DataSource::Live);
    assert_ne!(first.mood_id, second.mood_id);

    let history = service.mood_history("alice", 7, 30).await;
    assert_eq!(history.source, DataSource::Live);
    assert_eq!(history.data.len(), 2);
    assert_eq!(history.data[0].mood_score, 9);
    assert_eq!(history.trends.average_mood, 7.5);

    assert!(service.mood_history("bob", 7, 30).await.data.is_empty());

    let created = service
        .create_goal(
            "alice",
            GoalRequest {
                title: Some("Zero-waste week".into()),
                category: Some("environment".into()),
                target_date: Some("2030-01-01".into()),
            },
        )
        .await
        .unwrap();
    let goals = service.goals("alice").await;
    assert_eq!(goals.goals.len(), 1);
    assert_eq!(goals.goals[0].id, created.goal_id);

    let context = service.context("alice").await;
    assert_eq!(context.source, DataSource::Live);
    assert_eq!(context.recent_moods.len(), 2);
    assert_eq!(context.goals[0].title, "Zero-waste week");
}

#[tokio::test]
async fn sleep_log_and_history() {
    let service = WellnessService::new(
        Arc::new(SledWellnessStore::temporary().unwrap()),
        Arc::new(DegradedMode::new()),
        offline_generator(),
    );
    let end = Utc::now() - chrono::Duration::hours(1);
    let logged = service
        .log_sleep(
            "alice",
            SleepLogRequest {
                start_time: Some(end - chrono::Duration::hours(8)),
                end_time: Some(end),
                quality: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(logged.source, DataSource::Live);

    let history = service.sleep_history("alice", 7).await;
    assert_eq!(history.data.len(), 1);
    assert_eq!(history.average_hours, 8.0);
    assert_eq!(history.average_quality, 4.0);
}

#[test]
fn suggestions_fall_back_to_general() {
    let service = WellnessService::new(
        Arc::new(BrokenStore),
        Arc::new(DegradedMode::new()),
        offline_generator(),
    );
    assert_eq!(service.suggestions("nutrition").category, "nutrition");
    assert_eq!(service.suggestions("crystals").category, "general");
}

#[tokio::test]
async fn oversized_history_window_is_clamped_on_live_store() {
    let service = WellnessService::new(
        Arc::new(SledWellnessStore::temporary().unwrap()),
        Arc::new(DegradedMode::new()),
        offline_generator(),
    );
    service.log_mood("alice", mood_request(5)).await.unwrap();

    let moods = service.mood_history("alice", u32::MAX, 30).await;
    assert_eq!(moods.source, DataSource::Live);
    assert_eq!(moods.data.len(), 1);

    let sleep = service.sleep_history("alice", u32::MAX).await;
    assert_eq!(sleep.source, DataSource::Live);
    assert!(sleep.data.is_empty());
}
