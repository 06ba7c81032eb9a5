//! Wellness persistence seam.
//!
//! The service only sees [`WellnessStore`]. [`SledWellnessStore`] keeps JSON records in one tree
//! per kind; time-series keys are `{user}\0{timestamp_ms:020}\0{id:020}` so a user's records sort
//! chronologically and a time window is a plain range scan.

use super::records::{MoodEntry, SleepRecord, WellnessGoal};
use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const MOOD_TREE: &str = "mood";
const SLEEP_TREE: &str = "sleep";
const GOAL_TREE: &str = "goals";

#[async_trait]
pub trait WellnessStore: Send + Sync {
    /// Fresh record id.
    async fn next_id(&self) -> CoreResult<u64>;
    async fn insert_mood(&self, user: &str, entry: &MoodEntry) -> CoreResult<()>;
    /// Entries within `[from, to]`, newest first, at most `limit`.
    async fn query_moods(
        &self,
        user: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> CoreResult<Vec<MoodEntry>>;
    async fn insert_sleep(&self, user: &str, record: &SleepRecord) -> CoreResult<()>;
    /// Records whose end time falls within `[from, to]`, newest first.
    async fn query_sleep(
        &self,
        user: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<SleepRecord>>;
    async fn insert_goal(&self, user: &str, goal: &WellnessGoal) -> CoreResult<()>;
    async fn list_goals(&self, user: &str) -> CoreResult<Vec<WellnessGoal>>;
    /// Cheap liveness probe used at startup.
    async fn ping(&self) -> CoreResult<()>;
}

pub struct SledWellnessStore {
    db: sled::Db,
}

impl SledWellnessStore {
    pub fn open_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Throwaway store for tests and demos.
    pub fn temporary() -> CoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn time_key(user: &str, at: DateTime<Utc>, id: u64) -> Vec<u8> {
        let ms = at.timestamp_millis().max(0) as u64;
        format!("{}\0{:020}\0{:020}", user, ms, id).into_bytes()
    }

    fn put<T: Serialize>(&self, tree: &str, key: Vec<u8>, value: &T) -> CoreResult<()> {
        let tree = self.db.open_tree(tree)?;
        let bytes = serde_json::to_vec(value)?;
        tree.insert(key, bytes)?;
        Ok(())
    }

    /// Newest-first scan of one user's window.
    fn range_desc<T: DeserializeOwned>(
        &self,
        tree: &str,
        user: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> CoreResult<Vec<T>> {
        if from > to || limit == 0 {
            return Ok(Vec::new());
        }
        let tree = self.db.open_tree(tree)?;
        let lower = Self::time_key(user, from, 0);
        let upper = Self::time_key(user, to, u64::MAX);
        let mut out = Vec::new();
        for item in tree.range(lower..=upper).rev() {
            let (_, value) = item?;
            out.push(serde_json::from_slice(&value)?);
            if out.len() >= limit {
                break;
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl WellnessStore for SledWellnessStore {
    async fn next_id(&self) -> CoreResult<u64> {
        // sled ids start at 0; 0 is reserved for "unassigned".
        Ok(self.db.generate_id()? + 1)
    }

    async fn insert_mood(&self, user: &str, entry: &MoodEntry) -> CoreResult<()> {
        self.put(MOOD_TREE, Self::time_key(user, entry.timestamp, entry.id), entry)?;
        tracing::debug!(target: "synomind::store", user, id = entry.id, "mood entry stored");
        Ok(())
    }

    async fn query_moods(
        &self,
        user: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: usize,
    ) -> CoreResult<Vec<MoodEntry>> {
        self.range_desc(MOOD_TREE, user, from, to, limit)
    }

    async fn insert_sleep(&self, user: &str, record: &SleepRecord) -> CoreResult<()> {
        self.put(SLEEP_TREE, Self::time_key(user, record.end_time, record.id), record)?;
        tracing::debug!(target: "synomind::store", user, id = record.id, "sleep record stored");
        Ok(())
    }

    async fn query_sleep(
        &self,
        user: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<SleepRecord>> {
        self.range_desc(SLEEP_TREE, user, from, to, usize::MAX)
    }

    async fn insert_goal(&self, user: &str, goal: &WellnessGoal) -> CoreResult<()> {
        let key = format!("{}\0{:020}", user, goal.id).into_bytes();
        self.put(GOAL_TREE, key, goal)
    }

    async fn list_goals(&self, user: &str) -> CoreResult<Vec<WellnessGoal>> {
        let tree = self.db.open_tree(GOAL_TREE)?;
        let prefix = format!("{}\0", user);
        tree.scan_prefix(prefix.as_bytes())
            .map(|item| -> CoreResult<WellnessGoal> {
                let (_, value) = item?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    async fn ping(&self) -> CoreResult<()> {
        self.db
            .open_tree(MOOD_TREE)
            .map(|_| ())
            .map_err(|e| CoreError::Store(format!("store unreachable: {}", e)))
    }
}

/// Stand-in when the real store cannot be opened. Every call fails, so each request degrades.
#[derive(Debug, Default)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn err<T>(&self) -> CoreResult<T> {
        Err(CoreError::Store(format!("store unavailable: {}", self.reason)))
    }
}

#[async_trait]
impl WellnessStore for UnavailableStore {
    async fn next_id(&self) -> CoreResult<u64> {
        self.err()
    }

    async fn insert_mood(&self, _user: &str, _entry: &MoodEntry) -> CoreResult<()> {
        self.err()
    }

    async fn query_moods(
        &self,
        _user: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _limit: usize,
    ) -> CoreResult<Vec<MoodEntry>> {
        self.err()
    }

    async fn insert_sleep(&self, _user: &str, _record: &SleepRecord) -> CoreResult<()> {
        self.err()
    }

    async fn query_sleep(
        &self,
        _user: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> CoreResult<Vec<SleepRecord>> {
        self.err()
    }

    async fn insert_goal(&self, _user: &str, _goal: &WellnessGoal) -> CoreResult<()> {
        self.err()
    }

    async fn list_goals(&self, _user: &str) -> CoreResult<Vec<WellnessGoal>> {
        self.err()
    }

    async fn ping(&self) -> CoreResult<()> {
        self.err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn mood(id: u64, at: DateTime<Utc>, score: u8) -> MoodEntry {
        MoodEntry {
            id,
            timestamp: at,
            mood_score: score,
            mood_tags: vec!["calm".into()],
            activity_tags: vec!["reading".into()],
            notes: String::new(),
            weather: None,
            ai_suggestion: None,
        }
    }

    #[tokio::test]
    async fn mood_window_is_newest_first_and_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledWellnessStore::open_path(dir.path()).unwrap();
        let now = Utc::now();
        for (i, score) in [6u8, 7, 8].iter().enumerate() {
            let id = store.next_id().await.unwrap();
            store
                .insert_mood("alice", &mood(id, now - Duration::days(i as i64), *score))
                .await
                .unwrap();
        }
        store.insert_mood("bob", &mood(99, now, 2)).await.unwrap();
        store
            .insert_mood("alice", &mood(100, now - Duration::days(30), 1))
            .await
            .unwrap();

        let got = store
            .query_moods("alice", now - Duration::days(7), now, 30)
            .await
            .unwrap();
        let scores: Vec<u8> = got.iter().map(|m| m.mood_score).collect();
        assert_eq!(scores, vec![6, 7, 8]);

        let limited = store
            .query_moods("alice", now - Duration::days(7), now, 2)
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn goals_round_through_store() {
        let store = SledWellnessStore::temporary().unwrap();
        let goal = WellnessGoal {
            id: store.next_id().await.unwrap(),
            title: "Meatless Mondays".into(),
            category: "nutrition".into(),
            target_date: Utc::now() + Duration::days(30),
            progress: 0,
        };
        store.insert_goal("alice", &goal).await.unwrap();
        assert_eq!(store.list_goals("alice").await.unwrap(), vec![goal]);
        assert!(store.list_goals("bob").await.unwrap().is_empty());
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn ids_are_never_zero() {
        let store = SledWellnessStore::temporary().unwrap();
        assert!(store.next_id().await.unwrap() > 0);
    }

    #[tokio::test]
    async fn unavailable_store_always_fails() {
        let store = UnavailableStore::new("probe timed out");
        assert!(matches!(store.ping().await, Err(CoreError::Store(_))));
        assert!(store.list_goals("alice").await.is_err());
    }
}
