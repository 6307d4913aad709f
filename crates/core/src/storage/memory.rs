use crate::storage::{Tally, VoteStore};
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local counter documents. Lost on restart; meant for local runs
/// without Postgres and for tests.
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    tallies: Mutex<HashMap<NaiveDate, Tally>>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VoteStore for MemoryVoteStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn apply_delta(
        &self,
        date: NaiveDate,
        team_id: &str,
        delta: i64,
    ) -> anyhow::Result<i64> {
        let mut tallies = self.tallies.lock().await;
        let entry = tallies
            .entry(date)
            .or_default()
            .entry(team_id.to_string())
            .or_insert(0);
        *entry += delta;
        Ok(*entry)
    }

    async fn tally(&self, date: NaiveDate) -> anyhow::Result<Tally> {
        Ok(self
            .tallies
            .lock()
            .await
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 12).unwrap()
    }

    #[tokio::test]
    async fn documents_are_created_lazily() {
        let store = MemoryVoteStore::new();
        assert!(store.tally(date()).await.unwrap().is_empty());

        store.apply_delta(date(), "UIUC", -1).await.unwrap();
        let tally = store.tally(date()).await.unwrap();
        assert_eq!(tally.len(), 1);
        assert_eq!(tally["UIUC"], -1);
    }

    #[tokio::test]
    async fn dates_are_independent() {
        let store = MemoryVoteStore::new();
        let other = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap();
        store.apply_delta(date(), "UIUC", 1).await.unwrap();
        assert!(store.tally(other).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deltas_are_not_lost() {
        let store = Arc::new(MemoryVoteStore::new());
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let delta = if i % 2 == 0 { 1 } else { -1 };
                    store.apply_delta(date(), "MSU", delta).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.tally(date()).await.unwrap()["MSU"], 0);
    }
}
