use crate::storage::{Tally, VoteStore};
use anyhow::Context;
use chrono::NaiveDate;
use sqlx::types::Json;

/// Counter documents in `vote_tallies`, one JSONB row per snapshot date.
#[derive(Debug, Clone)]
pub struct PgVoteStore {
    pool: sqlx::PgPool,
}

impl PgVoteStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VoteStore for PgVoteStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn apply_delta(
        &self,
        date: NaiveDate,
        team_id: &str,
        delta: i64,
    ) -> anyhow::Result<i64> {
        let mut tx = self.pool.begin().await.context("begin transaction failed")?;

        sqlx::query(
            "INSERT INTO vote_tallies (snapshot_date) VALUES ($1) \
             ON CONFLICT (snapshot_date) DO NOTHING",
        )
        .persistent(false)
        .bind(date)
        .execute(&mut *tx)
        .await
        .context("create vote_tallies document failed")?;

        // Row lock serializes concurrent voters for the same date until commit.
        let Json(mut counts): Json<Tally> = sqlx::query_scalar(
            "SELECT counts FROM vote_tallies WHERE snapshot_date = $1 FOR UPDATE",
        )
        .persistent(false)
        .bind(date)
        .fetch_one(&mut *tx)
        .await
        .context("lock vote_tallies document failed")?;

        let total = {
            let entry = counts.entry(team_id.to_string()).or_insert(0);
            *entry += delta;
            *entry
        };

        sqlx::query(
            "UPDATE vote_tallies SET counts = $2, updated_at = now() \
             WHERE snapshot_date = $1",
        )
        .persistent(false)
        .bind(date)
        .bind(Json(&counts))
        .execute(&mut *tx)
        .await
        .context("update vote_tallies document failed")?;

        tx.commit().await.context("commit transaction failed")?;
        Ok(total)
    }

    async fn tally(&self, date: NaiveDate) -> anyhow::Result<Tally> {
        let row: Option<Json<Tally>> =
            sqlx::query_scalar("SELECT counts FROM vote_tallies WHERE snapshot_date = $1")
                .persistent(false)
                .bind(date)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("read vote_tallies failed (date={date})"))?;

        Ok(row.map(|Json(counts)| counts).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Runs only against a disposable database.
    async fn test_store(date: NaiveDate) -> Option<PgVoteStore> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("skipping postgres vote store test: TEST_DATABASE_URL not set");
            return None;
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .expect("connect TEST_DATABASE_URL failed");
        crate::storage::migrate(&pool).await.expect("migrations failed");
        sqlx::query("DELETE FROM vote_tallies WHERE snapshot_date = $1")
            .bind(date)
            .execute(&pool)
            .await
            .expect("reset vote_tallies row failed");
        Some(PgVoteStore::new(pool))
    }

    #[tokio::test]
    async fn absent_document_is_empty_tally() {
        let date = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
        let Some(store) = test_store(date).await else {
            return;
        };
        assert!(store.tally(date).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sequential_deltas_accumulate() {
        let date = NaiveDate::from_ymd_opt(1999, 1, 2).unwrap();
        let Some(store) = test_store(date).await else {
            return;
        };

        store.apply_delta(date, "UIUC", 1).await.unwrap();
        store.apply_delta(date, "UIUC", 1).await.unwrap();
        let total = store.apply_delta(date, "UIUC", -1).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(store.tally(date).await.unwrap().get("UIUC"), Some(&1));
    }

    #[tokio::test]
    async fn concurrent_deltas_are_not_lost() {
        let date = NaiveDate::from_ymd_opt(1999, 1, 3).unwrap();
        let Some(store) = test_store(date).await else {
            return;
        };
        let store = Arc::new(store);

        let voters = 25;
        let handles: Vec<_> = (0..voters)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let delta = if i % 2 == 0 { 1 } else { -1 };
                    store.apply_delta(date, "PUR", delta).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        // 13 up, 12 down.
        assert_eq!(store.tally(date).await.unwrap().get("PUR"), Some(&1));
    }
}
