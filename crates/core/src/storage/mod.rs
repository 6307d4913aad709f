use anyhow::Context;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub mod memory;
pub mod votes;

/// Per-date counter map: team id -> net votes.
pub type Tally = BTreeMap<String, i64>;

/// Persistence for vote counter documents.
///
/// `apply_delta` must be an atomic read-modify-write: concurrent calls for the
/// same date are all reflected in the final tally.
#[async_trait::async_trait]
pub trait VoteStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Creates the date's document if needed, applies `delta` to `team_id`
    /// and returns the new total for that team.
    async fn apply_delta(&self, date: NaiveDate, team_id: &str, delta: i64)
        -> anyhow::Result<i64>;

    /// An absent document is an empty tally.
    async fn tally(&self, date: NaiveDate) -> anyhow::Result<Tally>;
}

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}
