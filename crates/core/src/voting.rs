use crate::domain::vote::{VoteDirection, VoteStats};
use crate::rankings::{RankingsError, SnapshotStore};
use crate::storage::VoteStore;
use crate::time::snapshot_date::parse_snapshot_date;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("invalid date format, expected YYYY-MM-DD: {0}")]
    InvalidDate(String),

    #[error("voting is closed for {requested}; only {current} is open")]
    NotCurrent {
        requested: NaiveDate,
        current: NaiveDate,
    },

    #[error("no current rankings are open for voting")]
    NoCurrentSnapshot,

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("failed to load current rankings")]
    Rankings(#[source] RankingsError),

    #[error("failed to submit vote")]
    Store(#[source] anyhow::Error),

    #[error("failed to read vote stats")]
    Stats(#[source] anyhow::Error),
}

/// Applies crowd votes to the current snapshot's counter document.
#[derive(Clone)]
pub struct VoteAggregator {
    rankings: SnapshotStore,
    store: Arc<dyn VoteStore>,
}

impl VoteAggregator {
    pub fn new(rankings: SnapshotStore, store: Arc<dyn VoteStore>) -> Self {
        Self { rankings, store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Only the current snapshot's date accepts votes, which freezes every
    /// archived week. Nothing is returned; callers re-read [`Self::stats`].
    pub async fn submit_vote(
        &self,
        team_id: &str,
        direction: VoteDirection,
        date: &str,
    ) -> Result<(), VoteError> {
        let requested =
            parse_snapshot_date(date).ok_or_else(|| VoteError::InvalidDate(date.to_string()))?;

        let current = match self.rankings.current_unmerged().await {
            Ok(snapshot) => snapshot,
            Err(RankingsError::NoCurrentSnapshot) => return Err(VoteError::NoCurrentSnapshot),
            Err(e) => return Err(VoteError::Rankings(e)),
        };

        if requested != current.date {
            return Err(VoteError::NotCurrent {
                requested,
                current: current.date,
            });
        }

        if !current.contains_team(team_id) {
            return Err(VoteError::UnknownTeam(team_id.to_string()));
        }

        let delta = direction.delta();
        let total = self
            .store
            .apply_delta(requested, team_id, delta)
            .await
            .map_err(VoteError::Store)?;

        tracing::info!(date = %requested, team_id, delta, total, "vote recorded");
        Ok(())
    }

    /// Totals for `date`, ordered by team id. No document means no votes.
    pub async fn stats(&self, date: NaiveDate) -> Result<Vec<VoteStats>, VoteError> {
        let tally = self.store.tally(date).await.map_err(VoteError::Stats)?;
        Ok(tally
            .into_iter()
            .map(|(team_id, total)| VoteStats { team_id, total })
            .collect())
    }
}
