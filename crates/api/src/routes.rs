use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use powerrank_core::domain::ranking::{PlayerRankings, RankingSnapshot, Team};
use powerrank_core::domain::vote::{SubmitVote, VoteStats};
use powerrank_core::rankings::SnapshotStore;
use powerrank_core::time::snapshot_date::{parse_snapshot_date, DATE_FORMAT};
use powerrank_core::voting::VoteAggregator;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub rankings: SnapshotStore,
    /// `None` when no vote store could be set up; vote routes answer 503.
    pub votes: Option<VoteAggregator>,
}

impl AppState {
    fn votes(&self) -> Result<&VoteAggregator, ApiError> {
        self.votes
            .as_ref()
            .ok_or_else(|| ApiError::Unavailable("voting is unavailable".to_string()))
    }
}

pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/rankings", get(get_rankings))
        .route("/api/archives", get(get_archives))
        .route("/api/players", get(get_players))
        .route("/api/votes", get(get_votes))
        .route("/api/votes/submit", post(submit_vote))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct RankingsQuery {
    filename: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RankingsResponse {
    teams: Vec<Team>,
    last_updated: String,
}

impl From<RankingSnapshot> for RankingsResponse {
    fn from(snapshot: RankingSnapshot) -> Self {
        Self {
            last_updated: snapshot.date.format(DATE_FORMAT).to_string(),
            teams: snapshot.teams,
        }
    }
}

async fn get_rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<RankingsResponse>, ApiError> {
    let snapshot = match query.filename.as_deref().filter(|s| !s.is_empty()) {
        Some(date) => state.rankings.by_date_str(date).await?,
        None => state.rankings.current().await?,
    };
    Ok(Json(snapshot.into()))
}

/// Read failures degrade to an empty list.
async fn get_archives(State(state): State<AppState>) -> Json<Vec<String>> {
    match state.rankings.archive_dates().await {
        Ok(dates) => Json(
            dates
                .into_iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "archive listing failed; returning none");
            Json(Vec::new())
        }
    }
}

async fn get_players(State(state): State<AppState>) -> Result<Json<PlayerRankings>, ApiError> {
    Ok(Json(state.rankings.players().await?))
}

#[derive(Debug, Deserialize)]
struct VotesQuery {
    date: Option<String>,
}

async fn get_votes(
    State(state): State<AppState>,
    Query(query): Query<VotesQuery>,
) -> Result<Json<Vec<VoteStats>>, ApiError> {
    let Some(raw) = query.date.filter(|s| !s.is_empty()) else {
        return Ok(Json(Vec::new()));
    };
    let date = parse_snapshot_date(&raw)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date format: {raw}")))?;

    Ok(Json(state.votes()?.stats(date).await?))
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    success: bool,
}

async fn submit_vote(
    State(state): State<AppState>,
    payload: Result<Json<SubmitVote>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(vote) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    state
        .votes()?
        .submit_vote(&vote.team_id, vote.vote, &vote.date)
        .await?;

    Ok(Json(SubmitResponse { success: true }))
}
