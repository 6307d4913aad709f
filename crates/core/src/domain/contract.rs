use crate::domain::ranking::{
    Mvp, Player, PlayerRankings, RankingSnapshot, Team, PLAYER_RANKINGS_VERSION,
};
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// `mvps.json`: entity id -> most valuable player.
pub type MvpOverlay = BTreeMap<String, Mvp>;

/// On-disk shapes of `players.json`. Older files are a flat array; newer ones
/// split out honorable mentions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlayersFile {
    Grouped {
        top: Vec<Player>,
        #[serde(default, rename = "honorableMentions")]
        honorable_mentions: Vec<Player>,
    },
    Flat(Vec<Player>),
}

impl PlayersFile {
    pub fn into_rankings(self) -> PlayerRankings {
        let (mut top, mut honorable_mentions) = match self {
            Self::Grouped {
                top,
                honorable_mentions,
            } => (top, honorable_mentions),
            Self::Flat(players) => (players, Vec::new()),
        };
        top.sort_by_key(|p| p.rank);
        honorable_mentions.sort_by_key(|p| p.rank);

        PlayerRankings {
            version: PLAYER_RANKINGS_VERSION,
            top,
            honorable_mentions,
        }
    }
}

/// Checks a raw snapshot file and returns it sorted by rank.
///
/// Ids must be non-empty and unique; ranks must be exactly `1..=N`.
pub fn validate_snapshot(date: NaiveDate, teams: Vec<Team>) -> anyhow::Result<RankingSnapshot> {
    ensure!(!teams.is_empty(), "snapshot {date} has no teams");

    let n = teams.len() as i32;
    let mut seen_ids = HashSet::with_capacity(teams.len());
    let mut seen_ranks = BTreeSet::<i32>::new();

    for team in &teams {
        let id = team.id.trim();
        ensure!(!id.is_empty(), "team id must be non-empty (rank {})", team.rank);
        ensure!(seen_ids.insert(id), "duplicate team id: {id}");
        ensure!(
            (1..=n).contains(&team.rank),
            "rank out of range for {id}: {} (expected 1..={n})",
            team.rank
        );
        ensure!(seen_ranks.insert(team.rank), "duplicate rank: {}", team.rank);
    }

    for rank in 1..=n {
        if !seen_ranks.contains(&rank) {
            bail!("missing rank {rank} in snapshot {date}");
        }
    }

    let mut teams = teams;
    teams.sort_by_key(|t| t.rank);

    Ok(RankingSnapshot { date, teams })
}

/// Overlay entries win over anything written inline in the snapshot.
pub fn apply_mvp_overlay(snapshot: &mut RankingSnapshot, overlay: &MvpOverlay) {
    for team in &mut snapshot.teams {
        if let Some(mvp) = overlay.get(&team.id) {
            team.mvp = Some(mvp.clone());
        }
    }
}
