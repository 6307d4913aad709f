use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const PLAYER_RANKINGS_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub rank: i32,
    pub name: String,
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<i32>,
    pub blurb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TeamStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp: Option<Mvp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Hot,
    Cold,
    Bubble,
    Lock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mvp {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headshot_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
}

/// A validated snapshot: teams sorted by rank, ranks exactly `1..=N`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingSnapshot {
    pub date: NaiveDate,
    pub teams: Vec<Team>,
}

impl RankingSnapshot {
    pub fn contains_team(&self, team_id: &str) -> bool {
        self.teams.iter().any(|t| t.id == team_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub rank: i32,
    pub name: String,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headshot_url: Option<String>,
    pub blurb: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRankings {
    pub version: u32,
    pub top: Vec<Player>,
    pub honorable_mentions: Vec<Player>,
}
