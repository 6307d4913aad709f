use crate::domain::contract::{apply_mvp_overlay, validate_snapshot, MvpOverlay, PlayersFile};
use crate::domain::ranking::{PlayerRankings, RankingSnapshot, Team};
use crate::time::snapshot_date::{parse_snapshot_date, snapshot_date_from_file_name, snapshot_file_name};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const ARCHIVES_DIR: &str = "archives";
const MVPS_FILE: &str = "mvps.json";
const PLAYERS_FILE: &str = "players.json";

#[derive(Debug, thiserror::Error)]
pub enum RankingsError {
    #[error("invalid date format, expected YYYY-MM-DD: {0}")]
    InvalidDate(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("no current rankings snapshot")]
    NoCurrentSnapshot,

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid snapshot: {0:#}")]
    Invalid(#[from] anyhow::Error),
}

/// Read-only view over the rankings directory.
///
/// The current snapshot lives at the top level as `YYYY-MM-DD.json`; superseded
/// snapshots are moved to `archives/`. Nothing is cached, every call re-reads
/// the files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Date of the newest eligible snapshot file in the top-level directory.
    pub async fn current_date(&self) -> Result<NaiveDate, RankingsError> {
        snapshot_dates_in(&self.root)
            .await?
            .into_iter()
            .max()
            .ok_or(RankingsError::NoCurrentSnapshot)
    }

    pub async fn current(&self) -> Result<RankingSnapshot, RankingsError> {
        let snapshot = self.current_unmerged().await?;
        self.with_mvp_overlay(snapshot).await
    }

    /// The current snapshot as published, without the `mvps.json` overlay.
    /// The vote gate reads this so a broken overlay cannot block voting.
    pub async fn current_unmerged(&self) -> Result<RankingSnapshot, RankingsError> {
        let date = self.current_date().await?;
        let path = self.root.join(snapshot_file_name(date));
        match self.read_snapshot(&path, date).await? {
            Some(snapshot) => Ok(snapshot),
            // Removed between listing and reading.
            None => Err(RankingsError::NoCurrentSnapshot),
        }
    }

    pub async fn by_date_str(&self, date: &str) -> Result<RankingSnapshot, RankingsError> {
        let date =
            parse_snapshot_date(date).ok_or_else(|| RankingsError::InvalidDate(date.to_string()))?;
        self.by_date(date).await
    }

    /// Archived snapshot for `date`, falling back to the top level so the
    /// current week can be requested by date as well.
    pub async fn by_date(&self, date: NaiveDate) -> Result<RankingSnapshot, RankingsError> {
        let file_name = snapshot_file_name(date);
        let candidates = [
            self.root.join(ARCHIVES_DIR).join(&file_name),
            self.root.join(&file_name),
        ];

        for path in &candidates {
            if let Some(snapshot) = self.read_snapshot(path, date).await? {
                return self.with_mvp_overlay(snapshot).await;
            }
        }

        Err(RankingsError::NotFound(format!("rankings for {date}")))
    }

    /// Archived snapshot dates, newest first. A missing `archives/` directory
    /// means there are no archives yet.
    pub async fn archive_dates(&self) -> Result<Vec<NaiveDate>, RankingsError> {
        let mut dates = snapshot_dates_in(&self.root.join(ARCHIVES_DIR)).await?;
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    pub async fn players(&self) -> Result<PlayerRankings, RankingsError> {
        let path = self.root.join(PLAYERS_FILE);
        let file: PlayersFile = read_json(&path)
            .await?
            .ok_or_else(|| RankingsError::NotFound(PLAYERS_FILE.to_string()))?;
        Ok(file.into_rankings())
    }

    async fn mvp_overlay(&self) -> Result<MvpOverlay, RankingsError> {
        Ok(read_json(&self.root.join(MVPS_FILE)).await?.unwrap_or_default())
    }

    async fn with_mvp_overlay(
        &self,
        mut snapshot: RankingSnapshot,
    ) -> Result<RankingSnapshot, RankingsError> {
        let overlay = self.mvp_overlay().await?;
        apply_mvp_overlay(&mut snapshot, &overlay);
        tracing::debug!(date = %snapshot.date, mvps_len = overlay.len(), "merged mvp overlay");
        Ok(snapshot)
    }

    async fn read_snapshot(
        &self,
        path: &Path,
        date: NaiveDate,
    ) -> Result<Option<RankingSnapshot>, RankingsError> {
        let Some(teams) = read_json::<Vec<Team>>(path).await? else {
            return Ok(None);
        };

        let snapshot = validate_snapshot(date, teams)?;

        tracing::debug!(
            %date,
            path = %path.display(),
            teams_len = snapshot.teams.len(),
            "loaded rankings snapshot"
        );

        Ok(Some(snapshot))
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RankingsError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(RankingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| RankingsError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

async fn snapshot_dates_in(dir: &Path) -> Result<Vec<NaiveDate>, RankingsError> {
    let io_err = |source| RankingsError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(e)),
    };

    let mut dates = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        if !entry.file_type().await.map_err(io_err)?.is_file() {
            continue;
        }
        if let Some(date) = entry
            .file_name()
            .to_str()
            .and_then(snapshot_date_from_file_name)
        {
            dates.push(date);
        }
    }
    Ok(dates)
}
