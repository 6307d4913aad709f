pub mod domain;
pub mod rankings;
pub mod storage;
pub mod time;
pub mod voting;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_RANKINGS_DIR: &str = "rankings";

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum VoteStoreKind {
        Postgres,
        Memory,
    }

    impl std::str::FromStr for VoteStoreKind {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "postgres" | "pg" => Ok(Self::Postgres),
                "memory" | "mem" => Ok(Self::Memory),
                other => anyhow::bail!("unknown VOTE_STORE value: {other}"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub vote_store: VoteStoreKind,
        pub rankings_dir: PathBuf,
        pub static_dir: Option<PathBuf>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let vote_store = match std::env::var("VOTE_STORE") {
                Ok(s) if !s.trim().is_empty() => s.parse()?,
                _ => VoteStoreKind::Postgres,
            };

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                vote_store,
                rankings_dir: std::env::var("RANKINGS_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_RANKINGS_DIR)),
                static_dir: std::env::var("STATIC_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_vote_store_kind() {
            assert_eq!("memory".parse::<VoteStoreKind>().unwrap(), VoteStoreKind::Memory);
            assert_eq!(" Postgres ".parse::<VoteStoreKind>().unwrap(), VoteStoreKind::Postgres);
            assert!("redis".parse::<VoteStoreKind>().is_err());
        }
    }
}
