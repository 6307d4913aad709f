use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use powerrank_core::config::{Settings, VoteStoreKind};
use powerrank_core::rankings::SnapshotStore;
use powerrank_core::storage::memory::MemoryVoteStore;
use powerrank_core::storage::votes::PgVoteStore;
use powerrank_core::storage::VoteStore;
use powerrank_core::voting::VoteAggregator;

mod error;
mod routes;

use routes::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let rankings = SnapshotStore::new(settings.rankings_dir.clone());
    match rankings.current_date().await {
        Ok(date) => tracing::info!(%date, dir = %rankings.root().display(), "current rankings"),
        Err(e) => tracing::warn!(error = %e, dir = %rankings.root().display(), "no current rankings at startup"),
    }

    let votes = init_vote_store(&settings)
        .await
        .map(|store| VoteAggregator::new(rankings.clone(), store));
    if let Some(votes) = &votes {
        tracing::info!(backend = votes.backend_name(), "vote store ready");
    }

    let state = AppState { rankings, votes };
    let app = build_router(state, settings.static_dir.as_deref());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Connects once at startup. Failures leave the API up in degraded mode:
/// rankings are served, vote routes answer 503.
async fn init_vote_store(settings: &Settings) -> Option<Arc<dyn VoteStore>> {
    if settings.vote_store == VoteStoreKind::Memory {
        tracing::warn!("using in-memory vote store; tallies are lost on restart");
        let store: Arc<dyn VoteStore> = Arc::new(MemoryVoteStore::new());
        return Some(store);
    }

    match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match powerrank_core::storage::migrate(&pool).await {
                Ok(()) => {
                    let store: Arc<dyn VoteStore> = Arc::new(PgVoteStore::new(pool));
                    Some(store)
                }
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
