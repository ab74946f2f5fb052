//! # media-board Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use mb_api::AppState;
use mb_config::{LogSettings, Settings};
use mb_core::{ForumRepo, MediaCatalogRepo, MediaListRepo, MediaTitle, ProfileStore};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "db-sqlite")]
use mb_db_sqlite::SqliteStore;

#[cfg(all(feature = "db-memory", not(feature = "db-sqlite")))]
use mb_db_memory::MemoryStore;

#[cfg(feature = "auth-simple")]
use mb_auth_simple::SimpleIdentityProvider;

#[cfg(not(any(feature = "db-sqlite", feature = "db-memory")))]
compile_error!("enable one storage backend: `db-sqlite` or `db-memory`");

#[cfg(not(feature = "auth-simple"))]
compile_error!("enable an identity backend: `auth-simple`");

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings.log)?;

    // 1. Storage
    #[cfg(feature = "db-sqlite")]
    let store = Arc::new(
        SqliteStore::new(&settings.database.url, settings.database.max_connections)
            .await
            .with_context(|| format!("failed to open {}", settings.database.url))?,
    );

    #[cfg(all(feature = "db-memory", not(feature = "db-sqlite")))]
    let store = Arc::new(MemoryStore::new());

    // 2. Identity
    let identity = Arc::new(SimpleIdentityProvider::new(settings.auth.pepper));

    let state = assemble(store, identity);

    // 3. Catalog seed
    if let Some(seed) = &settings.catalog.seed_file {
        seed_catalog(&state, seed).await?;
    }

    let app = mb_api::app(state, &settings.cors.allowed_origins);
    let address = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(%address, "media-board listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// One store serves every persistence port.
fn assemble<S>(store: Arc<S>, identity: Arc<SimpleIdentityProvider>) -> AppState
where
    S: ForumRepo + MediaListRepo + MediaCatalogRepo + ProfileStore + 'static,
{
    AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        identity,
    )
}

async fn seed_catalog(state: &AppState, path: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog seed {}", path.display()))?;
    let titles: Vec<MediaTitle> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid catalog seed {}", path.display()))?;
    state.catalog.import(titles).await?;
    Ok(())
}

fn init_tracing(log: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    if log.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutting down");
}
