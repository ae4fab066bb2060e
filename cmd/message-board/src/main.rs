//! # message-board
//!
//! Assembles the board from configuration: picks the store, wires the
//! service and serves the HTTP API until Ctrl+C or SIGTERM.

mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use api_adapters::{router, AppState};
use configs::{Settings, StorageBackend};
use domains::ThreadRepository;
use services::{ListingLimits, ThreadService};
use storage_adapters::InMemoryThreadRepository;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = configs::load_env_file();
    let settings = Settings::load().context("loading configuration")?;
    telemetry::init(&settings.log)?;
    if let Some(path) = env_file {
        info!(path = %path.display(), "loaded .env");
    }

    let repo = build_repository(&settings).await?;
    let limits = ListingLimits {
        page_size: settings.board.page_size,
        reply_preview: settings.board.reply_preview,
    };
    let service = ThreadService::with_limits(repo.clone(), limits);
    let app = router(AppState::new(service));

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "message board listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    repo.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn build_repository(settings: &Settings) -> Result<Arc<dyn ThreadRepository>> {
    match settings.database.backend {
        StorageBackend::Memory => {
            warn!("using the in-memory store; data is lost on exit");
            Ok(Arc::new(InMemoryThreadRepository::new()))
        }
        StorageBackend::Postgres => connect_postgres(settings).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn connect_postgres(settings: &Settings) -> Result<Arc<dyn ThreadRepository>> {
    use secrecy::ExposeSecret;
    use storage_adapters::{PgThreadRepository, PostgresOptions};

    let url = settings
        .database
        .url
        .as_ref()
        .context("database.url is required for the postgres backend")?;
    let options = PostgresOptions {
        url: url.expose_secret().to_string(),
        max_connections: settings.database.max_connections,
        acquire_timeout: settings.database.acquire_timeout(),
    };
    let repo = PgThreadRepository::connect(&options)
        .await
        .context("connecting to postgres")?;
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "db-postgres"))]
async fn connect_postgres(_settings: &Settings) -> Result<Arc<dyn ThreadRepository>> {
    anyhow::bail!("built without the db-postgres feature; set database.backend = \"memory\"")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received Ctrl+C, shutting down"),
        _ = terminate => warn!("received SIGTERM, shutting down"),
    }
}
