mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use tipster_api::{AppState, AppStateInner};
use tipster_db::Database;
use tipster_fixtures::{FixtureStore, HttpFixtureProvider};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tipster=debug,tipster_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.admin_secret.is_none() {
        warn!("TIPSTER_ADMIN_SECRET is unset, admin elevation is disabled");
    }

    let db = Database::open(&config.db_path)?;
    let fixtures = FixtureStore::new(config.fixtures_path.clone()).await?;
    let provider = HttpFixtureProvider::new(
        config.provider_url.clone(),
        config.provider_timeout,
        config.provider_key.clone(),
    )?;
    info!("Fixture provider: {}", config.provider_url);

    let state: AppState = Arc::new(AppStateInner {
        db,
        fixtures,
        provider: Arc::new(provider),
        admin_secret: config.admin_secret.clone(),
        miza_stake: config.miza_stake,
    });

    let app = tipster_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Tipster server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
