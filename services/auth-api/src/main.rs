//! Warden Auth API
//!
//! HTTP surface over the Warden auth core: registration, login, token
//! refresh and revocation, and the trusted upgrade webhook.

mod config;
mod error;
mod extractors;
mod handlers;
mod routes;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

/// How often dead refresh tokens are purged
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(auth = ?config.auth, "Starting Warden Auth API");

    let pool = warden_db::create_pool(&config.database_url).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(config, pool)?;

    spawn_purge_task(state.clone());

    let app = routes::router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

/// Periodically delete expired and revoked refresh tokens
fn spawn_purge_task(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = state.sessions.purge_expired().await {
                tracing::warn!("Refresh token purge failed: {}", e);
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
