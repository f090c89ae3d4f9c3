//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;
mod routes;

use auth::application::BootstrapAdminUseCase;
use auth::{AuthAppState, InMemoryUserRepository, KvSessionStore, TokenCodec};
use config::ApiConfig;
use platform::kv::MemoryKeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired session records are swept from the key-value store
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    config.auth.validate()?;

    // A bad key must stop startup, not surface on the first request
    let codec = TokenCodec::new(&config.auth.token_secret)
        .map_err(|e| anyhow::anyhow!("invalid AUTH_TOKEN_SECRET: {e}"))?;

    tracing::info!(
        access_ttl_secs = config.auth.access_token_ttl.as_secs(),
        refresh_ttl_secs = config.auth.refresh_token_ttl.as_secs(),
        pepper = config.auth.password_pepper.is_some(),
        "Auth configured"
    );

    // Session storage
    let kv = Arc::new(MemoryKeyValueStore::new());
    let sweeper = kv.spawn_sweeper(SESSION_SWEEP_INTERVAL);

    let state = AuthAppState::new(
        InMemoryUserRepository::new(),
        KvSessionStore::new(kv),
        codec,
        config.auth,
    );

    if let Some(admin) = config.bootstrap_admin {
        let summary = BootstrapAdminUseCase::new(state.users.clone(), state.config.clone())
            .execute(admin)
            .await?;
        tracing::info!(user_id = %summary.id, role = %summary.role, "Bootstrap admin ready");
    }

    let app = routes::app(state, &config.frontend_origins);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down server...");
}
