use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use casework_api::config::config;
use casework_api::database::{DatabaseManager, MemoryRepository, PgRepository, Repository};
use casework_api::{app, serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = config();
    tracing::info!("Starting Casework API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        bail!("SECURITY_JWT_SECRET must be set outside development");
    }
    if casework_api::is_production!() && config.security.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("SECURITY_CORS_ORIGINS allows any origin in production");
    }

    let repo: Arc<dyn Repository> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            Arc::new(PgRepository::new(pool))
        }
        None if config.is_development() => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Arc::new(MemoryRepository::new())
        }
        None => bail!("DATABASE_URL must be set outside development"),
    };

    let state = AppState::new(config.clone(), repo).context("invalid notification settings")?;
    let _sweeper = state
        .limiter
        .spawn_sweeper(Duration::from_secs(config.api.rate_limit_sweep_secs));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Casework API listening on http://{}", bind_addr);

    serve(listener, app(state), shutdown_signal()).await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
