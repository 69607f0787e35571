use anyhow::{Context, Result};
use sgmodule_hub::api::{create_router, AppState};
use sgmodule_hub::config::AppConfig;
use sgmodule_hub::repository::MySqlModuleRepository;
use sgmodule_hub::service::ModuleService;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sgmodule_hub=info,tower_http=info".into()),
        )
        .init();

    info!("sgmodule-hub starting...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(config = ?config, "Configuration loaded");

    let repository = MySqlModuleRepository::connect(&config.database).await?;
    repository.ensure_schema().await?;
    info!("Module repository initialized");

    let state = AppState {
        service: ModuleService::new(Arc::new(repository)),
        api_key: config.auth_token.clone(),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    info!(port = config.server_port, "HTTP API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("sgmodule-hub stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
        // No signal to wait on; keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
