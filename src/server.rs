/// Server setup and initialization
///
/// Wires together storage, the action runner, the execution engine and HTTP routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::{create_automation_routes, create_execution_routes, AppState},
    config::Config,
    runtime::{Backends, SimulatedActionRunner},
    store::SqliteStore,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Create the main Axum application with all routes
///
/// Opens the SQLite store under the configured data directory and shares it
/// as flow, execution and alert store.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("🗄️ Opening automation database in: {}", config.database.data_dir);
    let store = SqliteStore::open(&config.database.data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open automation database: {}", e))?;

    tracing::info!("⚙️ Initializing simulated action runner ({} ms delay, {:.0}% success)",
        config.executor.action_delay_ms,
        config.executor.action_success_rate * 100.0);
    let actions = Arc::new(SimulatedActionRunner::from_config(&config.executor));

    let state = AppState {
        backends: Backends::with_store(Arc::new(store), actions),
        executor: config.executor.clone(),
    };

    Ok(create_router(state))
}

/// Build the router over an already assembled state
pub fn create_router(state: AppState) -> Router {
    tracing::info!("📡 Creating HTTP router with all endpoints");
    Router::new()
        .route("/healthz", get(health_check))
        .merge(create_automation_routes())
        .merge(create_execution_routes())
        .with_state(state)
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Autoflow server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}
