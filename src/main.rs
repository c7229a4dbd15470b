/// Autoflow: automation flow execution engine
///
/// Main entry point for the Autoflow server. Initializes configuration and starts
/// the HTTP server.

use autoflow::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Automation management API at /api/automations/*
/// - Manual execution at /api/automations/{id}/execute
/// - Alert reads at /api/executions/{id}/alerts
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3004 and data/autoflow.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
