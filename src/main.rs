// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::diagnostic_service::DiagnosticService;
use crate::infrastructure::config::load_app_config;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    tracing::info!("Detector settings: {:?}", app_config.detector);

    // Create services (application layer)
    let diagnostic_service = DiagnosticService::new(app_config.detector);

    // Create application state
    let state = Arc::new(AppState { diagnostic_service });

    // Build router (presentation layer)
    let router = build_router(state, app_config.server.max_upload_bytes);

    // Start server
    let addr: SocketAddr = app_config.server.bind_addr.parse()?;
    tracing::info!("Starting vehicle-diagnostics service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
