//! sims-di - Document Import module
//!
//! **Module Identity:**
//! - Name: sims-di (Document Import)
//! - Port: 5731 (default)
//!
//! Owns the DOCX import review & approval workflow for student
//! class-of-degree updates: validates and uploads candidate documents to
//! the document processing service, holds the client-side review ledger,
//! and submits approved updates back in one batch.
//!
//! Integrates with the portal UI via HTTP REST + SSE.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sims_common::config;
use sims_common::events::EventBus;
use sims_di::services::StaticCredentials;
use sims_di::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load TOML config before tracing so the configured level applies;
    // RUST_LOG still wins when set.
    let config_path = config::config_file_path("sims-di")?;
    let toml_config = config::load_toml_config(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(toml_config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting sims-di (Document Import) module");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Config file: {}", config_path.display());

    // Resolve document service endpoint and credentials (ENV → TOML)
    let service_url = sims_di::config::resolve_service_url(&toml_config);
    let api_token = sims_di::config::resolve_api_token(&toml_config)?;
    let port = sims_di::config::resolve_listen_port(&toml_config);

    info!("Document service: {}", service_url);

    let credentials = Arc::new(StaticCredentials::new(api_token));

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    let state = AppState::new(&service_url, credentials, event_bus)?;
    let app = sims_di::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
