use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod service;

use config::{Config, EngineMode};
use engine::Engines;
use ledger::Ledger;
use service::Coordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Studio Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    match &config.engine {
        EngineMode::Stub => tracing::info!("Using the stub engine"),
        EngineMode::Remote { base_url } => tracing::info!("Using remote engine at {}", base_url),
    }

    let ledger = Arc::new(Ledger::new(config.max_jobs));
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&ledger),
        Engines::from_config(&config),
        config.engine_timeout,
        config.max_parallel_jobs,
    ));

    if let Some(retention) = config.job_retention {
        service::retention::spawn_sweeper(Arc::clone(&ledger), retention, config.sweep_interval);
    }

    // Build router with all API endpoints
    let app = api::create_router(coordinator, config.max_upload_bytes);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
