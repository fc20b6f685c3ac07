//! Loan Default API - Main Entry Point
//!
//! Loads the client sample and the model, fits the scaler, then serves
//! lookups and predictions over HTTP.

use anyhow::{Context, Result};
use loan_default_api::{
    api::build_router,
    config::{AppConfig, LoggingConfig},
    context::AppContext,
    metrics::MetricsReporter,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    init_tracing(&config.logging)?;

    info!("Starting Loan Default API");
    info!(
        dataset = %config.dataset.path.display(),
        model = %config.model.path.display(),
        sample_size = config.dataset.sample_size,
        "Configuration loaded successfully"
    );

    // Everything is loaded before the listener exists; no request sees a partial state
    let context = tokio::task::spawn_blocking({
        let config = config.clone();
        move || AppContext::initialize(&config)
    })
    .await
    .context("Startup task panicked")??;
    let context = Arc::new(context);

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(
            context.metrics().clone(),
            config.metrics.report_interval_secs,
        );
        tokio::spawn(reporter.start());
    }

    let app = build_router(context.clone());

    let listener = tokio::net::TcpListener::bind(config.server.bind_address())
        .await
        .with_context(|| {
            format!("Failed to bind {}:{}", config.server.host, config.server.port)
        })?;
    info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Print final summary
    info!("Server shutting down...");
    context.metrics().print_summary();

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives)?,
        Err(_) => EnvFilter::try_new(format!(
            "loan_default_api={level},tower_http={level}",
            level = logging.level
        ))?,
    };

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
