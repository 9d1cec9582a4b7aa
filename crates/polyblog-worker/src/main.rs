//! Route worker entry point.
//!
//! Loads configuration from the environment, registers with the broker, and
//! serves the configured route until interrupted or a fatal error occurs.
//! Any error exits the process with a non-zero status; restarting is left to
//! the supervisor.

use anyhow::Context;
use polyblog_worker::{RouteWorker, WorkerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, connection, or the serve loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("polyblog-worker starting");

    let config = WorkerConfig::from_env().context("loading configuration")?;
    info!(
        broker_url = config.broker_url,
        route = %config.route,
        layout = %config.views.layout.display(),
        content = %config.views.content.display(),
        render_failure = ?config.render_failure,
        "configuration loaded"
    );

    let worker = RouteWorker::start(&config)
        .await
        .with_context(|| format!("registering {} with {}", config.route, config.broker_url))?;

    worker
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c, serving until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("serving requests")?;

    info!("polyblog-worker stopped");
    Ok(())
}
