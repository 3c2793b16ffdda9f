//! FlatFly command-line client
//!
//! Main entry point.

mod app;
mod cli;
mod session_store;

use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = flat_log::init()?;

    let config = flat_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {}", e);
        flat_core::AppConfig::default()
    });

    if let Err(e) = flat_log::cleanup_old_logs(config.logging.retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    let command = cli::parse_env()?;
    tracing::debug!(?command, "FlatFly starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let app = app::App::bootstrap(config).await?;
        app.run(command).await
    })
}
