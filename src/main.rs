use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use pvwatch_core::app_state::build_app_state;
use pvwatch_core::core::config::app_config::AppConfig;
use pvwatch_core::core::logging::init_tracing;
use pvwatch_core::debug::run_debug;
use pvwatch_core::routes::app_router;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = init_tracing(&config.log_dir);
    info!(
        "Starting pvwatch-core (tz={}, day={}..{}, backend={})",
        config.timezone,
        config.boundary.day_start_hour,
        config.boundary.night_start_hour,
        config.backend_url
    );

    let state = build_app_state(config.clone())?;

    if config.debug_mode {
        run_debug(&state).await;
        return Ok(());
    }

    let listener = TcpListener::bind(config.server_addr).await?;
    info!("Listening on {}", config.server_addr);

    axum::serve(listener, app_router().with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
