//! flangio console server

use clap::Parser;
use flangio_server::{AppState, Config};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env values become environment fallbacks for the flags
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting flangio on {}", config.bind);
    info!(
        "Store: {:?} backend, defaults {}.{}",
        config.backend, config.mongo_db_name, config.mongo_master_collection
    );

    let state = AppState::from_config(&config).await?;
    let app = flangio_server::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("flangio running on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => warn!("Unable to listen for shutdown signal: {}", err),
    }
}
