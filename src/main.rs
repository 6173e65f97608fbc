//! Tagwatch daemon entry point.

use log::{error, info};
use tokio::signal;

use tagwatch::config::Config;
use tagwatch::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let cfg = Config::load()?;
    info!("Starting tagwatch daemon with config: {:?}", cfg.masked());

    // Store, bus, registries, triggers and watchers
    let mut context = Context::init(&cfg).await?;
    context.start();

    // Graceful Shutdown
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, shutting down...");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    context.shutdown().await?;

    info!("Shutdown complete.");
    Ok(())
}
