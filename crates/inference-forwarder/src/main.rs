//! Inference Forwarder - Main Entry Point

use inference_forwarder::run_server;
use service_core::{init_logging, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    init_logging(&settings.log_level, &settings.log_format)?;

    info!("=== Inference Forwarder v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(&settings).await?;

    Ok(())
}
