//! Model Server - Main Entry Point

use model_server::run_server;
use service_core::{init_logging, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    init_logging(&settings.log_level, &settings.log_format)?;

    info!("=== Model Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading model from {}", settings.model_dir);

    run_server(&settings).await?;

    Ok(())
}
